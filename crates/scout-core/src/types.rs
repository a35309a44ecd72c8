// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model for the Scout feed engine: opportunity records, the filter
//! value object, connection status, and the paged-fetch request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The fixed set of product names an opportunity feed can be filtered by.
///
/// Serialized forms match the upstream service verbatim, including spaces
/// and ampersands, so they can be sent as the `product` query parameter
/// and compared against pushed event topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum Product {
    #[strum(serialize = "PFAS")]
    #[serde(rename = "PFAS")]
    Pfas,
    #[strum(serialize = "Soil Remediation")]
    #[serde(rename = "Soil Remediation")]
    SoilRemediation,
    #[strum(serialize = "Mining")]
    #[serde(rename = "Mining")]
    Mining,
    #[strum(serialize = "Gold Recovery")]
    #[serde(rename = "Gold Recovery")]
    GoldRecovery,
    #[strum(serialize = "Drinking Water")]
    #[serde(rename = "Drinking Water")]
    DrinkingWater,
    #[strum(serialize = "Wastewater Treatment")]
    #[serde(rename = "Wastewater Treatment")]
    WastewaterTreatment,
    #[strum(serialize = "Air & Gas Purification")]
    #[serde(rename = "Air & Gas Purification")]
    AirGasPurification,
    #[strum(serialize = "Mercury Removal")]
    #[serde(rename = "Mercury Removal")]
    MercuryRemoval,
    #[strum(serialize = "Food & Beverage")]
    #[serde(rename = "Food & Beverage")]
    FoodBeverage,
    #[strum(serialize = "Energy Storage")]
    #[serde(rename = "Energy Storage")]
    EnergyStorage,
    #[strum(serialize = "Catalyst Support")]
    #[serde(rename = "Catalyst Support")]
    CatalystSupport,
    #[strum(serialize = "Automotive Filters")]
    #[serde(rename = "Automotive Filters")]
    AutomotiveFilters,
    #[strum(serialize = "Medical & Pharma")]
    #[serde(rename = "Medical & Pharma")]
    MedicalPharma,
    #[strum(serialize = "Nuclear Applications")]
    #[serde(rename = "Nuclear Applications")]
    NuclearApplications,
    #[strum(serialize = "EDLC")]
    #[serde(rename = "EDLC")]
    Edlc,
    #[strum(serialize = "Silicon Anodes")]
    #[serde(rename = "Silicon Anodes")]
    SiliconAnodes,
    #[strum(serialize = "Lithium Iron Batteries")]
    #[serde(rename = "Lithium Iron Batteries")]
    LithiumIronBatteries,
    #[strum(serialize = "Carbon Block Filters")]
    #[serde(rename = "Carbon Block Filters")]
    CarbonBlockFilters,
    #[strum(serialize = "Activated Carbon for Gold Recovery")]
    #[serde(rename = "Activated Carbon for Gold Recovery")]
    ActivatedCarbonGoldRecovery,
    #[strum(serialize = "Activated Carbon for EDLC")]
    #[serde(rename = "Activated Carbon for EDLC")]
    ActivatedCarbonEdlc,
    #[strum(serialize = "Activated Carbon for Silicon Anodes")]
    #[serde(rename = "Activated Carbon for Silicon Anodes")]
    ActivatedCarbonSiliconAnodes,
    #[strum(serialize = "Jacobi Updates")]
    #[serde(rename = "Jacobi Updates")]
    JacobiUpdates,
    #[strum(serialize = "Jacobi Profile")]
    #[serde(rename = "Jacobi Profile")]
    JacobiProfile,
    #[strum(serialize = "Haycarb Updates")]
    #[serde(rename = "Haycarb Updates")]
    HaycarbUpdates,
}

/// The time-window filter applied server-side to fetched pages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "day")]
    Day,
    #[strum(serialize = "month")]
    Month,
    #[strum(serialize = "year")]
    Year,
}

/// The active filter combination: exactly one product and one period.
///
/// A pure value object; changing either member resets the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub product: Product,
    pub period: Period,
}

impl FilterState {
    pub fn new(product: Product, period: Period) -> Self {
        Self { product, period }
    }

    /// Loose topic match used to route pushed events.
    ///
    /// Accepts an exact match or a case-insensitive substring containment
    /// of the product name inside the topic. The match is intentionally
    /// asymmetric: product names may appear as sub-phrases of topics
    /// (topic "Jacobi Updates - PFAS Division" matches product "PFAS"),
    /// but a topic that is merely a sub-phrase of the product does not.
    pub fn accepts_topic(&self, topic: &str) -> bool {
        let product = self.product.to_string();
        topic == product || topic.to_lowercase().contains(&product.to_lowercase())
    }
}

impl std::fmt::Display for FilterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.product, self.period)
    }
}

/// Health of the push channel, surfaced to presentation as a status flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionStatus {
    #[strum(serialize = "connecting")]
    Connecting,
    #[strum(serialize = "connected")]
    Connected,
    #[strum(serialize = "disconnected")]
    Disconnected,
}

/// Parameters of one paged query against the opportunity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub product: Product,
    pub period: Period,
    pub offset: usize,
    pub limit: usize,
}

impl std::fmt::Display for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "product={} period={} skip={} limit={}",
            self.product, self.period, self.offset, self.limit
        )
    }
}

/// A single market/news item surfaced by the feed.
///
/// Every field other than `title` is optional: records missing fields are
/// rendered with safe defaults, never rejected. Unknown fields on inbound
/// frames are retained in `extra` and passed through to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Tag matched against the active product filter for pushed events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Opportunity {
    /// Source text with the display default for absent values.
    pub fn source_display(&self) -> &str {
        self.source.as_deref().unwrap_or("Unknown")
    }

    /// Summary text with the display default for absent values.
    pub fn summary_display(&self) -> &str {
        self.summary.as_deref().unwrap_or("No description")
    }

    /// Date formatted for display, or the "not available" sentinel.
    pub fn date_display(&self) -> String {
        match self.date {
            Some(d) => d.format("%m/%d/%Y").to_string(),
            None => "N/A".to_string(),
        }
    }

    /// Key used to deduplicate records across pages and pushed events:
    /// the identifier when present, otherwise title + date + source.
    pub fn dedup_key(&self) -> DedupKey {
        match &self.id {
            Some(id) => DedupKey::Id(id.clone()),
            None => DedupKey::Fields {
                title: self.title.clone(),
                date: self.date,
                source: self.source.clone(),
            },
        }
    }
}

/// Deduplication key for feed records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(String),
    Fields {
        title: String,
        date: Option<DateTime<Utc>>,
        source: Option<String>,
    },
}

/// Control messages sent from the feed engine to the push listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushCommand {
    /// Close the current connection and reopen it. Issued on filter change.
    Rebind,
}
