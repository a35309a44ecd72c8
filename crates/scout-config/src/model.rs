// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Scout feed engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Scout configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoutConfig {
    /// Opportunity API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Live update channel settings.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Feed behavior settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Opportunity API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the opportunity API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Live update channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Explicit websocket URL. When unset, derived from `api.base_url`.
    #[serde(default)]
    pub url: Option<String>,

    /// Connection handshake timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Reconnection behavior after unexpected drops.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ChannelConfig {
    /// Resolves the websocket URL, deriving it from the API base when no
    /// explicit `channel.url` is configured: `http` maps to `ws`, `https`
    /// to `wss`, with the update path appended.
    pub fn resolved_url(&self, api_base: &str) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let base = api_base.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws_base}/ws/updates")
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Reconnection policy for the update channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectConfig {
    /// Reconnect automatically after an unexpected drop.
    #[serde(default = "default_reconnect_enabled")]
    pub enabled: bool,

    /// Initial backoff in seconds; doubles per failed attempt.
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,

    /// Backoff ceiling in seconds.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: default_reconnect_enabled(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

fn default_reconnect_enabled() -> bool {
    true
}

fn default_initial_backoff_secs() -> u64 {
    1
}

fn default_max_backoff_secs() -> u64 {
    30
}

/// Feed behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Records requested per page.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Product filter selected at startup.
    #[serde(default = "default_product")]
    pub default_product: String,

    /// Period filter selected at startup.
    #[serde(default = "default_period")]
    pub default_period: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            default_product: default_product(),
            default_period: default_period(),
        }
    }
}

fn default_page_limit() -> usize {
    8
}

fn default_product() -> String {
    "PFAS".to_string()
}

fn default_period() -> String {
    "all".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
