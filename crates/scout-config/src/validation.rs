// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes, positive page limits, and backoff
//! ordering.

use scout_core::{Period, Product};

use crate::diagnostic::ConfigError;
use crate::model::ScoutConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ScoutConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base = config.api.base_url.trim();
    if base.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base.starts_with("http://") && !base.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base}` must start with http:// or https://"),
        });
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if let Some(url) = &config.channel.url
        && !url.starts_with("ws://")
        && !url.starts_with("wss://")
    {
        errors.push(ConfigError::Validation {
            message: format!("channel.url `{url}` must start with ws:// or wss://"),
        });
    }

    if config.channel.connect_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "channel.connect_timeout_secs must be at least 1".to_string(),
        });
    }

    let reconnect = &config.channel.reconnect;
    if reconnect.initial_backoff_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "channel.reconnect.initial_backoff_secs must be at least 1".to_string(),
        });
    }
    if reconnect.initial_backoff_secs > reconnect.max_backoff_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "channel.reconnect.initial_backoff_secs ({}) must not exceed max_backoff_secs ({})",
                reconnect.initial_backoff_secs, reconnect.max_backoff_secs
            ),
        });
    }

    if config.feed.page_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "feed.page_limit must be at least 1".to_string(),
        });
    }

    if config.feed.default_product.parse::<Product>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "feed.default_product `{}` is not a known product",
                config.feed.default_product
            ),
        });
    }

    if config.feed.default_period.parse::<Period>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "feed.default_period `{}` must be one of: all, day, month, year",
                config.feed.default_period
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
