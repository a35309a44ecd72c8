// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./scout.toml` > `~/.config/scout/scout.toml` > `/etc/scout/scout.toml`
//! with environment variable overrides via `SCOUT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ScoutConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/scout/scout.toml` (system-wide)
/// 3. `~/.config/scout/scout.toml` (user XDG config)
/// 4. `./scout.toml` (local directory)
/// 5. `SCOUT_*` environment variables
pub fn load_config() -> Result<ScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScoutConfig::default()))
        .merge(Toml::file("/etc/scout/scout.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("scout/scout.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("scout.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScoutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScoutConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` instead of `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SCOUT_FEED_PAGE_LIMIT` must map to
/// `feed.page_limit`, not `feed.page.limit`.
fn env_provider() -> Env {
    Env::prefixed("SCOUT_").map(|key| {
        // `key` still carries the env var's original casing here; figment
        // lowercases only after the map runs, so normalize first or the
        // section rewrites never match.
        // Example: SCOUT_CHANNEL_RECONNECT_ENABLED -> "channel.reconnect.enabled"
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("api_", "api.", 1)
            .replacen("channel_", "channel.", 1)
            .replacen("feed_", "feed.", 1)
            .replacen("log_", "log.", 1)
            .replacen("reconnect_", "reconnect.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "scout.toml",
                r#"
[feed]
page_limit = 4
"#,
            )?;
            jail.set_env("SCOUT_FEED_PAGE_LIMIT", "16");
            let config = load_config().expect("config loads");
            assert_eq!(config.feed.page_limit, 16);
            Ok(())
        });
    }

    #[test]
    fn nested_reconnect_env_key_maps_to_dotted_path() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SCOUT_CHANNEL_RECONNECT_ENABLED", "false");
            jail.set_env("SCOUT_CHANNEL_RECONNECT_MAX_BACKOFF_SECS", "120");
            let config = load_config().expect("config loads");
            assert!(!config.channel.reconnect.enabled);
            assert_eq!(config.channel.reconnect.max_backoff_secs, 120);
            Ok(())
        });
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let config = load_config_from_str("").expect("defaults load");
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.feed.page_limit, 8);
        assert!(config.channel.reconnect.enabled);
        assert_eq!(config.log.level, "info");
    }
}
