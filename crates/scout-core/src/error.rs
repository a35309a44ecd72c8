// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Scout feed engine.

use thiserror::Error;

use crate::types::PageRequest;

/// The primary error type used across the Scout crates.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A paged fetch failed (network or decode). Carries the attempted
    /// request so the caller can surface it and retry with the same cursor.
    #[error("fetch failed for {request}: {message}")]
    Fetch {
        request: PageRequest,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Push channel errors (connect failure, socket error, unexpected close).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
