// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paged HTTP fetch client for the Scout opportunity source.

pub mod client;

pub use client::FetchClient;
