// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Scout integration tests.

pub mod mock_source;

pub use mock_source::{batch, event, page, record, MockSource};
