// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented at the transport seams.

pub mod source;

pub use source::OpportunitySource;
