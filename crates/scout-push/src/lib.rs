// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Websocket push channel for live opportunity updates.

mod listener;

pub use listener::{PushHandle, PushListener, ReconnectPolicy};
