//! Container engine boundary for dockscope.
//!
//! Handles:
//! - **Records**: Engine API response types.
//! - **Inventory**: The read-only fetcher capability and a concurrent snapshot read.
//! - **Client**: The HTTP implementation of that capability.
//! - **Actions**: Start, stop, delete, prune, and plugin toggles.
//! - **Compose CLI**: `docker compose` invocations for whole projects.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod actions;
pub mod client;
pub mod compose_cli;
pub mod inventory;
pub mod records;
