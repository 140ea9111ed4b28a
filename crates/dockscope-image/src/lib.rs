//! # dockscope-image
//!
//! Image reference handling for dockscope.
//!
//! Handles:
//! - **Reference**: Parsing, comparing, and normalising image references.
//! - **Cache**: The URL-keyed response cache every registry call goes through.
//! - **Registry**: Endpoints of the public registries that can be checked.
//! - **Update**: Comparing a local digest against the registry's current one.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cache;
pub mod reference;
pub mod registry;
pub mod update;
