//! # dockscope-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire dockscope workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and defines the error taxonomy that decides which failures
//! stay local to one entity and which abort a whole snapshot.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
