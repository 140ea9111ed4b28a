//! # dockscope-topology
//!
//! The reconciled view of a Docker host.
//!
//! Handles:
//! - **Entities**: Projects, containers, networks, volumes, images, builds, and plugins.
//! - **Reconcile**: Merging compose projects with the engine inventory under one identity per entity.
//! - **Snapshot**: Loading and fetching concurrently, then reconciling.
//! - **Updates**: Attaching registry update checks to a finished host.
//!
//! # Example
//!
//! ```rust,no_run
//! use dockscope_common::config::DockscopeConfig;
//! use dockscope_topology::snapshot::SnapshotBuilder;
//!
//! # async fn run() -> Result<(), dockscope_common::error::EngineError> {
//! let host = SnapshotBuilder::from_config(&DockscopeConfig::default())?.build().await?;
//! for project in &host.projects {
//!     println!("{} running={}", project.name, project.is_running(&host));
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod diagnostics;
pub mod entity;
pub mod host;
pub mod reconcile;
pub mod snapshot;
pub mod updates;
