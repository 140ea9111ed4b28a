//! # dockscope-compose
//!
//! Loader and linter for compose projects.
//!
//! Handles:
//! - **Discovery**: Finding compose files and the filesystem seam they are read through.
//! - **Interpolation**: `.env` parsing and `${VAR}` substitution on raw text.
//! - **Parser**: YAML parsing, merge keys, and validation against the supported schema.
//! - **Loader**: Turning a compose file into a project with its env files and Dockerfiles.
//! - **Lint**: Policy checks on a validated configuration.
//! - **Graph**: `depends_on` ordering.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod discovery;
pub mod dotenv;
pub mod env_files;
pub mod graph;
pub mod interpolate;
pub mod lint;
pub mod loader;
pub mod parser;
pub mod schema;
