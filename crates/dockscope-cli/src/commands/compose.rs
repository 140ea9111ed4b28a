//! `dscope compose`: run `docker compose` against a project's file.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};
use dockscope_common::config::DockscopeConfig;
use dockscope_compose::discovery::LocalFileSystem;
use dockscope_compose::loader::ComposeLoader;
use dockscope_engine::compose_cli::{ComposeCommand, run_compose};

/// Compose subcommand to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Pull service images.
    Pull,
    /// Rebuild service images without cache.
    Build,
    /// Create and start containers in the background.
    Up,
    /// Stop and remove containers and networks.
    Down,
}

impl From<Operation> for ComposeCommand {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Pull => Self::Pull,
            Operation::Build => Self::Build,
            Operation::Up => Self::Up,
            Operation::Down => Self::Down,
        }
    }
}

/// Arguments for the `compose` command.
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Operation to run.
    #[arg(value_enum)]
    pub operation: Operation,

    /// Project name.
    pub project: String,

    /// Limit the operation to one service.
    #[arg(long)]
    pub service: Option<String>,
}

/// Executes the `compose` command.
///
/// Only the compose files are read; the engine is not queried.
///
/// # Errors
///
/// Returns an error if the project has no compose file or the compose
/// process fails.
pub async fn execute(args: ComposeArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let loader = ComposeLoader::new(Arc::new(LocalFileSystem));
    let projects = loader
        .load_all(&config.services_root, config.discovery_depth)
        .await;
    let project = projects
        .iter()
        .find(|p| p.name == args.project)
        .with_context(|| {
            format!(
                "no compose file for project {} under {}",
                args.project,
                config.services_root.display()
            )
        })?;

    run_compose(&project.compose.path, args.operation.into(), args.service.as_deref()).await?;
    Ok(())
}
