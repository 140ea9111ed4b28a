//! `dscope prune`: remove unused resources.

use clap::{Args, ValueEnum};
use dockscope_common::config::DockscopeConfig;
use dockscope_engine::actions::PruneKind;

use crate::output::format_bytes;

/// Resource kind to prune.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// Stopped containers.
    Containers,
    /// Dangling images.
    Images,
    /// Unused networks.
    Networks,
    /// Unused volumes.
    Volumes,
}

impl From<Kind> for PruneKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Containers => Self::Containers,
            Kind::Images => Self::Images,
            Kind::Networks => Self::Networks,
            Kind::Volumes => Self::Volumes,
        }
    }
}

/// Arguments for the `prune` command.
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// What to prune.
    #[arg(value_enum)]
    pub kind: Kind,
}

/// Executes the `prune` command.
///
/// # Errors
///
/// Returns an error if the engine rejects the request.
pub async fn execute(args: PruneArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let kind = PruneKind::from(args.kind);
    let report = super::client(config)?.prune(kind).await?;

    for deleted in &report.deleted {
        println!("deleted {deleted}");
    }
    println!(
        "Pruned {} {kind}, reclaimed {}",
        report.deleted.len(),
        format_bytes(report.space_reclaimed)
    );
    Ok(())
}
