//! `dscope ps`: list containers, declared and live.

use clap::Args;
use dockscope_common::config::DockscopeConfig;

use crate::output::{elide, since};

/// Arguments for the `ps` command.
#[derive(Args, Debug)]
pub struct PsArgs {
    /// Show all containers (including stopped and never started).
    #[arg(short, long)]
    pub all: bool,

    /// Only show containers of this project.
    #[arg(short, long)]
    pub project: Option<String>,
}

/// Executes the `ps` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built.
pub async fn execute(args: PsArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;

    let filtered: Vec<_> = host
        .containers
        .iter()
        .filter(|c| args.all || c.is_running())
        .filter(|c| args.project.is_none() || c.project == args.project)
        .collect();

    if filtered.is_empty() {
        println!("No containers found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<16} {:<11} {:<15} {:<36} {}",
        "NAME", "PROJECT", "STATE", "CREATED", "IMAGE", "PORTS"
    );
    for c in &filtered {
        let image = host
            .container_image(c)
            .map_or_else(|| c.image_ref.display_name(), |i| i.display_name());
        println!(
            "{:<36} {:<16} {:<11} {:<15} {:<36} {}",
            elide(&c.name),
            c.project.as_deref().unwrap_or("-"),
            c.state().to_string(),
            since(c.created()),
            elide(&image),
            c.ports().join(", ")
        );
    }

    Ok(())
}
