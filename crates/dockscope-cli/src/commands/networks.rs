//! `dscope networks`: list networks and their members.

use clap::Args;
use dockscope_common::config::DockscopeConfig;

use crate::output::elide;

/// Arguments for the `networks` command.
#[derive(Args, Debug)]
pub struct NetworksArgs {}

/// Executes the `networks` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built.
pub async fn execute(_args: NetworksArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;

    println!(
        "{:<36} {:<16} {:<10} {:<9} {}",
        "NAME", "PROJECT", "DRIVER", "CREATED", "CONTAINERS"
    );
    for network in &host.networks {
        let members: Vec<&str> = network.containers.iter().map(String::as_str).collect();
        println!(
            "{:<36} {:<16} {:<10} {:<9} {}",
            elide(&network.name),
            network.project.as_deref().unwrap_or("-"),
            network.driver().unwrap_or("-"),
            if network.is_instantiated() { "yes" } else { "no" },
            members.join(", ")
        );
    }
    Ok(())
}
