//! `dscope volumes`: list volumes.

use clap::Args;
use dockscope_common::config::DockscopeConfig;

use crate::output::elide;

/// Arguments for the `volumes` command.
#[derive(Args, Debug)]
pub struct VolumesArgs {}

/// Executes the `volumes` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built.
pub async fn execute(_args: VolumesArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;

    println!("{:<36} {:<16} {:<10} {}", "NAME", "PROJECT", "DRIVER", "CREATED");
    for volume in &host.volumes {
        println!(
            "{:<36} {:<16} {:<10} {}",
            elide(&volume.name),
            volume.project.as_deref().unwrap_or("-"),
            volume.driver().unwrap_or("-"),
            if volume.is_instantiated() { "yes" } else { "no" }
        );
    }
    Ok(())
}
