//! `dscope host`: summarise the host.

use clap::Args;
use dockscope_common::config::DockscopeConfig;

use crate::output::format_bytes;

/// Arguments for the `host` command.
#[derive(Args, Debug)]
pub struct HostArgs {
    /// Print the whole snapshot as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `host` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built or serialized.
pub async fn execute(args: HostArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&host)?);
        return Ok(());
    }

    let running = host.containers.iter().filter(|c| c.is_running()).count();
    let pulled: Vec<_> = host.images.iter().filter(|i| i.is_pulled()).collect();
    let image_bytes: u64 = pulled.iter().map(|i| i.size()).sum();

    println!("Host:        {}", host.name);
    println!("Projects:    {}", host.projects.len());
    println!("Containers:  {} ({running} running)", host.containers.len());
    println!("Networks:    {}", host.networks.len());
    println!("Volumes:     {}", host.volumes.len());
    println!(
        "Images:      {} pulled, {} declared only, {}",
        pulled.len(),
        host.images.len() - pulled.len(),
        format_bytes(image_bytes)
    );
    println!("Builds:      {}", host.builds.len());
    println!("Plugins:     {}", host.plugins.len());

    if !host.diagnostics.is_empty() {
        println!();
        for diagnostic in &host.diagnostics {
            println!("{diagnostic}");
        }
    }
    Ok(())
}
