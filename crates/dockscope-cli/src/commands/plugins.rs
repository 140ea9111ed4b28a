//! `dscope plugins` and `dscope plugin`: list and toggle engine plugins.

use clap::{Args, ValueEnum};
use dockscope_common::config::DockscopeConfig;

/// Arguments for the `plugins` command.
#[derive(Args, Debug)]
pub struct PluginsArgs {}

/// What to do with a plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    /// Enable the plugin.
    Enable,
    /// Disable the plugin.
    Disable,
}

/// Arguments for the `plugin` command.
#[derive(Args, Debug)]
pub struct PluginArgs {
    /// Enable or disable.
    #[arg(value_enum)]
    pub toggle: Toggle,

    /// Plugin name, e.g. `vieux/sshfs:latest`.
    pub name: String,
}

/// Executes the `plugins` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built.
pub async fn list(_args: PluginsArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;

    if host.plugins.is_empty() {
        println!("No plugins installed.");
        return Ok(());
    }
    println!("{:<40} {}", "NAME", "ENABLED");
    for plugin in &host.plugins {
        println!("{:<40} {}", plugin.name, plugin.enabled);
    }
    Ok(())
}

/// Executes the `plugin` command.
///
/// # Errors
///
/// Returns an error if the engine rejects the request.
pub async fn toggle(args: PluginArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let enabled = args.toggle == Toggle::Enable;
    super::client(config)?
        .set_plugin_enabled(&args.name, enabled)
        .await?;
    println!("{} {}", args.name, if enabled { "enabled" } else { "disabled" });
    Ok(())
}
