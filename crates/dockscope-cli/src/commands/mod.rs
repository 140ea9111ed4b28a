//! CLI command definitions and dispatch.

pub mod compose;
pub mod container;
pub mod host;
pub mod images;
pub mod lint;
pub mod networks;
pub mod plugins;
pub mod projects;
pub mod prune;
pub mod ps;
pub mod volumes;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use dockscope_common::config::DockscopeConfig;
use dockscope_engine::client::DockerClient;
use dockscope_topology::host::Host;
use dockscope_topology::snapshot::SnapshotBuilder;

/// dockscope: one view of a Docker host, its compose projects and what is actually running.
#[derive(Parser, Debug)]
#[command(name = "dscope", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every command.
///
/// Each flag overrides the matching value of the configuration file, which
/// in turn overrides the built-in defaults.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// JSON configuration file.
    #[arg(long, global = true, env = "DOCKSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the Docker Engine API [default: http://localhost:2375].
    #[arg(long, global = true, env = "DOCKER_SOCKET_BASE_URL")]
    pub engine_url: Option<String>,

    /// Directory scanned for compose projects [default: /services].
    #[arg(long, global = true, env = "DOCKSCOPE_SERVICES_ROOT")]
    pub services_root: Option<PathBuf>,

    /// Maximum depth of the compose file search [default: 3].
    #[arg(long, global = true)]
    pub depth: Option<usize>,

    /// Registry response cache file.
    #[arg(long, global = true, env = "DOCKSCOPE_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Timeout in seconds for each engine call [default: 30].
    #[arg(long, global = true)]
    pub engine_timeout: Option<u64>,

    /// Timeout in seconds for each registry call [default: 10].
    #[arg(long, global = true)]
    pub registry_timeout: Option<u64>,

    /// Let process environment variables take part in compose interpolation.
    #[arg(long, global = true, env = "DOCKSCOPE_INHERIT_ENV")]
    pub inherit_env: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    /// Resolves the runtime configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded or the
    /// result is invalid.
    pub fn config(&self) -> dockscope_common::error::Result<DockscopeConfig> {
        let mut config = match &self.config {
            Some(path) => DockscopeConfig::load(path)?,
            None => DockscopeConfig::default(),
        };
        if let Some(url) = &self.engine_url {
            config.engine_url.clone_from(url);
        }
        if let Some(root) = &self.services_root {
            config.services_root.clone_from(root);
        }
        if let Some(depth) = self.depth {
            config.discovery_depth = depth;
        }
        if let Some(file) = &self.cache_file {
            config.cache_file.clone_from(file);
        }
        if let Some(seconds) = self.engine_timeout {
            config.engine_timeout = Duration::from_secs(seconds);
        }
        if let Some(seconds) = self.registry_timeout {
            config.registry_timeout = Duration::from_secs(seconds);
        }
        if self.inherit_env {
            config.inherit_environment = true;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarise the host, or dump the whole snapshot as JSON.
    Host(host::HostArgs),
    /// List compose projects.
    Projects(projects::ProjectsArgs),
    /// List containers.
    Ps(ps::PsArgs),
    /// List images, optionally checking registries for updates.
    Images(images::ImagesArgs),
    /// List networks and their members.
    Networks(networks::NetworksArgs),
    /// List volumes.
    Volumes(volumes::VolumesArgs),
    /// List engine plugins.
    Plugins(plugins::PluginsArgs),
    /// Enable or disable an engine plugin.
    Plugin(plugins::PluginArgs),
    /// Check a project's compose file against the house rules.
    Lint(lint::LintArgs),
    /// Run `docker compose` for a project.
    Compose(compose::ComposeArgs),
    /// Run a lifecycle action on a container.
    Container(container::ContainerArgs),
    /// Remove unused resources of one kind.
    Prune(prune::PruneArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.global.config()?;
    tracing::debug!(?config, "resolved configuration");
    match cli.command {
        Command::Host(args) => host::execute(args, &config).await,
        Command::Projects(args) => projects::execute(args, &config).await,
        Command::Ps(args) => ps::execute(args, &config).await,
        Command::Images(args) => images::execute(args, &config).await,
        Command::Networks(args) => networks::execute(args, &config).await,
        Command::Volumes(args) => volumes::execute(args, &config).await,
        Command::Plugins(args) => plugins::list(args, &config).await,
        Command::Plugin(args) => plugins::toggle(args, &config).await,
        Command::Lint(args) => lint::execute(args, &config).await,
        Command::Compose(args) => compose::execute(args, &config).await,
        Command::Container(args) => container::execute(args, &config).await,
        Command::Prune(args) => prune::execute(args, &config).await,
    }
}

/// Builds a fresh snapshot of the host.
pub(crate) async fn snapshot(config: &DockscopeConfig) -> dockscope_common::error::Result<Host> {
    Ok(SnapshotBuilder::from_config(config)?.build().await?)
}

/// Creates an engine client for mutating commands.
pub(crate) fn client(config: &DockscopeConfig) -> dockscope_common::error::Result<DockerClient> {
    Ok(DockerClient::new(&config.engine_url, config.engine_timeout)?)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use dockscope_common::constants::DEFAULT_ENGINE_TIMEOUT;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::parse_from([
            "dscope",
            "--engine-url",
            "http://docker:2375",
            "--services-root",
            "/srv",
            "--depth",
            "2",
            "--cache-file",
            "/tmp/cache.json",
            "ps",
        ]);
        let config = cli.global.config().expect("config");
        assert_eq!(config.engine_url, "http://docker:2375");
        assert_eq!(config.services_root, PathBuf::from("/srv"));
        assert_eq!(config.discovery_depth, 2);
        assert_eq!(config.cache_file, PathBuf::from("/tmp/cache.json"));
        assert_eq!(config.engine_timeout, DEFAULT_ENGINE_TIMEOUT);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dockscope.json");
        std::fs::write(&path, r#"{"services_root":"/from-file","discovery_depth":1}"#)
            .expect("write");
        let cli = Cli::parse_from([
            "dscope",
            "--config",
            path.to_str().expect("utf-8 path"),
            "--depth",
            "2",
            "ps",
        ]);
        let config = cli.global.config().expect("config");
        assert_eq!(config.services_root, PathBuf::from("/from-file"));
        assert_eq!(config.discovery_depth, 2);
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let cli = Cli::parse_from(["dscope", "--depth", "0", "ps"]);
        assert!(cli.global.config().is_err());
    }

    #[test]
    fn container_action_parses() {
        let cli = Cli::parse_from(["dscope", "container", "restart", "shop-web-1"]);
        assert!(matches!(cli.command, Command::Container(_)));
    }
}
