//! One point-in-time snapshot of a Docker host.

use std::path::PathBuf;
use std::sync::Arc;

use dockscope_common::config::DockscopeConfig;
use dockscope_common::constants::DISCOVERY_MAX_DEPTH;
use dockscope_common::error::EngineError;
use dockscope_compose::discovery::LocalFileSystem;
use dockscope_compose::interpolate::Environment;
use dockscope_compose::loader::ComposeLoader;
use dockscope_engine::client::DockerClient;
use dockscope_engine::inventory::{Inventory, InventoryFetcher};

use crate::host::Host;
use crate::reconcile::reconcile;

/// Builds [`Host`] snapshots from compose files and the engine.
///
/// # Example
///
/// ```rust,no_run
/// use dockscope_common::config::DockscopeConfig;
/// use dockscope_topology::snapshot::SnapshotBuilder;
///
/// # async fn run() -> Result<(), dockscope_common::error::EngineError> {
/// let host = SnapshotBuilder::from_config(&DockscopeConfig::default())?
///     .build()
///     .await?;
/// println!("{} projects on {}", host.projects.len(), host.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SnapshotBuilder {
    loader: ComposeLoader,
    fetcher: Arc<dyn InventoryFetcher>,
    root: PathBuf,
    max_depth: usize,
}

impl std::fmt::Debug for SnapshotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBuilder")
            .field("root", &self.root)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl SnapshotBuilder {
    /// Creates a builder scanning `root` for compose files.
    #[must_use]
    pub fn new(loader: ComposeLoader, fetcher: Arc<dyn InventoryFetcher>, root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            fetcher,
            root: root.into(),
            max_depth: DISCOVERY_MAX_DEPTH,
        }
    }

    /// Creates a builder talking to the engine over HTTP and reading the
    /// local disk, as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine client cannot be created.
    pub fn from_config(config: &DockscopeConfig) -> Result<Self, EngineError> {
        let client = DockerClient::new(&config.engine_url, config.engine_timeout)?;
        let base_env: Environment = if config.inherit_environment {
            std::env::vars().collect()
        } else {
            Environment::new()
        };
        let loader = ComposeLoader::new(Arc::new(LocalFileSystem)).with_base_env(base_env);
        Ok(Self::new(loader, Arc::new(client), config.services_root.clone())
            .max_depth(config.discovery_depth))
    }

    /// Sets the maximum compose discovery depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Loads compose projects and fetches the inventory concurrently, then
    /// reconciles them.
    ///
    /// Dropping the returned future cancels all in-flight I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine inventory cannot be read. Compose
    /// problems never fail the snapshot.
    pub async fn build(&self) -> Result<Host, EngineError> {
        let (projects, inventory) = tokio::join!(
            self.loader.load_all(&self.root, self.max_depth),
            Inventory::fetch(self.fetcher.as_ref())
        );
        let inventory = inventory.inspect_err(|e| tracing::error!(error = %e, "engine inventory failed"))?;
        Ok(reconcile(projects, inventory))
    }
}
