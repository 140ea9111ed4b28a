//! Point-in-time read of everything the engine knows about.

use async_trait::async_trait;
use dockscope_common::error::EngineError;
use futures::future::try_join_all;
use serde::Serialize;

use crate::records::{
    ContainerRecord, ImageDetail, ImageSummary, NetworkRecord, PluginRecord, SystemInfo,
    VolumeRecord,
};

/// Read-only access to the container engine.
///
/// Implementors perform one request per call; no pagination or streaming.
#[async_trait]
pub trait InventoryFetcher: Send + Sync {
    /// Lists containers, including stopped ones when `all` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerRecord>, EngineError>;

    /// Lists networks.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn list_networks(&self) -> Result<Vec<NetworkRecord>, EngineError>;

    /// Lists volumes.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>, EngineError>;

    /// Lists images, including intermediate ones when `all` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn list_images(&self, all: bool) -> Result<Vec<ImageSummary>, EngineError>;

    /// Inspects one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn inspect_image(&self, id: &str) -> Result<ImageDetail, EngineError>;

    /// Lists plugins.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn list_plugins(&self) -> Result<Vec<PluginRecord>, EngineError>;

    /// Returns host information.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    async fn system_info(&self) -> Result<SystemInfo, EngineError>;
}

/// An image summary together with its inspect detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryImage {
    /// List entry.
    pub summary: ImageSummary,
    /// Inspect result.
    pub detail: ImageDetail,
}

/// Everything read from the engine for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    /// Host display name.
    pub host_name: String,
    /// All containers, stopped ones included.
    pub containers: Vec<ContainerRecord>,
    /// Networks.
    pub networks: Vec<NetworkRecord>,
    /// Volumes.
    pub volumes: Vec<VolumeRecord>,
    /// Images with inspect detail.
    pub images: Vec<InventoryImage>,
    /// Plugins.
    pub plugins: Vec<PluginRecord>,
}

impl Inventory {
    /// Reads the whole inventory, issuing all listings concurrently and
    /// inspecting images concurrently once they are listed.
    ///
    /// # Errors
    ///
    /// Returns the first engine error; no partial inventory is produced.
    pub async fn fetch(fetcher: &dyn InventoryFetcher) -> Result<Self, EngineError> {
        let (info, containers, networks, volumes, images, plugins) = tokio::try_join!(
            fetcher.system_info(),
            fetcher.list_containers(true),
            fetcher.list_networks(),
            fetcher.list_volumes(),
            fetch_images(fetcher),
            fetcher.list_plugins(),
        )?;
        tracing::info!(
            host = %info.name,
            containers = containers.len(),
            networks = networks.len(),
            volumes = volumes.len(),
            images = images.len(),
            plugins = plugins.len(),
            "fetched engine inventory"
        );
        Ok(Self {
            host_name: info.name,
            containers,
            networks,
            volumes,
            images,
            plugins,
        })
    }
}

async fn fetch_images(fetcher: &dyn InventoryFetcher) -> Result<Vec<InventoryImage>, EngineError> {
    let summaries = fetcher.list_images(true).await?;
    try_join_all(summaries.into_iter().map(|summary| async move {
        let detail = fetcher.inspect_image(&summary.id).await?;
        Ok::<_, EngineError>(InventoryImage { summary, detail })
    }))
    .await
}
