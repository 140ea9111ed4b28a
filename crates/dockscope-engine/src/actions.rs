//! Mutating pass-throughs to the engine API.
//!
//! These carry no identity resolution: callers pass engine IDs or names.

use std::fmt;

use dockscope_common::error::EngineError;
use serde::Serialize;

use crate::client::DockerClient;

/// Lifecycle action on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    /// `POST /containers/{id}/start`
    Start,
    /// `POST /containers/{id}/stop`
    Stop,
    /// `POST /containers/{id}/restart`
    Restart,
    /// `POST /containers/{id}/kill`
    Kill,
    /// `POST /containers/{id}/pause`
    Pause,
    /// `POST /containers/{id}/unpause`
    Unpause,
}

impl ContainerAction {
    const fn path_segment(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Kill => "kill",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
        }
    }
}

impl fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Resource kind for a prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneKind {
    /// Stopped containers.
    Containers,
    /// Dangling images.
    Images,
    /// Unused networks.
    Networks,
    /// Unused volumes.
    Volumes,
}

impl PruneKind {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Containers => "/containers/prune",
            Self::Images => "/images/prune",
            Self::Networks => "/networks/prune",
            Self::Volumes => "/volumes/prune",
        }
    }

    const fn deleted_key(self) -> &'static str {
        match self {
            Self::Containers => "ContainersDeleted",
            Self::Images => "ImagesDeleted",
            Self::Networks => "NetworksDeleted",
            Self::Volumes => "VolumesDeleted",
        }
    }
}

impl fmt::Display for PruneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Containers => "containers",
            Self::Images => "images",
            Self::Networks => "networks",
            Self::Volumes => "volumes",
        };
        f.write_str(text)
    }
}

/// What a prune removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// IDs or names removed.
    pub deleted: Vec<String>,
    /// Bytes freed, when the engine reports it.
    pub space_reclaimed: u64,
}

impl PruneReport {
    /// Reads a prune response body.
    ///
    /// Image prunes list objects with `Deleted` or `Untagged`; the others
    /// list plain strings.
    #[must_use]
    pub fn from_response(kind: PruneKind, body: &serde_json::Value) -> Self {
        let deleted = body
            .get(kind.deleted_key())
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        entry
                            .as_str()
                            .or_else(|| entry.get("Deleted").and_then(serde_json::Value::as_str))
                            .or_else(|| entry.get("Untagged").and_then(serde_json::Value::as_str))
                            .map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let space_reclaimed = body
            .get("SpaceReclaimed")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        Self {
            deleted,
            space_reclaimed,
        }
    }
}

impl DockerClient {
    /// Runs a lifecycle action on a container.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the request.
    pub async fn container_action(&self, id: &str, action: ContainerAction) -> Result<(), EngineError> {
        tracing::info!(container = id, %action, "container action");
        let _ = self.post(&format!("/containers/{id}/{}", action.path_segment())).await?;
        Ok(())
    }

    /// Removes a container.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the request.
    pub async fn delete_container(&self, id: &str, force: bool) -> Result<(), EngineError> {
        tracing::info!(container = id, force, "deleting container");
        let _ = self.delete(&format!("/containers/{id}?force={force}")).await?;
        Ok(())
    }

    /// Removes an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the request.
    pub async fn delete_image(&self, id: &str, force: bool) -> Result<(), EngineError> {
        tracing::info!(image = id, force, "deleting image");
        let _ = self.delete(&format!("/images/{id}?force={force}")).await?;
        Ok(())
    }

    /// Prunes unused resources of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the request or the body
    /// cannot be decoded.
    pub async fn prune(&self, kind: PruneKind) -> Result<PruneReport, EngineError> {
        tracing::info!(%kind, "pruning");
        let endpoint = kind.endpoint();
        let response = self.post(endpoint).await?;
        let body: serde_json::Value = response.json().await.map_err(|e| EngineError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        Ok(PruneReport::from_response(kind, &body))
    }

    /// Enables or disables a plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the request.
    pub async fn set_plugin_enabled(&self, name: &str, enabled: bool) -> Result<(), EngineError> {
        let verb = if enabled { "enable" } else { "disable" };
        tracing::info!(plugin = name, verb, "plugin action");
        let _ = self.post(&format!("/plugins/{name}/{verb}")).await?;
        Ok(())
    }
}
