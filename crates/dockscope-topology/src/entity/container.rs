//! Containers, declared by a compose service, running on the engine, or both.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use dockscope_common::types::ContainerState;
use dockscope_compose::schema::Service;
use dockscope_engine::records::ContainerRecord;
use dockscope_image::reference::ImageRef;
use serde::Serialize;

/// A container. At least one of `declared` and `live` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    /// Identity name, unique within a snapshot.
    pub name: String,
    /// Owning project, if any.
    pub project: Option<String>,
    /// Compose service key, if any.
    pub service: Option<String>,
    /// Compose service definition.
    pub declared: Option<Service>,
    /// Engine record.
    pub live: Option<ContainerRecord>,
    /// Image reference, from compose when declared, else from the engine.
    pub image_ref: ImageRef,
    /// ID of the linked image.
    pub image: Option<String>,
    /// Names of the networks the container is on or should be on.
    pub networks: BTreeSet<String>,
}

impl Container {
    /// Names of the services this container depends on.
    #[must_use]
    pub fn depends_on(&self) -> Vec<String> {
        self.declared
            .as_ref()
            .map(Service::depends_on_names)
            .unwrap_or_default()
    }

    /// Published host ports.
    ///
    /// Taken from compose when declared, else from the engine's bindings.
    #[must_use]
    pub fn ports(&self) -> Vec<String> {
        if let Some(service) = &self.declared {
            return service.published_ports();
        }
        self.live
            .iter()
            .flat_map(|live| &live.ports)
            .filter_map(|binding| binding.public_port.map(|port| port.to_string()))
            .collect()
    }

    /// Mount sources: volume names or host paths.
    #[must_use]
    pub fn mounts(&self) -> Vec<String> {
        if let Some(service) = &self.declared {
            return service.mount_sources();
        }
        self.live
            .iter()
            .flat_map(|live| &live.mounts)
            .map(|mount| mount.name.clone().unwrap_or_else(|| mount.source.clone()))
            .collect()
    }

    /// Engine state, or [`ContainerState::Down`] without a live instance.
    #[must_use]
    pub fn state(&self) -> ContainerState {
        self.live
            .as_ref()
            .map_or(ContainerState::Down, |live| ContainerState::from_engine(&live.state))
    }

    /// Whether the container is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == ContainerState::Running
    }

    /// Whether the engine knows this container.
    #[must_use]
    pub const fn is_instantiated(&self) -> bool {
        self.live.is_some()
    }

    /// Creation time of the live instance.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.live.as_ref()?.created, 0)
    }
}
