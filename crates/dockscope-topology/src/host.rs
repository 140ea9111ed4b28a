//! The aggregate root of a snapshot.

use dockscope_common::types::EntityKind;
use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::entity::{Build, Container, Image, Network, Plugin, Project, Volume};

/// Everything known about one Docker host at one point in time.
///
/// Collections are sorted by identity. Cross-links between entities are
/// names or IDs; resolve them with the lookup methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Host {
    /// Host name reported by the engine.
    pub name: String,
    /// Compose projects.
    pub projects: Vec<Project>,
    /// Containers.
    pub containers: Vec<Container>,
    /// Networks.
    pub networks: Vec<Network>,
    /// Volumes.
    pub volumes: Vec<Volume>,
    /// Images, pulled and declared.
    pub images: Vec<Image>,
    /// Builds declared by compose services.
    pub builds: Vec<Build>,
    /// Engine plugins.
    pub plugins: Vec<Plugin>,
    /// Problems found while reconciling.
    pub diagnostics: Vec<Diagnostic>,
}

impl Host {
    /// Looks up a project by name.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Looks up a container by identity name.
    #[must_use]
    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Looks up a network by name.
    #[must_use]
    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// Looks up a volume by name.
    #[must_use]
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    /// Looks up an image by ID.
    #[must_use]
    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    /// Looks up a build by `project/service`.
    #[must_use]
    pub fn build(&self, id: &str) -> Option<&Build> {
        self.builds.iter().find(|b| b.id() == id)
    }

    /// Looks up a plugin by name.
    #[must_use]
    pub fn plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Containers of a project.
    pub fn project_containers<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a Container> {
        project.containers.iter().filter_map(|name| self.container(name))
    }

    /// Networks a container is attached to.
    pub fn container_networks<'a>(&'a self, container: &'a Container) -> impl Iterator<Item = &'a Network> {
        container.networks.iter().filter_map(|name| self.network(name))
    }

    /// The image a container runs.
    #[must_use]
    pub fn container_image(&self, container: &Container) -> Option<&Image> {
        self.image(container.image.as_deref()?)
    }

    /// Diagnostics addressed to one entity.
    pub fn diagnostics_for<'a>(
        &'a self,
        kind: EntityKind,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.kind == kind && d.entity == entity)
    }
}
