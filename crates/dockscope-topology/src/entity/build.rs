//! Image builds declared by compose services.

use dockscope_compose::loader::Dockerfile;
use dockscope_image::reference::ImageRef;
use serde::Serialize;

/// A compose service with a `build:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    /// Owning project.
    pub project: String,
    /// Service name.
    pub service: String,
    /// Reference of the image the build produces.
    pub image_ref: ImageRef,
    /// Dockerfile, resolved when the context is a local path.
    pub dockerfile: Option<Dockerfile>,
    /// ID of the matching image, set during linking.
    pub image: Option<String>,
}

impl Build {
    /// Identity of the build, `project/service`.
    #[must_use]
    pub fn id(&self) -> String {
        build_id(&self.project, &self.service)
    }
}

/// Identity of the build of `service` in `project`.
#[must_use]
pub fn build_id(project: &str, service: &str) -> String {
    format!("{project}/{service}")
}
