//! Volumes.

use dockscope_compose::schema::VolumeConfig;
use dockscope_engine::records::VolumeRecord;
use serde::Serialize;

/// A volume, declared in compose, present on the engine, or both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    /// Resolved volume name.
    pub name: String,
    /// Owning project, if any.
    pub project: Option<String>,
    /// Key under the compose `volumes:` section.
    pub key: Option<String>,
    /// Compose declaration.
    pub declared: Option<VolumeConfig>,
    /// Engine record.
    pub live: Option<VolumeRecord>,
}

impl Volume {
    /// Whether the engine knows this volume.
    #[must_use]
    pub const fn is_instantiated(&self) -> bool {
        self.live.is_some()
    }

    /// Driver, preferring the engine's view.
    #[must_use]
    pub fn driver(&self) -> Option<&str> {
        self.live
            .as_ref()
            .map(|live| live.driver.as_str())
            .or_else(|| self.declared.as_ref()?.driver.as_deref())
    }
}
