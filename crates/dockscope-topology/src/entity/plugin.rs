//! Engine plugins.

use dockscope_engine::records::PluginRecord;
use serde::Serialize;

/// A plugin installed on the engine. Live-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plugin {
    /// Plugin name, e.g. `vieux/sshfs:latest`.
    pub name: String,
    /// Whether the plugin is enabled.
    pub enabled: bool,
    /// Engine ID.
    pub id: String,
}

impl From<PluginRecord> for Plugin {
    fn from(record: PluginRecord) -> Self {
        Self {
            name: record.name,
            enabled: record.enabled,
            id: record.id,
        }
    }
}
