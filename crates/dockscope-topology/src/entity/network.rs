//! Networks.

use std::collections::BTreeSet;

use dockscope_compose::schema::{NetworkConfig, NetworkDriver};
use dockscope_engine::records::NetworkRecord;
use serde::Serialize;

/// A network, declared in compose, present on the engine, or both.
///
/// A project's default network has a `key` of `default` and no
/// declaration unless the compose file configures it explicitly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    /// Resolved network name.
    pub name: String,
    /// Owning project, if any.
    pub project: Option<String>,
    /// Key under the compose `networks:` section.
    pub key: Option<String>,
    /// Compose declaration.
    pub declared: Option<NetworkConfig>,
    /// Engine record.
    pub live: Option<NetworkRecord>,
    /// Names of member containers.
    pub containers: BTreeSet<String>,
}

impl Network {
    /// Whether the engine knows this network.
    #[must_use]
    pub const fn is_instantiated(&self) -> bool {
        self.live.is_some()
    }

    /// Driver name, preferring the engine's view.
    #[must_use]
    pub fn driver(&self) -> Option<&str> {
        if let Some(live) = &self.live {
            return Some(&live.driver);
        }
        let driver = match self.declared.as_ref()?.driver? {
            NetworkDriver::Bridge => "bridge",
            NetworkDriver::Overlay => "overlay",
            NetworkDriver::Host => "host",
            NetworkDriver::None => "none",
        };
        Some(driver)
    }
}
