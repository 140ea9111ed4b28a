//! Docker Engine API response records.
//!
//! Only the fields dockscope reads are modelled. Collections the engine may
//! send as `null` deserialize to empty.

use std::collections::BTreeMap;

use dockscope_common::constants::{COMPOSE_PROJECT_LABEL, COMPOSE_SERVICE_LABEL};
use serde::{Deserialize, Deserializer, Serialize};

/// Label map as reported by the engine.
pub type Labels = BTreeMap<String, String>;

/// Entry of `GET /containers/json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ContainerRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub names: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "ImageID", default)]
    pub image_id: String,
    #[serde(default)]
    pub command: Option<String>,
    /// Unix timestamp.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_default")]
    pub ports: Vec<PortBinding>,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: Labels,
    #[serde(default)]
    pub network_settings: Option<NetworkSettings>,
    #[serde(default, deserialize_with = "null_default")]
    pub mounts: Vec<MountPoint>,
}

impl ContainerRecord {
    /// Primary name without the leading `/`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.names
            .first()
            .map_or(self.id.as_str(), |name| name.trim_start_matches('/'))
    }

    /// Compose project label, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.labels.get(COMPOSE_PROJECT_LABEL).map(String::as_str)
    }

    /// Compose service label, if any.
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.labels.get(COMPOSE_SERVICE_LABEL).map(String::as_str)
    }

    /// Names of the networks the container is attached to.
    #[must_use]
    pub fn network_names(&self) -> Vec<String> {
        self.network_settings
            .as_ref()
            .map(|settings| settings.networks.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// A published or exposed port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct PortBinding {
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
    pub private_port: u16,
    #[serde(default)]
    pub public_port: Option<u16>,
    #[serde(rename = "Type", default)]
    pub protocol: String,
}

/// `NetworkSettings` of a container summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSettings {
    /// Endpoints keyed by network name.
    #[serde(default, deserialize_with = "null_default")]
    pub networks: BTreeMap<String, EndpointSettings>,
}

/// A container's endpoint on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct EndpointSettings {
    #[serde(rename = "NetworkID", default)]
    pub network_id: String,
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub mac_address: String,
}

/// A mount of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct MountPoint {
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(rename = "RW", default)]
    pub read_write: bool,
}

/// Entry of `GET /networks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct NetworkRecord {
    pub name: String,
    pub id: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub attachable: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: Labels,
}

impl NetworkRecord {
    /// Compose project label, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.labels.get(COMPOSE_PROJECT_LABEL).map(String::as_str)
    }
}

/// Body of `GET /volumes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeList {
    /// Volumes.
    #[serde(default, deserialize_with = "null_default")]
    pub volumes: Vec<VolumeRecord>,
}

/// A volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct VolumeRecord {
    pub name: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub mountpoint: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: Labels,
}

impl VolumeRecord {
    /// Compose project label, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.labels.get(COMPOSE_PROJECT_LABEL).map(String::as_str)
    }
}

/// Entry of `GET /images/json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ImageSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub repo_tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub repo_digests: Vec<String>,
    /// Unix timestamp.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: Labels,
}

/// Body of `GET /images/{id}/json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ImageDetail {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub repo_tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub repo_digests: Vec<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub config: Option<ImageConfig>,
}

impl ImageDetail {
    /// Image labels from `Config.Labels`.
    #[must_use]
    pub fn labels(&self) -> Labels {
        self.config
            .as_ref()
            .map(|config| config.labels.clone())
            .unwrap_or_default()
    }

    /// Ports from `Config.ExposedPorts`, e.g. `80/tcp`.
    #[must_use]
    pub fn exposed_ports(&self) -> Vec<String> {
        self.config
            .as_ref()
            .map(|config| config.exposed_ports.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// `Config` of an inspected image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ImageConfig {
    #[serde(default, deserialize_with = "null_default")]
    pub exposed_ports: BTreeMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub labels: Labels,
    #[serde(default, deserialize_with = "null_default")]
    pub env: Vec<String>,
}

/// Entry of `GET /plugins`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct PluginRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Subset of `GET /info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct SystemInfo {
    pub name: String,
    #[serde(default)]
    pub server_version: String,
    #[serde(default)]
    pub operating_system: String,
    #[serde(rename = "NCPU", default)]
    pub cpus: i64,
    #[serde(default)]
    pub mem_total: i64,
}

/// Deserializes `null` as `T::default()`.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}
