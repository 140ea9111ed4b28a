//! Runtime configuration model.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{DockscopeError, Result};

/// Root configuration for a dockscope process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockscopeConfig {
    /// Base URL of the container engine API.
    pub engine_url: String,
    /// Directory scanned for compose projects.
    pub services_root: PathBuf,
    /// Maximum depth of the compose discovery walk.
    pub discovery_depth: usize,
    /// JSON file backing the registry response cache.
    pub cache_file: PathBuf,
    /// Timeout applied to each engine API call.
    #[serde(with = "seconds")]
    pub engine_timeout: Duration,
    /// Timeout applied to each registry call.
    #[serde(with = "seconds")]
    pub registry_timeout: Duration,
    /// Whether process environment variables take part in interpolation.
    pub inherit_environment: bool,
}

impl Default for DockscopeConfig {
    fn default() -> Self {
        Self {
            engine_url: constants::DEFAULT_ENGINE_URL.to_string(),
            services_root: PathBuf::from(constants::DEFAULT_SERVICES_ROOT),
            discovery_depth: constants::DISCOVERY_MAX_DEPTH,
            cache_file: constants::default_cache_file(),
            engine_timeout: constants::DEFAULT_ENGINE_TIMEOUT,
            registry_timeout: constants::DEFAULT_REGISTRY_TIMEOUT,
            inherit_environment: false,
        }
    }
}

impl DockscopeConfig {
    /// Reads a JSON configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DockscopeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Checks values no default could produce.
    ///
    /// # Errors
    ///
    /// Returns [`DockscopeError::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if !(self.engine_url.starts_with("http://") || self.engine_url.starts_with("https://")) {
            return Err(DockscopeError::Config {
                message: format!("engine URL must use http or https, got {}", self.engine_url),
            });
        }
        if self.discovery_depth == 0 {
            return Err(DockscopeError::Config {
                message: "discovery depth must be at least 1".into(),
            });
        }
        if self.engine_timeout.is_zero() || self.registry_timeout.is_zero() {
            return Err(DockscopeError::Config {
                message: "timeouts must be at least one second".into(),
            });
        }
        Ok(())
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
