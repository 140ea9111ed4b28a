//! Environment files referenced by a compose project.
//!
//! Collected from the raw YAML document rather than the typed config, so a
//! project whose schema validation failed still lists its env files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;

use crate::schema::{EnvFileEntry, EnvFileFormat, EnvFileSpec};

/// Who an env file applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "services", rename_all = "lowercase")]
pub enum EnvFileScope {
    /// The root `.env`, used for interpolation.
    Project,
    /// Loaded into the listed services' containers.
    Service(Vec<String>),
}

/// An env file and where it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvFile {
    /// Absolute path, resolved against the compose working directory.
    pub path: PathBuf,
    /// Scope of the file.
    pub scope: EnvFileScope,
    /// Whether compose fails when the file is missing.
    pub required: bool,
    /// Declared format, `None` for regular dotenv syntax.
    pub format: Option<EnvFileFormat>,
    /// File content, `None` when it could not be read.
    pub content: Option<String>,
}

impl EnvFile {
    /// The project-scoped root `.env`.
    #[must_use]
    pub const fn project(path: PathBuf, content: Option<String>) -> Self {
        Self {
            path,
            scope: EnvFileScope::Project,
            required: false,
            format: None,
            content,
        }
    }

    /// Services referencing this file; empty for the project file.
    #[must_use]
    pub fn services(&self) -> &[String] {
        match &self.scope {
            EnvFileScope::Project => &[],
            EnvFileScope::Service(services) => services,
        }
    }
}

/// Collects the `env_file` references of every service in `document`.
///
/// References to the same path are merged, accumulating service names. A
/// file is required if any reference requires it. Contents are left unset.
#[must_use]
pub fn collect_service_env_files(document: &Value, working_dir: &Path) -> Vec<EnvFile> {
    let Some(services) = document.get("services").and_then(Value::as_mapping) else {
        return Vec::new();
    };

    let mut by_path: BTreeMap<PathBuf, EnvFile> = BTreeMap::new();
    for (name, service) in services {
        let (Some(name), Some(raw)) = (name.as_str(), service.get("env_file")) else {
            continue;
        };
        let spec: EnvFileSpec = match serde_yaml::from_value(raw.clone()) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::debug!(service = name, error = %e, "skipping malformed env_file");
                continue;
            }
        };

        for entry in spec.entries() {
            let (path, required, format) = match entry {
                EnvFileEntry::Path(path) => (path, true, None),
                EnvFileEntry::Detailed(details) => (
                    details.path,
                    details.required.unwrap_or(true),
                    details.format,
                ),
            };
            let path = working_dir.join(path);
            let file = by_path.entry(path.clone()).or_insert_with(|| EnvFile {
                path,
                scope: EnvFileScope::Service(Vec::new()),
                required: false,
                format,
                content: None,
            });
            file.required |= required;
            if let EnvFileScope::Service(services) = &mut file.scope {
                if !services.iter().any(|s| s == name) {
                    services.push(name.to_string());
                }
            }
        }
    }
    by_path.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(yaml: &str) -> Vec<EnvFile> {
        let document: Value = serde_yaml::from_str(yaml).expect("yaml");
        collect_service_env_files(&document, Path::new("/srv/shop"))
    }

    #[test]
    fn short_and_long_forms() {
        let files = collect(
            "services:\n  web:\n    env_file: web.env\n  api:\n    env_file:\n      - path: api.env\n        required: false\n        format: raw\n",
        );
        assert_eq!(files.len(), 2);
        let api = &files[0];
        assert_eq!(api.path, PathBuf::from("/srv/shop/api.env"));
        assert!(!api.required);
        assert_eq!(api.format, Some(EnvFileFormat::Raw));
        assert_eq!(files[1].services(), ["web"]);
        assert!(files[1].required);
    }

    #[test]
    fn duplicates_merge_service_names() {
        let files = collect(
            "services:\n  a:\n    env_file: [common.env]\n  b:\n    env_file:\n      - path: common.env\n        required: false\n",
        );
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].services(), ["a", "b"]);
        assert!(files[0].required);
    }

    #[test]
    fn collected_even_when_schema_would_fail() {
        let files = collect("services:\n  web:\n    not_a_key: 1\n    env_file: web.env\n");
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn document_without_services_has_none() {
        assert!(collect("networks: {}\n").is_empty());
    }

    #[test]
    fn project_file_has_no_services() {
        let file = EnvFile::project(PathBuf::from("/srv/shop/.env"), None);
        assert!(file.services().is_empty());
        assert_eq!(file.scope, EnvFileScope::Project);
    }
}
