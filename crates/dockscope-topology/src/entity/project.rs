//! Compose projects.

use std::collections::BTreeSet;

use dockscope_common::error::ConfigError;
use dockscope_compose::env_files::EnvFile;
use dockscope_compose::graph::service_start_order;
use dockscope_compose::lint::{LintFinding, lint};
use dockscope_compose::loader::ComposeFile;
use dockscope_compose::schema::ComposeConfig;
use serde::Serialize;

use crate::host::Host;

/// A compose project.
///
/// Exists when a compose file was found for it, when a live resource
/// carries its project label, or both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    /// Project name.
    pub name: String,
    /// The compose file, absent for label-only projects.
    pub compose: Option<ComposeFile>,
    /// Root `.env` and service env files.
    pub env_files: Vec<EnvFile>,
    /// Names of member containers.
    pub containers: BTreeSet<String>,
    /// Names of member networks.
    pub networks: BTreeSet<String>,
    /// Names of member volumes.
    pub volumes: BTreeSet<String>,
}

impl Project {
    /// A project known only from live resource labels.
    #[must_use]
    pub fn label_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compose: None,
            env_files: Vec::new(),
            containers: BTreeSet::new(),
            networks: BTreeSet::new(),
            volumes: BTreeSet::new(),
        }
    }

    /// The validated configuration, if the compose file loaded cleanly.
    #[must_use]
    pub fn config(&self) -> Option<&ComposeConfig> {
        self.compose.as_ref()?.state.config()
    }

    /// Why the compose file failed to load, if it did.
    #[must_use]
    pub fn config_error(&self) -> Option<&ConfigError> {
        self.compose.as_ref()?.state.error()
    }

    /// Runs the compose linter against this project.
    #[must_use]
    pub fn lint(&self) -> Vec<LintFinding> {
        lint(self.config())
    }

    /// Services in the order `depends_on` requires them to start.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] when the project has no valid
    /// configuration, depends on an undefined service, or has a cycle.
    pub fn start_order(&self) -> Result<Vec<String>, ConfigError> {
        let config = self.config().ok_or_else(|| ConfigError::Schema {
            message: format!("project {} has no valid compose configuration", self.name),
        })?;
        service_start_order(&config.services)
    }

    /// Whether any member container is running.
    #[must_use]
    pub fn is_running(&self, host: &Host) -> bool {
        self.containers
            .iter()
            .filter_map(|name| host.container(name))
            .any(super::Container::is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_only_project_has_no_start_order() {
        let project = Project::label_only("legacy");
        assert!(matches!(project.start_order(), Err(ConfigError::Schema { .. })));
        assert_eq!(project.lint().len(), 1);
    }
}
