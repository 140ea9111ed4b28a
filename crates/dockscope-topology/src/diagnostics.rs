//! Problems found while building a snapshot, addressed to one entity.

use std::fmt;

use dockscope_common::types::{EntityKind, Severity};
use serde::Serialize;

/// A problem attached to one entity of the host graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Kind of the entity concerned.
    pub kind: EntityKind,
    /// Identity of the entity concerned.
    pub entity: String,
    /// Severity.
    pub level: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// A warning about an entity.
    #[must_use]
    pub fn warning(kind: EntityKind, entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            level: Severity::Warning,
            message: message.into(),
        }
    }

    /// An error about an entity.
    #[must_use]
    pub fn error(kind: EntityKind, entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            level: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}: {}", self.level, self.kind, self.entity, self.message)
    }
}
