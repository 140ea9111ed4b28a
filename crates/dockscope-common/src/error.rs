//! Error taxonomy for the dockscope workspace.
//!
//! Failures are scoped to the smallest entity they affect:
//!
//! - [`ConfigError`] belongs to one compose project and is stored on it.
//! - [`EngineError`] means live state is unavailable and aborts the snapshot.
//! - [`RegistryError`] belongs to one image's update check.
//!
//! [`DockscopeError`] wraps all of them for callers that need a single type.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A compose project could not be loaded into a valid configuration.
///
/// Recorded on the project instead of being propagated, so the rest of the
/// snapshot still builds.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigError {
    /// A `${NAME:?message}` or `${NAME?message}` variable was not set.
    #[error("required variable {variable} is not set: {message}")]
    MissingVariable {
        /// Name of the missing variable.
        variable: String,
        /// Message supplied by the compose file author.
        message: String,
    },

    /// An interpolation expression could not be parsed.
    #[error("invalid interpolation: {message}")]
    Interpolation {
        /// Description of the malformed expression.
        message: String,
    },

    /// The substituted text is not valid YAML.
    #[error("invalid YAML: {message}")]
    Yaml {
        /// Parser message.
        message: String,
    },

    /// The document does not match the supported compose schema.
    #[error("schema violation: {message}")]
    Schema {
        /// Description of the violation.
        message: String,
    },

    /// The compose file could not be read.
    #[error("cannot read {path}: {message}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
}

/// The container engine could not be queried.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine did not answer.
    #[error("engine unreachable at {url}: {message}")]
    Unreachable {
        /// Endpoint that failed.
        url: String,
        /// Transport error text.
        message: String,
    },

    /// The engine answered with a non-2xx status.
    #[error("engine returned {status} for {endpoint}: {body}")]
    Status {
        /// Endpoint that failed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON `message`.
        body: String,
    },

    /// The engine answer could not be decoded.
    #[error("cannot decode engine response from {endpoint}: {message}")]
    Decode {
        /// Endpoint that failed.
        endpoint: String,
        /// Decoder message.
        message: String,
    },

    /// An external `docker compose` invocation failed.
    #[error("{command} exited with {code:?}")]
    Command {
        /// Rendered command line.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
    },
}

/// An update check against a public registry failed.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The HTTP call itself failed.
    #[error("registry request to {url} failed: {message}")]
    Transport {
        /// URL requested.
        url: String,
        /// Transport error text.
        message: String,
    },

    /// The registry answered with a non-2xx status.
    #[error("registry returned {status} for {url}")]
    Status {
        /// URL requested.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// No anonymous pull token could be obtained.
    #[error("no pull token from {registry}: {message}")]
    Token {
        /// Registry host.
        registry: String,
        /// Reason.
        message: String,
    },

    /// The response could not be decoded.
    #[error("cannot decode registry response from {url}: {message}")]
    Decode {
        /// URL requested.
        url: String,
        /// Decoder message.
        message: String,
    },

    /// The cache store could not be read or written.
    #[error("request cache at {path}: {message}")]
    Cache {
        /// Cache file path.
        path: PathBuf,
        /// Reason.
        message: String,
    },
}

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DockscopeError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A runtime configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A compose project failed to load.
    #[error(transparent)]
    Compose(#[from] ConfigError),

    /// Live state could not be fetched.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A registry check failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DockscopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_message_names_variable() {
        let err = ConfigError::MissingVariable {
            variable: "SECRET".into(),
            message: "missing".into(),
        };
        assert_eq!(err.to_string(), "required variable SECRET is not set: missing");
    }

    #[test]
    fn config_error_serializes_with_kind_tag() {
        let err = ConfigError::Schema {
            message: "unknown field `foo`".into(),
        };
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["kind"], "schema");
        assert_eq!(json["message"], "unknown field `foo`");
    }

    #[test]
    fn engine_error_wraps_into_top_level() {
        let err: DockscopeError = EngineError::Status {
            endpoint: "/containers/json".into(),
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert!(err.to_string().contains("500"));
    }
}
