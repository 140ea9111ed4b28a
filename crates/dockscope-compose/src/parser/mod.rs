//! Compose document parser built on `serde_yaml`.
//!
//! Transforms interpolated compose text into a validated [`ComposeConfig`]
//! through YAML parsing, merge-key expansion, extension stripping, typed
//! deserialization, and semantic validation.

pub mod validator;

use dockscope_common::error::ConfigError;
use serde_yaml::Value;

use crate::schema::ComposeConfig;

/// Prefix of top-level extension keys, which are ignored.
const EXTENSION_PREFIX: &str = "x-";

/// Parses compose text that has already been interpolated.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] for syntax errors and
/// [`ConfigError::Schema`] when the document does not fit the supported
/// compose subset.
pub fn parse_compose(input: &str) -> Result<ComposeConfig, ConfigError> {
    tracing::debug!(bytes = input.len(), "parsing compose document");
    from_document(parse_document(input)?)
}

/// Types and validates a document produced by [`parse_document`].
///
/// # Errors
///
/// Returns [`ConfigError::Schema`] when the document does not fit the
/// supported compose subset.
pub fn from_document(document: Value) -> Result<ComposeConfig, ConfigError> {
    let config: ComposeConfig =
        serde_yaml::from_value(document).map_err(|e| ConfigError::Schema {
            message: e.to_string(),
        })?;
    validator::validate(&config)?;
    Ok(config)
}

/// Parses YAML, expands `<<` merge keys, and drops top-level `x-` keys.
///
/// The result is the raw document, used for both typed deserialization
/// and best-effort extraction when the schema rejects the file.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] if the text is not valid YAML.
pub fn parse_document(input: &str) -> Result<Value, ConfigError> {
    let mut document: Value = serde_yaml::from_str(input).map_err(yaml_error)?;
    document.apply_merge().map_err(yaml_error)?;
    if let Value::Mapping(root) = &mut document {
        root.retain(|key, _| {
            !key.as_str()
                .is_some_and(|name| name.starts_with(EXTENSION_PREFIX))
        });
    }
    Ok(document)
}

fn yaml_error(e: serde_yaml::Error) -> ConfigError {
    ConfigError::Yaml {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_file() {
        let config = parse_compose("services:\n  web:\n    image: nginx:1.25\n").expect("parse");
        assert_eq!(config.services.len(), 1);
    }

    #[test]
    fn extension_keys_are_stripped() {
        let input = "x-common: &common\n  restart: always\nservices:\n  web:\n    image: nginx\n";
        assert!(parse_compose(input).is_ok());
    }

    #[test]
    fn merge_keys_are_expanded() {
        let input = "\
x-defaults: &defaults
  restart: unless-stopped
  user: \"1000\"
services:
  web:
    <<: *defaults
    image: nginx
";
        let config = parse_compose(input).expect("parse");
        assert_eq!(config.services["web"].user.as_deref(), Some("1000"));
    }

    #[test]
    fn unknown_top_level_key_is_a_schema_error() {
        let err = parse_compose("services: {}\nconfigs: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Schema { .. }), "got: {err}");
    }

    #[test]
    fn syntax_error_is_a_yaml_error() {
        let err = parse_compose("services:\n  web: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }), "got: {err}");
    }

    #[test]
    fn empty_document_is_a_schema_error() {
        assert!(matches!(
            parse_compose(""),
            Err(ConfigError::Schema { .. })
        ));
    }

    #[test]
    fn semantic_checks_run_after_typing() {
        let err = parse_compose("services:\n  web:\n    mem_swappiness: 101\n").unwrap_err();
        assert!(err.to_string().contains("mem_swappiness"), "got: {err}");
    }
}
