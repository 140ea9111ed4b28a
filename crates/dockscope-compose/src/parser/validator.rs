//! Semantic validation of a typed compose configuration.
//!
//! Covers the constraints the type system cannot express: name patterns
//! and numeric ranges.

use std::sync::LazyLock;

use dockscope_common::error::ConfigError;
use regex::Regex;

use crate::schema::{ComposeConfig, Gpus, Service};

static CONTAINER_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("^[a-zA-Z0-9][a-zA-Z0-9_.-]+$").ok());

/// Validates a typed compose configuration.
///
/// # Checks performed
///
/// 1. `container_name` matches `^[a-zA-Z0-9][a-zA-Z0-9_.-]+$`.
/// 2. `mem_swappiness` lies in `0..=100`.
/// 3. `oom_score_adj` lies in `-1000..=1000`.
/// 4. `pids_limit` is at least `-1`.
/// 5. A keyword `gpus` value is `all`.
///
/// # Errors
///
/// Returns [`ConfigError::Schema`] naming the first offending service.
pub fn validate(config: &ComposeConfig) -> Result<(), ConfigError> {
    for (name, service) in &config.services {
        check_container_name(name, service)?;
        check_ranges(name, service)?;
        check_gpus(name, service)?;
    }
    Ok(())
}

fn check_container_name(name: &str, service: &Service) -> Result<(), ConfigError> {
    let Some(container_name) = service.container_name.as_deref() else {
        return Ok(());
    };
    let valid = CONTAINER_NAME
        .as_ref()
        .is_some_and(|re| re.is_match(container_name));
    if valid {
        Ok(())
    } else {
        Err(schema(format!(
            "services.{name}.container_name: \"{container_name}\" is not a valid container name"
        )))
    }
}

fn check_ranges(name: &str, service: &Service) -> Result<(), ConfigError> {
    if let Some(value) = service.mem_swappiness {
        if !(0..=100).contains(&value) {
            return Err(schema(format!(
                "services.{name}.mem_swappiness: {value} is outside 0..=100"
            )));
        }
    }
    if let Some(value) = service.oom_score_adj {
        if !(-1000..=1000).contains(&value) {
            return Err(schema(format!(
                "services.{name}.oom_score_adj: {value} is outside -1000..=1000"
            )));
        }
    }
    if let Some(value) = service.pids_limit {
        if value < -1 {
            return Err(schema(format!(
                "services.{name}.pids_limit: {value} is below -1"
            )));
        }
    }
    Ok(())
}

fn check_gpus(name: &str, service: &Service) -> Result<(), ConfigError> {
    match &service.gpus {
        Some(Gpus::Keyword(keyword)) if keyword != "all" => Err(schema(format!(
            "services.{name}.gpus: expected \"all\" or a device list, got \"{keyword}\""
        ))),
        _ => Ok(()),
    }
}

const fn schema(message: String) -> ConfigError {
    ConfigError::Schema { message }
}
