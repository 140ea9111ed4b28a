//! Policy linter for compose configurations.

use dockscope_common::types::Severity;
use serde::Serialize;

use crate::schema::{ComposeConfig, Service};

/// One linter finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub level: Severity,
}

impl LintFinding {
    fn new(level: Severity, message: String) -> Self {
        Self { message, level }
    }
}

/// Lints a configuration, errors first.
///
/// `None` stands for a configuration that could not be loaded and yields a
/// single error without running any rule.
#[must_use]
pub fn lint(config: Option<&ComposeConfig>) -> Vec<LintFinding> {
    let Some(config) = config else {
        return vec![LintFinding::new(
            Severity::Error,
            "The config is not valid".to_string(),
        )];
    };

    let mut findings: Vec<LintFinding> = config
        .services
        .iter()
        .flat_map(|(name, service)| lint_service(name, service))
        .collect();
    // `sort_by` is stable, so findings of equal severity keep their order.
    findings.sort_by(|a, b| b.level.cmp(&a.level));
    findings
}

fn lint_service(name: &str, service: &Service) -> Vec<LintFinding> {
    let mut findings = Vec::new();

    match service.container_name.as_deref() {
        None => findings.push(LintFinding::new(
            Severity::Error,
            format!("Service {name} is missing a required container_name attribute"),
        )),
        Some(container_name) if container_name != name => findings.push(LintFinding::new(
            Severity::Error,
            format!(
                "Service {name} has a container_name attribute which is not the same as the service name"
            ),
        )),
        Some(_) => {}
    }

    if service.ports.is_some() {
        findings.push(LintFinding::new(
            Severity::Info,
            format!("Service {name} is exposing ports, consider using a network instead"),
        ));
    }

    let limits = [
        (
            service.user.is_none(),
            "a user, consider using a user to run the container",
        ),
        (
            service.cpus.is_none(),
            "a cpu limit, consider using a cpu limit to run the container",
        ),
        (
            service.mem_limit.is_none(),
            "a memory limit, consider using a memory limit to run the container",
        ),
        (
            service.pids_limit.is_none(),
            "a pid limit, consider using a pid limit to run the container",
        ),
    ];
    for (missing, what) in limits {
        if missing {
            findings.push(LintFinding::new(
                Severity::Warning,
                format!("Service {name} is not specifying {what}"),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_compose;

    fn lint_yaml(yaml: &str) -> Vec<LintFinding> {
        lint(Some(&parse_compose(yaml).expect("parse")))
    }

    fn count(findings: &[LintFinding], level: Severity) -> usize {
        findings.iter().filter(|f| f.level == level).count()
    }

    #[test]
    fn invalid_config_yields_single_error() {
        let findings = lint(None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].level, Severity::Error);
        assert_eq!(findings[0].message, "The config is not valid");
    }

    #[test]
    fn mismatched_container_name_is_one_error() {
        let findings = lint_yaml(
            "services:\n  web:\n    container_name: api\n    user: app\n    cpus: 1\n    mem_limit: 256m\n    pids_limit: 100\n",
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("not the same as the service name"));
        assert!(!findings[0].message.contains("missing"));
    }

    #[test]
    fn missing_container_name_is_one_error() {
        let findings = lint_yaml("services:\n  web:\n    image: nginx\n");
        assert_eq!(count(&findings, Severity::Error), 1);
        assert!(findings[0].message.contains("missing a required container_name"));
    }

    #[test]
    fn four_independent_limit_warnings() {
        let findings = lint_yaml("services:\n  web:\n    container_name: web\n");
        assert_eq!(count(&findings, Severity::Warning), 4);
    }

    #[test]
    fn exposed_ports_are_info() {
        let findings = lint_yaml(
            "services:\n  web:\n    container_name: web\n    ports: [\"80:80\"]\n",
        );
        assert_eq!(count(&findings, Severity::Info), 1);
        assert_eq!(findings.last().map(|f| f.level), Some(Severity::Info));
    }

    #[test]
    fn sorted_errors_then_warnings_then_info_stably() {
        let findings = lint_yaml(
            "services:\n  a:\n    ports: [\"1:1\"]\n  b:\n    container_name: x\n",
        );
        let levels: Vec<Severity> = findings.iter().map(|f| f.level).collect();
        let mut sorted = levels.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(levels, sorted);
        assert!(findings[0].message.starts_with("Service a "));
        assert!(findings[1].message.starts_with("Service b "));
        let first_warning = findings
            .iter()
            .find(|f| f.level == Severity::Warning)
            .expect("warning");
        assert!(first_warning.message.contains("a user"));
        assert!(first_warning.message.starts_with("Service a "));
    }

    #[test]
    fn services_keep_file_order_within_a_severity() {
        let findings = lint_yaml("services:\n  zeta: {}\n  alpha: {}\n");
        assert_eq!(
            findings[0].message,
            "Service zeta is missing a required container_name attribute"
        );
        assert!(findings[1].message.starts_with("Service alpha "));
        let warnings: Vec<&str> = findings
            .iter()
            .filter(|f| f.level == Severity::Warning)
            .map(|f| f.message.as_str())
            .collect();
        assert!(warnings[0].starts_with("Service zeta "));
        assert!(warnings[4].starts_with("Service alpha "));
    }
}
