//! `dscope lint`: check a project's compose file.

use anyhow::{Context, bail};
use clap::Args;
use dockscope_common::config::DockscopeConfig;
use dockscope_common::types::{EntityKind, Severity};

/// Arguments for the `lint` command.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Project name.
    pub project: String,
}

/// Executes the `lint` command.
///
/// Prints the linter findings followed by reconciliation diagnostics for
/// the project and its containers.
///
/// # Errors
///
/// Returns an error if the project is unknown or any error-level finding
/// was reported.
pub async fn execute(args: LintArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;
    let project = host
        .project(&args.project)
        .with_context(|| format!("no project named {}", args.project))?;

    match project.start_order() {
        Ok(order) => println!("start order: {}", order.join(" -> ")),
        Err(e) if project.config().is_some() => println!("{:<8} {e}", Severity::Error.to_string()),
        Err(_) => {}
    }

    let findings = project.lint();
    for finding in &findings {
        println!("{:<8} {}", finding.level.to_string(), finding.message);
    }
    let diagnostics = host
        .diagnostics_for(EntityKind::Project, &project.name)
        .chain(
            project
                .containers
                .iter()
                .flat_map(|name| host.diagnostics_for(EntityKind::Container, name)),
        );
    for diagnostic in diagnostics {
        println!("{diagnostic}");
    }

    let errors = findings.iter().filter(|f| f.level == Severity::Error).count();
    if errors > 0 {
        bail!("{errors} error(s) in project {}", project.name);
    }
    Ok(())
}
