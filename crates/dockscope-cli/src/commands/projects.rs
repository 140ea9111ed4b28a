//! `dscope projects`: list compose projects.

use clap::Args;
use dockscope_common::config::DockscopeConfig;
use dockscope_common::types::EntityKind;

/// Arguments for the `projects` command.
#[derive(Args, Debug)]
pub struct ProjectsArgs {}

/// Executes the `projects` command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be built.
pub async fn execute(_args: ProjectsArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let host = super::snapshot(config).await?;

    if host.projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!(
        "{:<20} {:<10} {:<11} {:<8} {:<8} {}",
        "NAME", "STATUS", "CONTAINERS", "ENV", "ISSUES", "COMPOSE FILE"
    );
    for project in &host.projects {
        let status = if project.is_running(&host) { "running" } else { "stopped" };
        let running = host
            .project_containers(project)
            .filter(|c| c.is_running())
            .count();
        let compose = project.compose.as_ref().map_or_else(
            || "-".to_string(),
            |file| file.path.display().to_string(),
        );
        let issues = host.diagnostics_for(EntityKind::Project, &project.name).count();
        println!(
            "{:<20} {:<10} {:<11} {:<8} {:<8} {}",
            project.name,
            status,
            format!("{running}/{}", project.containers.len()),
            project.env_files.len(),
            issues,
            compose
        );
    }
    Ok(())
}
