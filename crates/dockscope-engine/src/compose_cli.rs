//! Invocation of the `docker compose` CLI for project-level operations.

use std::fmt;
use std::path::Path;

use dockscope_common::error::EngineError;

/// A compose subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCommand {
    /// `pull`
    Pull,
    /// `build --no-cache`
    Build,
    /// `up -d`
    Up,
    /// `down`
    Down,
}

impl ComposeCommand {
    const fn args(self) -> &'static [&'static str] {
        match self {
            Self::Pull => &["pull"],
            Self::Build => &["build", "--no-cache"],
            Self::Up => &["up", "-d"],
            Self::Down => &["down"],
        }
    }
}

impl fmt::Display for ComposeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.args()[0])
    }
}

/// Arguments passed to `docker` for a compose command.
#[must_use]
pub fn compose_args(file: &Path, command: ComposeCommand, service: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "compose".to_string(),
        "-f".to_string(),
        file.display().to_string(),
    ];
    args.extend(command.args().iter().map(|arg| (*arg).to_string()));
    args.extend(service.map(str::to_string));
    args
}

/// Runs `docker compose -f <file> <command> [service]` with inherited stdio.
///
/// # Errors
///
/// Returns [`EngineError::Command`] if the process cannot be spawned or
/// exits unsuccessfully.
pub async fn run_compose(
    file: &Path,
    command: ComposeCommand,
    service: Option<&str>,
) -> Result<(), EngineError> {
    let args = compose_args(file, command, service);
    let rendered = format!("docker {}", args.join(" "));
    tracing::info!(command = %rendered, "running compose");

    let status = tokio::process::Command::new("docker")
        .args(&args)
        .status()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "cannot spawn docker");
            EngineError::Command {
                command: rendered.clone(),
                code: None,
            }
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(EngineError::Command {
            command: rendered,
            code: status.code(),
        })
    }
}
