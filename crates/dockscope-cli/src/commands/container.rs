//! `dscope container`: lifecycle actions on one container.

use clap::{Args, ValueEnum};
use dockscope_common::config::DockscopeConfig;
use dockscope_engine::actions::ContainerAction;

/// Action to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Start the container.
    Start,
    /// Stop the container.
    Stop,
    /// Restart the container.
    Restart,
    /// Send SIGKILL.
    Kill,
    /// Freeze all processes.
    Pause,
    /// Resume after a pause.
    Unpause,
    /// Remove the container.
    Delete,
}

impl Action {
    const fn lifecycle(self) -> Option<ContainerAction> {
        match self {
            Self::Start => Some(ContainerAction::Start),
            Self::Stop => Some(ContainerAction::Stop),
            Self::Restart => Some(ContainerAction::Restart),
            Self::Kill => Some(ContainerAction::Kill),
            Self::Pause => Some(ContainerAction::Pause),
            Self::Unpause => Some(ContainerAction::Unpause),
            Self::Delete => None,
        }
    }
}

/// Arguments for the `container` command.
#[derive(Args, Debug)]
pub struct ContainerArgs {
    /// Action to run.
    #[arg(value_enum)]
    pub action: Action,

    /// Container ID or name.
    pub id: String,

    /// With `delete`, remove the container even if it is running.
    #[arg(short, long)]
    pub force: bool,
}

/// Executes the `container` command.
///
/// # Errors
///
/// Returns an error if the engine rejects the request.
pub async fn execute(args: ContainerArgs, config: &DockscopeConfig) -> anyhow::Result<()> {
    let client = super::client(config)?;
    match args.action.lifecycle() {
        Some(action) => client.container_action(&args.id, action).await?,
        None => client.delete_container(&args.id, args.force).await?,
    }
    println!("{}: {:?}", args.id, args.action);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_is_not_a_lifecycle_action() {
        assert_eq!(Action::Delete.lifecycle(), None);
        assert_eq!(Action::Pause.lifecycle(), Some(ContainerAction::Pause));
    }
}
