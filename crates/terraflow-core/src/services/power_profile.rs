use std::sync::Arc;

use log::{debug, warn};
use terraflow_proto::ports::power_profile::{
    PowerProfile, PowerProfileError, PowerProfileFuture, PowerProfilePort,
};

use crate::utils::launcher::{LauncherError, run_command_with_output};

const POWERPROFILESCTL: &str = "powerprofilesctl";

/// [`PowerProfilePort`] implementation running `powerprofilesctl set <profile>`.
#[derive(Debug, Clone)]
pub struct PowerProfilesCtl {
    program: Arc<str>,
}

impl Default for PowerProfilesCtl {
    fn default() -> Self {
        Self::with_program(POWERPROFILESCTL)
    }
}

impl PowerProfilesCtl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `program` in place of `powerprofilesctl`. It receives the same
    /// `set <profile>` arguments.
    pub fn with_program(program: impl Into<Arc<str>>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PowerProfilePort for PowerProfilesCtl {
    fn set_profile(&self, profile: PowerProfile) -> PowerProfileFuture {
        let program = Arc::clone(&self.program);

        Box::pin(async move {
            debug!(target: "terraflow::power_profile", "Switching power profile to {profile}");

            run_command_with_output(&program, &["set", profile.as_str()])
                .await
                .map(|_| ())
                .map_err(|err| {
                    warn!(target: "terraflow::power_profile", "{err}");
                    PowerProfileError::from(err)
                })
        })
    }
}

impl From<LauncherError> for PowerProfileError {
    fn from(err: LauncherError) -> Self {
        match err {
            LauncherError::Spawn { command, context } => Self::Spawn {
                command,
                message: context.to_string(),
            },
            LauncherError::NonZeroExit { command, status } => Self::Failed {
                command,
                status: status.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_sets_profile() {
        let port = PowerProfilesCtl::with_program("true");

        assert_eq!(port.set_profile(PowerProfile::Performance).await, Ok(()));
    }

    #[tokio::test]
    async fn failing_command_reports_status() {
        let port = PowerProfilesCtl::with_program("false");

        match port.set_profile(PowerProfile::Balanced).await {
            Err(PowerProfileError::Failed { command, .. }) => {
                assert_eq!(command.as_ref(), "false set balanced");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_error() {
        let port = PowerProfilesCtl::with_program("terraflow-missing-powerprofilesctl");

        let result = port.set_profile(PowerProfile::Performance).await;
        assert!(matches!(result, Err(PowerProfileError::Spawn { .. })));
    }
}
