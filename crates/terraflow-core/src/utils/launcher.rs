use std::{
    process::{ExitStatus, Output},
    sync::Arc,
};

use thiserror::Error;
use tokio::process::Command;

/// Error type emitted when launching an external program fails.
///
/// The error keeps a shared reference to the rendered command line so callers
/// can tell failures apart per command without cloning buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LauncherError {
    /// The program could not be spawned by the operating system.
    #[error("failed to spawn `{command}`: {context}")]
    Spawn {
        /// The attempted command line.
        command: Arc<str>,
        /// Additional context provided by the OS error.
        context: Arc<str>,
    },
    /// The program ran but returned a non-zero exit status.
    #[error("command `{command}` exited with status {status}")]
    NonZeroExit {
        /// The attempted command line.
        command: Arc<str>,
        /// The exit status returned by the process.
        status: ExitStatus,
    },
}

impl LauncherError {
    pub fn command(&self) -> &Arc<str> {
        match self {
            Self::Spawn { command, .. } | Self::NonZeroExit { command, .. } => command,
        }
    }
}

/// Render `program` and `args` as a single line for logs and errors.
pub fn command_line(program: &str, args: &[&str]) -> Arc<str> {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    Arc::from(line)
}

/// Run `program` with `args` directly, without a shell, and collect its
/// output.
///
/// # Errors
///
/// Returns [`LauncherError::Spawn`] if the process cannot be created or
/// [`LauncherError::NonZeroExit`] when it finishes unsuccessfully.
///
/// # Examples
///
/// ```no_run
/// use terraflow_core::utils::launcher::{LauncherError, run_command_with_output};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let runtime = tokio::runtime::Runtime::new()?;
/// runtime.block_on(async {
///     let output = run_command_with_output("powerprofilesctl", &["get"]).await?;
///     println!("{}", String::from_utf8_lossy(&output.stdout));
///     Ok::<(), LauncherError>(())
/// })?;
/// # Ok(())
/// # }
/// ```
pub async fn run_command_with_output(program: &str, args: &[&str]) -> Result<Output, LauncherError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|error| LauncherError::Spawn {
            command: command_line(program, args),
            context: Arc::from(error.to_string()),
        })?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(LauncherError::NonZeroExit {
            command: command_line(program, args),
            status: output.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{LauncherError, command_line, run_command_with_output};

    #[test]
    fn command_line_joins_arguments() {
        assert_eq!(
            command_line("powerprofilesctl", &["set", "balanced"]).as_ref(),
            "powerprofilesctl set balanced"
        );
        assert_eq!(command_line("true", &[]).as_ref(), "true");
    }

    #[tokio::test]
    async fn reports_successful_status() -> Result<(), Box<dyn std::error::Error>> {
        let output =
            tokio::time::timeout(Duration::from_secs(5), run_command_with_output("true", &[]))
                .await??;

        assert!(output.status.success());

        Ok(())
    }

    #[tokio::test]
    async fn reports_non_zero_exit_as_error() -> Result<(), Box<dyn std::error::Error>> {
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            run_command_with_output("sh", &["-c", "exit 42"]),
        )
        .await?;

        match outcome {
            Err(LauncherError::NonZeroExit { status, command }) => {
                assert_eq!(status.code(), Some(42));
                assert_eq!(command.as_ref(), "sh -c exit 42");
            }
            other => {
                return Err(format!("unexpected outcome: {other:?}").into());
            }
        }

        Ok(())
    }

    #[tokio::test]
    async fn captures_command_output() -> Result<(), Box<dyn std::error::Error>> {
        let output = tokio::time::timeout(
            Duration::from_secs(5),
            run_command_with_output("printf", &["foo"]),
        )
        .await??;

        assert_eq!(output.stdout, b"foo");
        assert!(output.stderr.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let outcome = run_command_with_output("terraflow-definitely-missing-binary", &[]).await;

        match outcome {
            Err(error @ LauncherError::Spawn { .. }) => {
                assert_eq!(error.command().as_ref(), "terraflow-definitely-missing-binary");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
