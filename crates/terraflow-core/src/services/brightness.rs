use std::sync::Arc;

use log::{debug, warn};
use terraflow_proto::ports::brightness::{
    BrightnessError, BrightnessFuture, BrightnessPort, MAX_BRIGHTNESS,
};

use crate::utils::launcher::{LauncherError, run_command_with_output};

const BRIGHTNESSCTL: &str = "brightnessctl";

/// [`BrightnessPort`] implementation driving `brightnessctl`.
#[derive(Debug, Clone)]
pub struct Brightnessctl {
    program: Arc<str>,
}

impl Default for Brightnessctl {
    fn default() -> Self {
        Self::with_program(BRIGHTNESSCTL)
    }
}

impl Brightnessctl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `program` in place of `brightnessctl`. It receives the same
    /// `info -m` and `set <N>%` arguments.
    pub fn with_program(program: impl Into<Arc<str>>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Percentage column of `brightnessctl info -m`
/// (`device,class,current,percent,max`).
///
/// ```
/// use terraflow_core::services::brightness::parse_machine_info;
///
/// assert_eq!(parse_machine_info("intel_backlight,backlight,400,42%,960"), Some(42));
/// assert_eq!(parse_machine_info("garbage"), None);
/// ```
pub fn parse_machine_info(output: &str) -> Option<u8> {
    let percent = output.lines().next()?.split(',').nth(3)?;
    percent
        .trim()
        .trim_end_matches('%')
        .parse::<u8>()
        .ok()
        .map(|value| value.min(MAX_BRIGHTNESS))
}

impl BrightnessPort for Brightnessctl {
    fn brightness(&self) -> BrightnessFuture<u8> {
        let program = Arc::clone(&self.program);

        Box::pin(async move {
            let output = run_command_with_output(&program, &["info", "-m"]).await?;
            let stdout = String::from_utf8_lossy(&output.stdout);

            parse_machine_info(&stdout).ok_or_else(|| BrightnessError::Parse {
                output: stdout.trim().to_owned(),
            })
        })
    }

    fn set_brightness(&self, percent: u8) -> BrightnessFuture<()> {
        let program = Arc::clone(&self.program);
        let value = format!("{}%", percent.min(MAX_BRIGHTNESS));

        Box::pin(async move {
            debug!(target: "terraflow::brightness", "Setting brightness to {value}");

            run_command_with_output(&program, &["set", &value])
                .await
                .map(|_| ())
                .map_err(|err| {
                    warn!(target: "terraflow::brightness", "{err}");
                    BrightnessError::from(err)
                })
        })
    }
}

impl From<LauncherError> for BrightnessError {
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

    #[test]
    fn parse_takes_first_device_only() {
        let output = "intel_backlight,backlight,960,100%,960\nkbd,leds,0,0%,3\n";

        assert_eq!(parse_machine_info(output), Some(100));
    }

    #[test]
    fn parse_rejects_missing_percentage() {
        assert_eq!(parse_machine_info("intel_backlight,backlight,400"), None);
        assert_eq!(parse_machine_info("a,b,c,lots,d"), None);
        assert_eq!(parse_machine_info(""), None);
    }

    #[tokio::test]
    async fn set_brightness_clamps_and_formats_percentage() {
        let port = Brightnessctl::with_program("false");

        match port.set_brightness(250).await {
            Err(BrightnessError::Failed { command, .. }) => {
                assert_eq!(command.as_ref(), "false set 100%");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn brightness_reads_program_output() {
        let port = Brightnessctl::with_program("echo");

        // `echo info -m` prints no percentage column.
        assert_eq!(
            port.brightness().await,
            Err(BrightnessError::Parse {
                output: "info -m".into()
            })
        );
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_error() {
        let port = Brightnessctl::with_program("terraflow-missing-brightnessctl");

        assert!(matches!(
            port.set_brightness(40).await,
            Err(BrightnessError::Spawn { .. })
        ));
    }
}
