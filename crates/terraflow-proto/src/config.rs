use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

mod serde_helpers;
mod stylesheet;

pub use stylesheet::{StyleColor, Stylesheet};

use serde_helpers::interval_ms_deserializer;

pub const DEFAULT_CONFIG_FILE_PATH: &str = "~/.config/terraflow/config.toml";
pub const DEFAULT_STYLESHEET_PATH: &str = "~/.config/terraflow/style.toml";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BarConfig {
    /// Index of the monitor the bar is bound to, in compositor output order.
    #[serde(default)]
    pub monitor: usize,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            monitor: 0,
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    "TerraFlow".to_owned()
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    /// `strftime`-style format string rendered on every tick.
    #[serde(default = "default_clock_format")]
    pub format: String,
    #[serde(
        deserialize_with = "interval_ms_deserializer",
        default = "default_clock_interval_ms"
    )]
    pub interval_ms: u64,
}

impl ClockConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            format: default_clock_format(),
            interval_ms: default_clock_interval_ms(),
        }
    }
}

fn default_clock_format() -> String {
    "%H:%M".to_owned()
}

fn default_clock_interval_ms() -> u64 {
    1000
}

/// What the active-window item shows.
#[derive(Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WindowTitleMode {
    #[default]
    Title,
    Class,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WindowTitleConfig {
    #[serde(default)]
    pub mode: WindowTitleMode,
    /// Longer values are cut to this many characters plus an ellipsis.
    #[serde(default = "default_truncate_title_after_length")]
    pub truncate_title_after_length: u32,
}

impl Default for WindowTitleConfig {
    fn default() -> Self {
        Self {
            mode: WindowTitleMode::default(),
            truncate_title_after_length: default_truncate_title_after_length(),
        }
    }
}

fn default_truncate_title_after_length() -> u32 {
    60
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Static text shown by the network picker placeholder.
    #[serde(default = "default_network_label")]
    pub network_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            network_label: default_network_label(),
        }
    }
}

fn default_network_label() -> String {
    "Wifi: Connected".to_owned()
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    #[serde(default)]
    pub bar: BarConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub window_title: WindowTitleConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

fn default_log_level() -> String {
    "warn".to_owned()
}

fn default_stylesheet() -> String {
    DEFAULT_STYLESHEET_PATH.to_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            stylesheet: default_stylesheet(),
            bar: BarConfig::default(),
            clock: ClockConfig::default(),
            window_title: WindowTitleConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Errors returned when validating a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    /// The clock would never tick.
    #[error("clock interval must be greater than zero")]
    ZeroClockInterval,

    /// The clock format would always render an empty label.
    #[error("clock format must not be empty")]
    EmptyClockFormat,

    /// No stylesheet path was given.
    #[error("stylesheet path must not be empty")]
    EmptyStylesheetPath,
}

impl Config {
    /// Validates values that serde defaults cannot guard on their own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError`] describing the first invalid field.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraflow_proto::config::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.clock.interval_ms == 0 {
            return Err(ConfigValidationError::ZeroClockInterval);
        }

        if self.clock.format.trim().is_empty() {
            return Err(ConfigValidationError::EmptyClockFormat);
        }

        if self.stylesheet.trim().is_empty() {
            return Err(ConfigValidationError::EmptyStylesheetPath);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_match_shell_layout() {
        let config = Config::default();

        assert_eq!(config.bar.monitor, 0);
        assert_eq!(config.bar.title, "TerraFlow");
        assert_eq!(config.clock.format, "%H:%M");
        assert_eq!(config.clock.interval(), Duration::from_secs(1));
        assert_eq!(config.dashboard.network_label, "Wifi: Connected");
        assert_eq!(config.window_title.mode, WindowTitleMode::Title);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn parses_window_title_mode() {
        let config: Config = toml::from_str(
            r#"
            [window_title]
            mode = "class"
            truncate_title_after_length = 20
            "#,
        )
        .expect("config");

        assert_eq!(config.window_title.mode, WindowTitleMode::Class);
        assert_eq!(config.window_title.truncate_title_after_length, 20);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            log_level = "debug"

            [bar]
            monitor = 1

            [clock]
            format = "%H:%M:%S"
            "#,
        )
        .expect("config");

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.bar.monitor, 1);
        assert_eq!(config.bar.title, "TerraFlow");
        assert_eq!(config.clock.format, "%H:%M:%S");
        assert_eq!(config.clock.interval_ms, 1000);
        assert_eq!(config.stylesheet, DEFAULT_STYLESHEET_PATH);
    }

    #[test]
    fn rejects_zero_interval_in_toml() {
        let result = toml::from_str::<Config>("[clock]\ninterval_ms = 0");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = Config {
            clock: ClockConfig {
                interval_ms: 0,
                ..ClockConfig::default()
            },
            ..Config::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroClockInterval)
        );
    }

    #[test]
    fn validate_rejects_empty_format() {
        let config = Config {
            clock: ClockConfig {
                format: "  ".to_owned(),
                ..ClockConfig::default()
            },
            ..Config::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyClockFormat)
        );
    }
}
