use flexi_logger::LogSpecification;
use log::warn;

mod views;

pub mod app;

pub use app::{App, Message};

/// Level used when the configured spec cannot be parsed.
pub const FALLBACK_LOG_LEVEL: &str = "warn";

/// Parse `log_level`, letting `RUST_LOG` take precedence.
pub fn get_log_spec(log_level: &str) -> LogSpecification {
    LogSpecification::env_or_parse(log_level).unwrap_or_else(|err| {
        warn!("Failed to parse log level `{log_level}`: {err}; using {FALLBACK_LOG_LEVEL}");
        LogSpecification::parse(FALLBACK_LOG_LEVEL).unwrap_or_else(|_| LogSpecification::off())
    })
}

