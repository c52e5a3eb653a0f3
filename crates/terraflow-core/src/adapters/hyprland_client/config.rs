use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
const LISTENER_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_ATTEMPTS: u8 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// IPC budget of [`HyprlandClient`](super::HyprlandClient).
///
/// Snapshot reads and workspace dispatches are retried `retry_attempts`
/// times with a linear backoff. The event listener is restarted when it stays
/// silent for `listener_timeout`.
///
/// ```
/// use std::time::Duration;
/// use terraflow_core::adapters::hyprland_client::HyprlandClientConfig;
///
/// let config = HyprlandClientConfig {
///     retry_attempts: 5,
///     ..HyprlandClientConfig::default()
/// };
/// assert_eq!(config.request_timeout, Duration::from_secs(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HyprlandClientConfig {
    pub request_timeout: Duration,
    pub listener_timeout: Duration,
    pub retry_attempts: u8,
    /// Multiplied by the attempt number.
    pub retry_backoff: Duration,
}

impl Default for HyprlandClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
            listener_timeout: LISTENER_TIMEOUT,
            retry_attempts: RETRY_ATTEMPTS,
            retry_backoff: RETRY_BACKOFF,
        }
    }
}
