use std::{sync::Arc, thread, time::Duration};

use log::warn;
use terraflow_proto::ports::hyprland::HyprlandError;

use super::{config::HyprlandClientConfig, util::calculate_retry_delay};

/// Execute a blocking Hyprland request in a worker thread and wait for it to
/// complete within the provided timeout.
///
/// A timed out worker is left to finish on its own; its result is discarded.
pub(crate) fn execute_once<R, F>(
    operation: &'static str,
    timeout_dur: Duration,
    func: Arc<F>,
) -> Result<R, HyprlandError>
where
    R: Send + 'static,
    F: Fn() -> Result<R, HyprlandError> + Send + Sync + 'static,
{
    let (tx, rx) = std::sync::mpsc::channel();
    thread::spawn(move || {
        let result = func();
        if tx.send(result).is_err() {
            warn!(
                target: "terraflow::hyprland",
                "result receiver dropped before completion (operation={operation})"
            );
        }
    });

    match rx.recv_timeout(timeout_dur) {
        Ok(result) => result,
        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => Err(HyprlandError::Timeout {
            operation,
            timeout: timeout_dur,
        }),
        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => Err(HyprlandError::message(
            operation,
            "worker thread terminated before sending result",
        )),
    }
}

/// Execute a blocking Hyprland request with retry and linear backoff taken
/// from [`HyprlandClientConfig`]. The last error is returned once every
/// attempt has failed.
pub(crate) fn execute_with_retry<R, F>(
    config: &HyprlandClientConfig,
    operation: &'static str,
    func: F,
) -> Result<R, HyprlandError>
where
    R: Send + 'static,
    F: Fn() -> Result<R, HyprlandError> + Send + Sync + 'static,
{
    let func = Arc::new(func);
    let mut last_error = None;

    for attempt in 1..=config.retry_attempts {
        match execute_once(operation, config.request_timeout, Arc::clone(&func)) {
            Ok(result) => return Ok(result),
            Err(err) => {
                warn!(
                    target: "terraflow::hyprland",
                    "Hyprland operation failed (operation={operation}, attempt={attempt}, error={err})"
                );
                last_error = Some(err);

                if attempt < config.retry_attempts {
                    let delay = calculate_retry_delay(config.retry_backoff, attempt);
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        HyprlandError::message(operation, "Hyprland operation attempted zero times")
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn fast_config() -> HyprlandClientConfig {
        HyprlandClientConfig {
            request_timeout: Duration::from_millis(200),
            listener_timeout: Duration::from_secs(1),
            retry_attempts: 3,
            retry_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn execute_once_propagates_success() {
        let result = execute_once("test", Duration::from_secs(1), Arc::new(|| Ok(42)));
        assert_eq!(result.expect("value"), 42);
    }

    #[test]
    fn execute_once_times_out() {
        let result = execute_once(
            "slow",
            Duration::from_millis(10),
            Arc::new(|| {
                thread::sleep(Duration::from_millis(200));
                Ok(())
            }),
        );

        assert!(matches!(
            result,
            Err(HyprlandError::Timeout { operation: "slow", .. })
        ));
    }

    #[test]
    fn execute_with_retry_eventually_succeeds() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&counter);

        let result = execute_with_retry(&fast_config(), "retry", move || {
            let value = calls.fetch_add(1, Ordering::SeqCst);
            if value < 2 {
                Err(HyprlandError::message("retry", "try again"))
            } else {
                Ok(value)
            }
        });

        assert_eq!(result.expect("value"), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn execute_with_retry_returns_last_error() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&counter);

        let result = execute_with_retry(&fast_config(), "retry", move || -> Result<(), _> {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            Err(HyprlandError::message("retry", format!("failure {attempt}")))
        });

        match result {
            Err(HyprlandError::Message { message, .. }) => assert_eq!(message, "failure 2"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
