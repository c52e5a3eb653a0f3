use std::sync::Arc;

use log::{debug, info, warn};
use terraflow_proto::ports::power_profile::{PowerProfile, PowerProfileError, PowerProfilePort};
use tokio::{
    runtime::Handle,
    task::{AbortHandle, JoinHandle},
};

/// Handle to one spawned `powerprofilesctl` invocation.
pub type CommandHandle = JoinHandle<Result<(), PowerProfileError>>;

/// Performance-mode switch.
///
/// Invocations are not serialised. Overlapping switches may complete in any
/// order; the last spawned one is tracked only so the overlap can be logged.
pub struct PerformanceToggle {
    port: Arc<dyn PowerProfilePort>,
    active: bool,
    last: Option<AbortHandle>,
}

impl std::fmt::Debug for PerformanceToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceToggle")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl PerformanceToggle {
    pub fn new(port: Arc<dyn PowerProfilePort>) -> Self {
        Self {
            port,
            active: false,
            last: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Switch to the performance profile when `active`, to balanced otherwise.
    pub fn toggled(&mut self, active: bool, runtime: &Handle) -> CommandHandle {
        self.active = active;
        let profile = PowerProfile::from_active(active);

        if let Some(last) = self.last.take()
            && !last.is_finished()
        {
            debug!(
                target: "terraflow::power_profile",
                "previous power profile switch still running; completion order is unspecified"
            );
        }

        let switch = self.port.set_profile(profile);
        let handle = runtime.spawn(async move {
            let result = switch.await;

            match &result {
                Ok(()) => info!(target: "terraflow::power_profile", "Power profile set to {profile}"),
                Err(err) => warn!(target: "terraflow::power_profile", "Failed to set power profile {profile}: {err}"),
            }

            result
        });

        self.last = Some(handle.abort_handle());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockPowerProfilePort;

    #[tokio::test]
    async fn active_selects_performance() {
        let port = Arc::new(MockPowerProfilePort::default());
        let mut toggle = PerformanceToggle::new(port.clone());

        toggle
            .toggled(true, &Handle::current())
            .await
            .expect("join")
            .expect("profile set");

        assert!(toggle.is_active());
        assert_eq!(port.profiles(), [PowerProfile::Performance]);
    }

    #[tokio::test]
    async fn inactive_selects_balanced() {
        let port = Arc::new(MockPowerProfilePort::default());
        let mut toggle = PerformanceToggle::new(port.clone());

        toggle
            .toggled(false, &Handle::current())
            .await
            .expect("join")
            .expect("profile set");

        assert_eq!(port.profiles(), [PowerProfile::Balanced]);
    }

    #[tokio::test]
    async fn rapid_toggles_each_spawn_a_command() {
        let port = Arc::new(MockPowerProfilePort::default());
        let mut toggle = PerformanceToggle::new(port.clone());

        let first = toggle.toggled(true, &Handle::current());
        let second = toggle.toggled(false, &Handle::current());
        let (first, second) = tokio::join!(first, second);

        assert!(first.expect("join").is_ok());
        assert!(second.expect("join").is_ok());
        assert!(!toggle.is_active());

        let mut profiles = port.profiles();
        profiles.sort_by_key(|profile| profile.as_str());
        assert_eq!(profiles, [PowerProfile::Balanced, PowerProfile::Performance]);
    }

    #[tokio::test]
    async fn failures_are_returned_through_the_handle() {
        let port = Arc::new(MockPowerProfilePort::failing());
        let mut toggle = PerformanceToggle::new(port);

        let result = toggle
            .toggled(true, &Handle::current())
            .await
            .expect("join");

        assert!(matches!(result, Err(PowerProfileError::Failed { .. })));
    }
}
