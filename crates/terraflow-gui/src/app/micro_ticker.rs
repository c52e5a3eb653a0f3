use std::time::Duration;

const FAST_INTERVAL: Duration = Duration::from_millis(16);
const SLOW_INTERVAL: Duration = Duration::from_millis(33);
const IDLE_THRESHOLD: u8 = 3;

/// Adaptive cadence for draining the event bus.
///
/// Runs at the fast interval while events keep arriving and drops to the slow
/// one after `idle_threshold` consecutive empty drains.
#[derive(Debug, Clone)]
pub(super) struct MicroTicker {
    fast_interval: Duration,
    slow_interval: Duration,
    idle_threshold: u8,
    idle_ticks: u8,
    current_interval: Duration,
}

impl MicroTicker {
    pub(super) fn new(fast_interval: Duration, slow_interval: Duration, idle_threshold: u8) -> Self {
        Self {
            fast_interval,
            slow_interval,
            idle_threshold,
            idle_ticks: 0,
            current_interval: fast_interval,
        }
    }

    pub(super) fn interval(&self) -> Duration {
        self.current_interval
    }

    pub(super) fn record_activity(&mut self) {
        self.idle_ticks = 0;
        self.current_interval = self.fast_interval;
    }

    pub(super) fn record_idle(&mut self) {
        if self.idle_ticks < self.idle_threshold {
            self.idle_ticks += 1;
        }

        if self.idle_ticks >= self.idle_threshold {
            self.current_interval = self.slow_interval;
        }
    }
}

impl Default for MicroTicker {
    fn default() -> Self {
        Self::new(FAST_INTERVAL, SLOW_INTERVAL, IDLE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slows_down_after_idle_threshold() {
        let mut ticker = MicroTicker::default();

        ticker.record_idle();
        ticker.record_idle();
        assert_eq!(ticker.interval(), FAST_INTERVAL);

        ticker.record_idle();
        assert_eq!(ticker.interval(), SLOW_INTERVAL);
    }

    #[test]
    fn activity_restores_fast_cadence() {
        let mut ticker = MicroTicker::default();
        for _ in 0..5 {
            ticker.record_idle();
        }

        ticker.record_activity();
        assert_eq!(ticker.interval(), FAST_INTERVAL);

        ticker.record_idle();
        assert_eq!(ticker.interval(), FAST_INTERVAL);
    }
}
