use std::time::Duration;

use log::{error, warn};
use tokio::{task::JoinHandle, time::interval};

use crate::{
    ModuleContext,
    event_bus::ModuleEvent,
    modules::ModuleError,
    reactive::Observable,
    services::battery::{BatteryStatus, SysfsBattery},
};

/// Sysfs is re-read at this period; the kernel does not push capacity changes.
pub const BATTERY_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Visual indicator state for battery status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Normal,
    Warning,
    Danger,
    Success,
}

impl IndicatorState {
    pub fn of(status: BatteryStatus) -> Self {
        if status.charging || status.capacity >= 100 {
            Self::Success
        } else if status.capacity <= 10 {
            Self::Danger
        } else if status.capacity <= 20 {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

/// Bar text for `status`.
///
/// ```
/// use terraflow_core::{modules::battery::battery_label, services::battery::BatteryStatus};
///
/// let status = BatteryStatus { capacity: 85, charging: true };
/// assert_eq!(battery_label(status), "CHG 85%");
/// ```
pub fn battery_label(status: BatteryStatus) -> String {
    let prefix = if status.charging { "CHG" } else { "BAT" };
    format!("{prefix} {}%", status.capacity)
}

#[derive(Debug, Clone)]
pub enum Message {
    Updated(Option<BatteryStatus>),
}

/// Battery monitoring module
#[derive(Debug)]
pub struct Battery {
    reader: SysfsBattery,
    status: Option<BatteryStatus>,
    source: Observable<Option<BatteryStatus>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Battery {
    pub fn new(reader: SysfsBattery) -> Self {
        Self {
            reader,
            status: None,
            source: Observable::new(None),
            tasks: Vec::new(),
        }
    }

    /// Latest reading, `None` on machines without a battery.
    pub fn status(&self) -> Option<BatteryStatus> {
        self.status
    }

    pub fn indicator(&self) -> Option<IndicatorState> {
        self.status.map(IndicatorState::of)
    }

    pub fn label(&self) -> Option<String> {
        self.status.map(battery_label)
    }

    /// Poll the battery every [`BATTERY_POLL_INTERVAL`], starting right away.
    pub fn register(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        let handle = ctx.runtime_handle();
        self.tasks.push(self.source.bind(
            handle,
            ctx.module_sender(ModuleEvent::Battery),
            Message::Updated,
        ));

        let reader = self.reader.clone();
        let source = self.source.clone();
        self.tasks.push(handle.spawn(async move {
            let mut ticker = interval(BATTERY_POLL_INTERVAL);

            loop {
                ticker.tick().await;

                match reader.read().await {
                    Ok(status) => {
                        source.set(status);
                    }
                    Err(err) => error!("Failed to read battery: {err}"),
                }
            }
        }));

        Ok(())
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Updated(status) => {
                if let Some(status) = status
                    && !status.charging
                    && status.capacity <= 10
                {
                    warn!("Battery critically low: {}%", status.capacity);
                }
                self.status = status;
            }
        }
    }
}

impl Drop for Battery {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, num::NonZeroUsize, path::PathBuf};

    use tempfile::TempDir;
    use tokio::runtime::Handle;

    use super::*;
    use crate::event_bus::{BusEvent, EventBus};

    fn status(capacity: u8, charging: bool) -> BatteryStatus {
        BatteryStatus { capacity, charging }
    }

    #[test]
    fn battery_data_critical_state() {
        assert_eq!(IndicatorState::of(status(5, false)), IndicatorState::Danger);
        assert_eq!(IndicatorState::of(status(10, false)), IndicatorState::Danger);
    }

    #[test]
    fn battery_data_warning_state() {
        assert_eq!(IndicatorState::of(status(15, false)), IndicatorState::Warning);
        assert_eq!(IndicatorState::of(status(50, false)), IndicatorState::Normal);
    }

    #[test]
    fn charging_or_full_is_success() {
        assert_eq!(IndicatorState::of(status(5, true)), IndicatorState::Success);
        assert_eq!(IndicatorState::of(status(100, false)), IndicatorState::Success);
    }

    #[test]
    fn labels_show_charging_state() {
        assert_eq!(battery_label(status(42, false)), "BAT 42%");
        assert_eq!(battery_label(status(42, true)), "CHG 42%");
    }

    #[test]
    fn no_battery_renders_nothing() {
        let mut battery = Battery::new(SysfsBattery::with_supplies(Vec::<PathBuf>::new()));

        battery.update(Message::Updated(None));

        assert_eq!(battery.label(), None);
        assert_eq!(battery.indicator(), None);
    }

    #[tokio::test]
    async fn register_publishes_first_reading() {
        let dir = TempDir::new().expect("tempdir");
        let supply = dir.path().join("BAT0");
        fs::create_dir(&supply).expect("supply dir");
        fs::write(supply.join("capacity"), "18\n").expect("capacity");
        fs::write(supply.join("status"), "Discharging\n").expect("status");

        let bus = EventBus::new(NonZeroUsize::new(8).expect("capacity"));
        let ctx = ModuleContext::new(bus.sender(), Handle::current());
        let mut battery = Battery::new(SysfsBattery::with_supplies([supply]));
        battery.register(&ctx).expect("register");

        for _ in 0..200 {
            for event in bus.drain().expect("drain") {
                if let BusEvent::Module(ModuleEvent::Battery(message)) = event {
                    battery.update(message);
                }
            }
            if battery.status().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(battery.status(), Some(status(18, false)));
        assert_eq!(battery.indicator(), Some(IndicatorState::Warning));
        assert_eq!(battery.label().as_deref(), Some("BAT 18%"));
    }
}
