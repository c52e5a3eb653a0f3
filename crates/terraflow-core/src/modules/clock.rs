use std::{
    fmt::{Display, Write as _},
    time::Duration,
};

use chrono::{
    DateTime, Local, TimeZone,
    format::{Item, StrftimeItems},
};
use log::error;
use thiserror::Error;
use tokio::{task::JoinHandle, time::interval};

use crate::{ModuleContext, config::ClockConfig, event_bus::ModuleEvent, modules::ModuleError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockFormatError {
    #[error("invalid clock format `{format}`")]
    Invalid { format: String },
}

/// Render `time` with a strftime-style `format`.
///
/// # Errors
///
/// Returns [`ClockFormatError::Invalid`] for unknown specifiers or when the
/// formatter cannot render `time`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use terraflow_core::modules::clock::format_clock;
///
/// let time = Local.with_ymd_and_hms(2024, 5, 1, 9, 5, 0).single().expect("time");
/// assert_eq!(format_clock(&time, "%H:%M").expect("format"), "09:05");
/// ```
pub fn format_clock<Tz>(time: &DateTime<Tz>, format: &str) -> Result<String, ClockFormatError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let invalid = || ClockFormatError::Invalid {
        format: format.to_owned(),
    };

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let mut label = String::new();
    write!(label, "{}", time.format(format)).map_err(|_| invalid())?;
    Ok(label)
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick(DateTime<Local>),
}

/// Clock module: holds the label and the ticker task.
#[derive(Debug)]
pub struct Clock {
    label: String,
    format: String,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    pub fn new(config: &ClockConfig) -> Self {
        let mut clock = Self {
            label: String::new(),
            format: config.format.clone(),
            interval: config.interval(),
            task: None,
        };
        clock.update(Message::Tick(Local::now()));
        clock
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Start ticking every configured interval. A previous ticker is
    /// replaced.
    pub fn register(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let sender = ctx.module_sender(ModuleEvent::Clock);
        let period = self.interval;

        self.task = Some(ctx.runtime_handle().spawn(async move {
            let mut ticker = interval(period);

            loop {
                ticker.tick().await;

                if let Err(err) = sender.try_send(Message::Tick(Local::now())) {
                    error!("Failed to publish clock tick: {err}");
                }
            }
        }));

        Ok(())
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Tick(now) => match format_clock(&now, &self.format) {
                Ok(label) => self.label = label,
                Err(err) => error!("{err}"),
            },
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use chrono::Utc;
    use tokio::runtime::Handle;

    use super::*;
    use crate::event_bus::{BusEvent, EventBus};

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 5, 1, hour, minute, 0)
            .single()
            .expect("unambiguous time")
    }

    #[test]
    fn formats_zero_padded_24_hour_time() {
        assert_eq!(format_clock(&at(9, 5), "%H:%M").expect("format"), "09:05");
        assert_eq!(format_clock(&at(23, 0), "%H:%M").expect("format"), "23:00");
    }

    #[test]
    fn formats_any_timezone() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).single().expect("time");
        assert_eq!(format_clock(&time, "%H:%M").expect("format"), "07:30");
    }

    #[test]
    fn rejects_unknown_specifier() {
        assert_eq!(
            format_clock(&at(9, 5), "%Q"),
            Err(ClockFormatError::Invalid {
                format: "%Q".into()
            })
        );
    }

    #[test]
    fn invalid_format_keeps_previous_label() {
        let mut clock = Clock::new(&ClockConfig::default());
        clock.update(Message::Tick(at(9, 5)));
        assert_eq!(clock.label(), "09:05");

        clock.format = "%Q".into();
        clock.update(Message::Tick(at(10, 0)));
        assert_eq!(clock.label(), "09:05");
    }

    #[tokio::test(start_paused = true)]
    async fn register_publishes_ticks() {
        let bus = EventBus::new(NonZeroUsize::new(8).expect("capacity"));
        let ctx = ModuleContext::new(bus.sender(), Handle::current());
        let mut clock = Clock::new(&ClockConfig::default());

        clock.register(&ctx).expect("register");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let ticks = bus
            .drain()
            .expect("drain")
            .into_iter()
            .filter(|event| matches!(event, BusEvent::Module(ModuleEvent::Clock(Message::Tick(_)))))
            .count();
        assert_eq!(ticks, 2);
    }
}
