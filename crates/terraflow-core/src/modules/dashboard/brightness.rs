use std::sync::Arc;

use log::{info, warn};
use terraflow_proto::ports::brightness::{BrightnessError, BrightnessPort, MAX_BRIGHTNESS};
use tokio::{runtime::Handle, task::JoinHandle};

/// Backlight slider.
///
/// Dragging only moves the slider; the value is written once on release so
/// a drag does not spawn one `brightnessctl` per step.
pub struct BrightnessSlider {
    port: Arc<dyn BrightnessPort>,
    value: Option<u8>,
}

impl std::fmt::Debug for BrightnessSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrightnessSlider")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl BrightnessSlider {
    pub fn new(port: Arc<dyn BrightnessPort>) -> Self {
        Self { port, value: None }
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn changed(&mut self, percent: u8) {
        self.value = Some(percent.min(MAX_BRIGHTNESS));
    }

    pub fn mirror(&mut self, percent: u8) {
        self.value = Some(percent.min(MAX_BRIGHTNESS));
    }

    /// Write the current position, if any.
    pub fn released(&self, runtime: &Handle) -> Option<JoinHandle<Result<(), BrightnessError>>> {
        let percent = self.value?;
        let write = self.port.set_brightness(percent);

        Some(runtime.spawn(async move {
            let result = write.await;

            match &result {
                Ok(()) => info!(target: "terraflow::brightness", "Brightness set to {percent}%"),
                Err(err) => warn!(target: "terraflow::brightness", "Failed to set brightness: {err}"),
            }

            result
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBrightnessPort;

    #[tokio::test]
    async fn release_writes_last_position_once() {
        let port = Arc::new(MockBrightnessPort::default());
        let mut slider = BrightnessSlider::new(port.clone());

        slider.changed(30);
        slider.changed(35);
        assert!(port.writes().is_empty());

        let handle = slider.released(&Handle::current()).expect("value set");
        handle.await.expect("join").expect("write");

        assert_eq!(port.writes(), [35]);
    }

    #[tokio::test]
    async fn release_without_value_does_nothing() {
        let port = Arc::new(MockBrightnessPort::default());
        let slider = BrightnessSlider::new(port.clone());

        assert!(slider.released(&Handle::current()).is_none());
        assert!(port.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_write_is_reported() {
        let port = Arc::new(MockBrightnessPort::failing());
        let mut slider = BrightnessSlider::new(port);
        slider.mirror(80);

        let result = slider
            .released(&Handle::current())
            .expect("value set")
            .await
            .expect("join");

        assert!(matches!(result, Err(BrightnessError::Failed { .. })));
    }

    #[test]
    fn values_are_clamped() {
        let mut slider = BrightnessSlider::new(Arc::new(MockBrightnessPort::default()));

        slider.changed(180);

        assert_eq!(slider.value(), Some(MAX_BRIGHTNESS));
    }
}
