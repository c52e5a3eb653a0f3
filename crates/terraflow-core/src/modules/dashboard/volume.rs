use std::sync::Arc;

use terraflow_proto::ports::audio::{AudioEndpoint, AudioError, AudioPort, AudioVolumeEvent};

/// Granularity of the volume sliders.
pub const VOLUME_STEP: f64 = 0.01;

/// Slider bound to the default device of one audio endpoint.
///
/// Backend reports are echoes of the user's own writes most of the time, so
/// while the slider is dragged they are ignored, and afterwards a report
/// within [`VOLUME_STEP`] of the last user value leaves the slider alone.
pub struct VolumeSlider {
    endpoint: AudioEndpoint,
    audio: Arc<dyn AudioPort>,
    value: Option<f64>,
    muted: bool,
    last_user: Option<f64>,
    dragging: bool,
}

impl std::fmt::Debug for VolumeSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeSlider")
            .field("endpoint", &self.endpoint)
            .field("value", &self.value)
            .field("muted", &self.muted)
            .field("dragging", &self.dragging)
            .finish_non_exhaustive()
    }
}

impl VolumeSlider {
    pub fn new(endpoint: AudioEndpoint, audio: Arc<dyn AudioPort>) -> Self {
        Self {
            endpoint,
            audio,
            value: None,
            muted: false,
            last_user: None,
            dragging: false,
        }
    }

    pub fn endpoint(&self) -> AudioEndpoint {
        self.endpoint
    }

    /// Last known position, `None` until the backend reports a volume or the
    /// user moves the slider.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Forward a user change to the audio port.
    ///
    /// Issues exactly one [`AudioPort::set_volume`] call carrying `volume`
    /// as received; the port is responsible for clamping.
    pub fn changed(&mut self, volume: f64) -> Result<(), AudioError> {
        self.value = Some(volume);
        self.last_user = Some(volume);
        self.dragging = true;
        self.audio.set_volume(self.endpoint, volume)
    }

    /// The user let go of the slider.
    pub fn released(&mut self) {
        self.dragging = false;
    }

    /// Adopt the state reported by the backend.
    ///
    /// The mute flag is always taken over. The volume is skipped while
    /// dragging or when it is within one step of the last user value.
    pub fn mirror(&mut self, event: AudioVolumeEvent) {
        self.muted = event.muted;

        if self.dragging {
            return;
        }

        if let Some(user) = self.last_user
            && (event.volume - user).abs() <= VOLUME_STEP
        {
            return;
        }

        self.last_user = None;
        self.value = Some(event.volume);
    }

    /// Flip the mute state of the endpoint.
    pub fn toggle_mute(&mut self) -> Result<(), AudioError> {
        let muted = !self.muted;
        self.audio.set_mute(self.endpoint, muted)?;
        self.muted = muted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockAudioPort;

    fn report(volume: f64, muted: bool) -> AudioVolumeEvent {
        AudioVolumeEvent {
            endpoint: AudioEndpoint::Speaker,
            volume,
            muted,
        }
    }

    fn speaker() -> (Arc<MockAudioPort>, VolumeSlider) {
        let audio = Arc::new(MockAudioPort::default());
        let slider = VolumeSlider::new(AudioEndpoint::Speaker, audio.clone());
        (audio, slider)
    }

    #[test]
    fn changed_forwards_value_untouched() {
        let (audio, mut slider) = speaker();

        slider.changed(1.25).expect("set volume");

        assert_eq!(audio.calls(), [(AudioEndpoint::Speaker, 1.25)]);
        assert_eq!(slider.value(), Some(1.25));
    }

    #[test]
    fn each_change_is_one_call() {
        let audio = Arc::new(MockAudioPort::default());
        let mut slider = VolumeSlider::new(AudioEndpoint::Microphone, audio.clone());

        slider.changed(0.1).expect("first");
        slider.changed(0.1).expect("second");

        assert_eq!(audio.calls().len(), 2);
    }

    #[test]
    fn port_errors_are_returned() {
        let audio = Arc::new(MockAudioPort::default());
        audio.fail_with(AudioError::DeviceMissing {
            endpoint: AudioEndpoint::Microphone,
        });
        let mut slider = VolumeSlider::new(AudioEndpoint::Microphone, audio);

        assert!(matches!(
            slider.changed(0.4),
            Err(AudioError::DeviceMissing { .. })
        ));
    }

    #[test]
    fn mirror_updates_position_without_calling_port() {
        let (audio, mut slider) = speaker();

        slider.mirror(report(0.6, true));

        assert_eq!(slider.value(), Some(0.6));
        assert!(slider.is_muted());
        assert!(audio.calls().is_empty());
    }

    #[test]
    fn mirror_is_ignored_while_dragging() {
        let (_, mut slider) = speaker();

        slider.changed(0.5).expect("first");
        slider.changed(0.55).expect("second");
        slider.mirror(report(0.5, false));

        assert_eq!(slider.value(), Some(0.55));
    }

    #[test]
    fn echo_of_user_value_is_ignored_after_release() {
        let (_, mut slider) = speaker();

        slider.changed(0.5).expect("set");
        slider.released();
        slider.mirror(report(0.505, false));

        assert_eq!(slider.value(), Some(0.5));
    }

    #[test]
    fn distant_report_wins_after_release() {
        let (_, mut slider) = speaker();

        slider.changed(0.5).expect("set");
        slider.released();
        slider.mirror(report(0.8, false));
        assert_eq!(slider.value(), Some(0.8));

        // the user value is forgotten once a backend value is adopted
        slider.mirror(report(0.505, false));
        assert_eq!(slider.value(), Some(0.505));
    }

    #[test]
    fn mute_flag_is_mirrored_while_dragging() {
        let (_, mut slider) = speaker();

        slider.changed(0.3).expect("set");
        slider.mirror(report(0.9, true));

        assert_eq!(slider.value(), Some(0.3));
        assert!(slider.is_muted());
    }

    #[test]
    fn toggle_mute_flips_backend_state() {
        let (audio, mut slider) = speaker();

        slider.toggle_mute().expect("mute");
        slider.toggle_mute().expect("unmute");

        assert_eq!(
            audio.mutes(),
            [(AudioEndpoint::Speaker, true), (AudioEndpoint::Speaker, false)]
        );
        assert!(!slider.is_muted());
    }

    #[test]
    fn failed_toggle_keeps_mute_state() {
        let (audio, mut slider) = speaker();
        audio.fail_with(AudioError::Unavailable { operation: "set_mute" });

        assert!(slider.toggle_mute().is_err());
        assert!(!slider.is_muted());
    }
}
