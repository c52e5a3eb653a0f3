use std::{fmt, pin::Pin};

use tokio_stream::Stream;

/// Audio endpoint addressed by the dashboard sliders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioEndpoint {
    /// Default output device.
    Speaker,
    /// Default input device.
    Microphone,
}

impl fmt::Display for AudioEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speaker => f.write_str("speaker"),
            Self::Microphone => f.write_str("microphone"),
        }
    }
}

/// Default-device state reported by the audio backend. `volume` is
/// normalised to `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioVolumeEvent {
    pub endpoint: AudioEndpoint,
    pub volume: f64,
    pub muted: bool,
}

pub type AudioEventStream =
    Pin<Box<dyn Stream<Item = Result<AudioVolumeEvent, AudioError>> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// The backend is not connected to the sound server.
    #[error("audio operation `{operation}` unavailable: backend not connected")]
    Unavailable { operation: &'static str },

    /// No default device exists for the endpoint.
    #[error("no default {endpoint} device is available")]
    DeviceMissing { endpoint: AudioEndpoint },

    #[error("audio operation `{operation}` failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl AudioError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Volume and mute control for the default speaker and microphone.
///
/// `set_volume` forwards the value untouched; range enforcement belongs to
/// the backend.
pub trait AudioPort: Send + Sync {
    /// Write `volume` to the default device of `endpoint`.
    fn set_volume(&self, endpoint: AudioEndpoint, volume: f64) -> Result<(), AudioError>;

    /// Mute or unmute the default device of `endpoint`.
    fn set_mute(&self, endpoint: AudioEndpoint, muted: bool) -> Result<(), AudioError>;

    /// Subscribe to volume changes of both endpoints.
    fn volume_events(&self) -> Result<AudioEventStream, AudioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_missing_names_endpoint() {
        let error = AudioError::DeviceMissing {
            endpoint: AudioEndpoint::Microphone,
        };

        assert_eq!(error.to_string(), "no default microphone device is available");
    }
}
