use libpulse_binding::volume::ChannelVolumes;
use terraflow_proto::ports::audio::{AudioEndpoint, AudioVolumeEvent};

/// A sink or source reported by PulseAudio.
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    pub volume: ChannelVolumes,
    pub is_mute: bool,
}

/// Names of the default sink and source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub default_sink: String,
    pub default_source: String,
}

/// Common volume operations on PulseAudio channel volumes.
pub trait Volume {
    /// Average volume normalised so that `1.0` is 100 %.
    fn get_volume(&self) -> f64;

    /// Scale every channel so the loudest one sits at `max`, clamped to
    /// `[0.0, 1.0]`. Returns `None` for an invalid channel map.
    fn scale_volume(&mut self, max: f64) -> Option<&mut ChannelVolumes>;
}

impl Volume for ChannelVolumes {
    fn get_volume(&self) -> f64 {
        f64::from(self.avg().0) / f64::from(libpulse_binding::volume::Volume::NORMAL.0)
    }

    fn scale_volume(&mut self, max: f64) -> Option<&mut ChannelVolumes> {
        let max = max.clamp(0.0, 1.0);
        self.scale(libpulse_binding::volume::Volume(
            (f64::from(libpulse_binding::volume::Volume::NORMAL.0) * max) as u32,
        ))
    }
}

/// State mirrored from the sound server.
#[derive(Debug, Default, Clone)]
pub struct AudioData {
    pub server_info: ServerInfo,
    pub sinks: Vec<Device>,
    pub sources: Vec<Device>,
}

impl AudioData {
    pub fn apply(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::Sinks(sinks) => self.sinks = sinks,
            AudioEvent::Sources(sources) => self.sources = sources,
            AudioEvent::ServerInfo(info) => self.server_info = info,
        }
    }

    /// Default device backing `endpoint`, if the server reported one.
    pub fn default_device(&self, endpoint: AudioEndpoint) -> Option<&Device> {
        let (devices, default) = match endpoint {
            AudioEndpoint::Speaker => (&self.sinks, &self.server_info.default_sink),
            AudioEndpoint::Microphone => (&self.sources, &self.server_info.default_source),
        };

        devices.iter().find(|device| &device.name == default)
    }

    /// Volume and mute flag of the default device of `endpoint`.
    pub fn endpoint_state(&self, endpoint: AudioEndpoint) -> Option<AudioVolumeEvent> {
        self.default_device(endpoint).map(|device| AudioVolumeEvent {
            endpoint,
            volume: device.volume.get_volume(),
            muted: device.is_mute,
        })
    }
}

/// Updates produced by the backend.
#[derive(Debug, Clone)]
pub enum AudioEvent {
    Sinks(Vec<Device>),
    Sources(Vec<Device>),
    ServerInfo(ServerInfo),
}

#[cfg(test)]
pub(crate) fn stereo(level: f64) -> ChannelVolumes {
    let mut volumes = ChannelVolumes::default();
    volumes.set(2, libpulse_binding::volume::Volume::NORMAL);
    volumes.scale_volume(level);
    volumes
}
