//! Concrete adapters for the service ports and the bundle handed to modules.

use std::sync::Arc;

use terraflow_proto::ports::{
    audio::AudioPort, brightness::BrightnessPort, hyprland::HyprlandPort, media::MediaPort,
    power_profile::PowerProfilePort,
};

use self::battery::SysfsBattery;

pub mod audio;
pub mod battery;
pub mod brightness;
pub mod mpris;
pub mod power_profile;

/// Service clients injected into every module.
///
/// The application entry point builds the bundle once and owns the lifecycle
/// of each client; modules only keep cheap clones of the handles.
#[derive(Clone)]
pub struct ServicePorts {
    pub hyprland: Arc<dyn HyprlandPort>,
    pub audio: Arc<dyn AudioPort>,
    pub media: Arc<dyn MediaPort>,
    pub power_profile: Arc<dyn PowerProfilePort>,
    pub brightness: Arc<dyn BrightnessPort>,
    pub battery: SysfsBattery,
}

impl std::fmt::Debug for ServicePorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePorts").finish_non_exhaustive()
    }
}
