mod brightness;
mod media;
mod network;
mod performance;
mod volume;

use std::{sync::Arc, time::Duration};

pub use brightness::BrightnessSlider;
pub use media::{DEFAULT_PLAYER, MediaControls, TRANSPORT_ACTIONS, transport};
pub use network::NetworkPicker;
pub use performance::{CommandHandle, PerformanceToggle};
pub use volume::{VOLUME_STEP, VolumeSlider};

use log::{error, warn};
use terraflow_proto::ports::{
    audio::{AudioEndpoint, AudioPort, AudioVolumeEvent},
    brightness::BrightnessPort,
    media::TransportAction,
};
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};
use tokio_stream::StreamExt;

use crate::{
    ModuleContext, ModuleEventSender, config::DashboardConfig, event_bus::ModuleEvent,
    modules::ModuleError, services::ServicePorts,
};

const VOLUME_EVENT_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub enum Message {
    /// The user moved a slider.
    VolumeChanged(AudioEndpoint, f64),
    VolumeReleased(AudioEndpoint),
    /// The backend reported new default-device state.
    VolumeMirrored(AudioVolumeEvent),
    MuteToggled(AudioEndpoint),
    BrightnessChanged(u8),
    BrightnessReleased,
    BrightnessMirrored(u8),
    PerformanceToggled(bool),
    Transport(TransportAction),
}

/// Controls shown in the dashboard window.
#[derive(Debug)]
pub struct Dashboard {
    audio: Arc<dyn AudioPort>,
    brightness_port: Arc<dyn BrightnessPort>,
    speaker: VolumeSlider,
    microphone: VolumeSlider,
    brightness: BrightnessSlider,
    network: NetworkPicker,
    performance: PerformanceToggle,
    media: MediaControls,
    runtime: Option<Handle>,
    tasks: Vec<JoinHandle<()>>,
}

impl Dashboard {
    pub fn new(ports: &ServicePorts, config: &DashboardConfig) -> Self {
        Self {
            audio: Arc::clone(&ports.audio),
            brightness_port: Arc::clone(&ports.brightness),
            speaker: VolumeSlider::new(AudioEndpoint::Speaker, Arc::clone(&ports.audio)),
            microphone: VolumeSlider::new(AudioEndpoint::Microphone, Arc::clone(&ports.audio)),
            brightness: BrightnessSlider::new(Arc::clone(&ports.brightness)),
            network: NetworkPicker::new(config.network_label.clone()),
            performance: PerformanceToggle::new(Arc::clone(&ports.power_profile)),
            media: MediaControls::new(Arc::clone(&ports.media)),
            runtime: None,
            tasks: Vec::new(),
        }
    }

    pub fn slider(&self, endpoint: AudioEndpoint) -> &VolumeSlider {
        match endpoint {
            AudioEndpoint::Speaker => &self.speaker,
            AudioEndpoint::Microphone => &self.microphone,
        }
    }

    fn slider_mut(&mut self, endpoint: AudioEndpoint) -> &mut VolumeSlider {
        match endpoint {
            AudioEndpoint::Speaker => &mut self.speaker,
            AudioEndpoint::Microphone => &mut self.microphone,
        }
    }

    pub fn brightness(&self) -> &BrightnessSlider {
        &self.brightness
    }

    pub fn network(&self) -> &NetworkPicker {
        &self.network
    }

    pub fn performance(&self) -> &PerformanceToggle {
        &self.performance
    }

    /// Keep the runtime for spawned commands, mirror backend volumes into
    /// the sliders and read the initial backlight level.
    pub fn register(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        let handle = ctx.runtime_handle();
        self.runtime = Some(handle.clone());
        self.tasks.push(handle.spawn(mirror_volumes(
            Arc::clone(&self.audio),
            ctx.module_sender(ModuleEvent::Dashboard),
        )));
        self.tasks.push(handle.spawn(read_brightness(
            Arc::clone(&self.brightness_port),
            ctx.module_sender(ModuleEvent::Dashboard),
        )));

        Ok(())
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::VolumeChanged(endpoint, volume) => {
                if let Err(err) = self.slider_mut(endpoint).changed(volume) {
                    warn!(target: "terraflow::audio", "Failed to set {endpoint} volume: {err}");
                }
            }
            Message::VolumeReleased(endpoint) => {
                self.slider_mut(endpoint).released();
            }
            Message::VolumeMirrored(event) => {
                self.slider_mut(event.endpoint).mirror(event);
            }
            Message::MuteToggled(endpoint) => {
                if let Err(err) = self.slider_mut(endpoint).toggle_mute() {
                    warn!(target: "terraflow::audio", "Failed to toggle {endpoint} mute: {err}");
                }
            }
            Message::BrightnessChanged(percent) => self.brightness.changed(percent),
            Message::BrightnessMirrored(percent) => self.brightness.mirror(percent),
            Message::BrightnessReleased => match &self.runtime {
                Some(runtime) => {
                    drop(self.brightness.released(runtime));
                }
                None => error!("Dashboard is not registered; ignoring brightness change"),
            },
            Message::PerformanceToggled(active) => match &self.runtime {
                Some(runtime) => {
                    // Completion is logged by the spawned task.
                    drop(self.performance.toggled(active, runtime));
                }
                None => error!("Dashboard is not registered; ignoring performance toggle"),
            },
            Message::Transport(action) => match &self.runtime {
                Some(runtime) => {
                    drop(self.media.pressed(action, runtime));
                }
                None => error!("Dashboard is not registered; ignoring {action:?}"),
            },
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn read_brightness(port: Arc<dyn BrightnessPort>, sender: ModuleEventSender<Message>) {
    match port.brightness().await {
        Ok(percent) => {
            if let Err(err) = sender.try_send(Message::BrightnessMirrored(percent)) {
                error!("failed to enqueue brightness: {err}");
            }
        }
        Err(err) => warn!(target: "terraflow::brightness", "Failed to read brightness: {err}"),
    }
}

async fn mirror_volumes(audio: Arc<dyn AudioPort>, sender: ModuleEventSender<Message>) {
    loop {
        match audio.volume_events() {
            Ok(mut stream) => {
                while let Some(event) = stream.next().await {
                    match event {
                        Ok(event) => {
                            if let Err(err) = sender.try_send(Message::VolumeMirrored(event)) {
                                error!("failed to enqueue volume update: {err}");
                            }
                        }
                        Err(err) => {
                            error!("volume event stream error, restarting listener: {err}");
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                error!("failed to start volume event stream, retrying: {err}");
            }
        }

        sleep(VOLUME_EVENT_RETRY_DELAY).await;
    }
}
