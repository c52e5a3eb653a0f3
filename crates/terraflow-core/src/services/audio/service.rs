use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, warn};
use terraflow_proto::ports::audio::{
    AudioEndpoint, AudioError, AudioEventStream, AudioPort, AudioVolumeEvent,
};
use tokio::{
    runtime::Handle,
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{Duration, sleep},
};
use tokio_stream::StreamExt;

use super::{
    backend::{AudioBackend, BackendCommand, BackendEvent, BackendHandle, PulseAudioBackend},
    model::{AudioData, Volume},
};
use crate::reactive::Observable;

/// Delay applied before attempting to reconnect to the backend after an error.
const RECONNECT_BACKOFF: Duration = Duration::from_millis(500);

const SET_VOLUME_OP: &str = "set_volume";
const SET_MUTE_OP: &str = "set_mute";

#[derive(Debug, Default)]
struct Shared {
    data: AudioData,
    commander: Option<UnboundedSender<BackendCommand>>,
}

#[derive(Debug, Clone)]
struct Volumes {
    speaker: Observable<Option<AudioVolumeEvent>>,
    microphone: Observable<Option<AudioVolumeEvent>>,
}

impl Volumes {
    fn publish(&self, data: &AudioData) {
        self.speaker.set(data.endpoint_state(AudioEndpoint::Speaker));
        self.microphone
            .set(data.endpoint_state(AudioEndpoint::Microphone));
    }
}

/// [`AudioPort`] implementation mirroring the default PulseAudio devices.
///
/// A background task keeps the connection alive and reconnects after
/// [`RECONNECT_BACKOFF`] whenever the backend reports an error or closes its
/// event stream. The task is aborted when the client is dropped.
#[derive(Debug)]
pub struct PulseAudioClient {
    shared: Arc<Mutex<Shared>>,
    volumes: Volumes,
    listener: JoinHandle<()>,
}

impl PulseAudioClient {
    /// Connect to PulseAudio on `handle`.
    pub fn spawn(handle: &Handle) -> Self {
        Self::spawn_with_backend(handle, PulseAudioBackend)
    }

    pub fn spawn_with_backend<B: AudioBackend>(handle: &Handle, backend: B) -> Self {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let volumes = Volumes {
            speaker: Observable::new(None),
            microphone: Observable::new(None),
        };

        let listener = handle.spawn(listen_with_backend(
            backend,
            Arc::clone(&shared),
            volumes.clone(),
        ));

        Self {
            shared,
            volumes,
            listener,
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        lock(&self.shared)
    }

    fn send(&self, operation: &'static str, command: BackendCommand) -> Result<(), AudioError> {
        self.shared()
            .commander
            .as_ref()
            .ok_or(AudioError::Unavailable { operation })?
            .send(command)
            .map_err(|err| AudioError::backend(operation, err.to_string()))
    }
}

impl Drop for PulseAudioClient {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AudioPort for PulseAudioClient {
    fn set_volume(&self, endpoint: AudioEndpoint, volume: f64) -> Result<(), AudioError> {
        let command = {
            let shared = self.shared();
            if shared.commander.is_none() {
                return Err(AudioError::Unavailable {
                    operation: SET_VOLUME_OP,
                });
            }

            let device = shared
                .data
                .default_device(endpoint)
                .ok_or(AudioError::DeviceMissing { endpoint })?;

            let mut channels = device.volume;
            let scaled = *channels
                .scale_volume(volume)
                .ok_or_else(|| AudioError::backend(SET_VOLUME_OP, "invalid channel map"))?;

            match endpoint {
                AudioEndpoint::Speaker => BackendCommand::SinkVolume(device.name.clone(), scaled),
                AudioEndpoint::Microphone => {
                    BackendCommand::SourceVolume(device.name.clone(), scaled)
                }
            }
        };

        debug!(target: "terraflow::audio", "Setting {endpoint} volume to {volume:.2}");
        self.send(SET_VOLUME_OP, command)
    }

    fn set_mute(&self, endpoint: AudioEndpoint, muted: bool) -> Result<(), AudioError> {
        let command = {
            let shared = self.shared();
            if shared.commander.is_none() {
                return Err(AudioError::Unavailable {
                    operation: SET_MUTE_OP,
                });
            }

            let name = shared
                .data
                .default_device(endpoint)
                .ok_or(AudioError::DeviceMissing { endpoint })?
                .name
                .clone();

            match endpoint {
                AudioEndpoint::Speaker => BackendCommand::SinkMute(name, muted),
                AudioEndpoint::Microphone => BackendCommand::SourceMute(name, muted),
            }
        };

        debug!(target: "terraflow::audio", "Setting {endpoint} mute to {muted}");
        self.send(SET_MUTE_OP, command)
    }

    fn volume_events(&self) -> Result<AudioEventStream, AudioError> {
        let speaker = self
            .volumes
            .speaker
            .stream()
            .filter_map(|state| state.map(Ok::<_, AudioError>));
        let microphone = self
            .volumes
            .microphone
            .stream()
            .filter_map(|state| state.map(Ok::<_, AudioError>));

        Ok(Box::pin(speaker.merge(microphone)))
    }
}

enum State {
    Init,
    Active(BackendHandle),
    Error,
}

async fn listen_with_backend<B: AudioBackend>(
    backend: B,
    shared: Arc<Mutex<Shared>>,
    volumes: Volumes,
) {
    let mut state = State::Init;

    loop {
        state = start_listening(&backend, state, &shared, &volumes).await;
    }
}

async fn start_listening<B: AudioBackend>(
    backend: &B,
    state: State,
    shared: &Mutex<Shared>,
    volumes: &Volumes,
) -> State {
    match state {
        State::Init => match backend.spawn().await {
            Ok(handle) => {
                let mut shared = lock(shared);
                shared.data = AudioData::default();
                shared.commander = Some(handle.commander());

                State::Active(handle)
            }
            Err(err) => {
                error!(target: "terraflow::audio", "Failed to initialise audio backend: {err}");
                State::Error
            }
        },
        State::Active(mut handle) => match handle.recv().await {
            Some(BackendEvent::Update(event)) => {
                let mut shared = lock(shared);
                shared.data.apply(event);
                volumes.publish(&shared.data);

                State::Active(handle)
            }
            Some(BackendEvent::Error(err)) => {
                error!(target: "terraflow::audio", "Audio backend error: {err}");
                disconnect(shared, volumes);
                State::Error
            }
            None => {
                warn!(target: "terraflow::audio", "Audio backend closed event stream");
                disconnect(shared, volumes);
                State::Error
            }
        },
        State::Error => {
            sleep(RECONNECT_BACKOFF).await;
            State::Init
        }
    }
}

fn disconnect(shared: &Mutex<Shared>, volumes: &Volumes) {
    let mut shared = lock(shared);
    shared.commander = None;
    shared.data = AudioData::default();
    volumes.publish(&shared.data);
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use tokio::sync::mpsc;

    use super::*;
    use crate::services::audio::{
        backend::BackendFuture,
        model::{AudioEvent, Device, ServerInfo, stereo},
    };

    #[derive(Clone, Default)]
    struct TestBackend {
        sequences: Arc<Mutex<VecDeque<Vec<BackendEvent>>>>,
        starts: Arc<Mutex<usize>>,
        commands: Arc<Mutex<Vec<BackendCommand>>>,
    }

    impl TestBackend {
        fn new(sequences: Vec<Vec<BackendEvent>>) -> Self {
            Self {
                sequences: Arc::new(Mutex::new(sequences.into_iter().collect())),
                ..Self::default()
            }
        }

        fn start_count(&self) -> usize {
            *self.starts.lock().expect("starts")
        }

        fn commands(&self) -> Vec<BackendCommand> {
            self.commands.lock().expect("commands").clone()
        }
    }

    impl AudioBackend for TestBackend {
        fn spawn(&self) -> BackendFuture {
            let sequences = Arc::clone(&self.sequences);
            let starts = Arc::clone(&self.starts);
            let commands = Arc::clone(&self.commands);

            Box::pin(async move {
                let events = sequences
                    .lock()
                    .expect("sequences")
                    .pop_front()
                    .unwrap_or_else(|| vec![BackendEvent::Error("exhausted".into())]);

                *starts.lock().expect("starts") += 1;

                let (event_tx, event_rx) = mpsc::unbounded_channel();
                let (command_tx, mut command_rx) = mpsc::unbounded_channel();

                tokio::spawn(async move {
                    for event in events {
                        let _ = event_tx.send(event);
                    }
                    while let Some(command) = command_rx.recv().await {
                        commands.lock().expect("commands").push(command);
                    }
                    drop(event_tx);
                });

                Ok::<_, anyhow::Error>(BackendHandle::from_parts(event_rx, command_tx))
            })
        }
    }

    fn connected_sequence() -> Vec<BackendEvent> {
        vec![
            BackendEvent::Update(AudioEvent::ServerInfo(ServerInfo {
                default_sink: "speakers".into(),
                default_source: "mic".into(),
            })),
            BackendEvent::Update(AudioEvent::Sinks(vec![Device {
                name: "speakers".into(),
                volume: stereo(0.8),
                is_mute: true,
            }])),
            BackendEvent::Update(AudioEvent::Sources(vec![Device {
                name: "mic".into(),
                volume: stereo(0.4),
                is_mute: false,
            }])),
        ]
    }

    async fn wait_for_speaker(client: &PulseAudioClient) {
        let mut receiver = client.volumes.speaker.subscribe();
        tokio::time::timeout(Duration::from_secs(5), receiver.wait_for(Option::is_some))
            .await
            .expect("speaker volume")
            .expect("observable alive");
    }

    #[tokio::test]
    async fn set_volume_is_unavailable_before_connection() {
        let client =
            PulseAudioClient::spawn_with_backend(&Handle::current(), TestBackend::default());

        let result = client.set_volume(AudioEndpoint::Speaker, 0.5);
        assert_eq!(
            result,
            Err(AudioError::Unavailable {
                operation: SET_VOLUME_OP
            })
        );
    }

    #[tokio::test]
    async fn set_volume_sends_scaled_sink_command() {
        let backend = TestBackend::new(vec![connected_sequence()]);
        let client = PulseAudioClient::spawn_with_backend(&Handle::current(), backend.clone());
        wait_for_speaker(&client).await;

        client
            .set_volume(AudioEndpoint::Speaker, 0.5)
            .expect("volume sent");

        match wait_for_commands(&backend).await.as_slice() {
            [BackendCommand::SinkVolume(name, volume)] => {
                assert_eq!(name, "speakers");
                assert!((volume.get_volume() - 0.5).abs() < 1e-3);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    async fn wait_for_commands(backend: &TestBackend) -> Vec<BackendCommand> {
        let mut commands = Vec::new();
        for _ in 0..50 {
            commands = backend.commands();
            if !commands.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        commands
    }

    #[tokio::test]
    async fn set_mute_targets_default_source() {
        let backend = TestBackend::new(vec![connected_sequence()]);
        let client = PulseAudioClient::spawn_with_backend(&Handle::current(), backend.clone());
        wait_for_speaker(&client).await;

        client
            .set_mute(AudioEndpoint::Microphone, true)
            .expect("mute sent");

        match wait_for_commands(&backend).await.as_slice() {
            [BackendCommand::SourceMute(name, true)] => assert_eq!(name, "mic"),
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_mute_is_unavailable_before_connection() {
        let client =
            PulseAudioClient::spawn_with_backend(&Handle::current(), TestBackend::default());

        assert_eq!(
            client.set_mute(AudioEndpoint::Speaker, true),
            Err(AudioError::Unavailable {
                operation: SET_MUTE_OP
            })
        );
    }

    #[tokio::test]
    async fn set_volume_without_default_device_fails() {
        let backend = TestBackend::new(vec![vec![BackendEvent::Update(AudioEvent::ServerInfo(
            ServerInfo {
                default_sink: "missing".into(),
                default_source: "missing".into(),
            },
        ))]]);
        let client = PulseAudioClient::spawn_with_backend(&Handle::current(), backend);

        for _ in 0..50 {
            if client.shared().commander.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let result = client.set_volume(AudioEndpoint::Microphone, 0.3);
        assert_eq!(
            result,
            Err(AudioError::DeviceMissing {
                endpoint: AudioEndpoint::Microphone
            })
        );
    }

    #[tokio::test]
    async fn volume_events_mirror_default_devices() {
        let backend = TestBackend::new(vec![connected_sequence()]);
        let client = PulseAudioClient::spawn_with_backend(&Handle::current(), backend);
        wait_for_speaker(&client).await;

        let mut events = client.volume_events().expect("stream");
        let mut seen = Vec::new();
        while seen.len() < 2 {
            let event = tokio::time::timeout(Duration::from_secs(1), events.next())
                .await
                .expect("event")
                .expect("stream open")
                .expect("volume");
            seen.push(event);
        }

        seen.sort_by_key(|event| event.endpoint == AudioEndpoint::Microphone);
        assert_eq!(seen[0].endpoint, AudioEndpoint::Speaker);
        assert!((seen[0].volume - 0.8).abs() < 1e-3);
        assert!(seen[0].muted);
        assert_eq!(seen[1].endpoint, AudioEndpoint::Microphone);
        assert!((seen[1].volume - 0.4).abs() < 1e-3);
        assert!(!seen[1].muted);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_after_backend_error() {
        let backend = TestBackend::new(vec![
            vec![BackendEvent::Error("failure".into())],
            connected_sequence(),
        ]);
        let client = PulseAudioClient::spawn_with_backend(&Handle::current(), backend.clone());

        wait_for_speaker(&client).await;

        assert_eq!(backend.start_count(), 2);
        assert!(client.set_volume(AudioEndpoint::Microphone, 0.2).is_ok());
    }
}
