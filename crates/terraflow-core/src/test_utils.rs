//! In-memory port implementations for tests.

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, ThreadId},
};

use terraflow_proto::ports::{
    audio::{AudioEndpoint, AudioError, AudioEventStream, AudioPort, AudioVolumeEvent},
    brightness::{BrightnessError, BrightnessFuture, BrightnessPort},
    hyprland::{
        HyprlandError, HyprlandEventStream, HyprlandPort, HyprlandWindowEvent, HyprlandWindowInfo,
        HyprlandWorkspaceEvent, HyprlandWorkspaceInfo, HyprlandWorkspaceSelector,
        HyprlandWorkspaceSnapshot,
    },
    media::{MediaError, MediaFuture, MediaPlayer, MediaPort, TransportAction},
    power_profile::{PowerProfile, PowerProfileError, PowerProfileFuture, PowerProfilePort},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::{StreamExt, wrappers::UnboundedReceiverStream};

use crate::services::{ServicePorts, battery::SysfsBattery};

/// Event source handed out once; later subscribers get a pending stream.
#[derive(Debug)]
struct EventFeed<T> {
    sender: UnboundedSender<T>,
    receiver: Mutex<Option<UnboundedReceiver<T>>>,
}

impl<T> Default for EventFeed<T> {
    fn default() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }
}

impl<T: Send + 'static> EventFeed<T> {
    fn emit(&self, event: T) {
        let _ = self.sender.send(event);
    }

    fn take(&self) -> Option<UnboundedReceiverStream<T>> {
        self.receiver
            .lock()
            .expect("poisoned event feed lock")
            .take()
            .map(UnboundedReceiverStream::new)
    }
}

impl<E: Send + 'static> EventFeed<Result<E, HyprlandError>> {
    fn stream(&self) -> HyprlandEventStream<E> {
        match self.take() {
            Some(stream) => Box::pin(stream),
            None => Box::pin(tokio_stream::pending::<Result<E, HyprlandError>>()),
        }
    }
}

#[derive(Debug)]
pub struct MockHyprlandPort {
    snapshot: Mutex<HyprlandWorkspaceSnapshot>,
    fail_snapshot: AtomicBool,
    dispatched: Mutex<Vec<(HyprlandWorkspaceSelector, ThreadId)>>,
    events: EventFeed<Result<HyprlandWorkspaceEvent, HyprlandError>>,
    event_calls: AtomicUsize,
    active_window: Mutex<Option<HyprlandWindowInfo>>,
    window_events: EventFeed<Result<HyprlandWindowEvent, HyprlandError>>,
}

impl Default for MockHyprlandPort {
    fn default() -> Self {
        Self::with_snapshot(HyprlandWorkspaceSnapshot {
            workspaces: vec![HyprlandWorkspaceInfo {
                id: 1,
                name: "1".into(),
            }],
            active_workspace_id: Some(1),
        })
    }
}

impl MockHyprlandPort {
    pub fn with_snapshot(snapshot: HyprlandWorkspaceSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            fail_snapshot: AtomicBool::new(false),
            dispatched: Mutex::new(Vec::new()),
            events: EventFeed::default(),
            event_calls: AtomicUsize::new(0),
            active_window: Mutex::new(None),
            window_events: EventFeed::default(),
        }
    }

    pub fn with_active_window(title: &str, class: &str) -> Self {
        let port = Self::default();
        port.set_active_window(Some(HyprlandWindowInfo {
            title: title.into(),
            class: class.into(),
        }));
        port
    }

    pub fn set_active_window(&self, window: Option<HyprlandWindowInfo>) {
        *self.active_window.lock().expect("poisoned active window lock") = window;
    }

    pub fn emit_window(&self, event: HyprlandWindowEvent) {
        self.window_events.emit(Ok(event));
    }

    pub fn set_snapshot(&self, snapshot: HyprlandWorkspaceSnapshot) {
        *self.snapshot.lock().expect("poisoned workspace snapshot lock") = snapshot;
    }

    pub fn fail_snapshot(&self) {
        self.fail_snapshot.store(true, Ordering::SeqCst);
    }

    pub fn emit(&self, event: HyprlandWorkspaceEvent) {
        self.events.emit(Ok(event));
    }

    /// Push a listener failure into the workspace event stream.
    pub fn emit_error(&self, message: &str) {
        self.events
            .emit(Err(HyprlandError::message("workspace_events", message)));
    }

    pub fn dispatched(&self) -> Vec<HyprlandWorkspaceSelector> {
        self.dispatched
            .lock()
            .expect("poisoned dispatch lock")
            .iter()
            .map(|(selector, _)| selector.clone())
            .collect()
    }

    /// How many times a workspace event stream was opened.
    pub fn workspace_event_calls(&self) -> usize {
        self.event_calls.load(Ordering::SeqCst)
    }

    /// Threads the dispatches ran on, in call order.
    pub fn dispatch_threads(&self) -> Vec<ThreadId> {
        self.dispatched
            .lock()
            .expect("poisoned dispatch lock")
            .iter()
            .map(|(_, thread)| *thread)
            .collect()
    }
}

impl HyprlandPort for MockHyprlandPort {
    fn workspace_events(
        &self,
    ) -> Result<HyprlandEventStream<HyprlandWorkspaceEvent>, HyprlandError> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.events.stream())
    }

    fn workspace_snapshot(&self) -> Result<HyprlandWorkspaceSnapshot, HyprlandError> {
        if self.fail_snapshot.load(Ordering::SeqCst) {
            return Err(HyprlandError::message("workspace_snapshot", "mock failure"));
        }

        Ok(self
            .snapshot
            .lock()
            .expect("poisoned workspace snapshot lock")
            .clone())
    }

    fn change_workspace(&self, workspace: HyprlandWorkspaceSelector) -> Result<(), HyprlandError> {
        self.dispatched
            .lock()
            .expect("poisoned dispatch lock")
            .push((workspace, thread::current().id()));
        Ok(())
    }

    fn window_events(&self) -> Result<HyprlandEventStream<HyprlandWindowEvent>, HyprlandError> {
        Ok(self.window_events.stream())
    }

    fn active_window(&self) -> Result<Option<HyprlandWindowInfo>, HyprlandError> {
        Ok(self
            .active_window
            .lock()
            .expect("poisoned active window lock")
            .clone())
    }
}

#[derive(Debug, Default)]
pub struct MockAudioPort {
    calls: Mutex<Vec<(AudioEndpoint, f64)>>,
    mutes: Mutex<Vec<(AudioEndpoint, bool)>>,
    failure: Mutex<Option<AudioError>>,
    events: EventFeed<AudioVolumeEvent>,
}

impl MockAudioPort {
    pub fn calls(&self) -> Vec<(AudioEndpoint, f64)> {
        self.calls.lock().expect("poisoned audio calls lock").clone()
    }

    pub fn mutes(&self) -> Vec<(AudioEndpoint, bool)> {
        self.mutes.lock().expect("poisoned audio mutes lock").clone()
    }

    /// Make every following `set_volume` and `set_mute` fail with `error`.
    pub fn fail_with(&self, error: AudioError) {
        *self.failure.lock().expect("poisoned audio failure lock") = Some(error);
    }

    fn outcome(&self) -> Result<(), AudioError> {
        match self
            .failure
            .lock()
            .expect("poisoned audio failure lock")
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn emit(&self, event: AudioVolumeEvent) {
        self.events.emit(event);
    }
}

impl AudioPort for MockAudioPort {
    fn set_volume(&self, endpoint: AudioEndpoint, volume: f64) -> Result<(), AudioError> {
        self.calls
            .lock()
            .expect("poisoned audio calls lock")
            .push((endpoint, volume));

        self.outcome()
    }

    fn set_mute(&self, endpoint: AudioEndpoint, muted: bool) -> Result<(), AudioError> {
        self.mutes
            .lock()
            .expect("poisoned audio mutes lock")
            .push((endpoint, muted));

        self.outcome()
    }

    fn volume_events(&self) -> Result<AudioEventStream, AudioError> {
        match self.events.take() {
            Some(stream) => Ok(Box::pin(stream.map(Ok::<_, AudioError>))),
            None => Ok(Box::pin(tokio_stream::pending::<
                Result<AudioVolumeEvent, AudioError>,
            >())),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockMediaPort {
    player: Option<String>,
    failing: bool,
    lookups: Mutex<Vec<String>>,
    actions: Arc<Mutex<Vec<TransportAction>>>,
}

impl MockMediaPort {
    pub fn without_player() -> Self {
        Self::default()
    }

    pub fn with_player(identity: &str) -> Self {
        Self {
            player: Some(identity.to_owned()),
            ..Self::default()
        }
    }

    /// Every lookup fails with [`MediaError::BusUnavailable`].
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("poisoned lookups lock").clone()
    }

    pub fn actions(&self) -> Vec<TransportAction> {
        self.actions.lock().expect("poisoned actions lock").clone()
    }
}

impl MediaPort for MockMediaPort {
    fn find_player<'a>(&'a self, name: &'a str) -> MediaFuture<'a, Option<Box<dyn MediaPlayer>>> {
        Box::pin(async move {
            self.lookups
                .lock()
                .expect("poisoned lookups lock")
                .push(name.to_owned());

            if self.failing {
                return Err(MediaError::BusUnavailable {
                    message: "mock bus".into(),
                });
            }

            Ok(self.player.clone().map(|identity| {
                Box::new(MockPlayer {
                    identity,
                    actions: Arc::clone(&self.actions),
                }) as Box<dyn MediaPlayer>
            }))
        })
    }
}

struct MockPlayer {
    identity: String,
    actions: Arc<Mutex<Vec<TransportAction>>>,
}

impl MockPlayer {
    fn record(&self, action: TransportAction) -> MediaFuture<'_, ()> {
        self.actions
            .lock()
            .expect("poisoned actions lock")
            .push(action);
        Box::pin(async { Ok::<(), MediaError>(()) })
    }
}

impl MediaPlayer for MockPlayer {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn previous(&self) -> MediaFuture<'_, ()> {
        self.record(TransportAction::Previous)
    }

    fn play_pause(&self) -> MediaFuture<'_, ()> {
        self.record(TransportAction::PlayPause)
    }

    fn next(&self) -> MediaFuture<'_, ()> {
        self.record(TransportAction::Next)
    }
}

#[derive(Debug, Default)]
pub struct MockPowerProfilePort {
    profiles: Mutex<Vec<PowerProfile>>,
    failing: bool,
}

impl MockPowerProfilePort {
    /// Every switch fails as if `powerprofilesctl` exited with status 1.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn profiles(&self) -> Vec<PowerProfile> {
        self.profiles.lock().expect("poisoned profiles lock").clone()
    }
}

impl PowerProfilePort for MockPowerProfilePort {
    fn set_profile(&self, profile: PowerProfile) -> PowerProfileFuture {
        self.profiles
            .lock()
            .expect("poisoned profiles lock")
            .push(profile);

        let result = if self.failing {
            Err(PowerProfileError::Failed {
                command: Arc::from(format!("powerprofilesctl set {profile}")),
                status: "exit status: 1".into(),
            })
        } else {
            Ok(())
        };

        Box::pin(async move { result })
    }
}

#[derive(Debug)]
pub struct MockBrightnessPort {
    level: Arc<Mutex<u8>>,
    writes: Arc<Mutex<Vec<u8>>>,
    failing: bool,
}

impl Default for MockBrightnessPort {
    fn default() -> Self {
        Self::with_level(50)
    }
}

impl MockBrightnessPort {
    pub fn with_level(level: u8) -> Self {
        Self {
            level: Arc::new(Mutex::new(level)),
            writes: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// Every read and write fails as if `brightnessctl` exited with status 1.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<u8> {
        self.writes.lock().expect("poisoned brightness lock").clone()
    }

    fn failure(&self) -> BrightnessError {
        BrightnessError::Failed {
            command: Arc::from("brightnessctl"),
            status: "exit status: 1".into(),
        }
    }
}

impl BrightnessPort for MockBrightnessPort {
    fn brightness(&self) -> BrightnessFuture<u8> {
        let result = if self.failing {
            Err(self.failure())
        } else {
            Ok(*self.level.lock().expect("poisoned brightness lock"))
        };

        Box::pin(async move { result })
    }

    fn set_brightness(&self, percent: u8) -> BrightnessFuture<()> {
        self.writes
            .lock()
            .expect("poisoned brightness lock")
            .push(percent);

        let result = if self.failing {
            Err(self.failure())
        } else {
            *self.level.lock().expect("poisoned brightness lock") = percent;
            Ok(())
        };

        Box::pin(async move { result })
    }
}

/// Service bundle backed entirely by default mocks and a battery reader
/// that never finds a supply.
pub fn mock_ports() -> ServicePorts {
    ServicePorts {
        hyprland: Arc::new(MockHyprlandPort::default()),
        audio: Arc::new(MockAudioPort::default()),
        media: Arc::new(MockMediaPort::default()),
        power_profile: Arc::new(MockPowerProfilePort::default()),
        brightness: Arc::new(MockBrightnessPort::default()),
        battery: SysfsBattery::with_supplies(Vec::<PathBuf>::new()),
    }
}
