use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    thread::{self, JoinHandle},
};

use anyhow::Context as _;
use futures::executor::block_on;
use libpulse_binding::{
    callbacks::ListResult,
    context::{
        self, Context, FlagSet,
        introspect::{Introspector, SinkInfo, SourceInfo},
        subscribe::InterestMaskSet,
    },
    def::PortAvailable,
    mainloop::standard::{IterateResult, Mainloop},
    operation::{self, Operation},
    proplist::{Proplist, properties::APPLICATION_NAME},
    volume::ChannelVolumes,
};
use log::{debug, error, trace};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::model::{AudioEvent, Device, ServerInfo};

const APPLICATION: &str = "terraflow";

/// Commands accepted by backend implementations.
#[derive(Debug, Clone)]
pub enum BackendCommand {
    SinkVolume(String, ChannelVolumes),
    SourceVolume(String, ChannelVolumes),
    SinkMute(String, bool),
    SourceMute(String, bool),
}

/// Events emitted by backend implementations.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Error(String),
    Update(AudioEvent),
}

/// Future returned by backend spawners.
pub type BackendFuture = Pin<Box<dyn Future<Output = anyhow::Result<BackendHandle>> + Send>>;

/// Abstraction over backend implementations to allow testing without
/// PulseAudio.
pub trait AudioBackend: Send + Sync + Clone + 'static {
    fn spawn(&self) -> BackendFuture;
}

/// Default PulseAudio backend implementation.
#[derive(Clone, Debug, Default)]
pub struct PulseAudioBackend;

impl AudioBackend for PulseAudioBackend {
    fn spawn(&self) -> BackendFuture {
        Box::pin(async { PulseAudioServer::start().await })
    }
}

/// Handle returned by [`AudioBackend::spawn`].
///
/// Keeps the listener and commander threads alive for the lifetime of the
/// connection. Dropping the command sender ends the commander thread.
#[derive(Debug)]
pub struct BackendHandle {
    receiver: UnboundedReceiver<BackendEvent>,
    sender: UnboundedSender<BackendCommand>,
    _listener: Option<JoinHandle<()>>,
    _commander: Option<JoinHandle<()>>,
}

impl BackendHandle {
    fn new(
        receiver: UnboundedReceiver<BackendEvent>,
        sender: UnboundedSender<BackendCommand>,
        listener: JoinHandle<()>,
        commander: JoinHandle<()>,
    ) -> Self {
        Self {
            receiver,
            sender,
            _listener: Some(listener),
            _commander: Some(commander),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        receiver: UnboundedReceiver<BackendEvent>,
        sender: UnboundedSender<BackendCommand>,
    ) -> Self {
        Self {
            receiver,
            sender,
            _listener: None,
            _commander: None,
        }
    }

    pub(crate) fn commander(&self) -> UnboundedSender<BackendCommand> {
        self.sender.clone()
    }

    pub(crate) async fn recv(&mut self) -> Option<BackendEvent> {
        self.receiver.recv().await
    }
}

struct PulseAudioServer {
    mainloop: Mainloop,
    context: Context,
    introspector: Introspector,
}

impl PulseAudioServer {
    fn new() -> anyhow::Result<Self> {
        let mut proplist = Proplist::new().context("create PulseAudio properties")?;
        proplist
            .set_str(APPLICATION_NAME, APPLICATION)
            .map_err(|_| anyhow::anyhow!("failed to set application name"))?;

        let mut mainloop = Mainloop::new().context("create PulseAudio mainloop")?;

        let mut context = Context::new_with_proplist(&mainloop, APPLICATION, &proplist)
            .context("create PulseAudio context")?;

        context
            .connect(None, FlagSet::NOFLAGS, None)
            .context("connect PulseAudio context")?;

        loop {
            match mainloop.iterate(true) {
                IterateResult::Quit(_) | IterateResult::Err(_) => {
                    return Err(anyhow::anyhow!("PulseAudio mainloop failed during init"));
                }
                IterateResult::Success(_) => match context.get_state() {
                    context::State::Ready => break,
                    context::State::Failed | context::State::Terminated => {
                        return Err(anyhow::anyhow!("PulseAudio context failed to connect"));
                    }
                    _ => {}
                },
            }
        }

        let introspector = context.introspect();

        Ok(Self {
            mainloop,
            context,
            introspector,
        })
    }

    async fn start() -> anyhow::Result<BackendHandle> {
        let (from_server_tx, from_server_rx) = tokio::sync::mpsc::unbounded_channel();
        let (to_server_tx, to_server_rx) = tokio::sync::mpsc::unbounded_channel();

        let listener = Self::start_listener(from_server_tx.clone()).await?;
        let commander = Self::start_commander(from_server_tx, to_server_rx).await?;

        Ok(BackendHandle::new(
            from_server_rx,
            to_server_tx,
            listener,
            commander,
        ))
    }

    fn request_all(
        introspector: &Introspector,
        tx: &UnboundedSender<BackendEvent>,
        sinks: &Rc<RefCell<Vec<Device>>>,
        sources: &Rc<RefCell<Vec<Device>>>,
    ) -> (
        Operation<dyn FnMut(&libpulse_binding::context::introspect::ServerInfo<'_>)>,
        Operation<dyn FnMut(ListResult<&SinkInfo<'_>>)>,
        Operation<dyn FnMut(ListResult<&SourceInfo<'_>>)>,
    ) {
        let server = introspector.get_server_info({
            let tx = tx.clone();
            move |info| Self::send_server_info(info, &tx)
        });
        let sinks = introspector.get_sink_info_list({
            let tx = tx.clone();
            let sinks = Rc::clone(sinks);
            move |info| Self::populate_and_send_sinks(info, &tx, &mut sinks.borrow_mut())
        });
        let sources = introspector.get_source_info_list({
            let tx = tx.clone();
            let sources = Rc::clone(sources);
            move |info| Self::populate_and_send_sources(info, &tx, &mut sources.borrow_mut())
        });

        (server, sinks, sources)
    }

    async fn start_listener(
        from_server_tx: UnboundedSender<BackendEvent>,
    ) -> anyhow::Result<JoinHandle<()>> {
        let (ready_tx, mut ready_rx) = tokio::sync::mpsc::unbounded_channel();

        let handle = thread::spawn(move || match Self::new() {
            Ok(mut server) => {
                let _ = ready_tx.send(true);

                server.context.subscribe(
                    InterestMaskSet::SERVER
                        .union(InterestMaskSet::SINK)
                        .union(InterestMaskSet::SOURCE),
                    |result| {
                        if !result {
                            error!(target: "terraflow::audio", "Audio subscription failed");
                        }
                    },
                );

                let sinks = Rc::new(RefCell::new(Vec::new()));
                let sources = Rc::new(RefCell::new(Vec::new()));

                let (server_op, sinks_op, sources_op) =
                    Self::request_all(&server.introspector, &from_server_tx, &sinks, &sources);
                for result in [
                    server.wait_for_response(server_op),
                    server.wait_for_response(sinks_op),
                    server.wait_for_response(sources_op),
                ] {
                    if let Err(err) = result {
                        error!(target: "terraflow::audio", "Failed to read initial audio state: {err}");
                        let _ = from_server_tx.send(BackendEvent::Error(err.to_string()));
                    }
                }

                let introspector = server.context.introspect();
                let tx = from_server_tx.clone();
                server
                    .context
                    .set_subscribe_callback(Some(Box::new(move |_facility, _operation, _idx| {
                        let _ = Self::request_all(&introspector, &tx, &sinks, &sources);
                    })));

                loop {
                    if let IterateResult::Quit(_) | IterateResult::Err(_) =
                        server.mainloop.iterate(true)
                    {
                        error!(target: "terraflow::audio", "PulseAudio mainloop error");
                        let _ = from_server_tx
                            .send(BackendEvent::Error("PulseAudio mainloop error".into()));
                        break;
                    }
                }
            }
            Err(err) => {
                error!(target: "terraflow::audio", "Failed to start PulseAudio listener thread: {err}");
                let _ = ready_tx.send(false);
            }
        });

        match ready_rx.recv().await {
            Some(true) => Ok(handle),
            _ => Err(anyhow::anyhow!("Failed to start PulseAudio listener thread")),
        }
    }

    async fn start_commander(
        from_server_tx: UnboundedSender<BackendEvent>,
        mut to_server_rx: UnboundedReceiver<BackendCommand>,
    ) -> anyhow::Result<JoinHandle<()>> {
        let (ready_tx, mut ready_rx) = tokio::sync::mpsc::unbounded_channel();

        let handle = thread::spawn(move || {
            block_on(async move {
                match Self::new() {
                    Ok(mut server) => {
                        let _ = ready_tx.send(true);
                        while let Some(command) = to_server_rx.recv().await {
                            let result = match &command {
                                BackendCommand::SinkVolume(name, volume) => {
                                    server.set_sink_volume(name, volume)
                                }
                                BackendCommand::SourceVolume(name, volume) => {
                                    server.set_source_volume(name, volume)
                                }
                                BackendCommand::SinkMute(name, mute) => {
                                    server.set_sink_mute(name, *mute)
                                }
                                BackendCommand::SourceMute(name, mute) => {
                                    server.set_source_mute(name, *mute)
                                }
                            };

                            if let Err(err) = result {
                                error!(target: "terraflow::audio", "PulseAudio command {command:?} failed: {err}");
                            }
                        }
                    }
                    Err(err) => {
                        error!(target: "terraflow::audio", "Failed to start PulseAudio commander: {err}");
                        let _ = ready_tx.send(false);
                        let _ = from_server_tx.send(BackendEvent::Error(err.to_string()));
                    }
                }
            })
        });

        match ready_rx.recv().await {
            Some(true) => Ok(handle),
            _ => Err(anyhow::anyhow!("Failed to start PulseAudio commander thread")),
        }
    }

    fn wait_for_response<T: ?Sized>(&mut self, operation: Operation<T>) -> anyhow::Result<()> {
        loop {
            match self.mainloop.iterate(true) {
                IterateResult::Quit(_) | IterateResult::Err(_) => {
                    return Err(anyhow::anyhow!("PulseAudio iterate failure"));
                }
                IterateResult::Success(_) => match operation.get_state() {
                    operation::State::Done => break,
                    operation::State::Cancelled => {
                        return Err(anyhow::anyhow!("PulseAudio operation cancelled"));
                    }
                    operation::State::Running => {}
                },
            }
        }

        Ok(())
    }

    fn send_server_info(
        info: &libpulse_binding::context::introspect::ServerInfo<'_>,
        tx: &UnboundedSender<BackendEvent>,
    ) {
        let _ = tx.send(BackendEvent::Update(AudioEvent::ServerInfo(info.into())));
    }

    fn populate_and_send_sinks(
        info: ListResult<&SinkInfo<'_>>,
        tx: &UnboundedSender<BackendEvent>,
        sinks: &mut Vec<Device>,
    ) {
        match info {
            ListResult::Item(data) => {
                let available = data.ports.is_empty()
                    || data
                        .ports
                        .iter()
                        .any(|port| port.available != PortAvailable::No);

                if available {
                    debug!(target: "terraflow::audio", "Adding sink data: {:?}", data.name);
                    sinks.push(data.into());
                }
            }
            ListResult::End => {
                let _ = tx.send(BackendEvent::Update(AudioEvent::Sinks(std::mem::take(sinks))));
            }
            ListResult::Error => error!(target: "terraflow::audio", "Error during sink list population"),
        }
    }

    fn populate_and_send_sources(
        info: ListResult<&SourceInfo<'_>>,
        tx: &UnboundedSender<BackendEvent>,
        sources: &mut Vec<Device>,
    ) {
        match info {
            ListResult::Item(data) => {
                trace!(target: "terraflow::audio", "Received source data: {:?}", data.name);

                if data
                    .name
                    .as_ref()
                    .is_some_and(|name| !name.contains("monitor"))
                {
                    sources.push(data.into());
                }
            }
            ListResult::End => {
                let _ = tx.send(BackendEvent::Update(AudioEvent::Sources(std::mem::take(
                    sources,
                ))));
            }
            ListResult::Error => {
                error!(target: "terraflow::audio", "Error during sources list population")
            }
        }
    }

    fn set_sink_volume(&mut self, name: &str, volume: &ChannelVolumes) -> anyhow::Result<()> {
        let op = self.introspector.set_sink_volume_by_name(name, volume, None);
        self.wait_for_response(op)
    }

    fn set_source_volume(&mut self, name: &str, volume: &ChannelVolumes) -> anyhow::Result<()> {
        let op = self
            .introspector
            .set_source_volume_by_name(name, volume, None);
        self.wait_for_response(op)
    }

    fn set_sink_mute(&mut self, name: &str, mute: bool) -> anyhow::Result<()> {
        let op = self.introspector.set_sink_mute_by_name(name, mute, None);
        self.wait_for_response(op)
    }

    fn set_source_mute(&mut self, name: &str, mute: bool) -> anyhow::Result<()> {
        let op = self.introspector.set_source_mute_by_name(name, mute, None);
        self.wait_for_response(op)
    }
}

impl From<&libpulse_binding::context::introspect::ServerInfo<'_>> for ServerInfo {
    fn from(value: &libpulse_binding::context::introspect::ServerInfo<'_>) -> Self {
        Self {
            default_sink: value
                .default_sink_name
                .as_ref()
                .map_or_else(String::default, ToString::to_string),
            default_source: value
                .default_source_name
                .as_ref()
                .map_or_else(String::default, ToString::to_string),
        }
    }
}

impl From<&SinkInfo<'_>> for Device {
    fn from(value: &SinkInfo<'_>) -> Self {
        Self {
            name: value
                .name
                .as_ref()
                .map_or_else(String::default, ToString::to_string),
            volume: value.volume,
            is_mute: value.mute,
        }
    }
}

impl From<&SourceInfo<'_>> for Device {
    fn from(value: &SourceInfo<'_>) -> Self {
        Self {
            name: value
                .name
                .as_ref()
                .map_or_else(String::default, ToString::to_string),
            volume: value.volume,
            is_mute: value.mute,
        }
    }
}
