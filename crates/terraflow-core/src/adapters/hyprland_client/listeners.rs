use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use hyprland::event_listener::AsyncEventListener;
use log::{debug, warn};
use terraflow_proto::ports::hyprland::{
    HyprlandError, HyprlandEventStream, HyprlandWindowEvent, HyprlandWorkspaceEvent,
};
use tokio::{
    runtime::Handle,
    sync::{Notify, mpsc},
    time::timeout,
};
use tokio_stream::wrappers::ReceiverStream;

use super::{HyprlandClient, config::HyprlandClientConfig, util::sleep_with_backoff};

const CHANNEL_CAPACITY: usize = 64;
pub(crate) const WORKSPACE_EVENTS_OP: &str = "workspace_events";
pub(crate) const WINDOW_EVENTS_OP: &str = "window_events";

type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Builds listener callbacks that push one fixed event into the stream and
/// record activity for the inactivity watchdog.
struct Forwarder<E> {
    tx: mpsc::Sender<Result<E, HyprlandError>>,
    activity: Arc<Notify>,
    operation: &'static str,
}

impl<E> Forwarder<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Callback forwarding `event` whatever payload Hyprland attaches to it.
    fn handler<T>(&self, event: E) -> impl Fn(T) -> HandlerFuture + Send + Sync + 'static
    where
        T: Send + 'static,
    {
        let tx = self.tx.clone();
        let activity = Arc::clone(&self.activity);
        let operation = self.operation;

        move |_: T| -> HandlerFuture {
            let tx = tx.clone();
            let event = event.clone();
            activity.notify_one();

            Box::pin(async move {
                if let Err(err) = tx.send(Ok(event)).await {
                    warn!(
                        target: "terraflow::hyprland",
                        "event receiver dropped (operation={operation}, error={err})"
                    );
                }
            })
        }
    }
}

fn register_workspace_handlers(
    listener: &mut AsyncEventListener,
    forward: &Forwarder<HyprlandWorkspaceEvent>,
) {
    listener.add_workspace_added_handler(forward.handler(HyprlandWorkspaceEvent::Added));
    listener.add_workspace_deleted_handler(forward.handler(HyprlandWorkspaceEvent::Removed));
    listener.add_workspace_moved_handler(forward.handler(HyprlandWorkspaceEvent::Moved));
    listener.add_workspace_changed_handler(forward.handler(HyprlandWorkspaceEvent::Focused));
    listener.add_changed_special_handler(forward.handler(HyprlandWorkspaceEvent::SpecialChanged));
    listener.add_active_monitor_changed_handler(
        forward.handler(HyprlandWorkspaceEvent::ActiveMonitorChanged),
    );
}

fn register_window_handlers(
    listener: &mut AsyncEventListener,
    forward: &Forwarder<HyprlandWindowEvent>,
) {
    listener
        .add_active_window_changed_handler(forward.handler(HyprlandWindowEvent::ActiveWindowChanged));
    listener.add_window_closed_handler(forward.handler(HyprlandWindowEvent::WindowClosed));
    listener
        .add_workspace_changed_handler(forward.handler(HyprlandWindowEvent::WorkspaceFocusChanged));
}

/// Resolves once `activity` has not been notified for `limit`.
async fn inactivity(activity: &Notify, limit: Duration) {
    while timeout(limit, activity.notified()).await.is_ok() {}
}

/// Spawn the workspace event listener on the current runtime.
pub(crate) fn spawn_workspace_listener(
    config: Arc<HyprlandClientConfig>,
) -> Result<HyprlandEventStream<HyprlandWorkspaceEvent>, HyprlandError> {
    spawn_listener(config, WORKSPACE_EVENTS_OP, register_workspace_handlers)
}

/// Spawn the focused-window event listener on the current runtime.
pub(crate) fn spawn_window_listener(
    config: Arc<HyprlandClientConfig>,
) -> Result<HyprlandEventStream<HyprlandWindowEvent>, HyprlandError> {
    spawn_listener(config, WINDOW_EVENTS_OP, register_window_handlers)
}

/// Run a Hyprland event listener until the returned stream is dropped.
///
/// The socket is reopened after `retry_backoff` when Hyprland closes it or
/// fails, and also when no event arrived for `listener_timeout`. Socket
/// failures are delivered on the stream; inactivity restarts are silent.
fn spawn_listener<E>(
    config: Arc<HyprlandClientConfig>,
    operation: &'static str,
    register: fn(&mut AsyncEventListener, &Forwarder<E>),
) -> Result<HyprlandEventStream<E>, HyprlandError>
where
    E: Clone + Send + Sync + 'static,
{
    let handle = Handle::try_current().map_err(|_| HyprlandError::runtime_unavailable(operation))?;
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let listener_timeout = config.listener_timeout;
    let retry_backoff = config.retry_backoff;

    handle.spawn(async move {
        loop {
            let forward = Forwarder {
                tx: tx.clone(),
                activity: Arc::new(Notify::new()),
                operation,
            };
            let mut listener = AsyncEventListener::new();
            register(&mut listener, &forward);

            let failure = tokio::select! {
                result = listener.start_listener_async() => match result {
                    Ok(()) => {
                        warn!(
                            target: "terraflow::hyprland",
                            "listener stopped unexpectedly (operation={operation})"
                        );
                        None
                    }
                    Err(err) => Some(HyprlandClient::backend_error(operation, err)),
                },
                () = inactivity(&forward.activity, listener_timeout) => {
                    debug!(
                        target: "terraflow::hyprland",
                        "no events for {listener_timeout:?}, reconnecting (operation={operation})"
                    );
                    None
                }
            };

            if let Some(failure) = failure
                && let Err(send_err) = tx.send(Err(failure)).await
            {
                warn!(
                    target: "terraflow::hyprland",
                    "failed to publish listener error (operation={operation}, error={send_err})"
                );
                break;
            }

            if tx.is_closed() {
                break;
            }

            sleep_with_backoff(retry_backoff).await;
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn inactivity_resolves_only_after_a_quiet_period() {
        let activity = Arc::new(Notify::new());
        let limit = Duration::from_secs(60);
        let started = tokio::time::Instant::now();

        let ticker = {
            let activity = Arc::clone(&activity);
            tokio::spawn(async move {
                for _ in 0..3 {
                    tokio::time::sleep(Duration::from_secs(40)).await;
                    activity.notify_one();
                }
            })
        };

        inactivity(&activity, limit).await;

        assert!(started.elapsed() >= Duration::from_secs(180));
        ticker.await.expect("ticker");
    }

    #[tokio::test(start_paused = true)]
    async fn inactivity_resolves_after_limit_without_events() {
        let activity = Notify::new();
        let started = tokio::time::Instant::now();

        inactivity(&activity, Duration::from_secs(60)).await;

        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }
}
