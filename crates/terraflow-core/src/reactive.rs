//! Per-field publish/subscribe values.
//!
//! An [`Observable`] holds the latest value of one observed field. Subscribers
//! only see the newest value; intermediate values written between two polls
//! are skipped. Derived fields are built with [`Observable::map`] and UI
//! modules receive changes through [`Observable::bind`], which forwards every
//! change into the event bus.

use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle, time::sleep};
use tokio_stream::wrappers::WatchStream;

use crate::{ModuleEventSender, event_bus::EventBusError};

/// Pause between attempts to publish into a full event bus.
pub const BIND_RETRY_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub struct Observable<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T> Observable<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replace the value, notifying subscribers only when it differs.
    ///
    /// Returns `true` when subscribers were notified.
    ///
    /// ```
    /// use terraflow_core::reactive::Observable;
    ///
    /// let active = Observable::new(Some(1));
    /// assert!(active.set(Some(2)));
    /// assert!(!active.set(Some(2)));
    /// assert_eq!(active.get(), Some(2));
    /// ```
    pub fn set(&self, value: T) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Stream yielding the current value first, then every change.
    pub fn stream(&self) -> WatchStream<T> {
        WatchStream::new(self.subscribe())
    }

    /// Derive a new observable that follows `self` through `transform`.
    ///
    /// The derivation runs on `handle` until every handle to `self` is
    /// dropped or the returned task is aborted.
    pub fn map<U, F>(&self, handle: &Handle, transform: F) -> (Observable<U>, JoinHandle<()>)
    where
        U: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let mut receiver = self.subscribe();
        let derived = Observable::new(transform(&*receiver.borrow_and_update()));
        let target = derived.clone();

        let task = handle.spawn(async move {
            while receiver.changed().await.is_ok() {
                let value = transform(&*receiver.borrow_and_update());
                target.set(value);
            }
        });

        (derived, task)
    }

    /// Forward every change of `self` to the UI as a module message.
    ///
    /// The current value is not sent; callers render it directly at
    /// construction time. While the bus is full the pending value is kept
    /// and retried every [`BIND_RETRY_DELAY`], replaced by any newer value
    /// written meanwhile, so the UI always ends on the latest value.
    pub fn bind<M, F>(
        &self,
        handle: &Handle,
        sender: ModuleEventSender<M>,
        into_message: F,
    ) -> JoinHandle<()>
    where
        M: Send + 'static,
        F: Fn(T) -> M + Send + Sync + 'static,
    {
        let mut receiver = self.subscribe();
        receiver.mark_unchanged();

        handle.spawn(async move {
            while receiver.changed().await.is_ok() {
                let mut value = receiver.borrow_and_update().clone();

                loop {
                    match sender.try_send(into_message(value.clone())) {
                        Ok(()) => break,
                        Err(EventBusError::QueueFull { capacity }) => {
                            debug!(
                                target: "terraflow::reactive",
                                "event bus full (capacity {capacity}), retrying update"
                            );
                            sleep(BIND_RETRY_DELAY).await;

                            if receiver.has_changed().unwrap_or(false) {
                                value = receiver.borrow_and_update().clone();
                            }
                        }
                        Err(err) => {
                            warn!(target: "terraflow::reactive", "dropping observable update: {err}");
                            break;
                        }
                    }
                }
            }
        })
    }
}
