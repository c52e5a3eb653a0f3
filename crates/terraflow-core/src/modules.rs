//! Module state machines behind the bar and the dashboard.
//!
//! Each module owns the UI-facing state it renders, exposes an `update`
//! entry point for its `Message` type and spawns its background work through
//! the [`ModuleContext`](crate::ModuleContext) handed to `register`.

use std::borrow::Cow;

use thiserror::Error;

use crate::event_bus::EventBusError;

pub mod battery;
pub mod clock;
pub mod dashboard;
pub mod window_title;
pub mod workspaces;

/// Errors that can occur while registering a module.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Propagates failures originating from the event bus.
    #[error("module event bus interaction failed: {0}")]
    EventBus(#[from] EventBusError),
    /// Domain-specific registration failures surfaced by the module.
    #[error("module registration failed: {reason}")]
    Registration { reason: Cow<'static, str> },
}

impl ModuleError {
    /// Construct a registration error with the provided reason.
    pub fn registration(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Registration {
            reason: reason.into(),
        }
    }
}
