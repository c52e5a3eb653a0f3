use std::{error::Error, fmt, pin::Pin, time::Duration};

use tokio_stream::Stream;

/// Stream type alias used for Hyprland event subscriptions.
pub type HyprlandEventStream<E> =
    Pin<Box<dyn Stream<Item = Result<E, HyprlandError>> + Send + 'static>>;

/// Error type returned by [`HyprlandPort`] operations.
///
/// Each error variant stores the logical operation name to aid diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum HyprlandError {
    /// The requested operation timed out before it could complete.
    #[error("operation `{operation}` timed out after {timeout:?}")]
    Timeout {
        /// Logical operation identifier.
        operation: &'static str,
        /// Maximum allotted time before aborting the operation.
        timeout: Duration,
    },
    /// The backend failed to execute the requested operation.
    #[error("operation `{operation}` failed: {source}")]
    Backend {
        /// Logical operation identifier.
        operation: &'static str,
        /// Source error reported by the backend implementation.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The async runtime required to perform the operation was unavailable.
    #[error("operation `{operation}` unavailable because no async runtime is active")]
    RuntimeUnavailable {
        /// Logical operation identifier.
        operation: &'static str,
    },
    /// The operation failed with an explanatory message.
    #[error("operation `{operation}` failed: {message}")]
    Message {
        /// Logical operation identifier.
        operation: &'static str,
        /// Human readable error description.
        message: String,
    },
}

impl HyprlandError {
    /// Helper for constructing [`HyprlandError::RuntimeUnavailable`].
    pub const fn runtime_unavailable(operation: &'static str) -> Self {
        Self::RuntimeUnavailable { operation }
    }

    /// Helper for constructing [`HyprlandError::Message`].
    pub fn message(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Message {
            operation,
            message: message.into(),
        }
    }
}

/// Metadata describing a Hyprland workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HyprlandWorkspaceInfo {
    /// Workspace identifier. Special workspaces use negative ids.
    pub id: i32,
    /// Workspace name.
    pub name: String,
}

/// Immutable snapshot of the workspaces known to Hyprland.
///
/// The list is reported as-is; deduplication and ordering are left to the
/// consumer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HyprlandWorkspaceSnapshot {
    /// Known workspaces reported by Hyprland.
    pub workspaces: Vec<HyprlandWorkspaceInfo>,
    /// Identifier of the currently active workspace, if available.
    pub active_workspace_id: Option<i32>,
}

/// Metadata describing the focused Hyprland window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HyprlandWindowInfo {
    /// Window title provided by the client.
    pub title: String,
    /// Window class name.
    pub class: String,
}

/// Identifies a workspace for Hyprland dispatch calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HyprlandWorkspaceSelector {
    /// Select workspace by numeric identifier.
    Id(i32),
}

impl HyprlandWorkspaceSelector {
    /// Textual IPC command Hyprland receives for this selector.
    ///
    /// ```
    /// use terraflow_proto::ports::hyprland::HyprlandWorkspaceSelector;
    ///
    /// assert_eq!(
    ///     HyprlandWorkspaceSelector::Id(3).dispatch_command(),
    ///     "dispatch workspace 3"
    /// );
    /// ```
    pub fn dispatch_command(&self) -> String {
        match self {
            Self::Id(id) => format!("dispatch workspace {id}"),
        }
    }
}

impl fmt::Display for HyprlandWorkspaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "workspace-id:{id}"),
        }
    }
}

/// Events that may change the focused window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HyprlandWindowEvent {
    /// The active window changed.
    ActiveWindowChanged,
    /// A window was closed.
    WindowClosed,
    /// Focus moved to another workspace.
    WorkspaceFocusChanged,
}

/// Events related to Hyprland workspaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HyprlandWorkspaceEvent {
    /// A new workspace was added.
    Added,
    /// A workspace was removed.
    Removed,
    /// A workspace was moved to another monitor.
    Moved,
    /// The focused workspace changed.
    Focused,
    /// The active special workspace changed.
    SpecialChanged,
    /// The active monitor changed.
    ActiveMonitorChanged,
}

/// Abstraction over the Hyprland functionality the workspace strip and the
/// window title need.
///
/// Backends are expected to provide retry/timeout behaviour and surface errors
/// using [`HyprlandError`]. All methods must be thread-safe.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use terraflow_proto::ports::hyprland::{
///     HyprlandError, HyprlandEventStream, HyprlandPort, HyprlandWindowEvent,
///     HyprlandWindowInfo, HyprlandWorkspaceEvent, HyprlandWorkspaceSelector,
///     HyprlandWorkspaceSnapshot,
/// };
///
/// struct DummyPort;
///
/// impl HyprlandPort for DummyPort {
///     fn workspace_events(
///         &self,
///     ) -> Result<HyprlandEventStream<HyprlandWorkspaceEvent>, HyprlandError> {
///         Err(HyprlandError::runtime_unavailable("workspace_events"))
///     }
///
///     fn workspace_snapshot(&self) -> Result<HyprlandWorkspaceSnapshot, HyprlandError> {
///         Ok(HyprlandWorkspaceSnapshot::default())
///     }
///
///     fn change_workspace(&self, _: HyprlandWorkspaceSelector) -> Result<(), HyprlandError> {
///         Err(HyprlandError::message("change_workspace", "not connected"))
///     }
///
///     fn window_events(&self) -> Result<HyprlandEventStream<HyprlandWindowEvent>, HyprlandError> {
///         Err(HyprlandError::runtime_unavailable("window_events"))
///     }
///
///     fn active_window(&self) -> Result<Option<HyprlandWindowInfo>, HyprlandError> {
///         Ok(None)
///     }
/// }
///
/// let port: Arc<dyn HyprlandPort> = Arc::new(DummyPort);
/// assert!(port.workspace_snapshot().is_ok());
/// ```
pub trait HyprlandPort: Send + Sync {
    /// Subscribe to workspace related events.
    fn workspace_events(
        &self,
    ) -> Result<HyprlandEventStream<HyprlandWorkspaceEvent>, HyprlandError>;

    /// Obtain the latest snapshot of workspaces and the focused one.
    fn workspace_snapshot(&self) -> Result<HyprlandWorkspaceSnapshot, HyprlandError>;

    /// Request Hyprland to focus the provided workspace.
    fn change_workspace(&self, workspace: HyprlandWorkspaceSelector) -> Result<(), HyprlandError>;

    /// Subscribe to events that may change the focused window.
    fn window_events(&self) -> Result<HyprlandEventStream<HyprlandWindowEvent>, HyprlandError>;

    /// Title and class of the focused window, `None` on an empty workspace.
    fn active_window(&self) -> Result<Option<HyprlandWindowInfo>, HyprlandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_selector_display() {
        assert_eq!(
            HyprlandWorkspaceSelector::Id(2).to_string(),
            "workspace-id:2"
        );
    }

    #[test]
    fn dispatch_command_matches_ipc_syntax() {
        assert_eq!(
            HyprlandWorkspaceSelector::Id(3).dispatch_command(),
            "dispatch workspace 3"
        );
        assert_eq!(
            HyprlandWorkspaceSelector::Id(-98).dispatch_command(),
            "dispatch workspace -98"
        );
    }

    #[test]
    fn timeout_error_mentions_operation() {
        let error = HyprlandError::Timeout {
            operation: "change_workspace",
            timeout: Duration::from_secs(2),
        };

        assert!(error.to_string().contains("change_workspace"));
    }
}
