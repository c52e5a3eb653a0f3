use std::{fmt, future::Future, pin::Pin, sync::Arc};

/// Power profiles selectable from the dashboard toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerProfile {
    Performance,
    Balanced,
}

impl PowerProfile {
    /// Profile selected by the toggle state.
    ///
    /// ```
    /// use terraflow_proto::ports::power_profile::PowerProfile;
    ///
    /// assert_eq!(PowerProfile::from_active(true), PowerProfile::Performance);
    /// assert_eq!(PowerProfile::from_active(false), PowerProfile::Balanced);
    /// ```
    pub const fn from_active(active: bool) -> Self {
        if active {
            Self::Performance
        } else {
            Self::Balanced
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Balanced => "balanced",
        }
    }
}

impl fmt::Display for PowerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PowerProfileError {
    #[error("failed to launch `{command}`: {message}")]
    Spawn {
        command: Arc<str>,
        message: String,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: Arc<str>, status: String },
}

pub type PowerProfileFuture =
    Pin<Box<dyn Future<Output = Result<(), PowerProfileError>> + Send + 'static>>;

/// Switches the system power profile.
///
/// The returned future owns everything it needs so callers can spawn it and
/// keep the join handle.
pub trait PowerProfilePort: Send + Sync {
    fn set_profile(&self, profile: PowerProfile) -> PowerProfileFuture;
}
