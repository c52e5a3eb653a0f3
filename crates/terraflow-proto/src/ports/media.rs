use std::{future::Future, pin::Pin};

/// Transport operations exposed by the dashboard media buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportAction {
    Previous,
    PlayPause,
    Next,
}

impl TransportAction {
    /// Button label shown in the dashboard.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Previous => "Prev",
            Self::PlayPause => "Play/Pause",
            Self::Next => "Next",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    /// The session bus could not be reached.
    #[error("media bus unavailable: {message}")]
    BusUnavailable { message: String },

    #[error("media operation `{operation}` failed for `{player}`: {message}")]
    Player {
        operation: &'static str,
        player: String,
        message: String,
    },
}

pub type MediaFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MediaError>> + Send + 'a>>;

/// Handle to one media player.
pub trait MediaPlayer: Send + Sync {
    /// Bus name or other stable identity of the player.
    fn identity(&self) -> &str;

    fn previous(&self) -> MediaFuture<'_, ()>;

    fn play_pause(&self) -> MediaFuture<'_, ()>;

    fn next(&self) -> MediaFuture<'_, ()>;

    /// Dispatch `action` to the matching transport call.
    fn perform(&self, action: TransportAction) -> MediaFuture<'_, ()> {
        match action {
            TransportAction::Previous => self.previous(),
            TransportAction::PlayPause => self.play_pause(),
            TransportAction::Next => self.next(),
        }
    }
}

/// Player lookup.
///
/// `find_player` resolves to `Ok(None)` when no player matches; callers treat
/// that as a silent no-op. An empty `name` matches any player.
pub trait MediaPort: Send + Sync {
    fn find_player<'a>(&'a self, name: &'a str) -> MediaFuture<'a, Option<Box<dyn MediaPlayer>>>;
}
