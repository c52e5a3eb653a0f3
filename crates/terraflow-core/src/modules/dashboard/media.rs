use std::sync::Arc;

use log::{debug, warn};
use terraflow_proto::ports::media::{MediaError, MediaPort, TransportAction};
use tokio::{runtime::Handle, task::JoinHandle};

/// Lookup key meaning "the default player".
pub const DEFAULT_PLAYER: &str = "";

/// Buttons in display order.
pub const TRANSPORT_ACTIONS: [TransportAction; 3] = [
    TransportAction::Previous,
    TransportAction::PlayPause,
    TransportAction::Next,
];

/// Run `action` on the default player.
///
/// Resolves to `Ok(None)` without any transport call when no player is
/// present, otherwise to the identity of the player that received exactly
/// one call.
pub async fn transport(
    media: &dyn MediaPort,
    action: TransportAction,
) -> Result<Option<String>, MediaError> {
    let Some(player) = media.find_player(DEFAULT_PLAYER).await? else {
        debug!(target: "terraflow::mpris", "No media player for {action:?}");
        return Ok(None);
    };

    player.perform(action).await?;
    Ok(Some(player.identity().to_owned()))
}

pub struct MediaControls {
    media: Arc<dyn MediaPort>,
}

impl std::fmt::Debug for MediaControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaControls").finish_non_exhaustive()
    }
}

impl MediaControls {
    pub fn new(media: Arc<dyn MediaPort>) -> Self {
        Self { media }
    }

    /// Spawn the transport call for a button press. Failures are logged.
    pub fn pressed(&self, action: TransportAction, runtime: &Handle) -> JoinHandle<()> {
        let media = Arc::clone(&self.media);

        runtime.spawn(async move {
            match transport(media.as_ref(), action).await {
                Ok(Some(player)) => {
                    debug!(target: "terraflow::mpris", "{} sent to {player}", action.label());
                }
                Ok(None) => {}
                Err(err) => warn!(target: "terraflow::mpris", "{} failed: {err}", action.label()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockMediaPort;

    #[tokio::test]
    async fn absent_player_is_a_silent_no_op() {
        let media = MockMediaPort::without_player();

        for action in TRANSPORT_ACTIONS {
            assert_eq!(transport(&media, action).await, Ok(None));
        }

        assert!(media.actions().is_empty());
        assert_eq!(media.lookups(), ["", "", ""]);
    }

    #[tokio::test]
    async fn present_player_receives_exactly_one_call() {
        let media = MockMediaPort::with_player("org.mpris.MediaPlayer2.mock");

        assert_eq!(
            transport(&media, TransportAction::Next).await,
            Ok(Some("org.mpris.MediaPlayer2.mock".to_owned()))
        );

        assert_eq!(media.actions(), [TransportAction::Next]);
    }

    #[tokio::test]
    async fn lookup_errors_are_returned() {
        let media = MockMediaPort::failing();

        let result = transport(&media, TransportAction::PlayPause).await;
        assert!(matches!(result, Err(MediaError::BusUnavailable { .. })));
    }

    #[tokio::test]
    async fn pressed_runs_on_the_runtime() {
        let media = Arc::new(MockMediaPort::with_player("org.mpris.MediaPlayer2.mock"));
        let controls = MediaControls::new(media.clone());

        controls
            .pressed(TransportAction::Previous, &Handle::current())
            .await
            .expect("join");

        assert_eq!(media.actions(), [TransportAction::Previous]);
    }
}
