//! Media player lookup over the MPRIS D-Bus interface.

mod dbus;
mod ipc;

use log::{debug, info};
use terraflow_proto::ports::media::{MediaError, MediaFuture, MediaPlayer, MediaPort};
use tokio::sync::OnceCell;
use zbus::Connection;

use dbus::MprisPlayerProxy;

/// [`MediaPort`] implementation resolving players on the session bus.
///
/// The bus connection is opened on first use, so constructing the client
/// never fails even when no session bus is running.
#[derive(Debug, Default)]
pub struct MprisClient {
    conn: OnceCell<Connection>,
}

impl MprisClient {
    pub fn new() -> Self {
        Self::default()
    }

    async fn connection(&self) -> Result<&Connection, MediaError> {
        self.conn
            .get_or_try_init(|| async {
                let conn = Connection::session().await.map_err(|err| {
                    MediaError::BusUnavailable {
                        message: err.to_string(),
                    }
                })?;
                info!(target: "terraflow::mpris", "Connected to the session bus");
                Ok::<_, MediaError>(conn)
            })
            .await
    }
}

impl MediaPort for MprisClient {
    fn find_player<'a>(&'a self, name: &'a str) -> MediaFuture<'a, Option<Box<dyn MediaPlayer>>> {
        Box::pin(async move {
            let conn = self.connection().await?;

            let service = ipc::find_service(conn, name)
                .await
                .map_err(|err| MediaError::BusUnavailable {
                    message: format!("{err:#}"),
                })?;

            let Some(service) = service else {
                debug!(target: "terraflow::mpris", "No media player matches {name:?}");
                return Ok(None);
            };

            let proxy = MprisPlayerProxy::new(conn, service.clone())
                .await
                .map_err(|err| player_error("find_player", &service, err))?;

            Ok::<_, MediaError>(Some(
                Box::new(MprisPlayer { service, proxy }) as Box<dyn MediaPlayer>
            ))
        })
    }
}

fn player_error(operation: &'static str, player: &str, err: zbus::Error) -> MediaError {
    MediaError::Player {
        operation,
        player: player.to_owned(),
        message: err.to_string(),
    }
}

struct MprisPlayer {
    service: String,
    proxy: MprisPlayerProxy<'static>,
}

impl MediaPlayer for MprisPlayer {
    fn identity(&self) -> &str {
        &self.service
    }

    fn previous(&self) -> MediaFuture<'_, ()> {
        Box::pin(async move {
            self.proxy
                .previous()
                .await
                .map_err(|err| player_error("previous", &self.service, err))
        })
    }

    fn play_pause(&self) -> MediaFuture<'_, ()> {
        Box::pin(async move {
            self.proxy
                .play_pause()
                .await
                .map_err(|err| player_error("play_pause", &self.service, err))
        })
    }

    fn next(&self) -> MediaFuture<'_, ()> {
        Box::pin(async move {
            self.proxy
                .next()
                .await
                .map_err(|err| player_error("next", &self.service, err))
        })
    }
}
