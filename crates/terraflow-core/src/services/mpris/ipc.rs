use anyhow::Context;
use zbus::{Connection, fdo::DBusProxy};

/// Prefix applied to all MPRIS-compliant player service names on the session
/// bus.
pub(crate) const MPRIS_PLAYER_SERVICE_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Returns `true` when `name` references an MPRIS player service.
pub(crate) fn is_mpris_service(name: &str) -> bool {
    name.starts_with(MPRIS_PLAYER_SERVICE_PREFIX)
}

/// Returns `true` when the MPRIS service `service` answers to the lookup key
/// `name`. An empty key matches every player.
pub(crate) fn matches_player(service: &str, name: &str) -> bool {
    is_mpris_service(service)
        && service[MPRIS_PLAYER_SERVICE_PREFIX.len()..]
            .to_lowercase()
            .contains(&name.to_lowercase())
}

/// First service on `conn` matching `name`, in bus order.
pub(crate) async fn find_service(conn: &Connection, name: &str) -> anyhow::Result<Option<String>> {
    let dbus = DBusProxy::new(conn).await?;
    let names = dbus
        .list_names()
        .await
        .context("failed to list D-Bus names")?;

    Ok(names
        .iter()
        .map(|name| name.as_str())
        .find(|service| matches_player(service, name))
        .map(ToString::to_string))
}
