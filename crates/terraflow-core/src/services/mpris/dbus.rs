use zbus::{Result, proxy};

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait MprisPlayer {
    fn next(&self) -> Result<()>;

    fn play_pause(&self) -> Result<()>;

    fn previous(&self) -> Result<()>;
}
