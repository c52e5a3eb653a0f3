use std::{future::Future, pin::Pin, sync::Arc};

/// Highest brightness accepted by [`BrightnessPort::set_brightness`].
pub const MAX_BRIGHTNESS: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrightnessError {
    #[error("failed to launch `{command}`: {message}")]
    Spawn {
        command: Arc<str>,
        message: String,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: Arc<str>, status: String },

    /// The backend answered with something that holds no percentage.
    #[error("unexpected brightness output: {output:?}")]
    Parse { output: String },
}

pub type BrightnessFuture<T> =
    Pin<Box<dyn Future<Output = Result<T, BrightnessError>> + Send + 'static>>;

/// Backlight of the primary display, as a percentage.
pub trait BrightnessPort: Send + Sync {
    /// Current brightness in `0..=100`.
    fn brightness(&self) -> BrightnessFuture<u8>;

    /// Set the brightness to `percent`, clamped to [`MAX_BRIGHTNESS`].
    fn set_brightness(&self, percent: u8) -> BrightnessFuture<()>;
}
