//! Port definitions for TerraFlow service adapters.
//!
//! Higher level crates talk to the window manager, the sound server, media
//! players, the backlight and the power-profile daemon only through these
//! traits, so the concrete clients can be swapped for in-memory mocks in
//! tests.

pub mod audio;
pub mod brightness;
pub mod hyprland;
pub mod media;
pub mod power_profile;
