//! Shared contracts for the TerraFlow shell.
//!
//! The crate holds the configuration schema and the port traits that decouple
//! the shell modules from concrete service backends (Hyprland, PulseAudio,
//! MPRIS and power profiles).

pub mod config;
pub mod ports;
