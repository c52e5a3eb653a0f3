//! Concrete clients for external services that need more than a thin wrapper.

pub mod hyprland_client;
