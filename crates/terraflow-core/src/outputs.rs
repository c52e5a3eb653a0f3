//! Layer-shell surfaces backing the registered windows.

mod state;
mod wayland;

pub use state::Outputs;
pub use wayland::DASHBOARD_WIDTH;
