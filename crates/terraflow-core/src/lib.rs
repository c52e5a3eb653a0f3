//! Service adapters, module state machines and window registration of the
//! TerraFlow shell.

/// Bar height in logical pixels.
pub const HEIGHT: f64 = 34.;

pub mod adapters;
pub mod config;
pub mod event_bus;
pub mod module_context;
pub mod modules;
pub mod outputs;
pub mod reactive;
pub mod services;
pub mod style;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod utils;
pub mod windows;

pub use module_context::{ModuleContext, ModuleEventSender};
