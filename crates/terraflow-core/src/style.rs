mod buttons;
mod theme;

pub use buttons::{control_button_style, workspace_button_style};
pub use theme::{indicator_style, surface_style, terraflow_theme};
