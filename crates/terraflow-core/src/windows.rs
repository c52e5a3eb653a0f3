//! Windows registered with the compositor at startup.
//!
//! The list is fixed: one bar on the configured monitor and one dashboard on
//! the active output. Layout descriptions for each window live in the
//! submodules; the GUI renders them.

pub mod bar;
pub mod dashboard;

use crate::config::Config;

pub use bar::{BarItem, BarLayout, BarRegion};
pub use dashboard::{DashboardItem, DashboardLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Bar,
    Dashboard,
}

/// Screen edges a layer surface is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Edges {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Edges {
    pub const TOP_LEFT_RIGHT: Self = Self {
        top: true,
        bottom: false,
        left: true,
        right: true,
    };

    pub const RIGHT_TOP_BOTTOM: Self = Self {
        top: true,
        bottom: true,
        left: false,
        right: true,
    };
}

/// Registration record for one layer-shell window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub name: String,
    /// Monitor index, or `None` for the active output.
    pub monitor: Option<usize>,
    pub anchor: Edges,
    /// Reserve the window's size so other windows do not overlap it.
    pub exclusive: bool,
    pub kind: WindowKind,
}

impl WindowSpec {
    /// ```
    /// use terraflow_core::windows::{Edges, WindowSpec};
    ///
    /// let bar = WindowSpec::bar(1);
    /// assert_eq!(bar.name, "bar-1");
    /// assert_eq!(bar.anchor, Edges::TOP_LEFT_RIGHT);
    /// assert!(bar.exclusive);
    /// ```
    pub fn bar(monitor: usize) -> Self {
        Self {
            name: format!("bar-{monitor}"),
            monitor: Some(monitor),
            anchor: Edges::TOP_LEFT_RIGHT,
            exclusive: true,
            kind: WindowKind::Bar,
        }
    }

    pub fn dashboard() -> Self {
        Self {
            name: "dashboard".to_owned(),
            monitor: None,
            anchor: Edges::RIGHT_TOP_BOTTOM,
            exclusive: false,
            kind: WindowKind::Dashboard,
        }
    }
}

/// Windows to create at startup, in creation order.
pub fn registered_windows(config: &Config) -> Vec<WindowSpec> {
    vec![WindowSpec::bar(config.bar.monitor), WindowSpec::dashboard()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_registers_bar_on_first_monitor_and_dashboard() {
        let windows = registered_windows(&Config::default());

        assert_eq!(windows, [WindowSpec::bar(0), WindowSpec::dashboard()]);
        assert_eq!(windows[0].name, "bar-0");
        assert_eq!(windows[0].monitor, Some(0));
    }

    #[test]
    fn bar_monitor_follows_config() {
        let mut config = Config::default();
        config.bar.monitor = 2;

        let windows = registered_windows(&config);
        assert_eq!(windows[0].monitor, Some(2));
        assert_eq!(windows[0].name, "bar-2");
    }

    #[test]
    fn dashboard_is_anchored_right_and_not_exclusive() {
        let dashboard = WindowSpec::dashboard();

        assert_eq!(dashboard.name, "dashboard");
        assert_eq!(dashboard.monitor, None);
        assert!(dashboard.anchor.right && dashboard.anchor.top && dashboard.anchor.bottom);
        assert!(!dashboard.anchor.left);
        assert!(!dashboard.exclusive);
        assert_eq!(dashboard.kind, WindowKind::Dashboard);
    }
}
