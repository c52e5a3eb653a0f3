use crate::config::BarConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarItem {
    WorkspaceStrip,
    Clock,
    Title,
    ActiveWindow,
    Battery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarRegion {
    Start(BarItem),
    Center(BarItem),
    End(BarItem),
}

/// Layout of the bar window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarLayout {
    title: String,
}

impl BarLayout {
    pub fn new(config: &BarConfig) -> Self {
        Self {
            title: config.title.clone(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Regions from start to end. The layout does not depend on how many
    /// workspaces exist.
    pub const fn regions() -> [BarRegion; 3] {
        [
            BarRegion::Start(BarItem::WorkspaceStrip),
            BarRegion::Center(BarItem::Clock),
            BarRegion::End(BarItem::Title),
        ]
    }

    /// Status indicators placed next to the fixed regions: the focused
    /// window after the workspace strip, the battery before the title.
    pub const fn indicators() -> [BarRegion; 2] {
        [
            BarRegion::Start(BarItem::ActiveWindow),
            BarRegion::End(BarItem::Battery),
        ]
    }
}
