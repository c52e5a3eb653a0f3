use terraflow_proto::ports::{audio::AudioEndpoint, media::TransportAction};

use crate::modules::dashboard::TRANSPORT_ACTIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardItem {
    Label(&'static str),
    VolumeSlider(AudioEndpoint),
    BrightnessSlider,
    NetworkPicker,
    PerformanceToggle,
    MediaControls([TransportAction; 3]),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardLayout;

impl DashboardLayout {
    /// Items from top to bottom.
    pub const fn items() -> [DashboardItem; 8] {
        [
            DashboardItem::Label("Volume"),
            DashboardItem::VolumeSlider(AudioEndpoint::Speaker),
            DashboardItem::Label("Mic"),
            DashboardItem::VolumeSlider(AudioEndpoint::Microphone),
            DashboardItem::NetworkPicker,
            DashboardItem::Label("Performance Mode"),
            DashboardItem::PerformanceToggle,
            DashboardItem::MediaControls(TRANSPORT_ACTIONS),
        ]
    }

    /// Backlight controls shown below [`Self::items`].
    pub const fn system_items() -> [DashboardItem; 2] {
        [
            DashboardItem::Label("Brightness"),
            DashboardItem::BrightnessSlider,
        ]
    }
}
