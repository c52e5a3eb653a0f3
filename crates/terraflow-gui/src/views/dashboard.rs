use iced::{
    Alignment, Element, Length,
    widget::{Column, Row, button, container, slider, text, toggler},
};
use terraflow_core::{
    modules::dashboard::{Dashboard, Message as DashboardMessage, VOLUME_STEP},
    outputs::DASHBOARD_WIDTH,
    style::{control_button_style, surface_style},
    windows::dashboard::{DashboardItem, DashboardLayout},
};
use terraflow_proto::ports::{
    audio::AudioEndpoint, brightness::MAX_BRIGHTNESS, media::TransportAction,
};

use crate::app::Message;

/// Render the dashboard controls top to bottom.
pub fn render_dashboard(dashboard: &Dashboard, opacity: f32) -> Element<'_, Message> {
    let items = DashboardLayout::items()
        .into_iter()
        .chain(DashboardLayout::system_items())
        .map(|item| render_item(dashboard, item, opacity));

    container(
        Column::with_children(items)
            .spacing(12)
            .padding(16)
            .width(Length::Fixed(DASHBOARD_WIDTH as f32)),
    )
    .height(Length::Fill)
    .style(surface_style(opacity))
    .into()
}

fn render_item(dashboard: &Dashboard, item: DashboardItem, opacity: f32) -> Element<'_, Message> {
    match item {
        DashboardItem::Label(label) => text(label).size(14).into(),
        DashboardItem::VolumeSlider(endpoint) => volume_slider(dashboard, endpoint, opacity),
        DashboardItem::BrightnessSlider => brightness_slider(dashboard),
        DashboardItem::NetworkPicker => button(text(dashboard.network().label()))
            .style(control_button_style(opacity))
            .padding([4, 12])
            .width(Length::Fill)
            .into(),
        DashboardItem::PerformanceToggle => toggler(dashboard.performance().is_active())
            .on_toggle(|active| Message::Dashboard(DashboardMessage::PerformanceToggled(active)))
            .into(),
        DashboardItem::MediaControls(actions) => Row::with_children(
            actions
                .into_iter()
                .map(|action| transport_button(action, opacity)),
        )
        .spacing(8)
        .align_y(Alignment::Center)
        .into(),
    }
}

fn volume_slider(
    dashboard: &Dashboard,
    endpoint: AudioEndpoint,
    opacity: f32,
) -> Element<'_, Message> {
    let state = dashboard.slider(endpoint);
    let value = state.value().unwrap_or_default();

    let mute = button(text(if state.is_muted() { "Unmute" } else { "Mute" }).size(12))
        .style(control_button_style(opacity))
        .padding([2, 8])
        .on_press(Message::Dashboard(DashboardMessage::MuteToggled(endpoint)));

    Row::new()
        .push(mute)
        .push(
            slider(0.0..=1.0, value, move |volume| {
                Message::Dashboard(DashboardMessage::VolumeChanged(endpoint, volume))
            })
            .on_release(Message::Dashboard(DashboardMessage::VolumeReleased(endpoint)))
            .step(VOLUME_STEP)
            .width(Length::Fill),
        )
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
}

fn brightness_slider(dashboard: &Dashboard) -> Element<'_, Message> {
    let value = dashboard.brightness().value().unwrap_or_default();

    slider(0..=MAX_BRIGHTNESS, value, |percent| {
        Message::Dashboard(DashboardMessage::BrightnessChanged(percent))
    })
    .on_release(Message::Dashboard(DashboardMessage::BrightnessReleased))
    .width(Length::Fill)
    .into()
}

fn transport_button<'a>(action: TransportAction, opacity: f32) -> Element<'a, Message> {
    button(text(action.label()))
        .style(control_button_style(opacity))
        .padding([4, 12])
        .on_press(Message::Dashboard(DashboardMessage::Transport(action)))
        .into()
}
