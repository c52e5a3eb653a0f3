use iced::{
    Alignment, Element, Length, alignment,
    widget::{Row, container, text},
};
use terraflow_core::{
    HEIGHT,
    modules::{
        battery::Battery, clock::Clock, window_title::WindowTitle, workspaces::Workspaces,
    },
    style::{indicator_style, surface_style},
    windows::bar::{BarItem, BarLayout, BarRegion},
};

use super::{clock::render_clock, workspaces::render_workspaces};
use crate::app::Message;

/// Modules rendered by the bar.
pub struct BarModules<'a> {
    pub workspaces: &'a Workspaces,
    pub window_title: &'a WindowTitle,
    pub clock: &'a Clock,
    pub battery: &'a Battery,
}

fn render_item<'a>(
    item: BarItem,
    layout: &'a BarLayout,
    modules: &BarModules<'a>,
) -> Option<Element<'a, Message>> {
    match item {
        BarItem::WorkspaceStrip => Some(render_workspaces(modules.workspaces)),
        BarItem::Clock => Some(render_clock(modules.clock)),
        BarItem::Title => Some(text(layout.title()).into()),
        BarItem::ActiveWindow => modules
            .window_title
            .value()
            .map(|title| text(title).size(12).into()),
        BarItem::Battery => {
            let label = modules.battery.label()?;
            let state = modules.battery.indicator()?;
            Some(text(label).size(12).style(indicator_style(state)).into())
        }
    }
}

/// Render the bar: workspace strip and focused window at the start, clock in
/// the center, battery and title at the end.
pub fn render_bar<'a>(
    layout: &'a BarLayout,
    modules: BarModules<'a>,
    opacity: f32,
) -> Element<'a, Message> {
    let indicators = BarLayout::indicators();

    let regions: [Element<'a, Message>; 3] = BarLayout::regions().map(|region| {
        let (item, horizontal) = match region {
            BarRegion::Start(item) => (item, alignment::Horizontal::Left),
            BarRegion::Center(item) => (item, alignment::Horizontal::Center),
            BarRegion::End(item) => (item, alignment::Horizontal::Right),
        };

        let mut items = vec![item];
        for indicator in indicators {
            match (region, indicator) {
                (BarRegion::Start(_), BarRegion::Start(extra)) => items.push(extra),
                (BarRegion::Center(_), BarRegion::Center(extra)) => items.push(extra),
                (BarRegion::End(_), BarRegion::End(extra)) => items.insert(0, extra),
                _ => {}
            }
        }

        let content = Row::with_children(
            items
                .into_iter()
                .filter_map(|item| render_item(item, layout, &modules)),
        )
        .spacing(8)
        .align_y(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .align_x(horizontal)
            .align_y(alignment::Vertical::Center)
            .into()
    });

    container(
        Row::with_children(regions)
            .spacing(4)
            .width(Length::Fill)
            .height(HEIGHT as f32)
            .padding([0, 8])
            .align_y(Alignment::Center),
    )
    .style(surface_style(opacity))
    .into()
}
