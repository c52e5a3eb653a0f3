use iced::{Element, widget::text};
use terraflow_core::modules::clock::Clock;

use crate::app::Message;

pub fn render_clock(clock: &Clock) -> Element<'_, Message> {
    text(clock.label()).into()
}
