use iced::{Color, Element, Theme, daemon::Appearance, widget::Row, window::Id};
use terraflow_core::{style::terraflow_theme, windows::WindowKind};

use super::{App, Message};
use crate::views::{
    bar::{BarModules, render_bar},
    dashboard::render_dashboard,
};

impl App {
    pub fn title(&self, _id: Id) -> String {
        String::from("terraflow")
    }

    pub fn theme(&self, _id: Id) -> Theme {
        terraflow_theme(&self.stylesheet)
    }

    pub fn style(&self, theme: &Theme) -> Appearance {
        Appearance {
            background_color: Color::TRANSPARENT,
            text_color: theme.palette().text,
            icon_color: theme.palette().text,
        }
    }

    pub fn view(&self, id: Id) -> Element<'_, Message> {
        match self.outputs.kind(id) {
            Some(WindowKind::Bar) => render_bar(
                &self.bar,
                BarModules {
                    workspaces: &self.workspaces,
                    window_title: &self.window_title,
                    clock: &self.clock,
                    battery: &self.battery,
                },
                self.stylesheet.opacity,
            ),
            Some(WindowKind::Dashboard) => render_dashboard(&self.dashboard, self.stylesheet.opacity),
            None => Row::new().into(),
        }
    }
}
