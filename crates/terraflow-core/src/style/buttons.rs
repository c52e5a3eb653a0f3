use iced::{
    Background, Border, Color, Theme,
    widget::button::{self, Status},
};

use crate::modules::workspaces::FOCUSED_CLASS;

/// Builds the workspace button style closure for a button `class`.
#[must_use]
pub fn workspace_button_style(class: &'static str) -> impl Fn(&Theme, Status) -> button::Style {
    let focused = class == FOCUSED_CLASS;

    move |theme: &Theme, status: Status| {
        let palette = theme.extended_palette();
        let (background, text) = if focused {
            (palette.primary.base.color, palette.primary.base.text)
        } else {
            (palette.background.weak.color, palette.background.weak.text)
        };

        let mut base = button::Style {
            background: Some(Background::Color(background)),
            border: Border {
                width: if focused { 0.0 } else { 1.0 },
                color: palette.primary.base.color,
                radius: 16.0.into(),
            },
            text_color: text,
            ..button::Style::default()
        };

        match status {
            Status::Hovered => {
                base.background = Some(Background::Color(if focused {
                    palette.primary.strong.color
                } else {
                    palette.background.strong.color
                }));
                base
            }
            _ => base,
        }
    }
}

/// Builds the style closure for dashboard control buttons.
#[must_use]
pub fn control_button_style(opacity: f32) -> impl Fn(&Theme, Status) -> button::Style {
    move |theme, status| {
        let mut base = button::Style {
            background: Some(theme.palette().background.scale_alpha(opacity).into()),
            border: Border {
                width: 1.0,
                radius: 12.0.into(),
                color: theme.extended_palette().background.weak.color,
            },
            text_color: theme.palette().text,
            ..button::Style::default()
        };

        match status {
            Status::Hovered => {
                base.background = Some(
                    theme
                        .extended_palette()
                        .background
                        .weak
                        .color
                        .scale_alpha(opacity)
                        .into(),
                );
                base
            }
            Status::Pressed => {
                base.border.color = Color::TRANSPARENT;
                base
            }
            _ => base,
        }
    }
}
