use iced::{
    Background, Border, Color, Theme,
    theme::{Palette, palette},
    widget::{container, text},
};

use crate::{
    config::{StyleColor, Stylesheet},
    modules::battery::IndicatorState,
};

/// Builds the TerraFlow [`Theme`] from the loaded [`Stylesheet`].
///
/// Colours with an explicit `text` entry override the text colour iced
/// derives for the matching base pair.
#[must_use]
pub fn terraflow_theme(stylesheet: &Stylesheet) -> Theme {
    Theme::custom_with_fn(
        "terraflow".to_string(),
        Palette {
            background: stylesheet.background.base(),
            text: stylesheet.text.base(),
            primary: stylesheet.primary.base(),
            success: stylesheet.success.base(),
            danger: stylesheet.danger.base(),
        },
        |palette| build_extended_palette(stylesheet, palette),
    )
}

fn build_extended_palette(stylesheet: &Stylesheet, palette: Palette) -> palette::Extended {
    let mut extended = palette::Extended::generate(palette);

    override_text(&mut extended.background.base, &stylesheet.background);
    override_text(&mut extended.primary.base, &stylesheet.primary);
    override_text(&mut extended.success.base, &stylesheet.success);
    override_text(&mut extended.danger.base, &stylesheet.danger);
    extended.is_dark = true;

    extended
}

fn override_text(pair: &mut palette::Pair, color: &StyleColor) {
    if let Some(text) = color.text() {
        pair.text = text;
    }
}

/// Background of a whole window surface at the stylesheet opacity.
#[must_use]
pub fn surface_style(opacity: f32) -> impl Fn(&Theme) -> container::Style {
    move |theme| container::Style {
        background: Some(Background::Color(
            theme.palette().background.scale_alpha(opacity),
        )),
        text_color: Some(theme.palette().text),
        border: Border {
            width: 0.0,
            radius: 0.0.into(),
            color: Color::TRANSPARENT,
        },
        ..container::Style::default()
    }
}

/// Text colour of the battery indicator.
#[must_use]
pub fn indicator_style(state: IndicatorState) -> impl Fn(&Theme) -> text::Style {
    move |theme| {
        let palette = theme.extended_palette();
        let color = match state {
            IndicatorState::Normal => theme.palette().text,
            IndicatorState::Warning => palette.danger.weak.color,
            IndicatorState::Danger => palette.danger.base.color,
            IndicatorState::Success => palette.success.base.color,
        };

        text::Style { color: Some(color) }
    }
}
