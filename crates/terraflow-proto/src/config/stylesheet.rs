use hex_color::HexColor;
use iced::Color;
use serde::Deserialize;

use super::serde_helpers::opacity_deserializer;

/// A palette entry in the stylesheet.
///
/// Accepts either a bare hex string (`"#1e1e2e"`) or a table with a `base`
/// colour and an optional `text` colour drawn on top of it.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum StyleColor {
    Simple(HexColor),
    Complete {
        base: HexColor,
        text: Option<HexColor>,
    },
}

impl StyleColor {
    /// Returns the base [`Color`].
    #[must_use]
    pub fn base(&self) -> Color {
        match self {
            StyleColor::Simple(color) | StyleColor::Complete { base: color, .. } => {
                Color::from_rgb8(color.r, color.g, color.b)
            }
        }
    }

    /// Returns the text [`Color`] drawn on top of the base, if configured.
    #[must_use]
    pub fn text(&self) -> Option<Color> {
        match self {
            StyleColor::Simple(_) => None,
            StyleColor::Complete { text, .. } => {
                text.map(|color| Color::from_rgb8(color.r, color.g, color.b))
            }
        }
    }
}

/// Global look of both shell windows, loaded from the stylesheet path.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Stylesheet {
    #[serde(deserialize_with = "opacity_deserializer", default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_background_color")]
    pub background: StyleColor,
    #[serde(default = "default_text_color")]
    pub text: StyleColor,
    #[serde(default = "default_primary_color")]
    pub primary: StyleColor,
    #[serde(default = "default_success_color")]
    pub success: StyleColor,
    #[serde(default = "default_danger_color")]
    pub danger: StyleColor,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_background_color() -> StyleColor {
    StyleColor::Simple(HexColor::rgb(30, 30, 46))
}

fn default_text_color() -> StyleColor {
    StyleColor::Simple(HexColor::rgb(205, 214, 244))
}

fn default_primary_color() -> StyleColor {
    StyleColor::Complete {
        base: HexColor::rgb(250, 179, 135),
        text: Some(HexColor::rgb(30, 30, 46)),
    }
}

fn default_success_color() -> StyleColor {
    StyleColor::Simple(HexColor::rgb(166, 227, 161))
}

fn default_danger_color() -> StyleColor {
    StyleColor::Simple(HexColor::rgb(243, 139, 168))
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            background: default_background_color(),
            text: default_text_color(),
            primary: default_primary_color(),
            success: default_success_color(),
            danger: default_danger_color(),
        }
    }
}
