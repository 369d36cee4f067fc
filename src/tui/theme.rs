use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::UiConfig;

/// Colors by role. Every field can be overridden from `[ui.colors]` using
/// the field name as the key.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Cursor bars, badges, the input prompt
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub selection_bg: Color,
    /// Placeholder bars drawn while a page loads
    pub skeleton: Color,
    pub tag_colors: HashMap<String, Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x14, 0x17, 0x1F),
            text: Color::Rgb(0xC8, 0xCE, 0xD9),
            text_bright: Color::Rgb(0xF2, 0xF4, 0xF8),
            accent: Color::Rgb(0x5E, 0xC4, 0xB6),
            muted: Color::Rgb(0x6B, 0x74, 0x85),
            error: Color::Rgb(0xE5, 0x6B, 0x6F),
            warning: Color::Rgb(0xE8, 0xC0, 0x6A),
            info: Color::Rgb(0x7A, 0xA7, 0xE8),
            selection_bg: Color::Rgb(0x25, 0x2B, 0x38),
            skeleton: Color::Rgb(0x2E, 0x34, 0x42),
            tag_colors: HashMap::from([
                ("bug".to_string(), Color::Rgb(0xE5, 0x6B, 0x6F)),
                ("docs".to_string(), Color::Rgb(0x7A, 0xA7, 0xE8)),
                ("release".to_string(), Color::Rgb(0x8F, 0xD1, 0x7E)),
            ]),
        }
    }
}

impl Theme {
    /// Defaults with the board's `[ui]` overrides applied. Unknown keys and
    /// malformed colors are ignored.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (key, value) in &ui.colors {
            if let (Some(slot), Some(color)) = (theme.slot_mut(key), parse_hex_color(value)) {
                *slot = color;
            }
        }
        theme.tag_colors.extend(
            ui.tag_colors
                .iter()
                .filter_map(|(tag, value)| Some((tag.clone(), parse_hex_color(value)?))),
        );
        theme
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        Some(match name {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "accent" => &mut self.accent,
            "muted" => &mut self.muted,
            "error" => &mut self.error,
            "warning" => &mut self.warning,
            "info" => &mut self.info,
            "selection_bg" => &mut self.selection_bg,
            "skeleton" => &mut self.skeleton,
            _ => return None,
        })
    }

    /// Color for a tag; tags without one use the body text color
    pub fn tag_color(&self, tag: &str) -> Color {
        self.tag_colors.get(tag).copied().unwrap_or(self.text)
    }
}

/// `#RRGGBB` to an RGB color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}
