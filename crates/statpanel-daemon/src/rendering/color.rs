//! Colour names and roles.

use std::collections::HashMap;
use tracing::warn;

const NAMED: &[(&str, u32)] = &[
    ("BLACK", 0x000000),
    ("WHITE", 0xFFFFFF),
    ("RED", 0xFF0000),
    ("GREEN", 0x008000),
    ("LIME", 0x00FF00),
    ("BLUE", 0x0000FF),
    ("YELLOW", 0xFFFF00),
    ("CYAN", 0x00FFFF),
    ("MAGENTA", 0xFF00FF),
    ("ORANGE", 0xFFA500),
    ("PURPLE", 0x800080),
    ("GRAY", 0x808080),
    ("GREY", 0x808080),
    ("LIGHTGRAY", 0xD3D3D3),
    ("DARKGRAY", 0xA9A9A9),
    ("NAVY", 0x000080),
];

/// Parses a colour name (case-insensitive) or `#RRGGBB` / `#RGB` into 0xRRGGBB.
pub fn parse_color(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok(),
            3 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                let (r, g, b) = ((v >> 8) & 0xF, (v >> 4) & 0xF, v & 0xF);
                Some((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11)
            }
            _ => None,
        };
    }
    NAMED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|&(_, rgb)| rgb)
}

/// Resolves an optional colour string, warning and falling back on bad input.
pub fn resolve(value: Option<&str>, fallback: u32) -> u32 {
    match value {
        None => fallback,
        Some(s) => parse_color(s).unwrap_or_else(|| {
            warn!("Unrecognised colour '{}'", s);
            fallback
        }),
    }
}

/// Colour roles used by the screen chrome and widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub content_background: u32,
    pub title_background: u32,
    pub title_text: u32,
    pub nav_buttons: u32,
    pub widget_default: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            content_background: 0x000000,
            title_background: 0x000000,
            title_text: 0xFFFFFF,
            nav_buttons: 0xFFFFFF,
            widget_default: 0xFFFFFF,
        }
    }
}

impl Palette {
    /// Builds a palette from the layout's `[colors]` table.
    pub fn from_roles(roles: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let role = |name: &str, fallback: u32| resolve(roles.get(name).map(String::as_str), fallback);
        Self {
            content_background: role("content_background", defaults.content_background),
            title_background: role("title_background", defaults.title_background),
            title_text: role("title_text", defaults.title_text),
            nav_buttons: role("nav_buttons", defaults.nav_buttons),
            widget_default: role("widget_default", defaults.widget_default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("WHITE"), Some(0xFFFFFF));
        assert_eq!(parse_color("gray"), Some(0x808080));
        assert_eq!(parse_color("#1a2B3c"), Some(0x1A2B3C));
        assert_eq!(parse_color("#f80"), Some(0xFF8800));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_palette_roles() {
        let mut roles = HashMap::new();
        roles.insert("title_background".to_string(), "NAVY".to_string());
        roles.insert("nav_buttons".to_string(), "not a colour".to_string());
        let palette = Palette::from_roles(&roles);
        assert_eq!(palette.title_background, 0x000080);
        assert_eq!(palette.nav_buttons, 0xFFFFFF);
        assert_eq!(palette.content_background, 0x000000);
    }
}
