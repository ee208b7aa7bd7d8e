//! RGBA colors as written in stroke, text and background attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Named colors usable on strokes and text.
const PEN_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("blue", 0x3333cc),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("gray", 0x808080),
    ("lightblue", 0x00c0ff),
    ("lightgreen", 0x00ff00),
    ("magenta", 0xff00ff),
    ("orange", 0xff8000),
    ("yellow", 0xffff00),
    ("white", 0xffffff),
];

/// Named colors usable on solid page backgrounds.
const BACKGROUND_COLORS: &[(&str, u32)] = &[
    ("white", 0xffffff),
    ("yellow", 0xffff80),
    ("pink", 0xffc0d4),
    ("orange", 0xffc080),
    ("blue", 0xa0e8ff),
    ("green", 0x80ffc0),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    /// Opaque color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Opaque color from a `0xRRGGBB` value.
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Parse a stroke/text color: a predefined name or `#RRGGBB[AA]`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::parse_with_palette(value, PEN_COLORS)
    }

    /// Parse a background color: a background palette name or `#RRGGBB[AA]`.
    pub fn parse_background(value: &str) -> Option<Self> {
        Self::parse_with_palette(value, BACKGROUND_COLORS)
    }

    fn parse_with_palette(value: &str, palette: &[(&str, u32)]) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        palette
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
            .map(|&(_, rgb)| Self::from_rgb_u32(rgb))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Some(Self::from_rgb_u32(value)),
            8 => Some(Self {
                r: (value >> 24) as u8,
                g: (value >> 16) as u8,
                b: (value >> 8) as u8,
                a: value as u8,
            }),
            _ => None,
        }
    }

    /// The color without its alpha channel, as `0xRRGGBB`.
    pub fn to_rgb_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("black"), Some(Color::BLACK));
        assert_eq!(Color::parse("blue"), Some(Color::from_rgb_u32(0x3333cc)));
        assert_eq!(Color::parse("pink"), None);
        assert_eq!(
            Color::parse_background("pink"),
            Some(Color::from_rgb_u32(0xffc0d4))
        );
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#000000"), Some(Color::BLACK));
        assert_eq!(Color::parse("#ffffff"), Some(Color::WHITE));
        let translucent = Color::parse("#ff000080").unwrap();
        assert_eq!(translucent.r, 0xff);
        assert_eq!(translucent.a, 0x80);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::BLACK.to_string(), "#000000ff");
        assert_eq!(Color::from_rgb_u32(0x3333cc).to_rgb_u32(), 0x3333cc);
    }
}
