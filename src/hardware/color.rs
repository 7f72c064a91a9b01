//! Color helpers shared by the status light and the display
//!
//! The status light works in `smart_leds::RGB8`, the display in
//! `embedded_graphics` `Rgb888`. Both are reported over the API as `#RRGGBB`.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use serde::Serializer;
use smart_leds::RGB8;
use thiserror::Error;

/// Errors from parsing a hex color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("expected 6 hex digits, got {0} characters in {1:?}")]
    Length(usize, String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

pub const BLACK: RGB8 = RGB8 { r: 0x00, g: 0x00, b: 0x00 };

/// Parse `RRGGBB`, with any number of leading `#` markers
pub fn parse_hex(hex: &str) -> Result<RGB8, ColorError> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColorError::Length(digits.chars().count(), hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorError::Digits(hex.to_string()))
    };

    Ok(RGB8 {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// `#RRGGBB`, upper case
pub fn to_hex(color: RGB8) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Dim `color` to `brightness` (clamped to `0.0..=1.0`)
pub fn dimmed(color: RGB8, brightness: f32) -> RGB8 {
    let level = (brightness.clamp(0.0, 1.0) * 255.0).round() as u8;
    smart_leds::brightness(std::iter::once(color), level)
        .next()
        .unwrap_or(BLACK)
}

/// Same color on the display side
pub fn to_rgb888(color: RGB8) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

pub fn serialize_rgb8<S: Serializer>(color: &RGB8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex(*color))
}

pub fn serialize_rgb888<S: Serializer>(color: &Rgb888, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_rgb8(
        &RGB8 {
            r: color.r(),
            g: color.g(),
            b: color.b(),
        },
        serializer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_marker() {
        assert_eq!(parse_hex("00FF06"), Ok(RGB8 { r: 0x00, g: 0xFF, b: 0x06 }));
        assert_eq!(parse_hex("#0d00ff"), Ok(RGB8 { r: 0x0D, g: 0x00, b: 0xFF }));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_hex("#FFF"), Err(ColorError::Length(3, _))));
        assert!(matches!(parse_hex("GG0000"), Err(ColorError::Digits(_))));
        assert!(parse_hex("ééé").is_err());
    }

    #[test]
    fn test_dimmed() {
        let red = RGB8 { r: 0xEF, g: 0x08, b: 0x08 };
        assert_eq!(dimmed(red, 1.0), red);
        assert_eq!(dimmed(red, 0.0), BLACK);
        assert_eq!(dimmed(RGB8 { r: 255, g: 255, b: 255 }, 0.2), RGB8 { r: 51, g: 51, b: 51 });
        assert_eq!(dimmed(red, 7.0), red);
    }

    #[test]
    fn test_hex_roundtrips_through_parse() {
        let color = RGB8 { r: 0xE7, g: 0xFF, b: 0x00 };
        assert_eq!(to_hex(color), "#E7FF00");
        assert_eq!(parse_hex(&to_hex(color)), Ok(color));
    }

    #[test]
    fn test_display_color_matches() {
        let color = to_rgb888(RGB8 { r: 0xEF, g: 0x08, b: 0x08 });
        assert_eq!((color.r(), color.g(), color.b()), (0xEF, 0x08, 0x08));
    }
}
