// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simple representation of color

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};

/// A datatype representing color.
///
/// Currently this is only a 32 bit RGBA value, but it will likely
/// extend to some form of wide-gamut colorspace, and in the meantime
/// is useful for giving programs proper type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Color {
    #[doc(hidden)]
    Rgba32(u32),
}

/// Errors that can occur when parsing a hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// The input string has an incorrect length
    #[error("expected 6 or 8 hex digits, found {0}")]
    WrongSize(usize),
    /// A byte in the input string is not in one of the ranges `0..=9`,
    /// `a..=f`, or `A..=F`.
    #[error("invalid hex digit '{}' at position {idx}", *byte as char)]
    NotHex { idx: usize, byte: u8 },
}

impl Color {
    /// Create a color from 8 bit per sample RGB values.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Color {
        Color::from_rgba32_u32(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 0xff)
    }

    /// Create a color from 8 bit per sample RGBA values.
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color::from_rgba32_u32(
            ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32),
        )
    }

    /// Create a color from a 32-bit rgba value (alpha as least significant byte).
    pub const fn from_rgba32_u32(rgba: u32) -> Color {
        Color::Rgba32(rgba)
    }

    /// Create a color from a 24-bit rgb value (red most significant, blue least).
    pub const fn from_rgb24_u32(rgb: u32) -> Color {
        Color::from_rgba32_u32((rgb << 8) | 0xff)
    }

    /// Attempt to create a color from a hex string.
    ///
    /// Accepts `RRGGBB` and `AARRGGBB`, optionally prefixed by `#` or `0x`.
    /// Eight digit colors carry alpha in the leading byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use drawkit::Color;
    ///
    /// let color = Color::from_hex_str("#3498db").unwrap();
    /// assert_eq!(color, Color::rgb8(0x34, 0x98, 0xdb));
    ///
    /// let translucent = Color::from_hex_str("803498db").unwrap();
    /// assert_eq!(translucent, Color::rgba8(0x34, 0x98, 0xdb, 0x80));
    /// ```
    pub fn from_hex_str(hex: &str) -> Result<Color, ColorParseError> {
        let hex = hex.trim();
        let hex = hex
            .strip_prefix('#')
            .or_else(|| hex.strip_prefix("0x"))
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        let bytes = hex.as_bytes();
        if bytes.len() != 6 && bytes.len() != 8 {
            return Err(ColorParseError::WrongSize(bytes.len()));
        }
        let mut value = 0u32;
        for (idx, &byte) in bytes.iter().enumerate() {
            let digit = hex_digit(byte).ok_or(ColorParseError::NotHex { idx, byte })?;
            value = (value << 4) | digit;
        }
        if bytes.len() == 6 {
            Ok(Color::from_rgb24_u32(value))
        } else {
            Ok(Color::from_rgba32_u32(value.rotate_left(8)))
        }
    }

    /// Create a color from four floating point values, each in the range 0.0 to 1.0.
    ///
    /// The interpretation is the same as rgba32, and no greater precision is
    /// (currently) assumed.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color::rgba8(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), unit_to_byte(a))
    }

    /// Create a color from three floating point values, each in the range 0.0 to 1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color::rgba(r, g, b, 1.0)
    }

    /// Change just the alpha value of a color.
    ///
    /// The `a` value represents alpha in the range 0.0 to 1.0.
    pub fn with_alpha(self, a: f64) -> Color {
        Color::from_rgba32_u32((self.as_rgba_u32() & !0xff) | unit_to_byte(a) as u32)
    }

    /// Multiply the alpha of a color by `factor`, in the range 0.0 to 1.0.
    pub fn multiply_alpha(self, factor: f64) -> Color {
        let (r, g, b, a) = self.as_rgba8();
        Color::rgba8(r, g, b, unit_to_byte(a as f64 / 255.0 * factor))
    }

    /// Linearly interpolate each channel between `self` and `other`.
    ///
    /// `t` is clamped to 0.0..=1.0. No gamma correction is applied.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let (r0, g0, b0, a0) = self.as_rgba8();
        let (r1, g1, b1, a1) = other.as_rgba8();
        let mix = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
        Color::rgba8(mix(r0, r1), mix(g0, g1), mix(b0, b1), mix(a0, a1))
    }

    /// Convert a color value to a 32-bit rgba value.
    pub fn as_rgba_u32(self) -> u32 {
        match self {
            Color::Rgba32(rgba) => rgba,
        }
    }

    /// Convert a color value to four 8-bit rgba values.
    pub fn as_rgba8(self) -> (u8, u8, u8, u8) {
        let rgba = self.as_rgba_u32();
        (
            (rgba >> 24 & 255) as u8,
            ((rgba >> 16) & 255) as u8,
            ((rgba >> 8) & 255) as u8,
            (rgba & 255) as u8,
        )
    }

    /// Convert a color value to four f64 values, each in the range 0.0 to 1.0.
    pub fn as_rgba(self) -> (f64, f64, f64, f64) {
        let (r, g, b, a) = self.as_rgba8();
        (
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        )
    }

    /// Returns `true` if the color has zero alpha.
    pub fn is_transparent(self) -> bool {
        self.as_rgba_u32() & 0xff == 0
    }

    /// Opaque white.
    pub const WHITE: Color = Color::rgba8(0xff, 0xff, 0xff, 0xff);

    /// Opaque black.
    pub const BLACK: Color = Color::rgba8(0, 0, 0, 0xff);

    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba8(0, 0, 0, 0);
}

fn unit_to_byte(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hex_digit(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u32),
        b'a'..=b'f' => Some((byte - b'a' + 10) as u32),
        b'A'..=b'F' => Some((byte - b'A' + 10) as u32),
        _ => None,
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:08x}", self.as_rgba_u32())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex_str(&hex).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_six_digits() {
        assert_eq!(
            Color::from_hex_str("#e74c3c"),
            Ok(Color::rgb8(0xe7, 0x4c, 0x3c))
        );
        assert_eq!(
            Color::from_hex_str("E74C3C"),
            Ok(Color::rgb8(0xe7, 0x4c, 0x3c))
        );
        assert_eq!(
            Color::from_hex_str("0x000000"),
            Ok(Color::BLACK)
        );
    }

    #[test]
    fn hex_eight_digits_are_alpha_prefixed() {
        assert_eq!(
            Color::from_hex_str("#00ffffff"),
            Ok(Color::rgba8(0xff, 0xff, 0xff, 0))
        );
        assert_eq!(
            Color::from_hex_str("#ff102030"),
            Ok(Color::rgba8(0x10, 0x20, 0x30, 0xff))
        );
    }

    #[test]
    fn hex_errors() {
        assert_eq!(Color::from_hex_str("#fff"), Err(ColorParseError::WrongSize(3)));
        assert_eq!(
            Color::from_hex_str("#12345g"),
            Err(ColorParseError::NotHex { idx: 5, byte: b'g' })
        );
    }

    #[test]
    fn lerp_midpoint() {
        let a = Color::rgba8(0, 100, 200, 255);
        let b = Color::rgba8(200, 0, 100, 55);
        assert_eq!(a.lerp(b, 0.5), Color::rgba8(100, 50, 150, 155));
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn alpha_helpers() {
        let c = Color::rgb8(10, 20, 30);
        assert_eq!(c.with_alpha(0.0), Color::rgba8(10, 20, 30, 0));
        assert_eq!(c.multiply_alpha(0.5), Color::rgba8(10, 20, 30, 128));
        assert!(Color::TRANSPARENT.is_transparent());
        assert!(!Color::BLACK.is_transparent());
    }

    #[test]
    fn deserialize_from_string() {
        let c: Color = serde_json::from_str("\"#3498db\"").unwrap();
        assert_eq!(c, Color::rgb8(0x34, 0x98, 0xdb));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
