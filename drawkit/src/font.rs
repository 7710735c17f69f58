// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font families and weights.

use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// A reference to a font family.
///
/// This is either one of the CSS-style generic families (`serif`,
/// `sans-serif`, `monospace`, `system-ui`) or an explicit family name that a
/// [`Text`] factory resolved against its font registry.
///
/// [`Text`]: crate::Text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontFamily(FontFamilyInner);

/// The inner representation of a font family.
///
/// This is not public API; it is exposed for backends only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[doc(hidden)]
#[non_exhaustive]
pub enum FontFamilyInner {
    Serif,
    SansSerif,
    Monospace,
    SystemUi,
    Named(Arc<str>),
}

/// A font weight, represented as a value in the range 1..=1000.
///
/// This follows the [CSS `font-weight`] property.
///
/// [CSS `font-weight`]: https://developer.mozilla.org/en-US/docs/Web/CSS/font-weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(u16);

impl FontFamily {
    /// A sans-serif font, such as Arial or Helvetica.
    pub const SANS_SERIF: FontFamily = FontFamily(FontFamilyInner::SansSerif);
    /// A serif font, such as Times New Roman or Charter.
    pub const SERIF: FontFamily = FontFamily(FontFamilyInner::Serif);
    /// Whatever font the backend treats as its default.
    pub const SYSTEM_UI: FontFamily = FontFamily(FontFamilyInner::SystemUi);
    /// A monospace font.
    pub const MONOSPACE: FontFamily = FontFamily(FontFamilyInner::Monospace);

    /// Create a new font family with a given name, without verifying that it exists.
    ///
    /// Prefer [`Text::font_family`], which checks the name against the
    /// backend's fonts.
    ///
    /// [`Text::font_family`]: crate::Text::font_family
    pub fn new_unchecked(s: impl Into<Arc<str>>) -> Self {
        FontFamily(FontFamilyInner::Named(s.into()))
    }

    /// Map a generic CSS family name to its constant, if it is one.
    pub fn generic(name: &str) -> Option<FontFamily> {
        match name.trim().to_ascii_lowercase().as_str() {
            "serif" => Some(FontFamily::SERIF),
            "sans-serif" | "sans" => Some(FontFamily::SANS_SERIF),
            "monospace" | "mono" => Some(FontFamily::MONOSPACE),
            "system-ui" | "system" => Some(FontFamily::SYSTEM_UI),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.0 {
            FontFamilyInner::Serif => "serif",
            FontFamilyInner::SansSerif => "sans-serif",
            FontFamilyInner::SystemUi => "system-ui",
            FontFamilyInner::Monospace => "monospace",
            FontFamilyInner::Named(s) => s,
        }
    }

    /// Returns `true` if this is a generic font family.
    pub fn is_generic(&self) -> bool {
        !matches!(self.0, FontFamilyInner::Named(_))
    }

    /// Backend-only API; access the inner `FontFamilyInner` enum.
    #[doc(hidden)]
    pub fn inner(&self) -> &FontFamilyInner {
        &self.0
    }
}

impl FontWeight {
    pub const THIN: FontWeight = FontWeight(100);
    pub const EXTRA_LIGHT: FontWeight = FontWeight(200);
    pub const LIGHT: FontWeight = FontWeight(300);
    pub const REGULAR: FontWeight = FontWeight(400);
    pub const NORMAL: FontWeight = FontWeight::REGULAR;
    pub const MEDIUM: FontWeight = FontWeight(500);
    pub const SEMI_BOLD: FontWeight = FontWeight(600);
    pub const BOLD: FontWeight = FontWeight(700);
    pub const EXTRA_BOLD: FontWeight = FontWeight(800);
    pub const BLACK: FontWeight = FontWeight(900);

    /// Create a new `FontWeight` with a custom value.
    ///
    /// Values will be clamped to the range 1..=1000.
    pub fn new(raw: u16) -> FontWeight {
        FontWeight(raw.clamp(1, 1000))
    }

    /// Return the raw value as a u16.
    pub const fn to_raw(self) -> u16 {
        self.0
    }

    /// How far apart two weights are, used when matching a requested weight
    /// against the weights a font registry actually holds.
    pub fn distance(self, other: FontWeight) -> u16 {
        self.0.abs_diff(other.0)
    }

    fn from_keyword(keyword: &str) -> Option<FontWeight> {
        match keyword.to_ascii_lowercase().as_str() {
            "thin" | "hairline" => Some(FontWeight::THIN),
            "extralight" | "extra-light" => Some(FontWeight::EXTRA_LIGHT),
            "light" => Some(FontWeight::LIGHT),
            "normal" | "regular" => Some(FontWeight::REGULAR),
            "medium" => Some(FontWeight::MEDIUM),
            "semibold" | "semi-bold" => Some(FontWeight::SEMI_BOLD),
            "bold" => Some(FontWeight::BOLD),
            "extrabold" | "extra-bold" => Some(FontWeight::EXTRA_BOLD),
            "black" | "heavy" => Some(FontWeight::BLACK),
            _ => None,
        }
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        FontFamily::SYSTEM_UI
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        FontWeight::REGULAR
    }
}

/// Weights arrive either as a number (`700`) or a keyword (`"bold"`).
impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeightVisitor;

        impl<'de> Visitor<'de> for WeightVisitor {
            type Value = FontWeight;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a font weight number or keyword")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FontWeight, E> {
                Ok(FontWeight::new(v.min(1000) as u16))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FontWeight, E> {
                Ok(FontWeight::new(v.clamp(1, 1000) as u16))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FontWeight, E> {
                if v.is_finite() {
                    Ok(FontWeight::new(v.round().clamp(1.0, 1000.0) as u16))
                } else {
                    Err(E::custom("font weight must be finite"))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FontWeight, E> {
                FontWeight::from_keyword(v)
                    .ok_or_else(|| E::custom(format_args!("unknown font weight '{v}'")))
            }
        }

        deserializer.deserialize_any(WeightVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_clamps() {
        assert_eq!(FontWeight::new(0).to_raw(), 1);
        assert_eq!(FontWeight::new(4000).to_raw(), 1000);
        assert_eq!(FontWeight::BOLD.distance(FontWeight::REGULAR), 300);
    }

    #[test]
    fn weight_from_wire() {
        let w: FontWeight = serde_json::from_str("700").unwrap();
        assert_eq!(w, FontWeight::BOLD);
        let w: FontWeight = serde_json::from_str("\"semibold\"").unwrap();
        assert_eq!(w, FontWeight::SEMI_BOLD);
        assert!(serde_json::from_str::<FontWeight>("\"wide\"").is_err());
    }

    #[test]
    fn generic_families() {
        assert_eq!(FontFamily::generic("Serif"), Some(FontFamily::SERIF));
        assert_eq!(FontFamily::generic("Helvetica"), None);
        assert!(FontFamily::MONOSPACE.is_generic());
        assert_eq!(FontFamily::new_unchecked("Inter").name(), "Inter");
    }
}
