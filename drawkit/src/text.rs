// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for fonts and text handling.
//!
//! Text commands draw a single styled run. Shaping and rasterization belong
//! to the backend; the core only needs the size of the run to anchor it.

use kurbo::Size;
use serde::Deserialize;

use crate::{Color, Error, FontFamily, FontWeight};

/// The text factory of a [`RenderContext`].
///
/// [`RenderContext`]: crate::RenderContext
pub trait Text: Clone {
    type TextLayoutBuilder: TextLayoutBuilder<Out = Self::TextLayout>;
    type TextLayout: TextLayout;

    /// Query the platform for a font with a given name, and return a
    /// [`FontFamily`] object corresponding to that font, if it is found.
    ///
    /// Generic names such as `"serif"` always resolve.
    fn font_family(&mut self, family_name: &str) -> Option<FontFamily>;

    /// Load the font data and make it available for layouts.
    ///
    /// On success, returns the family of the loaded font.
    fn load_font(&mut self, data: &[u8]) -> Result<FontFamily, Error>;

    /// Create a new layout object to display the provided `text`.
    fn new_text_layout(&mut self, text: &str) -> Self::TextLayoutBuilder;
}

/// A type that stores the style of a text run and builds a layout from it.
pub trait TextLayoutBuilder: Sized {
    type Out: TextLayout;

    /// Set the font family and point size.
    fn font(self, family: FontFamily, size: f64) -> Self;

    fn weight(self, weight: FontWeight) -> Self;

    fn text_color(self, color: Color) -> Self;

    fn build(self) -> Result<Self::Out, Error>;
}

/// A single line of laid-out text.
pub trait TextLayout: Clone {
    /// The size of the inked line box, measured from the top-left origin.
    fn size(&self) -> Size;

    /// Distance from the top of the line box to the baseline.
    fn baseline(&self) -> f64;

    /// The text this layout was built from.
    fn text(&self) -> &str;
}

/// The horizontal alignment of a text run relative to its anchor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TextAlignment {
    /// The anchor is the left edge of the run.
    #[default]
    #[serde(alias = "left")]
    Start,
    /// The anchor is the horizontal center of the run.
    #[serde(alias = "center")]
    Center,
    /// The anchor is the right edge of the run.
    #[serde(alias = "right")]
    End,
}

impl TextAlignment {
    /// How far left of the anchor a run of `width` begins.
    pub fn offset(self, width: f64) -> f64 {
        match self {
            TextAlignment::Start => 0.0,
            TextAlignment::Center => width / 2.0,
            TextAlignment::End => width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_offsets() {
        assert_eq!(TextAlignment::Start.offset(80.0), 0.0);
        assert_eq!(TextAlignment::Center.offset(80.0), 40.0);
        assert_eq!(TextAlignment::End.offset(80.0), 80.0);
    }

    #[test]
    fn alignment_from_wire() {
        let a: TextAlignment = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(a, TextAlignment::End);
        let a: TextAlignment = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(a, TextAlignment::Center);
        let a: TextAlignment = serde_json::from_str("\"Start\"").unwrap();
        assert_eq!(a, TextAlignment::Start);
    }
}
