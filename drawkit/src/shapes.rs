// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Options for filling, stroking and compositing paths.

use serde::Deserialize;

/// A fill rule for resolving winding numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillRule {
    /// Fill everything with a non-zero winding number.
    #[default]
    NonZero,
    /// Fill everything with an odd winding number.
    EvenOdd,
}

/// Options for stroked lines beyond color and width.
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokeStyle {
    #[serde(rename = "join")]
    pub line_join: Option<LineJoin>,
    #[serde(rename = "cap")]
    pub line_cap: Option<LineCap>,
    pub dash: Option<Vec<f64>>,
    pub dash_offset: f64,
    pub miter_limit: Option<f64>,
}

/// Options for angled joins in strokes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Options for the cap of stroked lines.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// How a command's pixels combine with what is already on the surface.
///
/// `Normal` is source-over. The separable and non-separable modes follow
/// the W3C compositing spec; the Porter-Duff modes are named after their
/// operators.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Plus,
    Clear,
    Source,
    DestinationOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Xor,
}

impl StrokeStyle {
    pub fn new() -> StrokeStyle {
        StrokeStyle::default()
    }

    pub fn line_join(mut self, line_join: LineJoin) -> Self {
        self.line_join = Some(line_join);
        self
    }

    pub fn line_cap(mut self, line_cap: LineCap) -> Self {
        self.line_cap = Some(line_cap);
        self
    }

    pub fn dash(mut self, dashes: Vec<f64>, offset: f64) -> Self {
        self.dash = Some(dashes);
        self.dash_offset = offset;
        self
    }

    pub fn miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = Some(miter_limit);
        self
    }

    /// `true` if nothing differs from a plain butt-capped, miter-joined line.
    pub fn is_plain(&self) -> bool {
        self == &StrokeStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_style_from_wire() {
        let style: StrokeStyle =
            serde_json::from_str(r#"{"cap": "round", "join": "bevel", "dash": [4, 2]}"#).unwrap();
        assert_eq!(style.line_cap, Some(LineCap::Round));
        assert_eq!(style.line_join, Some(LineJoin::Bevel));
        assert_eq!(style.dash, Some(vec![4.0, 2.0]));
        assert!(!style.is_plain());
        assert!(StrokeStyle::new().is_plain());
    }

    #[test]
    fn blend_mode_names() {
        let mode: BlendMode = serde_json::from_str("\"colorDodge\"").unwrap();
        assert_eq!(mode, BlendMode::ColorDodge);
        let mode: BlendMode = serde_json::from_str("\"destinationOver\"").unwrap();
        assert_eq!(mode, BlendMode::DestinationOver);
        assert_eq!(BlendMode::default(), BlendMode::Normal);
        let rule: FillRule = serde_json::from_str("\"evenOdd\"").unwrap();
        assert_eq!(rule, FillRule::EvenOdd);
    }
}
