// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A render context that records what it was asked to draw.

use std::borrow::Cow;
use std::sync::Arc;

use kurbo::{Affine, BezPath, Point, Rect, Shape, Size};

use crate::util::LayoutDefaults;
use crate::{
    BlendMode, BlitOrigin, Color, Error, FillRule, FixedGradient, FontFamily, FontWeight,
    ImageFormat, InterpolationMode, IntoBrush, RenderContext, StrokeStyle, Text, TextLayout,
    TextLayoutBuilder,
};

const RECORD_TOLERANCE: f64 = 0.1;

/// A render context that keeps a list of [`DrawOp`]s instead of pixels.
///
/// This is useful for testing the [`Renderer`] without a raster backend.
/// Text is measured with fixed metrics: every character is half the font
/// size wide, and the line box is 1.2 times the font size tall.
///
/// [`Renderer`]: crate::Renderer
pub struct RecordingRenderContext {
    ops: Vec<DrawOp>,
    state: DrawState,
    stack: Vec<DrawState>,
    text: RecordingText,
    blit_origin: BlitOrigin,
}

/// The context state in effect when an op was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    pub opacity: f64,
    pub blend_mode: BlendMode,
    /// How many clips are active.
    pub clips: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedBrush {
    Solid(Color),
    Gradient(FixedGradient),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        region: Option<Rect>,
        color: Color,
    },
    Fill {
        path: BezPath,
        brush: RecordedBrush,
        fill_rule: FillRule,
        state: DrawState,
    },
    Stroke {
        path: BezPath,
        brush: RecordedBrush,
        width: f64,
        style: Option<StrokeStyle>,
        state: DrawState,
    },
    Clip {
        path: BezPath,
        fill_rule: FillRule,
    },
    Text {
        text: String,
        origin: Point,
        color: Color,
        state: DrawState,
    },
    Image {
        size: (usize, usize),
        dst: Rect,
        interp: InterpolationMode,
        state: DrawState,
    },
    BlurredRect {
        rect: Rect,
        radius: f64,
        brush: RecordedBrush,
        state: DrawState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedImage {
    pub width: usize,
    pub height: usize,
}

/// Text factory for [`RecordingRenderContext`].
#[derive(Debug, Clone, Default)]
pub struct RecordingText {
    families: Vec<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordingTextLayout {
    text: String,
    font: FontFamily,
    font_size: f64,
    weight: FontWeight,
    color: Color,
}

pub struct RecordingTextLayoutBuilder {
    text: String,
    defaults: LayoutDefaults,
}

impl Default for DrawState {
    fn default() -> Self {
        DrawState {
            transform: Affine::IDENTITY,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            clips: 0,
        }
    }
}

impl RecordingRenderContext {
    pub fn new() -> RecordingRenderContext {
        RecordingRenderContext {
            ops: Vec::new(),
            state: DrawState::default(),
            stack: Vec::new(),
            text: RecordingText::default(),
            blit_origin: BlitOrigin::TopLeft,
        }
    }

    /// Pretend the named font families are installed.
    pub fn with_fonts<S: Into<Arc<str>>>(mut self, families: impl IntoIterator<Item = S>) -> Self {
        self.text.families = families.into_iter().map(Into::into).collect();
        self
    }

    /// Report a different blit origin, as a flipped platform context would.
    pub fn with_blit_origin(mut self, origin: BlitOrigin) -> Self {
        self.blit_origin = origin;
        self
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    fn record_brush(&mut self, brush: &impl IntoBrush<Self>, bbox: impl FnOnce() -> Rect) -> RecordedBrush {
        brush.make_brush(self, bbox).into_owned()
    }
}

impl Default for RecordingRenderContext {
    fn default() -> Self {
        RecordingRenderContext::new()
    }
}

impl RenderContext for RecordingRenderContext {
    type Brush = RecordedBrush;
    type Image = RecordedImage;
    type Text = RecordingText;
    type TextLayout = RecordingTextLayout;

    fn status(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn solid_brush(&mut self, color: Color) -> Self::Brush {
        RecordedBrush::Solid(color)
    }

    fn gradient(&mut self, gradient: impl Into<FixedGradient>) -> Result<Self::Brush, Error> {
        Ok(RecordedBrush::Gradient(gradient.into()))
    }

    fn clear(&mut self, region: impl Into<Option<Rect>>, color: Color) {
        self.ops.push(DrawOp::Clear {
            region: region.into(),
            color,
        });
    }

    fn stroke(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>, width: f64) {
        let brush = self.record_brush(brush, || shape.bounding_box());
        self.ops.push(DrawOp::Stroke {
            path: shape.to_path(RECORD_TOLERANCE),
            brush,
            width,
            style: None,
            state: self.state,
        });
    }

    fn stroke_styled(
        &mut self,
        shape: impl Shape,
        brush: &impl IntoBrush<Self>,
        width: f64,
        style: &StrokeStyle,
    ) {
        let brush = self.record_brush(brush, || shape.bounding_box());
        self.ops.push(DrawOp::Stroke {
            path: shape.to_path(RECORD_TOLERANCE),
            brush,
            width,
            style: Some(style.clone()),
            state: self.state,
        });
    }

    fn fill(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>) {
        let brush = self.record_brush(brush, || shape.bounding_box());
        self.ops.push(DrawOp::Fill {
            path: shape.to_path(RECORD_TOLERANCE),
            brush,
            fill_rule: FillRule::NonZero,
            state: self.state,
        });
    }

    fn fill_even_odd(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>) {
        let brush = self.record_brush(brush, || shape.bounding_box());
        self.ops.push(DrawOp::Fill {
            path: shape.to_path(RECORD_TOLERANCE),
            brush,
            fill_rule: FillRule::EvenOdd,
            state: self.state,
        });
    }

    fn clip(&mut self, shape: impl Shape, fill_rule: FillRule) {
        self.state.clips += 1;
        self.ops.push(DrawOp::Clip {
            path: shape.to_path(RECORD_TOLERANCE),
            fill_rule,
        });
    }

    fn text(&mut self) -> &mut Self::Text {
        &mut self.text
    }

    fn draw_text(&mut self, layout: &Self::TextLayout, pos: impl Into<Point>) {
        self.ops.push(DrawOp::Text {
            text: layout.text.clone(),
            origin: pos.into(),
            color: layout.color,
            state: self.state,
        });
    }

    fn save(&mut self) -> Result<(), Error> {
        self.stack.push(self.state);
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Error> {
        self.state = self.stack.pop().ok_or(Error::StackUnbalance)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(Error::StackUnbalance)
        }
    }

    fn transform(&mut self, transform: Affine) {
        self.state.transform *= transform;
    }

    fn current_transform(&self) -> Affine {
        self.state.transform
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.state.opacity *= opacity.clamp(0.0, 1.0);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend_mode = mode;
    }

    fn make_image(
        &mut self,
        width: usize,
        height: usize,
        buf: &[u8],
        format: ImageFormat,
    ) -> Result<Self::Image, Error> {
        if buf.len() < width * height * format.bytes_per_pixel() {
            return Err(Error::InvalidInput);
        }
        Ok(RecordedImage { width, height })
    }

    fn draw_image(
        &mut self,
        image: &Self::Image,
        dst_rect: impl Into<Rect>,
        interp: InterpolationMode,
    ) {
        self.ops.push(DrawOp::Image {
            size: (image.width, image.height),
            dst: dst_rect.into(),
            interp,
            state: self.state,
        });
    }

    fn blurred_rect(&mut self, rect: Rect, blur_radius: f64, brush: &impl IntoBrush<Self>) {
        let brush = self.record_brush(brush, || rect);
        self.ops.push(DrawOp::BlurredRect {
            rect,
            radius: blur_radius,
            brush,
            state: self.state,
        });
    }

    fn blit_origin(&self) -> BlitOrigin {
        self.blit_origin
    }
}

impl IntoBrush<RecordingRenderContext> for RecordedBrush {
    fn make_brush<'b>(
        &'b self,
        _ctx: &mut RecordingRenderContext,
        _bbox: impl FnOnce() -> Rect,
    ) -> Cow<'b, RecordedBrush> {
        Cow::Borrowed(self)
    }
}

impl Text for RecordingText {
    type TextLayout = RecordingTextLayout;
    type TextLayoutBuilder = RecordingTextLayoutBuilder;

    fn font_family(&mut self, family_name: &str) -> Option<FontFamily> {
        FontFamily::generic(family_name).or_else(|| {
            self.families
                .iter()
                .find(|f| f.eq_ignore_ascii_case(family_name))
                .map(|f| FontFamily::new_unchecked(f.clone()))
        })
    }

    fn load_font(&mut self, _data: &[u8]) -> Result<FontFamily, Error> {
        Err(Error::NotSupported)
    }

    fn new_text_layout(&mut self, text: &str) -> Self::TextLayoutBuilder {
        RecordingTextLayoutBuilder {
            text: text.to_owned(),
            defaults: LayoutDefaults::default(),
        }
    }
}

impl TextLayoutBuilder for RecordingTextLayoutBuilder {
    type Out = RecordingTextLayout;

    fn font(mut self, family: FontFamily, size: f64) -> Self {
        self.defaults.font = family;
        self.defaults.font_size = size;
        self
    }

    fn weight(mut self, weight: FontWeight) -> Self {
        self.defaults.weight = weight;
        self
    }

    fn text_color(mut self, color: Color) -> Self {
        self.defaults.fg_color = color;
        self
    }

    fn build(self) -> Result<Self::Out, Error> {
        if !(self.defaults.font_size.is_finite() && self.defaults.font_size > 0.0) {
            return Err(Error::InvalidInput);
        }
        Ok(RecordingTextLayout {
            text: self.text,
            font: self.defaults.font,
            font_size: self.defaults.font_size,
            weight: self.defaults.weight,
            color: self.defaults.fg_color,
        })
    }
}

impl RecordingTextLayout {
    pub fn font(&self) -> &FontFamily {
        &self.font
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }
}

impl TextLayout for RecordingTextLayout {
    fn size(&self) -> Size {
        let chars = self.text.chars().count() as f64;
        Size::new(chars * self.font_size * 0.5, self.font_size * 1.2)
    }

    fn baseline(&self) -> f64 {
        self.font_size
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_transform_is_identity() {
        let ctx = RecordingRenderContext::new();
        assert_eq!(ctx.current_transform(), Affine::default());
    }

    #[test]
    fn save_restore_scopes_state() {
        let mut ctx = RecordingRenderContext::new();
        ctx.save().unwrap();
        ctx.set_opacity(0.5);
        ctx.set_opacity(0.5);
        ctx.set_blend_mode(BlendMode::Screen);
        ctx.clip(Rect::new(0.0, 0.0, 1.0, 1.0), FillRule::NonZero);
        ctx.fill(Rect::new(0.0, 0.0, 1.0, 1.0), &Color::BLACK);
        ctx.restore().unwrap();
        ctx.fill(Rect::new(0.0, 0.0, 1.0, 1.0), &Color::BLACK);

        let states: Vec<DrawState> = ctx
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { state, .. } => Some(*state),
                _ => None,
            })
            .collect();
        assert_eq!(states[0].opacity, 0.25);
        assert_eq!(states[0].blend_mode, BlendMode::Screen);
        assert_eq!(states[0].clips, 1);
        assert_eq!(states[1], DrawState::default());
    }

    #[test]
    fn unbalanced_restore() {
        let mut ctx = RecordingRenderContext::new();
        assert!(matches!(ctx.restore(), Err(Error::StackUnbalance)));
        ctx.save().unwrap();
        assert!(matches!(ctx.finish(), Err(Error::StackUnbalance)));
    }

    #[test]
    fn font_lookup() {
        let mut ctx = RecordingRenderContext::new().with_fonts(["Inter"]);
        assert_eq!(ctx.text().font_family("serif"), Some(FontFamily::SERIF));
        assert_eq!(
            ctx.text().font_family("inter"),
            Some(FontFamily::new_unchecked("Inter"))
        );
        assert_eq!(ctx.text().font_family("Comic Sans"), None);
    }
}
