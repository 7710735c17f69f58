// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-context abstraction backends implement.

use std::borrow::Cow;

use kurbo::{Affine, Point, Rect, Shape};

use crate::{
    BlendMode, Color, Error, FillRule, FixedGradient, ImageFormat, InterpolationMode, StrokeStyle, Text,
    TextLayout,
};

/// Where a context's image and text primitives put their origin.
///
/// Command coordinates are always top-left, Y-down. A context that blits
/// images and glyphs with a bottom-left origin reports `BottomLeft` and the
/// [`Renderer`] flips those blits to compensate.
///
/// [`Renderer`]: crate::Renderer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BlitOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// The main trait for rendering graphics.
///
/// This trait provides an API for drawing 2D graphics. In basic usage, it
/// wraps a surface of some kind, so that drawing commands paint onto the
/// surface. It can also be a recording context, creating a display list for
/// playback later.
///
/// The intent of the design is to be general so that any number of back-ends
/// can implement this trait.
///
/// Code that draws graphics will in general take `&mut impl RenderContext`.
pub trait RenderContext
where
    Self::Brush: IntoBrush<Self>,
{
    /// The type of a "brush".
    ///
    /// Represents solid colors and gradients.
    type Brush: Clone;

    /// An associated factory for creating text layouts and related resources.
    type Text: Text<TextLayout = Self::TextLayout>;

    /// The type use to represent text layout objects.
    type TextLayout: TextLayout;

    /// The associated type of an image.
    type Image;

    /// Report an internal error.
    ///
    /// Drawing operations may cause internal errors, which may also occur
    /// asynchronously after the drawing call was issued. This method reports
    /// any such error that has been detected.
    fn status(&mut self) -> Result<(), Error>;

    /// Create a new brush resource.
    fn solid_brush(&mut self, color: Color) -> Self::Brush;

    /// Create a new gradient brush.
    fn gradient(&mut self, gradient: impl Into<FixedGradient>) -> Result<Self::Brush, Error>;

    /// Replace a region of the canvas with the provided [`Color`].
    ///
    /// The region can be omitted, in which case it will apply to the entire
    /// canvas. This operation ignores any existing clipping and transformations.
    fn clear(&mut self, region: impl Into<Option<Rect>>, color: Color);

    /// Stroke a [`Shape`], using the default [`StrokeStyle`].
    fn stroke(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>, width: f64);

    /// Stroke a [`Shape`], providing a custom [`StrokeStyle`].
    fn stroke_styled(
        &mut self,
        shape: impl Shape,
        brush: &impl IntoBrush<Self>,
        width: f64,
        style: &StrokeStyle,
    );

    /// Fill a [`Shape`], using the [non-zero fill rule].
    ///
    /// [non-zero fill rule]: https://en.wikipedia.org/wiki/Nonzero-rule
    fn fill(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>);

    /// Fill a shape, using the [even-odd fill rule].
    ///
    /// [even-odd fill rule]: https://en.wikipedia.org/wiki/Even–odd_rule
    fn fill_even_odd(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>);

    /// Clip to a [`Shape`].
    ///
    /// All subsequent drawing operations up to the next [`restore`] are
    /// clipped by the shape, with its interior decided by `fill_rule`.
    /// Clips intersect.
    ///
    /// [`restore`]: RenderContext::restore
    fn clip(&mut self, shape: impl Shape, fill_rule: FillRule);

    /// Returns a reference to a shared [`Text`] object.
    fn text(&mut self) -> &mut Self::Text;

    /// Draw a text layout with its top-left corner at `pos`.
    fn draw_text(&mut self, layout: &Self::TextLayout, pos: impl Into<Point>);

    /// Save the context state.
    ///
    /// Pushes the current context state onto a stack, to be popped by
    /// [`restore`]. The state covers the transform, the clip, the opacity
    /// and the blend mode.
    ///
    /// [`restore`]: RenderContext::restore
    fn save(&mut self) -> Result<(), Error>;

    /// Restore the context state.
    ///
    /// Pop a context state that was pushed by [`save`]. Popping an empty
    /// stack is [`Error::StackUnbalance`].
    ///
    /// [`save`]: RenderContext::save
    fn restore(&mut self) -> Result<(), Error>;

    /// Do graphics operations with the context state saved and then restored.
    ///
    /// Equivalent to [`save`], calling `f`, then [`restore`].
    ///
    /// [`save`]: RenderContext::save
    /// [`restore`]: RenderContext::restore
    fn with_save(&mut self, f: impl FnOnce(&mut Self) -> Result<(), Error>) -> Result<(), Error> {
        self.save()?;
        let result = f(self);
        self.restore()?;
        result
    }

    /// Finish any pending operations.
    ///
    /// This will generally be called by a shell after all user drawing
    /// operations but before presenting.
    fn finish(&mut self) -> Result<(), Error>;

    /// Apply a transform.
    ///
    /// Apply an affine transformation. The transformation remains in effect
    /// until a [`restore`] operation.
    ///
    /// [`restore`]: RenderContext::restore
    fn transform(&mut self, transform: Affine);

    /// Returns the transformations currently applied to the context.
    fn current_transform(&self) -> Affine;

    /// Multiply the alpha of everything drawn until the next [`restore`].
    ///
    /// Opacities compose: two nested calls with `0.5` draw at quarter alpha.
    ///
    /// [`restore`]: RenderContext::restore
    fn set_opacity(&mut self, opacity: f64);

    /// Set the compositing mode used until the next [`restore`].
    ///
    /// [`restore`]: RenderContext::restore
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Create a new image from a pixel buffer.
    fn make_image(
        &mut self,
        width: usize,
        height: usize,
        buf: &[u8],
        format: ImageFormat,
    ) -> Result<Self::Image, Error>;

    /// Draw an image, scaled to fill `dst_rect`.
    fn draw_image(
        &mut self,
        image: &Self::Image,
        dst_rect: impl Into<Rect>,
        interp: InterpolationMode,
    );

    /// Draw a rectangle with Gaussian blur.
    ///
    /// The blur radius is sometimes referred to as the "standard deviation" of
    /// the blur.
    fn blurred_rect(&mut self, rect: Rect, blur_radius: f64, brush: &impl IntoBrush<Self>);

    /// The origin convention of this context's image and text blits.
    fn blit_origin(&self) -> BlitOrigin {
        BlitOrigin::TopLeft
    }
}

/// A trait for various types that can be used as brushes.
///
/// These include backend-independent types such [`Color`] and
/// [`FixedGradient`], as well as the native brush type of the backend.
pub trait IntoBrush<P: RenderContext>
where
    P: ?Sized,
{
    fn make_brush<'a>(&'a self, ctx: &mut P, bbox: impl FnOnce() -> Rect) -> Cow<'a, P::Brush>;
}

impl<P: RenderContext> IntoBrush<P> for Color {
    fn make_brush<'a>(&'a self, ctx: &mut P, _bbox: impl FnOnce() -> Rect) -> Cow<'a, P::Brush> {
        Cow::Owned(ctx.solid_brush(*self))
    }
}

/// A gradient that a backend refuses falls back to its first stop's color.
impl<P: RenderContext> IntoBrush<P> for FixedGradient {
    fn make_brush<'a>(&'a self, ctx: &mut P, _bbox: impl FnOnce() -> Rect) -> Cow<'a, P::Brush> {
        match ctx.gradient(self.clone()) {
            Ok(brush) => Cow::Owned(brush),
            Err(e) => {
                log::warn!("gradient brush rejected: {e}");
                let fallback = self.stops().first().map(|s| s.color);
                Cow::Owned(ctx.solid_brush(fallback.unwrap_or(Color::TRANSPARENT)))
            }
        }
    }
}
