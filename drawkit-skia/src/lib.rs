// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tiny-skia backend for drawkit.
//!
//! Everything is rasterized on the CPU into a premultiplied RGBA
//! [`Pixmap`]. Clips are kept as anti-aliased [`Mask`]s in device space.

mod text;

use std::borrow::Cow;
use std::rc::Rc;

use drawkit::kurbo::{Affine, PathEl, Point, Rect, Shape};
use drawkit::util::{compute_blurred_rect, premul, size_for_blurred_rect};
use drawkit::{
    BlendMode, Color, Error, FillRule, FixedGradient, ImageFormat, InterpolationMode, IntoBrush,
    LineCap, LineJoin, RenderContext, StrokeStyle,
};
use tiny_skia::{
    FilterQuality, GradientStop, IntSize, LinearGradient, Mask, Paint, Pattern, Pixmap,
    PixmapPaint, RadialGradient, Shader, SpreadMode, Transform,
};

pub use crate::text::*;

/// Flattening tolerance used when converting shapes to tiny-skia paths.
const TOLERANCE: f64 = 0.1;

pub struct SkiaRenderContext<'a> {
    pixmap: &'a mut Pixmap,
    text: SkiaText,
    /// Device scale, applied under the user transform and never reported.
    base: Affine,
    state: CtxState,
    stack: Vec<CtxState>,
}

#[derive(Clone)]
struct CtxState {
    transform: Affine,
    clip: Option<Rc<Mask>>,
    opacity: f64,
    blend_mode: tiny_skia::BlendMode,
}

#[derive(Clone, Debug)]
pub enum Brush {
    Solid(Color),
    Gradient(FixedGradient),
}

/// A decoded image, stored premultiplied.
#[derive(Clone)]
pub struct SkiaImage(Rc<Pixmap>);

impl Default for CtxState {
    fn default() -> Self {
        CtxState {
            transform: Affine::IDENTITY,
            clip: None,
            opacity: 1.0,
            blend_mode: tiny_skia::BlendMode::SourceOver,
        }
    }
}

impl<'a> SkiaRenderContext<'a> {
    /// Create a context that draws into `pixmap`.
    pub fn new(pixmap: &'a mut Pixmap, text: SkiaText) -> SkiaRenderContext<'a> {
        SkiaRenderContext {
            pixmap,
            text,
            base: Affine::IDENTITY,
            state: CtxState::default(),
            stack: Vec::new(),
        }
    }

    /// Draw everything scaled by `pix_scale` device pixels per point.
    pub fn with_pix_scale(mut self, pix_scale: f64) -> Self {
        self.base = Affine::scale(pix_scale);
        self
    }

    fn sk_transform(&self) -> Transform {
        affine_to_transform(self.base * self.state.transform)
    }

    fn paint_for(&self, brush: &Brush) -> Paint<'static> {
        let mut paint = Paint {
            anti_alias: true,
            blend_mode: self.state.blend_mode,
            ..Default::default()
        };
        match brush {
            Brush::Solid(color) => {
                let (r, g, b, a) = color.multiply_alpha(self.state.opacity).as_rgba8();
                paint.set_color_rgba8(r, g, b, a);
            }
            Brush::Gradient(gradient) => match gradient_shader(gradient, self.state.opacity) {
                Some(shader) => paint.shader = shader,
                None => paint.set_color_rgba8(0, 0, 0, 0),
            },
        }
        paint
    }

    fn fill_impl(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>, rule: FillRule) {
        let brush = brush.make_brush(self, || shape.bounding_box());
        let path = match to_sk_path(&shape) {
            Some(path) => path,
            None => return,
        };
        let paint = self.paint_for(&brush);
        let transform = self.sk_transform();
        self.pixmap.fill_path(
            &path,
            &paint,
            convert_fill_rule(rule),
            transform,
            self.state.clip.as_deref(),
        );
    }

    fn stroke_impl(
        &mut self,
        shape: impl Shape,
        brush: &impl IntoBrush<Self>,
        width: f64,
        style: Option<&StrokeStyle>,
    ) {
        let brush = brush.make_brush(self, || shape.bounding_box());
        let path = match to_sk_path(&shape) {
            Some(path) => path,
            None => return,
        };
        let paint = self.paint_for(&brush);
        let stroke = convert_stroke(width, style);
        let transform = self.sk_transform();
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            transform,
            self.state.clip.as_deref(),
        );
    }

    /// Composite a coverage mask tinted with `color`, its top-left corner at
    /// `origin` in user space.
    fn draw_coverage(
        &mut self,
        width: usize,
        height: usize,
        coverage: &[u8],
        color: Color,
        origin: Point,
    ) {
        let pixmap = match coverage_pixmap(width, height, coverage, color) {
            Some(pixmap) => pixmap,
            None => return,
        };
        let transform = self
            .sk_transform()
            .pre_translate(origin.x as f32, origin.y as f32);
        let paint = PixmapPaint {
            blend_mode: self.state.blend_mode,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &paint,
            transform,
            self.state.clip.as_deref(),
        );
    }
}

impl<'a> RenderContext for SkiaRenderContext<'a> {
    type Brush = Brush;
    type Text = SkiaText;
    type TextLayout = SkiaTextLayout;
    type Image = SkiaImage;

    fn status(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn solid_brush(&mut self, color: Color) -> Brush {
        Brush::Solid(color)
    }

    fn gradient(&mut self, gradient: impl Into<FixedGradient>) -> Result<Brush, Error> {
        let gradient = gradient.into();
        // tiny-skia refuses degenerate geometry; report it here rather than at draw time
        if gradient_shader(&gradient, 1.0).is_none() {
            return Err(Error::InvalidInput);
        }
        Ok(Brush::Gradient(gradient))
    }

    fn clear(&mut self, region: impl Into<Option<Rect>>, color: Color) {
        match region.into() {
            None => self.pixmap.fill(convert_color(color)),
            Some(region) => {
                if let Some(rect) = convert_rect(region) {
                    let mut paint = Paint {
                        blend_mode: tiny_skia::BlendMode::Source,
                        ..Default::default()
                    };
                    paint.set_color(convert_color(color));
                    self.pixmap
                        .fill_rect(rect, &paint, affine_to_transform(self.base), None);
                }
            }
        }
    }

    fn stroke(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>, width: f64) {
        self.stroke_impl(shape, brush, width, None);
    }

    fn stroke_styled(
        &mut self,
        shape: impl Shape,
        brush: &impl IntoBrush<Self>,
        width: f64,
        style: &StrokeStyle,
    ) {
        self.stroke_impl(shape, brush, width, Some(style));
    }

    fn fill(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>) {
        self.fill_impl(shape, brush, FillRule::NonZero);
    }

    fn fill_even_odd(&mut self, shape: impl Shape, brush: &impl IntoBrush<Self>) {
        self.fill_impl(shape, brush, FillRule::EvenOdd);
    }

    fn clip(&mut self, shape: impl Shape, fill_rule: FillRule) {
        let transform = self.sk_transform();
        let rule = convert_fill_rule(fill_rule);
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mask = match (self.state.clip.as_deref(), to_sk_path(&shape)) {
            (Some(current), Some(path)) => {
                let mut mask = current.clone();
                mask.intersect_path(&path, rule, true, transform);
                Some(mask)
            }
            (None, Some(path)) => Mask::new(width, height).map(|mut mask| {
                mask.fill_path(&path, rule, true, transform);
                mask
            }),
            // an empty clip hides everything
            (_, None) => Mask::new(width, height),
        };
        if let Some(mask) = mask {
            self.state.clip = Some(Rc::new(mask));
        }
    }

    fn text(&mut self) -> &mut Self::Text {
        &mut self.text
    }

    fn draw_text(&mut self, layout: &Self::TextLayout, pos: impl Into<Point>) {
        let pos = pos.into();
        let color = layout.fg_color.multiply_alpha(self.state.opacity);
        for glyph in layout.glyphs.iter() {
            let (metrics, coverage) = layout.font.rasterize_indexed(glyph.index, layout.px);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let origin = pos + (glyph.x as f64, glyph.y as f64);
            self.draw_coverage(metrics.width, metrics.height, &coverage, color, origin);
        }
    }

    fn save(&mut self) -> Result<(), Error> {
        self.stack.push(self.state.clone());
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Error> {
        self.state = self.stack.pop().ok_or(Error::StackUnbalance)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        if !self.stack.is_empty() {
            return Err(Error::StackUnbalance);
        }
        self.status()
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
        self.state.blend_mode = convert_blend_mode(mode);
    }

    fn make_image(
        &mut self,
        width: usize,
        height: usize,
        buf: &[u8],
        format: ImageFormat,
    ) -> Result<Self::Image, Error> {
        let bpp = format.bytes_per_pixel();
        if buf.len() < width * height * bpp {
            return Err(Error::InvalidInput);
        }
        let size = IntSize::from_wh(width as u32, height as u32).ok_or(Error::InvalidInput)?;
        let mut data = Vec::with_capacity(width * height * 4);
        for px in buf[..width * height * bpp].chunks_exact(bpp) {
            match format {
                ImageFormat::Grayscale => data.extend_from_slice(&[px[0], px[0], px[0], 255]),
                ImageFormat::Rgb => data.extend_from_slice(&[px[0], px[1], px[2], 255]),
                ImageFormat::RgbaSeparate => {
                    let a = px[3];
                    data.extend_from_slice(&[
                        premul(px[0], a),
                        premul(px[1], a),
                        premul(px[2], a),
                        a,
                    ]);
                }
                ImageFormat::RgbaPremul => data.extend_from_slice(px),
                _ => return Err(Error::NotSupported),
            }
        }
        let pixmap = Pixmap::from_vec(data, size).ok_or(Error::InvalidInput)?;
        Ok(SkiaImage(Rc::new(pixmap)))
    }

    fn draw_image(
        &mut self,
        image: &Self::Image,
        dst_rect: impl Into<Rect>,
        interp: InterpolationMode,
    ) {
        let dst = dst_rect.into();
        if dst.width() == 0.0 || dst.height() == 0.0 {
            return;
        }
        let rect = match convert_rect(dst) {
            Some(rect) => rect,
            None => return,
        };
        let pixmap: &Pixmap = &image.0;
        let to_dst = Transform::from_row(
            (dst.width() / pixmap.width() as f64) as f32,
            0.0,
            0.0,
            (dst.height() / pixmap.height() as f64) as f32,
            dst.x0 as f32,
            dst.y0 as f32,
        );
        let quality = match interp {
            InterpolationMode::NearestNeighbor => FilterQuality::Nearest,
            InterpolationMode::Bilinear => FilterQuality::Bilinear,
        };
        let paint = Paint {
            shader: Pattern::new(
                pixmap.as_ref(),
                SpreadMode::Pad,
                quality,
                self.state.opacity as f32,
                to_dst,
            ),
            blend_mode: self.state.blend_mode,
            anti_alias: true,
            ..Default::default()
        };
        let transform = self.sk_transform();
        self.pixmap
            .fill_rect(rect, &paint, transform, self.state.clip.as_deref());
    }

    fn blurred_rect(&mut self, rect: Rect, blur_radius: f64, brush: &impl IntoBrush<Self>) {
        if !(blur_radius > 0.0) {
            self.fill(rect, brush);
            return;
        }
        let brush = brush.make_brush(self, || rect);
        let color = match &*brush {
            Brush::Solid(color) => *color,
            Brush::Gradient(gradient) => gradient
                .stops()
                .first()
                .map(|s| s.color)
                .unwrap_or(Color::TRANSPARENT),
        };
        let size = size_for_blurred_rect(rect, blur_radius);
        let (width, height) = (size.width as usize, size.height as usize);
        if width == 0 || height == 0 {
            return;
        }
        let mut coverage = vec![0u8; width * height];
        let covered = compute_blurred_rect(rect, blur_radius, width, &mut coverage);
        let color = color.multiply_alpha(self.state.opacity);
        self.draw_coverage(width, height, &coverage, color, covered.origin());
    }
}

impl<'a> IntoBrush<SkiaRenderContext<'a>> for Brush {
    fn make_brush<'b>(
        &'b self,
        _ctx: &mut SkiaRenderContext<'a>,
        _bbox: impl FnOnce() -> Rect,
    ) -> Cow<'b, Brush> {
        Cow::Borrowed(self)
    }
}

impl SkiaImage {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

/// Build a premultiplied pixmap of `color` scaled by per-pixel coverage.
fn coverage_pixmap(width: usize, height: usize, coverage: &[u8], color: Color) -> Option<Pixmap> {
    let size = IntSize::from_wh(width as u32, height as u32)?;
    let (r, g, b, a) = color.as_rgba8();
    let mut data = Vec::with_capacity(width * height * 4);
    for &c in coverage.iter().take(width * height) {
        let alpha = premul(a, c);
        data.extend_from_slice(&[premul(r, alpha), premul(g, alpha), premul(b, alpha), alpha]);
    }
    Pixmap::from_vec(data, size)
}

fn gradient_shader(gradient: &FixedGradient, opacity: f64) -> Option<Shader<'static>> {
    let stops = gradient
        .stops()
        .iter()
        .map(|s| GradientStop::new(s.pos, convert_color(s.color.multiply_alpha(opacity))))
        .collect();
    match gradient {
        FixedGradient::Linear(linear) => LinearGradient::new(
            convert_point(linear.start),
            convert_point(linear.end),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ),
        FixedGradient::Radial(radial) => RadialGradient::new(
            convert_point(radial.center + radial.origin_offset),
            convert_point(radial.center),
            radial.radius as f32,
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ),
    }
}

fn to_sk_path(shape: &impl Shape) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for el in shape.path_elements(TOLERANCE) {
        match el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn convert_stroke(width: f64, style: Option<&StrokeStyle>) -> tiny_skia::Stroke {
    let mut stroke = tiny_skia::Stroke {
        width: width as f32,
        ..Default::default()
    };
    if let Some(style) = style {
        if let Some(cap) = style.line_cap {
            stroke.line_cap = convert_line_cap(cap);
        }
        if let Some(join) = style.line_join {
            stroke.line_join = convert_line_join(join);
        }
        if let Some(limit) = style.miter_limit {
            stroke.miter_limit = limit as f32;
        }
        if let Some(dash) = &style.dash {
            let intervals = dash.iter().map(|d| *d as f32).collect();
            stroke.dash = tiny_skia::StrokeDash::new(intervals, style.dash_offset as f32);
        }
    }
    stroke
}

fn convert_line_cap(line_cap: LineCap) -> tiny_skia::LineCap {
    match line_cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn convert_line_join(line_join: LineJoin) -> tiny_skia::LineJoin {
    match line_join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

fn convert_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::NonZero => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}

fn convert_blend_mode(mode: BlendMode) -> tiny_skia::BlendMode {
    use tiny_skia::BlendMode as Sk;
    match mode {
        BlendMode::Normal => Sk::SourceOver,
        BlendMode::Multiply => Sk::Multiply,
        BlendMode::Screen => Sk::Screen,
        BlendMode::Overlay => Sk::Overlay,
        BlendMode::Darken => Sk::Darken,
        BlendMode::Lighten => Sk::Lighten,
        BlendMode::ColorDodge => Sk::ColorDodge,
        BlendMode::ColorBurn => Sk::ColorBurn,
        BlendMode::HardLight => Sk::HardLight,
        BlendMode::SoftLight => Sk::SoftLight,
        BlendMode::Difference => Sk::Difference,
        BlendMode::Exclusion => Sk::Exclusion,
        BlendMode::Hue => Sk::Hue,
        BlendMode::Saturation => Sk::Saturation,
        BlendMode::Color => Sk::Color,
        BlendMode::Luminosity => Sk::Luminosity,
        BlendMode::Plus => Sk::Plus,
        BlendMode::Clear => Sk::Clear,
        BlendMode::Source => Sk::Source,
        BlendMode::DestinationOver => Sk::DestinationOver,
        BlendMode::SourceIn => Sk::SourceIn,
        BlendMode::SourceOut => Sk::SourceOut,
        BlendMode::SourceAtop => Sk::SourceAtop,
        BlendMode::DestinationIn => Sk::DestinationIn,
        BlendMode::DestinationOut => Sk::DestinationOut,
        BlendMode::DestinationAtop => Sk::DestinationAtop,
        BlendMode::Xor => Sk::Xor,
    }
}

fn convert_color(color: Color) -> tiny_skia::Color {
    let (r, g, b, a) = color.as_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn convert_point(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

fn convert_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    let rect = rect.abs();
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

/// Can't implement `From` here because both types belong to other crates.
fn affine_to_transform(affine: Affine) -> Transform {
    let a = affine.as_coeffs();
    Transform::from_row(
        a[0] as f32,
        a[1] as f32,
        a[2] as f32,
        a[3] as f32,
        a[4] as f32,
        a[5] as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn affine_coefficients_map_the_same_points() {
        let affine = Affine::translate((3.0, 4.0)) * Affine::scale_non_uniform(2.0, 5.0);
        let mut p = [tiny_skia::Point::from_xy(1.0, 1.0)];
        affine_to_transform(affine).map_points(&mut p);
        let expected = affine * Point::new(1.0, 1.0);
        assert_eq!((p[0].x as f64, p[0].y as f64), (expected.x, expected.y));
    }

    #[test]
    fn clip_limits_fill() {
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let mut ctx = SkiaRenderContext::new(&mut pixmap, SkiaText::default());
        ctx.clip(Rect::new(0.0, 0.0, 10.0, 20.0), FillRule::NonZero);
        ctx.fill(Rect::new(0.0, 0.0, 20.0, 20.0), &Color::rgb8(255, 0, 0));
        ctx.finish().unwrap();
        assert_eq!(pixel(&pixmap, 5, 5), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 15, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn opacity_scales_alpha() {
        let mut pixmap = Pixmap::new(4, 4).unwrap();
        let mut ctx = SkiaRenderContext::new(&mut pixmap, SkiaText::default());
        ctx.set_opacity(0.5);
        ctx.fill(Rect::new(0.0, 0.0, 4.0, 4.0), &Color::rgb8(0, 0, 255));
        let [_, _, b, a] = pixel(&pixmap, 1, 1);
        assert!((127..=128).contains(&a));
        assert_eq!(b, a);
    }

    #[test]
    fn restore_pops_clip() {
        let mut pixmap = Pixmap::new(8, 8).unwrap();
        let mut ctx = SkiaRenderContext::new(&mut pixmap, SkiaText::default());
        ctx.save().unwrap();
        ctx.clip(Rect::ZERO, FillRule::NonZero);
        ctx.fill(Rect::new(0.0, 0.0, 8.0, 8.0), &Color::WHITE);
        ctx.restore().unwrap();
        assert!(matches!(ctx.restore(), Err(Error::StackUnbalance)));
        ctx.fill(Rect::new(0.0, 0.0, 8.0, 8.0), &Color::BLACK);
        assert_eq!(pixel(&pixmap, 4, 4), [0, 0, 0, 255]);
    }

    #[test]
    fn separate_alpha_images_are_premultiplied() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        let mut ctx = SkiaRenderContext::new(&mut pixmap, SkiaText::default());
        let image = ctx
            .make_image(1, 1, &[255, 0, 0, 128], ImageFormat::RgbaSeparate)
            .unwrap();
        let c = image.0.pixel(0, 0).unwrap();
        assert_eq!((c.red(), c.alpha()), (128, 128));
        assert!(ctx.make_image(2, 2, &[0; 4], ImageFormat::Rgb).is_err());
    }
}
