// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting a command list into a [`RenderContext`].

use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, RoundedRect, Shape, Size, Vec2};
use serde::Deserialize;

use crate::command::{extent, finite};
use crate::util::DEFAULT_TEXT_COLOR;
use crate::{
    BlendMode, BlitOrigin, Color, CommandError, CommandKind, DrawCommand, Error, FillRule,
    FontFamily, ImageBuf, ImageCommand, IntoBrush, Paint, PointMode, PointsCommand,
    RenderContext, ResolvedPaint, ResourceRegistry, ShadowCommand, Snapshot, Stroke, Style, Text,
    TextCommand, TextLayout, TextLayoutBuilder, DEFAULT_TOLERANCE,
};

/// Tunables for the [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// How many flat wedges a sweep gradient is split into.
    pub sweep_wedges: usize,
    /// Flattening tolerance for curves built from commands.
    pub tolerance: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            sweep_wedges: 360,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// What happened during one paint pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaintReport {
    pub drawn: usize,
    pub skipped: usize,
}

/// Walks a command list in order and paints each command.
///
/// A command that cannot be drawn is logged and skipped; it never stops the
/// rest of the list. Only failures of the context itself are returned.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
    resources: ResourceRegistry,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Renderer {
        Renderer {
            options,
            resources: ResourceRegistry::new(),
        }
    }

    pub fn with_resources(mut self, resources: ResourceRegistry) -> Self {
        self.resources = resources;
        self
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Paint a whole frame: the background, then every command.
    pub fn paint<P: RenderContext>(
        &self,
        ctx: &mut P,
        snapshot: &Snapshot,
    ) -> Result<PaintReport, Error> {
        ctx.clear(None, snapshot.background().unwrap_or(Color::TRANSPARENT));
        self.paint_commands(ctx, snapshot.size(), snapshot.commands())
    }

    /// Paint `commands` over whatever the context already holds.
    pub fn paint_commands<P, C>(
        &self,
        ctx: &mut P,
        size: Size,
        commands: &[C],
    ) -> Result<PaintReport, Error>
    where
        P: RenderContext,
        C: AsRef<DrawCommand>,
    {
        let canvas = size.to_rect();
        let mut report = PaintReport::default();
        for (idx, command) in commands.iter().enumerate() {
            let command = command.as_ref();
            ctx.save()?;
            if command.style.opacity < 1.0 {
                ctx.set_opacity(command.style.opacity.max(0.0));
            }
            if command.style.blend_mode != BlendMode::Normal {
                ctx.set_blend_mode(command.style.blend_mode);
            }
            let result = self.draw_command(ctx, canvas, command);
            ctx.restore()?;
            match result {
                Ok(()) => report.drawn += 1,
                Err(e) => {
                    log::warn!("skipping {} command {idx}: {e}", command.kind.name());
                    report.skipped += 1;
                }
            }
        }
        log::debug!(
            "painted {} commands, skipped {}",
            report.drawn,
            report.skipped
        );
        ctx.status()?;
        Ok(report)
    }

    fn draw_command<P: RenderContext>(
        &self,
        ctx: &mut P,
        canvas: Rect,
        command: &DrawCommand,
    ) -> Result<(), CommandError> {
        let style = &command.style;
        match &command.kind {
            CommandKind::Image(image) => self.draw_image(ctx, image),
            CommandKind::Text(text) => draw_text(ctx, text, style),
            CommandKind::Points(points) => draw_points(ctx, points, style),
            CommandKind::Fill => {
                let paint = style.fill.as_ref().ok_or(CommandError::MissingPaint)?;
                let path = canvas.to_path(self.options.tolerance);
                self.fill(ctx, &path, FillRule::NonZero, paint.resolve())
            }
            CommandKind::ColorFill(fill) => {
                ctx.fill(canvas, &fill.color);
                Ok(())
            }
            CommandKind::Shadow(shadow) => draw_shadow(ctx, shadow),
            kind => {
                let geometry = kind
                    .geometry(self.options.tolerance)?
                    .ok_or(CommandError::Geometry("shape"))?;
                let stroke_only = kind.is_stroke_only();
                let fill = match &style.fill {
                    _ if stroke_only => None,
                    Some(paint) => Some(paint.resolve()),
                    None if style.stroke.is_none() => Some(ResolvedPaint::Solid(Color::BLACK)),
                    None => None,
                };
                if let Some(paint) = fill {
                    self.fill(ctx, &geometry.path, geometry.fill_rule, paint)?;
                }
                let stroke = style
                    .stroke
                    .clone()
                    .or_else(|| stroke_only.then(Stroke::default));
                if let Some(stroke) = stroke {
                    stroke_path(ctx, &geometry.path, &stroke);
                }
                Ok(())
            }
        }
    }

    fn fill<P: RenderContext>(
        &self,
        ctx: &mut P,
        path: &BezPath,
        fill_rule: FillRule,
        paint: ResolvedPaint,
    ) -> Result<(), CommandError> {
        match paint {
            ResolvedPaint::Solid(color) => fill_with_rule(ctx, path, fill_rule, &color),
            ResolvedPaint::Fixed(gradient) => ctx.with_save(|ctx| {
                ctx.clip(path, fill_rule);
                ctx.fill(path.bounding_box(), &gradient);
                Ok(())
            })?,
            ResolvedPaint::Sweep(sweep) => {
                let bbox = path.bounding_box();
                let radius = [
                    Point::new(bbox.x0, bbox.y0),
                    Point::new(bbox.x1, bbox.y0),
                    Point::new(bbox.x0, bbox.y1),
                    Point::new(bbox.x1, bbox.y1),
                ]
                .iter()
                .map(|corner| corner.distance(sweep.center))
                .fold(0.0, f64::max)
                    + 1.0;
                ctx.with_save(|ctx| {
                    ctx.clip(path, fill_rule);
                    for (wedge, color) in sweep.wedges(self.options.sweep_wedges, radius) {
                        ctx.fill(wedge, &color);
                    }
                    Ok(())
                })?
            }
        }
        Ok(())
    }

    fn draw_image<P: RenderContext>(
        &self,
        ctx: &mut P,
        command: &ImageCommand,
    ) -> Result<(), CommandError> {
        finite(&[command.x, command.y], "image origin")?;
        extent(&[command.width, command.height], "image size")?;
        let decoded;
        let buf = match (&command.data, &command.resource) {
            (Some(data), _) => {
                decoded = ImageBuf::from_base64(data)?;
                &decoded
            }
            (None, Some(name)) => self
                .resources
                .image(name)
                .ok_or_else(|| CommandError::UnknownResource(name.clone()))?,
            (None, None) => return Err(CommandError::MissingImage),
        };
        let image = buf.to_image(ctx)?;
        let dst = Rect::new(
            command.x,
            command.y,
            command.x + command.width,
            command.y + command.height,
        );
        let interp = command.interpolation;
        if ctx.blit_origin() == BlitOrigin::BottomLeft {
            ctx.with_save(|ctx| {
                ctx.transform(flip_about(dst));
                ctx.draw_image(&image, dst, interp);
                Ok(())
            })?;
        } else {
            ctx.draw_image(&image, dst, interp);
        }
        Ok(())
    }
}

fn draw_text<P: RenderContext>(
    ctx: &mut P,
    command: &TextCommand,
    style: &Style,
) -> Result<(), CommandError> {
    finite(&[command.x, command.y], "text origin")?;
    if !(command.font_size.is_finite() && command.font_size > 0.0) {
        return Err(CommandError::Geometry("font size"));
    }
    let family = match &command.font_family {
        Some(name) => ctx.text().font_family(name).unwrap_or_else(|| {
            log::warn!("font family '{name}' not found, using the system font");
            FontFamily::SYSTEM_UI
        }),
        None => FontFamily::default(),
    };
    let color = command
        .color
        .or_else(|| style.fill.as_ref().and_then(Paint::as_solid))
        .unwrap_or(DEFAULT_TEXT_COLOR);
    let layout = ctx
        .text()
        .new_text_layout(&command.text)
        .font(family, command.font_size)
        .weight(command.font_weight)
        .text_color(color)
        .build()?;
    let size = layout.size();
    let origin = Point::new(command.x - command.align.offset(size.width), command.y);
    if ctx.blit_origin() == BlitOrigin::BottomLeft {
        ctx.with_save(|ctx| {
            ctx.transform(flip_about(Rect::from_origin_size(origin, size)));
            ctx.draw_text(&layout, origin);
            Ok(())
        })?;
    } else {
        ctx.draw_text(&layout, origin);
    }
    Ok(())
}

fn draw_points<P: RenderContext>(
    ctx: &mut P,
    command: &PointsCommand,
    style: &Style,
) -> Result<(), CommandError> {
    if command
        .points
        .iter()
        .any(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(CommandError::Geometry("point"));
    }
    let stroke = style.stroke.clone().unwrap_or_else(|| {
        let color = style
            .fill
            .as_ref()
            .and_then(Paint::as_solid)
            .unwrap_or(Color::BLACK);
        Stroke::new(color, 1.0)
    });
    match command.mode {
        PointMode::Points => {
            let radius = command.point_size.unwrap_or(stroke.width).max(0.0) / 2.0;
            for &p in &command.points {
                ctx.fill(Circle::new(p, radius), &stroke.color);
            }
        }
        PointMode::Lines => {
            for pair in command.points.chunks_exact(2) {
                stroke_path(ctx, Line::new(pair[0], pair[1]), &stroke);
            }
        }
        PointMode::Polygon => {
            let mut points = command.points.iter();
            if let Some(&first) = points.next() {
                let mut path = BezPath::new();
                path.move_to(first);
                for &p in points {
                    path.line_to(p);
                }
                stroke_path(ctx, &path, &stroke);
            }
        }
    }
    Ok(())
}

fn draw_shadow<P: RenderContext>(
    ctx: &mut P,
    command: &ShadowCommand,
) -> Result<(), CommandError> {
    finite(
        &[command.x, command.y, command.offset_x, command.offset_y],
        "shadow origin",
    )?;
    extent(
        &[
            command.width,
            command.height,
            command.blur_radius,
            command.corner_radius,
        ],
        "shadow size",
    )?;
    let rect = Rect::new(
        command.x,
        command.y,
        command.x + command.width,
        command.y + command.height,
    ) + Vec2::new(command.offset_x, command.offset_y);
    if command.blur_radius > 0.0 {
        ctx.blurred_rect(rect, command.blur_radius, &command.color);
    } else if command.corner_radius > 0.0 {
        ctx.fill(RoundedRect::from_rect(rect, command.corner_radius), &command.color);
    } else {
        ctx.fill(rect, &command.color);
    }
    Ok(())
}

fn fill_with_rule<P: RenderContext>(
    ctx: &mut P,
    shape: impl Shape,
    fill_rule: FillRule,
    brush: &impl IntoBrush<P>,
) {
    match fill_rule {
        FillRule::NonZero => ctx.fill(shape, brush),
        FillRule::EvenOdd => ctx.fill_even_odd(shape, brush),
    }
}

fn stroke_path<P: RenderContext>(ctx: &mut P, shape: impl Shape, stroke: &Stroke) {
    if !(stroke.width.is_finite() && stroke.width > 0.0) {
        return;
    }
    if stroke.style.is_plain() {
        ctx.stroke(shape, &stroke.color, stroke.width);
    } else {
        ctx.stroke_styled(shape, &stroke.color, stroke.width, &stroke.style);
    }
}

/// Mirror vertically about the horizontal center line of `rect`.
fn flip_about(rect: Rect) -> Affine {
    Affine::translate((0.0, rect.y0 + rect.y1)) * Affine::FLIP_Y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parse_commands, CanvasSurface, DrawOp, DrawState, ImageFormat, RecordedBrush,
        RecordingRenderContext,
    };

    fn paint_json(ctx: &mut RecordingRenderContext, json: &str) -> PaintReport {
        paint_json_with(ctx, Renderer::default(), json)
    }

    fn paint_json_with(
        ctx: &mut RecordingRenderContext,
        renderer: Renderer,
        json: &str,
    ) -> PaintReport {
        let mut surface = CanvasSurface::new(Size::new(400.0, 300.0), Some(Color::WHITE));
        surface.set_commands(parse_commands(json).unwrap());
        renderer.paint(ctx, &surface.snapshot()).unwrap()
    }

    #[test]
    fn paints_in_list_order_over_background() {
        let mut ctx = RecordingRenderContext::new();
        let report = paint_json(
            &mut ctx,
            r##"[
                {"type": "rect", "x": 10, "y": 10, "width": 100, "height": 50, "fill": "#3498db"},
                {"type": "circle", "cx": 200, "cy": 100, "radius": 40, "fill": "#e74c3c"}
            ]"##,
        );
        assert_eq!(report, PaintReport { drawn: 2, skipped: 0 });
        let ops = ctx.ops();
        assert_eq!(
            ops[0],
            DrawOp::Clear {
                region: None,
                color: Color::WHITE
            }
        );
        match (&ops[1], &ops[2]) {
            (
                DrawOp::Fill {
                    path: a,
                    brush: RecordedBrush::Solid(ca),
                    ..
                },
                DrawOp::Fill {
                    path: b,
                    brush: RecordedBrush::Solid(cb),
                    ..
                },
            ) => {
                assert_eq!(a.bounding_box(), Rect::new(10.0, 10.0, 110.0, 60.0));
                assert_eq!(*ca, Color::rgb8(0x34, 0x98, 0xdb));
                assert!(b.bounding_box().x0 >= a.bounding_box().x1);
                assert_eq!(*cb, Color::rgb8(0xe7, 0x4c, 0x3c));
            }
            other => panic!("unexpected ops {other:?}"),
        }
    }

    #[test]
    fn compositing_state_is_scoped_to_one_command() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "fill": "#000000",
                 "opacity": 0.5, "blendMode": "multiply"},
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "fill": "#000000"}
            ]"##,
        );
        let states: Vec<DrawState> = ctx
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { state, .. } => Some(*state),
                _ => None,
            })
            .collect();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].opacity, 0.5);
        assert_eq!(states[0].blend_mode, BlendMode::Multiply);
        assert_eq!(states[1], DrawState::default());
    }

    #[test]
    fn bad_commands_are_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut ctx = RecordingRenderContext::new();
        let report = paint_json(
            &mut ctx,
            r##"[
                {"type": "rect", "x": 0, "y": 0, "width": -5, "height": 10},
                {"type": "path", "data": "L 10 10"},
                {"type": "image", "x": 0, "y": 0, "width": 4, "height": 4, "data": "%%%"},
                {"type": "image", "x": 0, "y": 0, "width": 4, "height": 4, "resource": "nope"},
                {"type": "fill"},
                {"type": "circle", "cx": 5, "cy": 5, "radius": 2}
            ]"##,
        );
        assert_eq!(report, PaintReport { drawn: 1, skipped: 5 });
    }

    #[test]
    fn unstyled_shape_gets_black_fill_and_line_gets_black_stroke() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[
                {"type": "ellipse", "cx": 50, "cy": 50, "width": 20, "height": 10},
                {"type": "line", "x1": 0, "y1": 0, "x2": 10, "y2": 10, "fill": "#ff0000"}
            ]"##,
        );
        let ops = &ctx.ops()[1..];
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[0],
            DrawOp::Fill { brush: RecordedBrush::Solid(c), .. } if *c == Color::BLACK
        ));
        assert!(matches!(
            &ops[1],
            DrawOp::Stroke { brush: RecordedBrush::Solid(c), width, style: None, .. }
                if *c == Color::BLACK && *width == 1.0
        ));
    }

    #[test]
    fn stroke_follows_fill() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[{"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "fill": "#00ff00",
                  "stroke": {"color": "#0000ff", "width": 3, "dash": [2, 1]}}]"##,
        );
        let ops = &ctx.ops()[1..];
        assert!(matches!(ops[0], DrawOp::Fill { .. }));
        match &ops[1] {
            DrawOp::Stroke { width, style, .. } => {
                assert_eq!(*width, 3.0);
                assert_eq!(style.as_ref().and_then(|s| s.dash.clone()), Some(vec![2.0, 1.0]));
            }
            other => panic!("expected a stroke, got {other:?}"),
        }
    }

    #[test]
    fn linear_gradient_fills_bbox_inside_clip() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[{"type": "circle", "cx": 50, "cy": 50, "radius": 10, "fill": {
                "kind": "linear", "start": [40, 50], "end": [60, 50],
                "colors": ["#ff0000", "#0000ff"]}}]"##,
        );
        let ops = &ctx.ops()[1..];
        assert!(matches!(ops[0], DrawOp::Clip { fill_rule: FillRule::NonZero, .. }));
        match &ops[1] {
            DrawOp::Fill {
                path,
                brush: RecordedBrush::Gradient(_),
                state,
                ..
            } => {
                let bbox = path.bounding_box();
                assert!((bbox.width() - 20.0).abs() < 0.5);
                assert_eq!(state.clips, 1);
            }
            other => panic!("expected a gradient fill, got {other:?}"),
        }
    }

    #[test]
    fn sweep_gradient_is_painted_as_wedges() {
        let mut ctx = RecordingRenderContext::new();
        let renderer = Renderer::new(RenderOptions {
            sweep_wedges: 8,
            ..RenderOptions::default()
        });
        paint_json_with(
            &mut ctx,
            renderer,
            r##"[{"type": "rect", "x": 0, "y": 0, "width": 20, "height": 20, "fill": {
                "kind": "sweep", "center": [10, 10],
                "colors": ["#000000", "#ffffff"]}}]"##,
        );
        let ops = &ctx.ops()[1..];
        assert!(matches!(ops[0], DrawOp::Clip { .. }));
        let wedges = ops[1..]
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { state, .. } if state.clips == 1))
            .count();
        assert_eq!(wedges, 8);
    }

    #[test]
    fn single_color_gradient_is_solid() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[{"type": "rect", "x": 0, "y": 0, "width": 20, "height": 20, "fill": {
                "kind": "radial", "center": [10, 10], "endRadius": 10,
                "colors": ["#123456"]}}]"##,
        );
        assert!(matches!(
            &ctx.ops()[1],
            DrawOp::Fill { brush: RecordedBrush::Solid(c), .. } if *c == Color::rgb8(0x12, 0x34, 0x56)
        ));
    }

    #[test]
    fn text_is_aligned_and_colored() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[
                {"type": "text", "x": 100, "y": 20, "text": "abcd", "fontSize": 10,
                 "align": "center", "fontFamily": "serif"},
                {"type": "text", "x": 100, "y": 40, "text": "ab", "fontSize": 10,
                 "align": "right", "fill": "#ff0000", "fontFamily": "Missing Font"}
            ]"##,
        );
        let texts: Vec<(Point, Color)> = ctx
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { origin, color, .. } => Some((*origin, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            [
                (Point::new(90.0, 20.0), Color::BLACK),
                (Point::new(90.0, 40.0), Color::rgb8(255, 0, 0)),
            ]
        );
    }

    #[test]
    fn bottom_left_contexts_get_flipped_blits() {
        let mut ctx = RecordingRenderContext::new().with_blit_origin(BlitOrigin::BottomLeft);
        paint_json(
            &mut ctx,
            r#"[{"type": "text", "x": 0, "y": 10, "text": "hi", "fontSize": 10}]"#,
        );
        let state = ctx
            .ops()
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { state, .. } => Some(*state),
                _ => None,
            })
            .unwrap();
        // line box is 10..22, so the flip maps y to 32 - y
        let flipped = state.transform * Point::new(0.0, 10.0);
        assert!((flipped.y - 22.0).abs() < 1e-9);
    }

    #[test]
    fn images_come_from_the_registry() {
        let mut resources = ResourceRegistry::new();
        resources.insert_image(
            "dot",
            ImageBuf::from_raw(vec![255u8; 16], ImageFormat::RgbaSeparate, 2, 2).unwrap(),
        );
        let mut ctx = RecordingRenderContext::new();
        let report = paint_json_with(
            &mut ctx,
            Renderer::default().with_resources(resources),
            r#"[{"type": "image", "x": 5, "y": 5, "width": 20, "height": 10,
                 "resource": "dot", "interpolation": "nearest"}]"#,
        );
        assert_eq!(report.drawn, 1);
        assert!(ctx.ops().iter().any(|op| matches!(
            op,
            DrawOp::Image { size: (2, 2), dst, interp: crate::InterpolationMode::NearestNeighbor, .. }
                if *dst == Rect::new(5.0, 5.0, 25.0, 15.0)
        )));
    }

    #[test]
    fn point_modes() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[
                {"type": "points", "points": [[0, 0], [10, 0], [10, 10]], "pointSize": 4},
                {"type": "points", "points": [[0, 0], [10, 0], [10, 10], [0, 10], [5, 5]],
                 "mode": "lines", "stroke": {"color": "#ff0000"}},
                {"type": "points", "points": [[0, 0], [10, 0], [10, 10]], "mode": "polygon"}
            ]"##,
        );
        let ops = &ctx.ops()[1..];
        let fills = ops.iter().filter(|op| matches!(op, DrawOp::Fill { .. })).count();
        let strokes = ops.iter().filter(|op| matches!(op, DrawOp::Stroke { .. })).count();
        assert_eq!(fills, 3);
        assert_eq!(strokes, 3);
        match &ops[0] {
            DrawOp::Fill { path, .. } => {
                assert!((path.bounding_box().width() - 4.0).abs() < 0.05);
            }
            other => panic!("expected a dot, got {other:?}"),
        }
    }

    #[test]
    fn canvas_fills_and_shadows() {
        let mut ctx = RecordingRenderContext::new();
        paint_json(
            &mut ctx,
            r##"[
                {"type": "colorFill", "color": "#808080"},
                {"type": "fill", "fill": "#ff0000"},
                {"type": "shadow", "x": 10, "y": 10, "width": 50, "height": 20,
                 "color": "#80000000", "offsetX": 2, "offsetY": 3}
            ]"##,
        );
        let ops = &ctx.ops()[1..];
        for op in &ops[..2] {
            match op {
                DrawOp::Fill { path, .. } => {
                    assert_eq!(path.bounding_box(), Rect::new(0.0, 0.0, 400.0, 300.0))
                }
                other => panic!("expected a canvas fill, got {other:?}"),
            }
        }
        assert_eq!(
            ops[2],
            DrawOp::BlurredRect {
                rect: Rect::new(12.0, 13.0, 62.0, 33.0),
                radius: 4.0,
                brush: RecordedBrush::Solid(Color::rgba8(0, 0, 0, 0x80)),
                state: DrawState::default(),
            }
        );
    }

    #[test]
    fn transparent_background() {
        let mut ctx = RecordingRenderContext::new();
        let surface = CanvasSurface::new(Size::new(10.0, 10.0), None);
        let report = Renderer::default().paint(&mut ctx, &surface.snapshot()).unwrap();
        assert_eq!(report, PaintReport::default());
        assert_eq!(
            ctx.ops(),
            [DrawOp::Clear {
                region: None,
                color: Color::TRANSPARENT
            }]
        );
    }

    #[test]
    fn options_from_json() {
        let opts: RenderOptions = serde_json::from_str(r#"{"sweepWedges": 90}"#).unwrap();
        assert_eq!(opts.sweep_wedges, 90);
        assert_eq!(opts.tolerance, DEFAULT_TOLERANCE);
    }
}
