// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The draw-command model and its JSON ingestion.

use kurbo::{BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape};
use serde::Deserialize;

use crate::{
    BlendMode, Color, Error, FillRule, FontWeight, GradientSpec, InterpolationMode, PathBuilder,
    PathElement, ResolvedPaint, StrokeStyle, TextAlignment,
};

/// A single paint operation together with its style.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrawCommand {
    #[serde(flatten)]
    pub kind: CommandKind,
    #[serde(flatten)]
    pub style: Style,
}

/// The attributes every command may carry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default)]
    pub fill: Option<Paint>,
    #[serde(default)]
    pub stroke: Option<Stroke>,
    #[serde(default = "opaque")]
    pub opacity: f64,
    #[serde(default)]
    pub blend_mode: BlendMode,
}

fn opaque() -> f64 {
    1.0
}

impl Default for Style {
    fn default() -> Self {
        Style {
            fill: None,
            stroke: None,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        }
    }
}

/// A fill: either a flat color or a gradient.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Solid(Color),
    Gradient(GradientSpec),
}

impl Paint {
    pub fn resolve(&self) -> ResolvedPaint {
        match self {
            Paint::Solid(color) => ResolvedPaint::Solid(*color),
            Paint::Gradient(spec) => spec.resolve(),
        }
    }

    /// The color, if this is a flat fill.
    pub fn as_solid(&self) -> Option<Color> {
        match self {
            Paint::Solid(color) => Some(*color),
            Paint::Gradient(_) => None,
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Paint {
        Paint::Solid(color)
    }
}

impl From<GradientSpec> for Paint {
    fn from(spec: GradientSpec) -> Paint {
        Paint::Gradient(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stroke {
    pub color: Color,
    #[serde(default = "hairline")]
    pub width: f64,
    #[serde(flatten)]
    pub style: StrokeStyle,
}

fn hairline() -> f64 {
    1.0
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Stroke {
        Stroke {
            color,
            width,
            style: StrokeStyle::default(),
        }
    }
}

impl Default for Stroke {
    /// A black line one unit wide.
    fn default() -> Self {
        Stroke::new(Color::BLACK, 1.0)
    }
}

/// The geometry of each kind of command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandKind {
    Rect(RectCommand),
    Circle(CircleCommand),
    Ellipse(EllipseCommand),
    Line(LineCommand),
    Arc(ArcCommand),
    Path(SvgPathCommand),
    BezierPath(BezierPathCommand),
    Image(ImageCommand),
    Text(TextCommand),
    Points(PointsCommand),
    /// Paint the whole canvas with the style's fill.
    Fill,
    ColorFill(ColorFillCommand),
    Shadow(ShadowCommand),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectCommand {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub corner_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircleCommand {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EllipseCommand {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineCommand {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// An arc of the ellipse inscribed in `width` x `height` around the center.
/// Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcCommand {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    #[serde(default)]
    pub use_center: bool,
}

/// A path given as SVG path data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgPathCommand {
    pub data: String,
    #[serde(default)]
    pub fill_rule: FillRule,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BezierPathCommand {
    pub elements: Vec<PathElement>,
    #[serde(default)]
    pub fill_rule: FillRule,
}

/// A bitmap blitted into `(x, y, width, height)`.
///
/// The pixels come from base64 `data`, or failing that from the named
/// `resource`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCommand {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub interpolation: InterpolationMode,
}

/// A single run of text whose line box has its top at `y`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCommand {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub align: TextAlignment,
}

fn default_font_size() -> f64 {
    crate::util::DEFAULT_FONT_SIZE
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointMode {
    /// A dot at every point.
    #[default]
    Points,
    /// Each consecutive pair is a separate segment.
    Lines,
    /// One connected polyline through every point.
    Polygon,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsCommand {
    pub points: Vec<Point>,
    #[serde(default)]
    pub mode: PointMode,
    #[serde(default)]
    pub point_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColorFillCommand {
    pub color: Color,
}

/// A blurred rectangle, offset from the rect it shadows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowCommand {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    #[serde(default = "default_blur")]
    pub blur_radius: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub corner_radius: f64,
}

fn default_blur() -> f64 {
    4.0
}

/// Why a command was left out of a paint.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CommandError {
    #[error("invalid {0}")]
    Geometry(&'static str),
    #[error("malformed path data: {0}")]
    PathData(String),
    #[error("no fill paint")]
    MissingPaint,
    #[error("no image data or resource")]
    MissingImage,
    #[error("unknown image resource '{0}'")]
    UnknownResource(String),
    #[error(transparent)]
    Context(#[from] Error),
}

/// The outline of a path-like command.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub path: BezPath,
    pub fill_rule: FillRule,
}

impl Geometry {
    fn new(shape: impl Shape, tolerance: f64) -> Geometry {
        Geometry {
            path: shape.to_path(tolerance),
            fill_rule: FillRule::NonZero,
        }
    }
}

pub(crate) fn finite(values: &[f64], what: &'static str) -> Result<(), CommandError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CommandError::Geometry(what))
    }
}

pub(crate) fn extent(values: &[f64], what: &'static str) -> Result<(), CommandError> {
    finite(values, what)?;
    if values.iter().all(|v| *v >= 0.0) {
        Ok(())
    } else {
        Err(CommandError::Geometry(what))
    }
}

/// Parse SVG path data. Data that draws anything must open with a move.
fn parse_svg_path(data: &str) -> Result<BezPath, CommandError> {
    match data.trim_start().chars().next() {
        None | Some('M' | 'm') => {
            BezPath::from_svg(data).map_err(|e| CommandError::PathData(e.to_string()))
        }
        Some(c) => Err(CommandError::PathData(format!(
            "expected a move command first, found '{c}'"
        ))),
    }
}

impl CommandKind {
    /// The `type` tag this kind has on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Rect(_) => "rect",
            CommandKind::Circle(_) => "circle",
            CommandKind::Ellipse(_) => "ellipse",
            CommandKind::Line(_) => "line",
            CommandKind::Arc(_) => "arc",
            CommandKind::Path(_) => "path",
            CommandKind::BezierPath(_) => "bezierPath",
            CommandKind::Image(_) => "image",
            CommandKind::Text(_) => "text",
            CommandKind::Points(_) => "points",
            CommandKind::Fill => "fill",
            CommandKind::ColorFill(_) => "colorFill",
            CommandKind::Shadow(_) => "shadow",
        }
    }

    /// Path-like commands that are only ever stroked.
    pub fn is_stroke_only(&self) -> bool {
        matches!(self, CommandKind::Line(_))
    }

    /// Build the outline of a path-like command.
    ///
    /// Returns `Ok(None)` for commands that aren't path-like, and an error
    /// when the geometry can't be drawn.
    pub fn geometry(&self, tolerance: f64) -> Result<Option<Geometry>, CommandError> {
        let geometry = match self {
            CommandKind::Rect(r) => {
                finite(&[r.x, r.y], "rect origin")?;
                extent(&[r.width, r.height, r.corner_radius], "rect size")?;
                let rect = Rect::new(r.x, r.y, r.x + r.width, r.y + r.height);
                if r.corner_radius > 0.0 {
                    let radius = r.corner_radius.min(r.width.min(r.height) / 2.0);
                    Geometry::new(RoundedRect::from_rect(rect, radius), tolerance)
                } else {
                    Geometry::new(rect, tolerance)
                }
            }
            CommandKind::Circle(c) => {
                finite(&[c.cx, c.cy], "circle center")?;
                extent(&[c.radius], "circle radius")?;
                Geometry::new(Circle::new((c.cx, c.cy), c.radius), tolerance)
            }
            CommandKind::Ellipse(e) => {
                finite(&[e.cx, e.cy], "ellipse center")?;
                extent(&[e.width, e.height], "ellipse size")?;
                let rect = Rect::from_center_size((e.cx, e.cy), (e.width, e.height));
                Geometry::new(Ellipse::from_rect(rect), tolerance)
            }
            CommandKind::Line(l) => {
                finite(&[l.x1, l.y1, l.x2, l.y2], "line endpoints")?;
                let mut path = BezPath::new();
                path.move_to((l.x1, l.y1));
                path.line_to((l.x2, l.y2));
                Geometry {
                    path,
                    fill_rule: FillRule::NonZero,
                }
            }
            CommandKind::Arc(a) => {
                finite(&[a.cx, a.cy, a.start_angle, a.sweep_angle], "arc angles")?;
                extent(&[a.width, a.height], "arc size")?;
                let mut builder = PathBuilder::with_tolerance(tolerance);
                builder.add_arc(
                    (a.cx, a.cy),
                    a.width,
                    a.height,
                    a.start_angle.to_radians(),
                    a.sweep_angle.to_radians(),
                    a.use_center,
                );
                Geometry {
                    path: builder.finish(),
                    fill_rule: FillRule::NonZero,
                }
            }
            CommandKind::Path(p) => {
                let path = parse_svg_path(&p.data)?;
                Geometry {
                    path,
                    fill_rule: p.fill_rule,
                }
            }
            CommandKind::BezierPath(p) => Geometry {
                path: PathBuilder::build(&p.elements, tolerance),
                fill_rule: p.fill_rule,
            },
            CommandKind::Image(_)
            | CommandKind::Text(_)
            | CommandKind::Points(_)
            | CommandKind::Fill
            | CommandKind::ColorFill(_)
            | CommandKind::Shadow(_) => return Ok(None),
        };
        Ok(Some(geometry))
    }
}

impl DrawCommand {
    pub fn new(kind: CommandKind) -> DrawCommand {
        DrawCommand {
            kind,
            style: Style::default(),
        }
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> DrawCommand {
        DrawCommand::new(CommandKind::Rect(RectCommand {
            x,
            y,
            width,
            height,
            corner_radius: 0.0,
        }))
    }

    pub fn circle(cx: f64, cy: f64, radius: f64) -> DrawCommand {
        DrawCommand::new(CommandKind::Circle(CircleCommand { cx, cy, radius }))
    }

    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> DrawCommand {
        let (p0, p1) = (p0.into(), p1.into());
        DrawCommand::new(CommandKind::Line(LineCommand {
            x1: p0.x,
            y1: p0.y,
            x2: p1.x,
            y2: p1.y,
        }))
    }

    pub fn with_fill(mut self, paint: impl Into<Paint>) -> Self {
        self.style.fill = Some(paint.into());
        self
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.style.stroke = Some(Stroke::new(color, width));
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity;
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.style.blend_mode = mode;
        self
    }

    /// The outline of a path-like command. See [`CommandKind::geometry`].
    pub fn geometry(&self, tolerance: f64) -> Result<Option<Geometry>, CommandError> {
        self.kind.geometry(tolerance)
    }
}

/// Parse a JSON array of draw commands.
///
/// Records that fail to parse (unknown `type`, missing or mistyped required
/// fields) are logged and dropped; the rest of the list is kept in order.
/// Only input that isn't a JSON array at all is an error.
pub fn parse_commands(json: &str) -> Result<Vec<DrawCommand>, Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = records.len();
    let commands: Vec<DrawCommand> = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match DrawCommand::deserialize(record) {
            Ok(command) => Some(command),
            Err(e) => {
                log::warn!("skipping draw command {idx}: {e}");
                None
            }
        })
        .collect();
    log::debug!("parsed {} of {total} draw commands", commands.len());
    Ok(commands)
}

/// Parse a single draw command.
pub fn parse_command(json: &str) -> Result<DrawCommand, Error> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GradientKind;

    macro_rules! assert_close {
        ($val:expr, $target:expr, $tolerance:expr) => {{
            let val = $val;
            let target = $target;
            let tol = $tolerance;
            assert!(
                (val - target).abs() <= tol,
                "{} is not within {} of {}",
                val,
                tol,
                target
            );
        }};
    }

    fn bbox(json: &str) -> Rect {
        let cmd = parse_command(json).unwrap();
        cmd.geometry(0.1).unwrap().unwrap().path.bounding_box()
    }

    #[test]
    fn parses_style_and_geometry() {
        let cmd = parse_command(
            r##"{"type": "rect", "x": 10, "y": 10, "width": 100, "height": 50,
                "fill": "#3498db", "stroke": {"color": "#000000"},
                "opacity": 0.5, "blendMode": "multiply", "futureField": [1, 2]}"##,
        )
        .unwrap();
        assert_eq!(
            cmd.kind,
            CommandKind::Rect(RectCommand {
                x: 10.0,
                y: 10.0,
                width: 100.0,
                height: 50.0,
                corner_radius: 0.0
            })
        );
        assert_eq!(cmd.style.fill, Some(Paint::Solid(Color::rgb8(0x34, 0x98, 0xdb))));
        assert_eq!(cmd.style.stroke, Some(Stroke::new(Color::BLACK, 1.0)));
        assert_eq!(cmd.style.opacity, 0.5);
        assert_eq!(cmd.style.blend_mode, BlendMode::Multiply);
    }

    #[test]
    fn defaults() {
        let cmd = parse_command(r#"{"type": "text", "x": 1, "y": 2, "text": "hi"}"#).unwrap();
        assert_eq!(cmd.style, Style::default());
        let CommandKind::Text(text) = cmd.kind else {
            panic!("expected text");
        };
        assert_eq!(text.font_size, 12.0);
        assert_eq!(text.font_weight, FontWeight::REGULAR);
        assert_eq!(text.align, TextAlignment::Start);
        assert_eq!(text.color, None);

        let cmd = parse_command(r##"{"type": "fill", "fill": "#ff0000"}"##).unwrap();
        assert_eq!(cmd.kind, CommandKind::Fill);
        assert_eq!(cmd.style.fill, Some(Paint::Solid(Color::rgb8(255, 0, 0))));
    }

    #[test]
    fn gradient_fill() {
        let cmd = parse_command(
            r##"{"type": "circle", "cx": 0, "cy": 0, "radius": 5,
                "fill": {"kind": "sweep", "center": [0, 0], "colors": ["#ff0000", "#0000ff"]}}"##,
        )
        .unwrap();
        let Some(Paint::Gradient(spec)) = cmd.style.fill else {
            panic!("expected a gradient fill");
        };
        assert!(matches!(spec.kind, GradientKind::Sweep { .. }));
    }

    #[test]
    fn malformed_records_are_skipped() {
        let json = r##"[
            {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10},
            {"type": "rect", "x": 0, "y": 0, "width": 10},
            {"type": "hexagon", "x": 0},
            {"type": "circle", "cx": "left", "cy": 0, "radius": 1},
            {"nothing": true},
            {"type": "line", "x1": 0, "y1": 0, "x2": 5, "y2": 5}
        ]"##;
        let commands = parse_commands(json).unwrap();
        let names: Vec<_> = commands.iter().map(|c| c.kind.name()).collect();
        assert_eq!(names, ["rect", "line"]);
        assert!(parse_commands(r#"{"type": "rect"}"#).is_err());
    }

    #[test]
    fn shape_bounds_match_geometry() {
        let r = bbox(r#"{"type": "rect", "x": 10, "y": 10, "width": 100, "height": 50}"#);
        assert_eq!(r, Rect::new(10.0, 10.0, 110.0, 60.0));
        let r = bbox(r#"{"type": "rect", "x": 0, "y": 0, "width": 40, "height": 20, "cornerRadius": 5}"#);
        assert_close!(r.x1, 40.0, 1e-9);
        assert_close!(r.y1, 20.0, 1e-9);
        let r = bbox(r#"{"type": "circle", "cx": 200, "cy": 100, "radius": 40}"#);
        assert_close!(r.x0, 160.0, 1e-9);
        assert_close!(r.y0, 60.0, 1e-9);
        assert_close!(r.x1, 240.0, 1e-9);
        assert_close!(r.y1, 140.0, 1e-9);
        let r = bbox(r#"{"type": "ellipse", "cx": 50, "cy": 50, "width": 60, "height": 20}"#);
        assert_close!(r.x0, 20.0, 1e-9);
        assert_close!(r.y0, 40.0, 1e-9);
        assert_close!(r.x1, 80.0, 1e-9);
        assert_close!(r.y1, 60.0, 1e-9);
    }

    #[test]
    fn invalid_geometry_is_an_error() {
        let cmd = DrawCommand::circle(0.0, 0.0, -1.0);
        assert!(matches!(cmd.geometry(0.1), Err(CommandError::Geometry(_))));
        let cmd = DrawCommand::rect(f64::NAN, 0.0, 1.0, 1.0);
        assert!(cmd.geometry(0.1).is_err());
        let cmd = parse_command(r#"{"type": "path", "data": "M 0 0 Q"}"#).unwrap();
        assert!(matches!(cmd.geometry(0.1), Err(CommandError::PathData(_))));
        let cmd = parse_command(r##"{"type": "colorFill", "color": "#000000"}"##).unwrap();
        assert!(cmd.geometry(0.1).unwrap().is_none());
    }

    #[test]
    fn path_data_must_start_with_a_move() {
        for data in ["L 10 10", "  l 5 5 z", "Z", "C 1 1 2 2 3 3"] {
            let json = format!(r#"{{"type": "path", "data": "{data}"}}"#);
            let cmd = parse_command(&json).unwrap();
            assert!(
                matches!(cmd.geometry(0.1), Err(CommandError::PathData(_))),
                "{data:?}"
            );
        }
        let cmd = parse_command(r#"{"type": "path", "data": " m 1 1 l 5 5"}"#).unwrap();
        let geometry = cmd.geometry(0.1).unwrap().unwrap();
        assert_eq!(geometry.path.elements().len(), 2);
        let cmd = parse_command(r#"{"type": "path", "data": ""}"#).unwrap();
        assert!(cmd.geometry(0.1).unwrap().unwrap().path.elements().is_empty());
    }

    #[test]
    fn svg_path_data() {
        let cmd = parse_command(
            r#"{"type": "path", "data": "M0 0 L10 0 L10 10 Z", "fillRule": "evenOdd"}"#,
        )
        .unwrap();
        let geometry = cmd.geometry(0.1).unwrap().unwrap();
        assert_eq!(geometry.fill_rule, FillRule::EvenOdd);
        assert_eq!(geometry.path.bounding_box(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }
}
