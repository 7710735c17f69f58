// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building geometry from path elements.

use std::f64::consts::TAU;

use kurbo::{
    Affine, Arc, BezPath, CubicBez, Ellipse, PathEl, Point, Rect, RoundedRect, Shape, Vec2,
};
use serde::Deserialize;

/// The default accuracy used when flattening arcs into cubics.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

const EPSILON: f64 = 1e-9;

/// One step of a `bezierPath` command.
///
/// Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathElement {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// A conic section. A weight of 1 is an ordinary quadratic.
    QuadraticTo {
        x1: f64,
        y1: f64,
        x: f64,
        y: f64,
        #[serde(default = "unit_weight")]
        weight: f64,
    },
    Close,
    /// An SVG-style circular arc from the current point to `(x, y)`.
    #[serde(rename_all = "camelCase")]
    ArcTo {
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default)]
        rotation: f64,
        #[serde(default)]
        large_arc: bool,
        #[serde(default = "yes")]
        clockwise: bool,
    },
    Oval {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    #[serde(rename_all = "camelCase")]
    RoundedRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        corner_radius: f64,
    },
    /// Elements built on their own, then translated by `(x, y)` and appended.
    SubPath {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        elements: Vec<PathElement>,
    },
}

fn unit_weight() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

/// Folds [`PathElement`]s into a single [`BezPath`].
///
/// Drawing operations issued without a current subpath start one at the
/// current point (the origin for a fresh builder, the start of the last
/// subpath after a close).
#[derive(Debug, Clone)]
pub struct PathBuilder {
    path: BezPath,
    current: Point,
    start: Point,
    open: bool,
    tolerance: f64,
}

/// The center parameterization of an SVG endpoint arc. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub rotation: f64,
}

impl Default for PathBuilder {
    fn default() -> Self {
        PathBuilder::new()
    }
}

impl PathBuilder {
    pub fn new() -> PathBuilder {
        PathBuilder::with_tolerance(DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> PathBuilder {
        PathBuilder {
            path: BezPath::new(),
            current: Point::ORIGIN,
            start: Point::ORIGIN,
            open: false,
            tolerance: if tolerance > 0.0 {
                tolerance
            } else {
                DEFAULT_TOLERANCE
            },
        }
    }

    /// Build a path from elements in one go.
    pub fn build(elements: &[PathElement], tolerance: f64) -> BezPath {
        let mut builder = PathBuilder::with_tolerance(tolerance);
        builder.extend(elements);
        builder.finish()
    }

    /// The point the next drawing operation starts from.
    pub fn current_point(&self) -> Point {
        self.current
    }

    pub fn move_to(&mut self, p: impl Into<Point>) {
        let p = p.into();
        self.path.move_to(p);
        self.current = p;
        self.start = p;
        self.open = true;
    }

    fn ensure_open(&mut self) {
        if !self.open {
            let p = self.current;
            self.move_to(p);
        }
    }

    pub fn line_to(&mut self, p: impl Into<Point>) {
        self.ensure_open();
        let p = p.into();
        self.path.line_to(p);
        self.current = p;
    }

    pub fn quad_to(&mut self, c: impl Into<Point>, p: impl Into<Point>) {
        self.ensure_open();
        let p = p.into();
        self.path.quad_to(c.into(), p);
        self.current = p;
    }

    pub fn cubic_to(&mut self, c1: impl Into<Point>, c2: impl Into<Point>, p: impl Into<Point>) {
        self.ensure_open();
        let p = p.into();
        self.path.curve_to(c1.into(), c2.into(), p);
        self.current = p;
    }

    /// A rational quadratic with weight `w` on the control point.
    ///
    /// A weight of 1 is an exact quadratic; anything else is approximated by
    /// a single cubic (see [`conic_to_cubic`]).
    pub fn conic_to(&mut self, c: impl Into<Point>, p: impl Into<Point>, w: f64) {
        let (c, p) = (c.into(), p.into());
        if (w - 1.0).abs() < EPSILON {
            self.quad_to(c, p);
            return;
        }
        if !w.is_finite() {
            log::warn!("conic weight {w} is not finite, drawing a line");
            self.line_to(p);
            return;
        }
        self.ensure_open();
        let cubic = conic_to_cubic(self.current, c, p, w.max(0.0));
        self.path.curve_to(cubic.p1, cubic.p2, cubic.p3);
        self.current = p;
    }

    pub fn close(&mut self) {
        if self.open {
            self.path.close_path();
            self.open = false;
            self.current = self.start;
        }
    }

    /// An SVG endpoint arc from the current point to `end`.
    ///
    /// `rotation` is in radians. A zero radius or coincident endpoints
    /// degrade to a straight line.
    pub fn svg_arc_to(
        &mut self,
        end: impl Into<Point>,
        radius: f64,
        rotation: f64,
        large_arc: bool,
        clockwise: bool,
    ) {
        self.ensure_open();
        let end = end.into();
        let Some(arc) = svg_arc_center(self.current, end, radius, rotation, large_arc, clockwise)
        else {
            self.line_to(end);
            return;
        };
        let to_user = Affine::translate(arc.center.to_vec2())
            * Affine::rotate(arc.rotation)
            * Affine::scale(arc.radius);
        let unit = Arc {
            center: Point::ORIGIN,
            radii: Vec2::new(1.0, 1.0),
            start_angle: arc.start_angle,
            sweep_angle: arc.sweep_angle,
            x_rotation: 0.0,
        };
        let mut curves = Vec::new();
        unit.to_cubic_beziers(self.tolerance / arc.radius, |p1, p2, p| {
            curves.push((to_user * p1, to_user * p2, to_user * p));
        });
        // Land exactly on the requested endpoint.
        if let Some(last) = curves.last_mut() {
            last.2 = end;
        }
        for (p1, p2, p) in curves {
            self.path.curve_to(p1, p2, p);
        }
        self.current = end;
    }

    /// Start a new subpath along an arc of the ellipse inscribed in
    /// `width` x `height` around `center`.
    ///
    /// Angles are in radians. With `use_center` the arc is closed into a
    /// pie slice through the center.
    pub fn add_arc(
        &mut self,
        center: impl Into<Point>,
        width: f64,
        height: f64,
        start_angle: f64,
        sweep_angle: f64,
        use_center: bool,
    ) {
        let center = center.into();
        if !(width > 0.0 && height > 0.0) || sweep_angle.abs() < EPSILON {
            return;
        }
        let radius = width / 2.0;
        let to_user = if (width - height).abs() < EPSILON {
            Affine::IDENTITY
        } else {
            let c = center.to_vec2();
            Affine::translate(c) * Affine::scale_non_uniform(1.0, height / width) * Affine::translate(-c)
        };
        let arc = Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle: sweep_angle.clamp(-TAU, TAU),
            x_rotation: 0.0,
        };
        let arc_start = to_user * (center + Vec2::from_angle(start_angle) * radius);
        if use_center {
            self.move_to(center);
            self.path.line_to(arc_start);
        } else {
            self.move_to(arc_start);
        }
        let path = &mut self.path;
        let mut last = arc_start;
        arc.to_cubic_beziers(self.tolerance, |p1, p2, p| {
            last = to_user * p;
            path.curve_to(to_user * p1, to_user * p2, last);
        });
        self.current = last;
        if use_center {
            self.close();
        }
    }

    /// Add a closed ellipse inscribed in `rect`.
    pub fn add_oval(&mut self, rect: Rect) {
        self.append_closed(Ellipse::from_rect(rect));
    }

    /// Add a closed rounded rectangle.
    pub fn add_rounded_rect(&mut self, rect: Rect, radius: f64) {
        let rect = rect.abs();
        let radius = radius.max(0.0).min(rect.width().min(rect.height()) / 2.0);
        self.append_closed(RoundedRect::from_rect(rect, radius));
    }

    fn append_closed(&mut self, shape: impl Shape) {
        let mut first = None;
        for el in shape.path_elements(self.tolerance) {
            if let (None, PathEl::MoveTo(p)) = (first, el) {
                first = Some(p);
            }
            self.path.push(el);
        }
        if let Some(p) = first {
            self.current = p;
            self.start = p;
        }
        self.open = false;
    }

    /// Build `elements` independently of this path, translate the result by
    /// `offset` and append it.
    ///
    /// The current point afterwards is the sub-path's own end point.
    pub fn add_sub_path(&mut self, elements: &[PathElement], offset: Vec2) {
        let mut sub = PathBuilder::with_tolerance(self.tolerance);
        sub.extend(elements);
        if sub.path.elements().is_empty() {
            return;
        }
        let shift = Affine::translate(offset);
        for &el in sub.path.elements() {
            self.path.push(shift * el);
        }
        self.current = sub.current + offset;
        self.start = sub.start + offset;
        self.open = sub.open;
    }

    pub fn push(&mut self, element: &PathElement) {
        match *element {
            PathElement::MoveTo { x, y } => self.move_to((x, y)),
            PathElement::LineTo { x, y } => self.line_to((x, y)),
            PathElement::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => self.cubic_to((x1, y1), (x2, y2), (x, y)),
            PathElement::QuadraticTo {
                x1,
                y1,
                x,
                y,
                weight,
            } => self.conic_to((x1, y1), (x, y), weight),
            PathElement::Close => self.close(),
            PathElement::ArcTo {
                x,
                y,
                radius,
                rotation,
                large_arc,
                clockwise,
            } => self.svg_arc_to((x, y), radius, rotation.to_radians(), large_arc, clockwise),
            PathElement::Oval {
                x,
                y,
                width,
                height,
            } => self.add_oval(Rect::new(x, y, x + width, y + height)),
            PathElement::RoundedRect {
                x,
                y,
                width,
                height,
                corner_radius,
            } => self.add_rounded_rect(Rect::new(x, y, x + width, y + height), corner_radius),
            PathElement::SubPath {
                x,
                y,
                ref elements,
            } => self.add_sub_path(elements, Vec2::new(x, y)),
        }
    }

    pub fn extend<'a>(&mut self, elements: impl IntoIterator<Item = &'a PathElement>) {
        for element in elements {
            self.push(element);
        }
    }

    pub fn finish(self) -> BezPath {
        self.path
    }
}

/// Approximate the conic `p0, c, p2` with weight `w` by one cubic.
///
/// The inner control points sit `2w/3` of the way from each endpoint toward
/// `c`, which is the exact degree elevation when `w == 1`.
pub fn conic_to_cubic(p0: Point, c: Point, p2: Point, w: f64) -> CubicBez {
    let k = 2.0 / 3.0 * w;
    CubicBez::new(p0, p0 + (c - p0) * k, p2 + (c - p2) * k, p2)
}

/// Solve an SVG endpoint arc for its center parameterization.
///
/// Returns `None` when the arc is degenerate and should be drawn as a line:
/// a zero (or non-finite) radius, or coincident endpoints. A radius too small
/// to span the endpoints is scaled up until it does.
pub fn svg_arc_center(
    from: Point,
    to: Point,
    radius: f64,
    rotation: f64,
    large_arc: bool,
    clockwise: bool,
) -> Option<SvgArc> {
    let mut r = radius.abs();
    if !r.is_finite() || r < EPSILON || (from - to).hypot() < EPSILON {
        return None;
    }
    let (sin_phi, cos_phi) = rotation.sin_cos();

    // Midpoint difference in the ellipse's local frame.
    let dx = (from.x - to.x) / 2.0;
    let dy = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx + sin_phi * dy;
    let y1p = -sin_phi * dx + cos_phi * dy;

    let lambda = (x1p * x1p + y1p * y1p) / (r * r);
    if lambda > 1.0 {
        r *= lambda.sqrt();
    }

    let rr = r * r;
    let num = rr * rr - rr * y1p * y1p - rr * x1p * x1p;
    let den = rr * y1p * y1p + rr * x1p * x1p;
    let sign = if large_arc != clockwise { 1.0 } else { -1.0 };
    let coef = sign * (num / den).max(0.0).sqrt();
    let cxp = coef * y1p;
    let cyp = -coef * x1p;

    let center = Point::new(
        cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0,
        sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0,
    );

    let u = Vec2::new((x1p - cxp) / r, (y1p - cyp) / r);
    let v = Vec2::new((-x1p - cxp) / r, (-y1p - cyp) / r);
    let start_angle = angle_between(Vec2::new(1.0, 0.0), u);
    let mut sweep_angle = angle_between(u, v);
    if !clockwise && sweep_angle > 0.0 {
        sweep_angle -= TAU;
    } else if clockwise && sweep_angle < 0.0 {
        sweep_angle += TAU;
    }

    Some(SvgArc {
        center,
        radius: r,
        start_angle,
        sweep_angle,
        rotation,
    })
}

/// Signed angle from `a` to `b`, with the cosine clamped before `acos`.
fn angle_between(a: Vec2, b: Vec2) -> f64 {
    let len = a.hypot() * b.hypot();
    if len < EPSILON {
        return 0.0;
    }
    let angle = (a.dot(b) / len).clamp(-1.0, 1.0).acos();
    if a.cross(b) < 0.0 {
        -angle
    } else {
        angle
    }
}
