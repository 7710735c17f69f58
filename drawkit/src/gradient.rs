// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gradient specifications and evaluation.
//!
//! A [`GradientSpec`] is what arrives on the wire. [`GradientSpec::resolve`]
//! turns it into something drawable: a solid color when there is nothing to
//! interpolate, a [`FixedGradient`] that backends render natively, or a
//! [`SweepGradient`] that is painted as a fan of flat-colored wedges.

use std::f64::consts::TAU;

use kurbo::{Arc, BezPath, Point, Vec2};
use serde::Deserialize;

use crate::Color;

/// Specification of a gradient that backends draw natively.
///
/// Coordinates are in user space, the same space the filled shape is in.
#[derive(Debug, Clone, PartialEq)]
pub enum FixedGradient {
    /// A linear gradient.
    Linear(FixedLinearGradient),
    /// A radial gradient.
    Radial(FixedRadialGradient),
}

/// Specification of a linear gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLinearGradient {
    /// The start point (corresponding to pos 0.0).
    pub start: Point,
    /// The end point (corresponding to pos 1.0).
    pub end: Point,
    /// The stops.
    ///
    /// There must be at least two for the gradient to be valid.
    pub stops: Vec<GradientStop>,
}

/// Specification of a radial gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRadialGradient {
    /// The center.
    pub center: Point,
    /// The offset of the focal point (pos 0.0) relative to the center.
    pub origin_offset: Vec2,
    /// The radius.
    ///
    /// The circle with this radius from the center corresponds to pos 1.0.
    pub radius: f64,
    /// The stops (see similar field in [`FixedLinearGradient`]).
    pub stops: Vec<GradientStop>,
}

/// Specification of a gradient stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// The coordinate of the stop.
    pub pos: f32,
    /// The color at that stop.
    pub color: Color,
}

/// A gradient as described by a draw command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientSpec {
    #[serde(flatten)]
    pub kind: GradientKind,
    #[serde(default)]
    pub colors: Vec<Color>,
    /// Stop positions in `[0, 1]`, one per color. Evenly spaced when absent.
    #[serde(default)]
    pub stops: Option<Vec<f64>>,
}

/// Kind-specific gradient geometry. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GradientKind {
    Linear {
        start: Point,
        end: Point,
    },
    #[serde(rename_all = "camelCase")]
    Radial {
        center: Point,
        #[serde(default)]
        start_radius: f64,
        end_radius: f64,
        #[serde(default)]
        focus: Option<Point>,
    },
    #[serde(rename_all = "camelCase")]
    Sweep {
        center: Point,
        #[serde(default)]
        start_angle: f64,
        #[serde(default = "full_turn_degrees")]
        end_angle: f64,
    },
}

fn full_turn_degrees() -> f64 {
    360.0
}

/// A gradient spec resolved into something a renderer can paint.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPaint {
    Solid(Color),
    Fixed(FixedGradient),
    Sweep(SweepGradient),
}

/// An angular gradient around a center point.
///
/// Angles are in radians, measured clockwise from the positive x axis in
/// Y-down space.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGradient {
    pub center: Point,
    pub start_angle: f64,
    pub end_angle: f64,
    pub stops: Vec<GradientStop>,
}

impl FixedGradient {
    pub fn stops(&self) -> &[GradientStop] {
        match self {
            FixedGradient::Linear(linear) => &linear.stops,
            FixedGradient::Radial(radial) => &radial.stops,
        }
    }
}

impl From<FixedLinearGradient> for FixedGradient {
    fn from(src: FixedLinearGradient) -> FixedGradient {
        FixedGradient::Linear(src)
    }
}

impl From<FixedRadialGradient> for FixedGradient {
    fn from(src: FixedRadialGradient) -> FixedGradient {
        FixedGradient::Radial(src)
    }
}

impl GradientStop {
    pub fn new(pos: f32, color: Color) -> GradientStop {
        GradientStop { pos, color }
    }
}

impl GradientSpec {
    /// Pair colors with stop positions.
    ///
    /// Stops that don't match the colors one-to-one, aren't sorted or fall
    /// outside `[0, 1]` are replaced with even spacing.
    pub fn normalized_stops(&self) -> Vec<GradientStop> {
        let n = self.colors.len();
        if let Some(stops) = &self.stops {
            let valid = stops.len() == n
                && stops.iter().all(|s| (0.0..=1.0).contains(s))
                && stops.windows(2).all(|w| w[0] <= w[1]);
            if valid {
                return self
                    .colors
                    .iter()
                    .zip(stops)
                    .map(|(&color, &pos)| GradientStop::new(pos as f32, color))
                    .collect();
            }
            log::warn!("ignoring {} gradient stops for {n} colors", stops.len());
        }
        evenly_spaced(&self.colors)
    }

    /// Resolve into a paint. Fewer than two colors is a solid fill with the
    /// sole color, or transparent when there are none.
    pub fn resolve(&self) -> ResolvedPaint {
        match self.colors.as_slice() {
            [] => return ResolvedPaint::Solid(Color::TRANSPARENT),
            [only] => return ResolvedPaint::Solid(*only),
            _ => (),
        }
        let stops = self.normalized_stops();
        match self.kind {
            GradientKind::Linear { start, end } => {
                ResolvedPaint::Fixed(FixedGradient::Linear(FixedLinearGradient {
                    start,
                    end,
                    stops,
                }))
            }
            GradientKind::Radial {
                center,
                start_radius,
                end_radius,
                focus,
            } => {
                if !(end_radius.is_finite() && end_radius > 0.0) {
                    log::warn!("radial gradient with end radius {end_radius}");
                    return ResolvedPaint::Solid(stops[stops.len() - 1].color);
                }
                let inner = (start_radius / end_radius).clamp(0.0, 1.0);
                let stops = if inner > 0.0 {
                    remap_stops(&stops, inner)
                } else {
                    stops
                };
                let origin_offset = focus.map(|f| f - center).unwrap_or(Vec2::ZERO);
                ResolvedPaint::Fixed(FixedGradient::Radial(FixedRadialGradient {
                    center,
                    origin_offset,
                    radius: end_radius,
                    stops,
                }))
            }
            GradientKind::Sweep {
                center,
                start_angle,
                end_angle,
            } => ResolvedPaint::Sweep(SweepGradient {
                center,
                start_angle: start_angle.to_radians(),
                end_angle: end_angle.to_radians(),
                stops,
            }),
        }
    }
}

fn evenly_spaced(colors: &[Color]) -> Vec<GradientStop> {
    let denom = (colors.len().max(2) - 1) as f32;
    colors
        .iter()
        .enumerate()
        .map(|(i, &color)| GradientStop::new(i as f32 / denom, color))
        .collect()
}

/// Squeeze stops into `[inner, 1]`, with the first stop's color held inside.
fn remap_stops(stops: &[GradientStop], inner: f64) -> Vec<GradientStop> {
    let mut out = Vec::with_capacity(stops.len() + 1);
    if let Some(first) = stops.first() {
        out.push(GradientStop::new(0.0, first.color));
    }
    out.extend(stops.iter().map(|s| {
        let pos = inner + s.pos as f64 * (1.0 - inner);
        GradientStop::new(pos as f32, s.color)
    }));
    out
}

/// Evaluate a stop list at `t`.
///
/// The bracketing pair is found by a linear scan clamped to valid indices,
/// and channels are interpolated linearly with the local fraction.
pub fn sample_stops(stops: &[GradientStop], t: f64) -> Color {
    let (first, last) = match stops {
        [] => return Color::TRANSPARENT,
        [only] => return only.color,
        [first, .., last] => (first, last),
    };
    let t = t.clamp(0.0, 1.0);
    if t <= first.pos as f64 {
        return first.color;
    }
    if t >= last.pos as f64 {
        return last.color;
    }
    let mut i = 0;
    while i + 2 < stops.len() && (stops[i + 1].pos as f64) < t {
        i += 1;
    }
    let (a, b) = (&stops[i], &stops[i + 1]);
    let span = (b.pos - a.pos) as f64;
    let local = if span > 0.0 {
        (t - a.pos as f64) / span
    } else {
        1.0
    };
    a.color.lerp(b.color, local)
}

impl SweepGradient {
    /// The angular extent mapped onto `t` in `[0, 1]`. A zero extent is a
    /// full turn.
    fn span(&self) -> f64 {
        let span = self.end_angle - self.start_angle;
        if span.abs() < 1e-9 {
            TAU
        } else {
            span
        }
    }

    /// The gradient parameter at `angle`, clamped to `[0, 1]`.
    pub fn t_at_angle(&self, angle: f64) -> f64 {
        ((angle - self.start_angle) / self.span()).clamp(0.0, 1.0)
    }

    pub fn color_at_angle(&self, angle: f64) -> Color {
        sample_stops(&self.stops, self.t_at_angle(angle))
    }

    /// Split the full turn starting at `start_angle` into `count` sectors of
    /// the given radius, each paired with the color at its midpoint.
    ///
    /// The turn is walked in the direction of the gradient, so a sweep whose
    /// end angle is below its start angle runs counterclockwise.
    ///
    /// Every sector but the last slightly overlaps its successor so that
    /// antialiasing doesn't leave hairline seams.
    pub fn wedges(&self, count: usize, radius: f64) -> Wedges<'_> {
        Wedges {
            gradient: self,
            count: count.max(1),
            radius,
            index: 0,
        }
    }
}

/// Iterator returned by [`SweepGradient::wedges`].
pub struct Wedges<'a> {
    gradient: &'a SweepGradient,
    count: usize,
    radius: f64,
    index: usize,
}

const WEDGE_OVERLAP: f64 = 0.002;

impl<'a> Iterator for Wedges<'a> {
    type Item = (BezPath, Color);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let i = self.index;
        self.index += 1;

        let direction = self.gradient.span().signum();
        let step = direction * TAU / self.count as f64;
        let a0 = self.gradient.start_angle + step * i as f64;
        let mid = a0 + step / 2.0;
        let sweep = if i + 1 < self.count {
            step + direction * WEDGE_OVERLAP
        } else {
            step
        };
        let color = self.gradient.color_at_angle(mid);
        let path = sector(self.gradient.center, self.radius, a0, sweep);
        Some((path, color))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.index;
        (left, Some(left))
    }
}

impl<'a> ExactSizeIterator for Wedges<'a> {}

/// A closed sector: center, out along `start`, around the arc, back.
pub(crate) fn sector(center: Point, radius: f64, start: f64, sweep: f64) -> BezPath {
    let arc = Arc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle: start,
        sweep_angle: sweep,
        x_rotation: 0.0,
    };
    let mut path = BezPath::new();
    path.move_to(center);
    path.line_to(center + Vec2::from_angle(start) * radius);
    arc.to_cubic_beziers(0.1, |p1, p2, p| path.curve_to(p1, p2, p));
    path.close_path();
    path
}
