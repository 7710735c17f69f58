// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Code useful for multiple backends

use crate::kurbo::{Rect, Size};
use crate::{Color, FontFamily, FontWeight};

/// The default point size for text.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// The default foreground text color.
pub const DEFAULT_TEXT_COLOR: Color = Color::BLACK;

/// Extent to which to expand the blur.
const BLUR_EXTENT: f64 = 2.5;

pub fn size_for_blurred_rect(rect: Rect, radius: f64) -> Size {
    let padding = BLUR_EXTENT * radius;
    let rect_padded = rect.inflate(padding, padding);
    let rect_exp = rect_padded.expand();
    rect_exp.size()
}

/// Generate an alpha mask for a blurred rect, writing it into the provided buffer.
///
/// Returns the device-space rect the mask covers. `buf` must hold at least
/// `stride * height` bytes for the size given by [`size_for_blurred_rect`].
pub fn compute_blurred_rect(rect: Rect, radius: f64, stride: usize, buf: &mut [u8]) -> Rect {
    let radius_recip = radius.recip();
    let xmax = rect.width() * radius_recip;
    let ymax = rect.height() * radius_recip;
    let padding = BLUR_EXTENT * radius;
    let rect_padded = rect.inflate(padding, padding);
    let rect_exp = rect_padded.expand();
    let xfrac = rect_padded.x0 - rect_exp.x0;
    let yfrac = rect_padded.y0 - rect_exp.y0;
    let width = rect_exp.width() as usize;
    let height = rect_exp.height() as usize;
    let strip = (0..width)
        .map(|i| {
            let x = ((i as f64) - (xfrac + padding)) * radius_recip;
            (255.0 * 0.25) * (compute_erf7(x) + compute_erf7(xmax - x))
        })
        .collect::<Vec<_>>();
    for j in 0..height {
        let y = ((j as f64) - (yfrac + padding)) * radius_recip;
        let z = compute_erf7(y) + compute_erf7(ymax - y);
        for (i, s) in strip.iter().enumerate() {
            buf[j * stride + i] = (z * s).round() as u8;
        }
    }
    rect_exp
}

// See https://raphlinus.github.io/audio/2018/09/05/sigmoid.html for a little
// explanation of this approximation to the erf function.
fn compute_erf7(x: f64) -> f64 {
    let x = x * std::f64::consts::FRAC_2_SQRT_PI;
    let xx = x * x;
    let x = x + (0.24295 + (0.03395 + 0.0104 * xx) * xx) * (x * xx);
    x / (1.0 + x * x).sqrt()
}

/// Premultiply one color channel by alpha, rounding.
#[inline]
pub fn premul(x: u8, a: u8) -> u8 {
    let y = (x as u16) * (a as u16);
    ((y + (y >> 8) + 0x80) >> 8) as u8
}

/// Convert premultiplied RGBA pixels to separate alpha, in place.
pub fn unpremultiply_rgba(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a != 0 && a != 255 {
            for c in &mut px[..3] {
                *c = ((*c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            }
        }
    }
}

/// Convert separate-alpha RGBA pixels to premultiplied, in place.
pub fn premultiply_rgba(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a != 255 {
            for c in &mut px[..3] {
                *c = premul(*c, a);
            }
        }
    }
}

/// A type backends can use to represent the default values for a `TextLayout`
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LayoutDefaults {
    pub font: FontFamily,
    pub font_size: f64,
    pub weight: FontWeight,
    pub fg_color: Color,
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        LayoutDefaults {
            font: FontFamily::default(),
            font_size: DEFAULT_FONT_SIZE,
            weight: FontWeight::default(),
            fg_color: DEFAULT_TEXT_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blurred_rect_is_opaque_inside() {
        let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
        let size = size_for_blurred_rect(rect, 2.0);
        let stride = size.width as usize;
        let mut buf = vec![0u8; stride * size.height as usize];
        let covered = compute_blurred_rect(rect, 2.0, stride, &mut buf);
        assert_eq!(covered.size(), size);
        let cx = (20.0 - covered.x0) as usize;
        let cy = (20.0 - covered.y0) as usize;
        assert!(buf[cy * stride + cx] >= 254);
        assert!(buf[0] <= 1);
    }

    #[test]
    fn premultiply_round_trips_opaque_and_clear() {
        let mut px = [200, 100, 50, 255, 10, 20, 30, 0, 255, 128, 0, 128];
        premultiply_rgba(&mut px);
        assert_eq!(&px[..4], &[200, 100, 50, 255]);
        assert_eq!(&px[4..8], &[0, 0, 0, 0]);
        assert_eq!(&px[8..], &[128, 64, 0, 128]);
        unpremultiply_rgba(&mut px);
        assert_eq!(&px[8..], &[255, 128, 0, 128]);
    }
}
