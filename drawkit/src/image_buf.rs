// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoded images that can be handed to any backend.

use std::sync::Arc;

use kurbo::Size;
use serde::Deserialize;

use crate::{Error, RenderContext};

/// The layout of a pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImageFormat {
    /// 1 byte per pixel.
    Grayscale,
    /// 3 bytes per pixel, in RGB order.
    Rgb,
    /// 4 bytes per pixel, in RGBA order, with separate alpha.
    RgbaSeparate,
    /// 4 bytes per pixel, in RGBA order, with premultiplied alpha.
    RgbaPremul,
}

impl ImageFormat {
    /// The number of bytes required to represent a pixel in this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::Grayscale => 1,
            ImageFormat::Rgb => 3,
            ImageFormat::RgbaPremul | ImageFormat::RgbaSeparate => 4,
        }
    }
}

/// The interpolation mode used when scaling an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpolationMode {
    /// Don't interpolate, use nearest neighbor.
    #[serde(alias = "nearest")]
    NearestNeighbor,
    /// Use bilinear interpolation.
    #[default]
    Bilinear,
}

/// An in-memory pixel buffer.
///
/// Cloning is cheap; the pixels are shared.
#[derive(Clone)]
pub struct ImageBuf {
    pixels: Arc<[u8]>,
    width: usize,
    height: usize,
    format: ImageFormat,
}

impl ImageBuf {
    /// Create an empty image buffer.
    pub fn empty() -> Self {
        ImageBuf {
            pixels: Arc::new([]),
            width: 0,
            height: 0,
            format: ImageFormat::RgbaSeparate,
        }
    }

    /// Create a new image buffer from an array of bytes.
    ///
    /// Returns [`Error::InvalidInput`] if `pixels` is not exactly
    /// `width * height * format.bytes_per_pixel()` bytes long.
    pub fn from_raw(
        pixels: impl Into<Arc<[u8]>>,
        format: ImageFormat,
        width: usize,
        height: usize,
    ) -> Result<ImageBuf, Error> {
        let pixels = pixels.into();
        if pixels.len() != width * height * format.bytes_per_pixel() {
            return Err(Error::InvalidInput);
        }
        Ok(ImageBuf {
            pixels,
            width,
            height,
            format,
        })
    }

    /// Decode an encoded image (PNG, JPEG, GIF, BMP or WebP).
    pub fn from_encoded(bytes: &[u8]) -> Result<ImageBuf, Error> {
        let image = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = image.dimensions();
        ImageBuf::from_raw(
            image.into_raw(),
            ImageFormat::RgbaSeparate,
            width as usize,
            height as usize,
        )
    }

    /// Decode a base64 string holding an encoded image.
    ///
    /// A `data:` URL prefix is tolerated.
    pub fn from_base64(data: &str) -> Result<ImageBuf, Error> {
        let data = data.trim();
        let payload = match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };
        let bytes = base64::decode(payload).map_err(|e| {
            log::debug!("base64 decode failed: {e}");
            Error::InvalidInput
        })?;
        ImageBuf::from_encoded(&bytes)
    }

    /// Get the raw pixel data.
    pub fn raw_pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Upload this buffer to a render context.
    pub fn to_image<P: RenderContext>(&self, ctx: &mut P) -> Result<P::Image, Error> {
        ctx.make_image(self.width, self.height, &self.pixels, self.format)
    }
}

impl std::fmt::Debug for ImageBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ImageBuf")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Default for ImageBuf {
    fn default() -> ImageBuf {
        ImageBuf::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 1x1 opaque red PNG.
    const RED_PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn raw_length_is_checked() {
        assert!(ImageBuf::from_raw(vec![0u8; 12], ImageFormat::Rgb, 2, 2).is_ok());
        assert!(matches!(
            ImageBuf::from_raw(vec![0u8; 11], ImageFormat::Rgb, 2, 2),
            Err(Error::InvalidInput)
        ));
    }

    #[test]
    fn empty_buffer() {
        let buf = ImageBuf::empty();
        assert!(buf.is_empty());
        assert_eq!(buf.size(), Size::ZERO);
    }

    #[test]
    fn decode_base64_png() {
        let buf = ImageBuf::from_base64(RED_PIXEL_PNG).unwrap();
        assert_eq!((buf.width(), buf.height()), (1, 1));
        assert_eq!(buf.format(), ImageFormat::RgbaSeparate);
        assert_eq!(buf.raw_pixels()[0], 255);
        assert_eq!(buf.raw_pixels()[3], 255);

        let url = format!("data:image/png;base64,{RED_PIXEL_PNG}");
        assert!(ImageBuf::from_base64(&url).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ImageBuf::from_base64("not base64 at all!").is_err());
        assert!(ImageBuf::from_encoded(b"definitely not a png").is_err());
    }
}
