// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Support for the tiny-skia back-end.

use std::path::Path;

use drawkit::util;
use drawkit::{Error, ImageBuf, ImageFormat};
#[doc(hidden)]
pub use drawkit_skia::*;
use tiny_skia::Pixmap;

/// The `RenderContext` for the tiny-skia backend, which is selected.
pub type DrawkitContext<'a> = SkiaRenderContext<'a>;

/// The associated brush type for this backend.
///
/// This type matches `RenderContext::Brush`
pub type Brush = drawkit_skia::Brush;

/// The associated text factory for this backend.
///
/// This type matches `RenderContext::Text`
pub type DrawkitText = SkiaText;

/// The associated text layout type for this backend.
///
/// This type matches `RenderContext::TextLayout`
pub type DrawkitTextLayout = SkiaTextLayout;

/// The associated text layout builder for this backend.
pub type DrawkitTextLayoutBuilder = SkiaTextLayoutBuilder;

/// The associated image type for this backend.
///
/// This type matches `RenderContext::Image`
pub type DrawkitImage = SkiaImage;

/// A struct that can be used to create bitmap render contexts.
///
/// tiny-skia is a software renderer, so no state is needed.
#[derive(Debug, Default)]
pub struct Device {
    _private: (),
}

/// A struct that provides a `RenderContext` and then can have its bitmap
/// extracted.
pub struct BitmapTarget {
    pixmap: Pixmap,
    fonts: FontRegistry,
    pix_scale: f64,
}

impl Device {
    /// Create a new device.
    pub fn new() -> Result<Device, Error> {
        Ok(Device::default())
    }

    /// Create a new bitmap target of `width` x `height` pixels.
    ///
    /// Drawing is scaled by `pix_scale` pixels per point.
    pub fn bitmap_target(
        &mut self,
        width: usize,
        height: usize,
        pix_scale: f64,
    ) -> Result<BitmapTarget, Error> {
        if !(pix_scale.is_finite() && pix_scale > 0.0) {
            return Err(Error::InvalidInput);
        }
        let pixmap = Pixmap::new(width as u32, height as u32).ok_or(Error::InvalidInput)?;
        log::debug!("created {width}x{height} bitmap target at scale {pix_scale}");
        Ok(BitmapTarget {
            pixmap,
            fonts: FontRegistry::new(),
            pix_scale,
        })
    }
}

impl BitmapTarget {
    /// Get a `RenderContext` for the bitmap.
    ///
    /// Note: caller is responsible for calling `finish` on the render
    /// context at the end of rendering.
    pub fn render_context(&mut self) -> DrawkitContext<'_> {
        let text = SkiaText::new(self.fonts.clone());
        SkiaRenderContext::new(&mut self.pixmap, text).with_pix_scale(self.pix_scale)
    }

    /// The fonts text layouts on this target can use.
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn width(&self) -> usize {
        self.pixmap.width() as usize
    }

    pub fn height(&self) -> usize {
        self.pixmap.height() as usize
    }

    pub fn pix_scale(&self) -> f64 {
        self.pix_scale
    }

    /// Get raw RGBA pixels from the bitmap by copying them into `buf`. If all
    /// the pixels were copied, returns the number of bytes written. If `buf`
    /// wasn't big enough, returns an error and doesn't write anything.
    ///
    /// Only the two RGBA formats are supported.
    pub fn copy_raw_pixels(&mut self, fmt: ImageFormat, buf: &mut [u8]) -> Result<usize, Error> {
        let src = self.pixmap.data();
        let dst_len = src.len();
        if buf.len() < dst_len {
            return Err(Error::InvalidInput);
        }
        let dst = &mut buf[..dst_len];
        match fmt {
            ImageFormat::RgbaPremul => dst.copy_from_slice(src),
            ImageFormat::RgbaSeparate => {
                dst.copy_from_slice(src);
                util::unpremultiply_rgba(dst);
            }
            _ => return Err(Error::NotSupported),
        }
        Ok(dst_len)
    }

    /// Get an in-memory pixel buffer from the bitmap.
    // Clippy complains about a to_xxx method taking &mut self; it only reads.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_image_buf(&mut self, fmt: ImageFormat) -> Result<ImageBuf, Error> {
        let (width, height) = (self.width(), self.height());
        let mut buf = vec![0; width * height * 4];
        self.copy_raw_pixels(fmt, &mut buf)?;
        ImageBuf::from_raw(buf, fmt, width, height)
    }

    /// Encode the bitmap as an RGBA PNG.
    #[cfg(feature = "png")]
    pub fn encode_png(&mut self) -> Result<Vec<u8>, Error> {
        let (width, height) = (self.width(), self.height());
        let mut data = vec![0; width * height * 4];
        self.copy_raw_pixels(ImageFormat::RgbaSeparate, &mut data)?;

        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, width as u32, height as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(Into::<Box<_>>::into)?;
        writer
            .write_image_data(&data)
            .map_err(Into::<Box<_>>::into)?;
        writer.finish().map_err(Into::<Box<_>>::into)?;
        Ok(out)
    }

    /// Stub for feature is missing
    #[cfg(not(feature = "png"))]
    pub fn encode_png(&mut self) -> Result<Vec<u8>, Error> {
        Err(Error::Unimplemented)
    }

    /// Save bitmap to RGBA PNG file
    pub fn save_to_file<P: AsRef<Path>>(mut self, path: P) -> Result<(), Error> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl std::fmt::Debug for BitmapTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapTarget")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("pix_scale", &self.pix_scale)
            .field("fonts", &self.fonts)
            .finish()
    }
}
