// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A canvas a host UI can embed: it owns the command list, paints it into a
//! bitmap and turns pointer input into gestures.

use drawkit::kurbo::{Point, Size};
use drawkit::{
    parse_command, parse_commands, CanvasSurface, Color, DrawCommand, Error, FontFamily,
    FontWeight, GestureMapper, GestureSink, ImageBuf, ImageFormat, Invalidation, PaintReport,
    PointerEvent, RenderContext, RenderOptions, Renderer, ResourceRegistry,
};
use serde::Deserialize;

use crate::{BitmapTarget, Device, FontRegistry};

/// Construction parameters of a [`Canvas`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
    /// `None` is transparent.
    pub background_color: Option<Color>,
    pub gestures_enabled: bool,
    /// Bitmap pixels per point.
    pub scale: f64,
    pub render: RenderOptions,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 300.0,
            height: 150.0,
            background_color: None,
            gestures_enabled: false,
            scale: 1.0,
            render: RenderOptions::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<CanvasConfig, Error> {
        Ok(serde_json::from_str(json)?)
    }

    fn pixel_size(&self) -> Result<(usize, usize), Error> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(self.width) && valid(self.height) && valid(self.scale)) {
            return Err(Error::InvalidInput);
        }
        let w = (self.width * self.scale).ceil() as usize;
        let h = (self.height * self.scale).ceil() as usize;
        Ok((w, h))
    }
}

/// A drawing surface driven by command lists.
///
/// Mutations only record what changed; [`Canvas::paint`] brings the bitmap
/// up to date, repainting just the new tail after appends.
pub struct Canvas {
    surface: CanvasSurface,
    renderer: Renderer,
    target: BitmapTarget,
    gestures: GestureMapper,
    sink: Option<Box<dyn GestureSink>>,
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Result<Canvas, Error> {
        let (width, height) = config.pixel_size()?;
        let target = Device::new()?.bitmap_target(width, height, config.scale)?;
        let size = Size::new(config.width, config.height);
        Ok(Canvas {
            surface: CanvasSurface::new(size, config.background_color),
            renderer: Renderer::new(config.render),
            target,
            gestures: GestureMapper::new(config.gestures_enabled),
            sink: None,
        })
    }

    /// Replace the whole command list.
    pub fn render(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.surface.set_commands(commands);
    }

    /// Replace the whole command list with a JSON array of commands.
    ///
    /// Malformed records are dropped; only a document that is not an array
    /// at all is an error.
    pub fn render_json(&mut self, json: &str) -> Result<(), Error> {
        let commands = parse_commands(json)?;
        self.render(commands);
        Ok(())
    }

    pub fn append_command(&mut self, command: DrawCommand) {
        self.surface.append_command(command);
    }

    pub fn append_json(&mut self, json: &str) -> Result<(), Error> {
        let command = parse_command(json)?;
        self.append_command(command);
        Ok(())
    }

    /// Remove every command, leaving only the background.
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn commands(&self) -> &[std::sync::Arc<DrawCommand>] {
        self.surface.commands()
    }

    pub fn size(&self) -> Size {
        self.surface.size()
    }

    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.surface.set_background(color);
    }

    /// Images that `image` commands can refer to by name.
    ///
    /// Borrowing the registry mutably schedules a full repaint.
    pub fn resources_mut(&mut self) -> &mut ResourceRegistry {
        self.surface.invalidate(Invalidation::Full);
        self.renderer.resources_mut()
    }

    /// The fonts available to `text` commands.
    ///
    /// Register fonts through [`Canvas::register_font`] or
    /// [`Canvas::load_font`] so that text drawn without them is repainted.
    pub fn fonts(&self) -> &FontRegistry {
        self.target.fonts()
    }

    /// Register a font under an explicit family name and weight, and schedule
    /// a full repaint.
    pub fn register_font(
        &mut self,
        family: &str,
        weight: FontWeight,
        data: &[u8],
    ) -> Result<FontFamily, Error> {
        let family = self.target.fonts().register(family, weight, data)?;
        self.surface.invalidate(Invalidation::Full);
        Ok(family)
    }

    /// Register a font under its own family name, and schedule a full
    /// repaint.
    pub fn load_font(&mut self, data: &[u8]) -> Result<FontFamily, Error> {
        let family = self.target.fonts().load(data)?;
        self.surface.invalidate(Invalidation::Full);
        Ok(family)
    }

    /// Bring the bitmap up to date with the command list.
    ///
    /// Returns what was painted in this pass; an empty report means nothing
    /// had changed.
    pub fn paint(&mut self) -> Result<PaintReport, Error> {
        let mut ctx = self.target.render_context();
        paint_pending(&mut self.surface, &self.renderer, &mut ctx)
    }

    /// Paint pending changes, then copy the bitmap out.
    pub fn pixels(&mut self, fmt: ImageFormat) -> Result<ImageBuf, Error> {
        self.paint()?;
        self.target.to_image_buf(fmt)
    }

    /// Paint pending changes, then encode the current frame as PNG.
    ///
    /// Mutations made after this returns do not affect the bytes.
    pub fn capture_snapshot(&mut self) -> Result<Vec<u8>, Error> {
        self.paint()?;
        self.target.encode_png()
    }

    /// Where gestures go. Without a sink, pointer events are still tracked
    /// but nothing is delivered.
    pub fn set_gesture_sink(&mut self, sink: impl GestureSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn set_gestures_enabled(&mut self, enabled: bool) {
        self.gestures.set_enabled(enabled);
    }

    /// Where the canvas's top-left corner sits in its view's coordinates.
    pub fn set_view_origin(&mut self, origin: impl Into<Point>) {
        self.gestures.set_origin(origin);
    }

    /// Feed one host pointer event. Returns whether a gesture was delivered.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match self.sink.as_deref_mut() {
            Some(sink) => self.gestures.dispatch(event, sink),
            None => {
                self.gestures.map(event);
                false
            }
        }
    }
}

/// Paint whatever `surface` has pending into `ctx`.
///
/// A failed pass leaves a full repaint pending.
fn paint_pending<P: RenderContext>(
    surface: &mut CanvasSurface,
    renderer: &Renderer,
    ctx: &mut P,
) -> Result<PaintReport, Error> {
    let invalidation = match surface.take_invalidation() {
        Some(invalidation) => invalidation,
        None => return Ok(PaintReport::default()),
    };
    let snapshot = surface.snapshot();
    let result = match invalidation {
        Invalidation::Full => renderer.paint(ctx, &snapshot),
        Invalidation::Appended { from } => {
            log::trace!("painting commands {from}..{}", snapshot.len());
            let tail = snapshot.commands().get(from..).unwrap_or_default();
            renderer.paint_commands(ctx, snapshot.size(), tail)
        }
    };
    let finished = ctx.finish();
    let result = result.and_then(|report| finished.map(|()| report));
    if let Err(e) = &result {
        log::warn!("paint failed, repainting everything next time: {e}");
        surface.invalidate(Invalidation::Full);
    }
    result
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("surface", &self.surface)
            .field("target", &self.target)
            .field("gestures", &self.gestures)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}
