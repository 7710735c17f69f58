// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text support for the tiny-skia backend.
//!
//! There is no system font lookup. Fonts are loaded from bytes into a
//! [`FontRegistry`] that the host shares between render contexts; generic
//! families resolve to the first family that was registered.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use drawkit::kurbo::Size;
use drawkit::util::LayoutDefaults;
use drawkit::{
    Color, Error, FontFamily, FontWeight, Text, TextLayout, TextLayoutBuilder,
};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

/// The fonts available to text layouts.
///
/// Cloning is cheap and clones share the same set of fonts.
#[derive(Clone, Default)]
pub struct FontRegistry {
    fonts: Rc<RefCell<Vec<RegisteredFont>>>,
}

struct RegisteredFont {
    family: Arc<str>,
    weight: FontWeight,
    font: Rc<fontdue::Font>,
}

/// The text factory of a [`SkiaRenderContext`].
///
/// [`SkiaRenderContext`]: crate::SkiaRenderContext
#[derive(Clone, Default)]
pub struct SkiaText {
    fonts: FontRegistry,
}

pub struct SkiaTextLayoutBuilder {
    fonts: FontRegistry,
    text: String,
    defaults: LayoutDefaults,
}

/// A shaped single line of text.
#[derive(Clone)]
pub struct SkiaTextLayout {
    text: String,
    pub(crate) font: Rc<fontdue::Font>,
    pub(crate) px: f32,
    pub(crate) fg_color: Color,
    pub(crate) glyphs: Rc<[PositionedGlyph]>,
    size: Size,
    baseline: f64,
}

/// A glyph and the top-left corner of its bitmap, relative to the line box.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PositionedGlyph {
    pub(crate) index: u16,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl FontRegistry {
    pub fn new() -> FontRegistry {
        FontRegistry::default()
    }

    /// Register a font under an explicit family name and weight.
    pub fn register(
        &self,
        family: &str,
        weight: FontWeight,
        data: &[u8],
    ) -> Result<FontFamily, Error> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| Error::FontLoadingFailed(e.to_string()))?;
        let family: Arc<str> = family.into();
        log::debug!("registered font '{family}' at weight {}", weight.to_raw());
        self.fonts.borrow_mut().push(RegisteredFont {
            family: family.clone(),
            weight,
            font: Rc::new(font),
        });
        Ok(FontFamily::new_unchecked(family))
    }

    /// Register a font under the family name stored in the font itself.
    pub fn load(&self, data: &[u8]) -> Result<FontFamily, Error> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| Error::FontLoadingFailed(e.to_string()))?;
        let family: Arc<str> = match font.name() {
            Some(name) => name.into(),
            None => format!("font-{}", self.len()).into(),
        };
        log::debug!("loaded font '{family}'");
        self.fonts.borrow_mut().push(RegisteredFont {
            family: family.clone(),
            weight: FontWeight::REGULAR,
            font: Rc::new(font),
        });
        Ok(FontFamily::new_unchecked(family))
    }

    /// The registered spelling of `name`, compared case-insensitively.
    pub fn family_name(&self, name: &str) -> Option<Arc<str>> {
        self.fonts
            .borrow()
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(name))
            .map(|f| f.family.clone())
    }

    pub fn len(&self) -> usize {
        self.fonts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.borrow().is_empty()
    }

    /// Pick the font of `family` closest to `weight`.
    ///
    /// Generic families and unknown names fall back to the first registered
    /// family.
    fn resolve(&self, family: &FontFamily, weight: FontWeight) -> Option<Rc<fontdue::Font>> {
        let fonts = self.fonts.borrow();
        let wanted = if family.is_generic() {
            None
        } else {
            fonts
                .iter()
                .find(|f| f.family.eq_ignore_ascii_case(family.name()))
                .map(|f| f.family.clone())
        };
        let wanted = match wanted {
            Some(name) => name,
            None => {
                if !family.is_generic() {
                    log::warn!("no font named '{}', using the default", family.name());
                }
                fonts.first()?.family.clone()
            }
        };
        fonts
            .iter()
            .filter(|f| f.family == wanted)
            .min_by_key(|f| f.weight.distance(weight))
            .map(|f| f.font.clone())
    }
}

impl fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fonts = self.fonts.borrow();
        f.debug_list()
            .entries(fonts.iter().map(|r| (&*r.family, r.weight.to_raw())))
            .finish()
    }
}

impl SkiaText {
    pub fn new(fonts: FontRegistry) -> SkiaText {
        SkiaText { fonts }
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }
}

impl Text for SkiaText {
    type TextLayout = SkiaTextLayout;
    type TextLayoutBuilder = SkiaTextLayoutBuilder;

    fn font_family(&mut self, family_name: &str) -> Option<FontFamily> {
        FontFamily::generic(family_name).or_else(|| {
            self.fonts
                .family_name(family_name)
                .map(FontFamily::new_unchecked)
        })
    }

    fn load_font(&mut self, data: &[u8]) -> Result<FontFamily, Error> {
        self.fonts.load(data)
    }

    fn new_text_layout(&mut self, text: &str) -> Self::TextLayoutBuilder {
        SkiaTextLayoutBuilder {
            fonts: self.fonts.clone(),
            text: text.to_owned(),
            defaults: LayoutDefaults::default(),
        }
    }
}

impl fmt::Debug for SkiaTextLayoutBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkiaTextLayoutBuilder")
            .field("text", &self.text)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl TextLayoutBuilder for SkiaTextLayoutBuilder {
    type Out = SkiaTextLayout;

    fn font(mut self, family: FontFamily, size: f64) -> Self {
        self.defaults.font = family;
        self.defaults.font_size = size;
        self
    }

    fn weight(mut self, weight: FontWeight) -> Self {
        self.defaults.weight = weight;
        self
    }

    fn text_color(mut self, color: Color) -> Self {
        self.defaults.fg_color = color;
        self
    }

    fn build(self) -> Result<Self::Out, Error> {
        let font = self
            .fonts
            .resolve(&self.defaults.font, self.defaults.weight)
            .ok_or_else(|| Error::MissingFont(self.defaults.font.name().to_owned()))?;
        let px = self.defaults.font_size as f32;
        if !(px.is_finite() && px > 0.0) {
            return Err(Error::InvalidInput);
        }

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font.as_ref()], &TextStyle::new(&self.text, px, 0));
        let glyphs: Rc<[PositionedGlyph]> = layout
            .glyphs()
            .iter()
            .map(|g| PositionedGlyph {
                index: g.key.glyph_index,
                x: g.x,
                y: g.y,
            })
            .collect();

        let width: f32 = self
            .text
            .chars()
            .map(|c| font.metrics(c, px).advance_width)
            .sum();
        let (height, baseline) = match font.horizontal_line_metrics(px) {
            Some(lm) => (lm.new_line_size, lm.ascent),
            None => (px * 1.2, px),
        };

        Ok(SkiaTextLayout {
            text: self.text,
            font,
            px,
            fg_color: self.defaults.fg_color,
            glyphs,
            size: Size::new(width as f64, height as f64),
            baseline: baseline as f64,
        })
    }
}

impl fmt::Debug for SkiaTextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkiaTextLayout")
            .field("text", &self.text)
            .field("px", &self.px)
            .field("fg_color", &self.fg_color)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl TextLayout for SkiaTextLayout {
    fn size(&self) -> Size {
        self.size
    }

    fn baseline(&self) -> f64 {
        self.baseline
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_families_always_resolve() {
        let mut text = SkiaText::default();
        assert_eq!(text.font_family("monospace"), Some(FontFamily::MONOSPACE));
        assert_eq!(text.font_family("Some Font"), None);
    }

    #[test]
    fn layout_without_fonts_is_missing_font() {
        let mut text = SkiaText::default();
        let result = text
            .new_text_layout("hello")
            .font(FontFamily::SANS_SERIF, 14.0)
            .build();
        assert!(matches!(result, Err(Error::MissingFont(_))));
    }

    #[test]
    fn garbage_font_data_fails_to_load() {
        let registry = FontRegistry::new();
        let result = registry.register("Broken", FontWeight::BOLD, b"not a font");
        assert!(matches!(result, Err(Error::FontLoadingFailed(_))));
        assert!(registry.is_empty());
    }
}
