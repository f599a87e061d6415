//! Fonts: glyph measurement and rasterisation
//!
//! The text fitter only needs [`MeasureText`]; the compositor additionally
//! draws through [`CardFont`]. [`GlyphFont`] implements both on top of
//! `rusttype`, and [`Fonts`] hands out the template default or a per-part
//! override.

use crate::types::{CarderError, Result};
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pixel size used when a template does not set `font_size`
pub const DEFAULT_FONT_SIZE_PX: f32 = 40.0;

/// Extra pixels between two drawn lines, on top of the font line height
pub const LINE_SPACING_PX: u32 = 4;

static BUILTIN_FONT: &[u8] = include_bytes!("../fonts/DejaVuSansMono.ttf");

/// Anything that can tell how wide a string renders, in pixels.
pub trait MeasureText {
    fn text_width(&self, text: &str) -> f32;
}

/// A font the compositor can draw with.
pub trait CardFont: MeasureText + Send + Sync {
    /// Vertical distance between the tops of two consecutive lines
    fn line_height(&self) -> u32;

    /// Draw one line of text with its top-left corner at `origin`.
    ///
    /// Pixels falling outside `canvas` are clipped.
    fn draw_line(&self, canvas: &mut RgbaImage, origin: (i64, i64), text: &str, color: Rgba<u8>);
}

/// Shared handle to a loaded font
pub type FontHandle = Arc<dyn CardFont>;

/// A TrueType font at a fixed pixel size.
#[derive(Clone)]
pub struct GlyphFont {
    font: Font<'static>,
    scale: Scale,
}

impl GlyphFont {
    /// The monospace font compiled into the crate
    pub fn builtin(size_px: f32) -> Result<Self> {
        let font = Font::try_from_bytes(BUILTIN_FONT)
            .ok_or_else(|| CarderError::Font("Failed to parse built-in font".to_string()))?;
        Ok(Self::with_font(font, size_px))
    }

    pub fn from_vec(bytes: Vec<u8>, size_px: f32) -> Result<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| CarderError::Font("Failed to parse font data".to_string()))?;
        Ok(Self::with_font(font, size_px))
    }

    /// Load a `.ttf`/`.otf` file from disk
    pub fn load(path: impl AsRef<Path>, size_px: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| CarderError::source_io(path, e))?;
        Self::from_vec(bytes, size_px).map_err(|_| {
            CarderError::Font(format!("Failed to parse font {}", path.display()))
        })
    }

    fn with_font(font: Font<'static>, size_px: f32) -> Self {
        Self {
            font,
            scale: Scale::uniform(size_px),
        }
    }

    pub fn size_px(&self) -> f32 {
        self.scale.y
    }
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont")
            .field("size_px", &self.scale.y)
            .finish_non_exhaustive()
    }
}

impl MeasureText for GlyphFont {
    fn text_width(&self, text: &str) -> f32 {
        self.font
            .layout(text, self.scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }
}

impl CardFont for GlyphFont {
    fn line_height(&self) -> u32 {
        let v_metrics = self.font.v_metrics(self.scale);
        (v_metrics.ascent - v_metrics.descent + v_metrics.line_gap).ceil() as u32
            + LINE_SPACING_PX
    }

    fn draw_line(&self, canvas: &mut RgbaImage, origin: (i64, i64), text: &str, color: Rgba<u8>) {
        let v_metrics = self.font.v_metrics(self.scale);
        let start = point(origin.0 as f32, origin.1 as f32 + v_metrics.ascent);

        for glyph in self.font.layout(text, self.scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i64 + bb.min.x as i64;
                let py = gy as i64 + bb.min.y as i64;
                if px < 0 || py < 0 || px >= canvas.width() as i64 || py >= canvas.height() as i64
                {
                    return;
                }
                blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * color.0[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for channel in 0..3 {
        dst.0[channel] = (color.0[channel] as f32 * alpha + dst.0[channel] as f32 * inv) as u8;
    }
    dst.0[3] = dst.0[3].max((alpha * 255.0) as u8);
}

/// Font context for one run: the template default plus lazily loaded
/// per-part overrides, all at the same pixel size.
pub struct Fonts {
    default: FontHandle,
    size_px: f32,
    loaded: HashMap<PathBuf, FontHandle>,
}

impl Fonts {
    pub fn new(default: FontHandle, size_px: f32) -> Self {
        Self {
            default,
            size_px,
            loaded: HashMap::new(),
        }
    }

    /// Use the built-in font as the default
    pub fn builtin(size_px: f32) -> Result<Self> {
        Ok(Self::new(Arc::new(GlyphFont::builtin(size_px)?), size_px))
    }

    /// Use a font file as the default
    pub fn from_file(path: impl AsRef<Path>, size_px: f32) -> Result<Self> {
        Ok(Self::new(Arc::new(GlyphFont::load(path, size_px)?), size_px))
    }

    pub fn default_font(&self) -> FontHandle {
        Arc::clone(&self.default)
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    /// The override font if one is given, else the default.
    ///
    /// Each override file is parsed once per run.
    pub fn resolve(&mut self, font_override: Option<&Path>) -> Result<FontHandle> {
        let Some(path) = font_override else {
            return Ok(self.default_font());
        };
        if let Some(font) = self.loaded.get(path) {
            return Ok(Arc::clone(font));
        }

        log::debug!("Loading font {}", path.display());
        let font: FontHandle = Arc::new(GlyphFont::load(path, self.size_px)?);
        self.loaded.insert(path.to_path_buf(), Arc::clone(&font));
        Ok(font)
    }
}

impl std::fmt::Debug for Fonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fonts")
            .field("size_px", &self.size_px)
            .field("overrides", &self.loaded.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_font_is_monospace() {
        let font = GlyphFont::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        let one = font.text_width("i");
        let four = font.text_width("mmmm");
        assert!(one > 0.0);
        assert!((four - 4.0 * one).abs() < 1.0);
    }

    #[test]
    fn test_empty_text_has_no_width() {
        let font = GlyphFont::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        assert_eq!(font.text_width(""), 0.0);
    }

    #[test]
    fn test_line_height_exceeds_font_size() {
        let font = GlyphFont::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        assert!(font.line_height() as f32 > DEFAULT_FONT_SIZE_PX);
    }

    #[test]
    fn test_draw_line_marks_pixels() {
        let font = GlyphFont::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        let mut canvas = RgbaImage::from_pixel(200, 60, Rgba([255, 255, 255, 255]));
        font.draw_line(&mut canvas, (0, 0), "HH", Rgba([0, 0, 0, 255]));
        assert!(canvas.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn test_draw_line_clips_outside_canvas() {
        let font = GlyphFont::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        font.draw_line(&mut canvas, (-500, -500), "clipped", Rgba([0, 0, 0, 255]));
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_resolve_without_override_returns_default() {
        let mut fonts = Fonts::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        let default = fonts.default_font();
        let resolved = fonts.resolve(None).unwrap();
        assert!(Arc::ptr_eq(&default, &resolved));
    }

    #[test]
    fn test_resolve_missing_override_fails() {
        let mut fonts = Fonts::builtin(DEFAULT_FONT_SIZE_PX).unwrap();
        let result = fonts.resolve(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(result, Err(CarderError::SourceIo { .. })));
    }
}
