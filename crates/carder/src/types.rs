use image::{Rgba, RgbaImage};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::fonts::FontHandle;

#[derive(Error, Debug)]
pub enum CarderError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error(
        "Invalid locale `{locale}` among [{}] in {}",
        .available.join(", "),
        .path.display()
    )]
    UnknownLocale {
        locale: String,
        available: Vec<String>,
        path: PathBuf,
    },
    #[error("Template part `{part}`: {reason}")]
    TemplatePart { part: String, reason: String },
    #[error("Cannot read {}: {source}", .path.display())]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Template syntax error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Font error: {0}")]
    Font(String),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No cards to render")]
    NoCards,
}

impl CarderError {
    pub(crate) fn part(part: impl Into<String>, reason: impl Into<String>) -> Self {
        CarderError::TemplatePart {
            part: part.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn source_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CarderError::SourceIo {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the template metadata or run options
    /// rather than by a single part or a source file.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CarderError::Configuration(_) | CarderError::UnknownLocale { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CarderError>;

/// An RGB colour as written in templates.
///
/// Accepts either `[r, g, b]` or a single grey level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Rgb([u8; 3]),
    Gray(u8),
}

impl Color {
    pub const WHITE: Color = Color::Rgb([255, 255, 255]);
    pub const BLACK: Color = Color::Rgb([0, 0, 0]);

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Color::Rgb(rgb) => rgb,
            Color::Gray(level) => [level, level, level],
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.rgb();
        Rgba([r, g, b, 255])
    }
}

/// A rectangle in millimetres, relative to the card canvas origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MmRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn to_pixels(self, resolution: u32) -> PixelRect {
        use crate::units::mm_to_px;

        PixelRect {
            x: mm_to_px(self.x, resolution),
            y: mm_to_px(self.y, resolution),
            width: mm_to_px(self.width, resolution),
            height: mm_to_px(self.height, resolution),
        }
    }
}

impl From<[f64; 4]> for MmRect {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

/// An axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// One part of one card, ready to be drawn.
///
/// Images are already resized to `rect` and text is already wrapped to the
/// rect width.
#[derive(Clone)]
pub enum ResolvedPart {
    Image {
        rect: PixelRect,
        image: Arc<RgbaImage>,
    },
    Text {
        rect: PixelRect,
        text: String,
        font: FontHandle,
    },
}

impl ResolvedPart {
    pub fn rect(&self) -> PixelRect {
        match self {
            ResolvedPart::Image { rect, .. } | ResolvedPart::Text { rect, .. } => *rect,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ResolvedPart::Text { text, .. } => Some(text),
            ResolvedPart::Image { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            ResolvedPart::Image { image, .. } => Some(image),
            ResolvedPart::Text { .. } => None,
        }
    }
}

impl std::fmt::Debug for ResolvedPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedPart::Image { rect, image } => f
                .debug_struct("Image")
                .field("rect", rect)
                .field("size", &image.dimensions())
                .finish(),
            ResolvedPart::Text { rect, text, .. } => f
                .debug_struct("Text")
                .field("rect", rect)
                .field("text", text)
                .finish(),
        }
    }
}

/// The parts of a single card, in drawing order.
///
/// Inserting a name that is already present replaces the part in place.
#[derive(Debug, Clone, Default)]
pub struct CardParts {
    parts: Vec<(String, ResolvedPart)>,
}

impl CardParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, part: ResolvedPart) {
        let name = name.into();
        match self.parts.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = part,
            None => self.parts.push((name, part)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPart> {
        self.parts
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, part)| part)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedPart)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Resolved cards keyed by card identifier, iterated in identifier order.
pub type CardRecords = std::collections::BTreeMap<String, CardParts>;

/// Summary of a render run
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStatistics {
    /// Distinct resolved cards
    pub cards: usize,
    /// How many times the card sequence is repeated
    pub repeat: usize,
    /// Card slots per row of a page
    pub columns: usize,
    /// Card slots per column of a page
    pub rows: usize,
    /// Card slots per page
    pub slots_per_page: usize,
    /// Output page count
    pub pages: usize,
}
