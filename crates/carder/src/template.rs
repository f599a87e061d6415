//! Template loading
//!
//! A template is a TOML document with one `[card]` metadata table and any
//! number of named part tables:
//!
//! ```toml
//! [card]
//! rect = [0, 0, 63, 88]          # mm, origin is always 0,0
//! background_color = [255, 255, 255]
//! resolution = 300               # DPI
//!
//! [card.border]                  # optional
//! size = 0.2                     # mm
//! color = [0, 0, 0]              # or a single grey level
//!
//! [name]
//! path = "names.csv"             # csv table, image folder or single image
//! rect = [5, 5, 53, 10]          # x, y, width, height in mm
//! font = "fonts/title.ttf"       # optional
//! to_ascii = true                # optional
//! ```
//!
//! Part tables keep their document order. Relative paths are resolved
//! against the template's directory.

use crate::fonts::DEFAULT_FONT_SIZE_PX;
use crate::types::{CarderError, Color, MmRect, Result};
use crate::wrap::WrapPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the metadata table
pub const CARD_TABLE: &str = "card";

/// Extensions accepted for fixed images and image folder entries
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extension of text table sources
pub const TEXT_TABLE_EXTENSION: &str = "csv";

/// Card-wide settings from the `[card]` table
#[derive(Debug, Clone, PartialEq)]
pub struct CardMetadata {
    pub rect: MmRect,
    pub resolution: u32,
    pub background_color: Color,
    pub border: Option<Border>,
    /// Replaces the built-in default font
    pub font: Option<PathBuf>,
    pub font_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub size_mm: f64,
    pub color: Color,
}

/// One named part table
#[derive(Debug, Clone, PartialEq)]
pub struct PartDeclaration {
    pub name: String,
    pub path: PathBuf,
    pub rect: MmRect,
    pub font: Option<PathBuf>,
    pub to_ascii: bool,
    pub wrap: WrapPolicy,
}

/// Where a part's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// One image drawn on every card
    FixedImage,
    /// One image per card, named after the card id
    ImageFolder,
    /// One CSV row per card, one column per locale
    TextTable,
}

impl PartKind {
    /// Fixed images are applied after every per-card source
    pub fn is_default(self) -> bool {
        matches!(self, PartKind::FixedImage)
    }
}

impl PartDeclaration {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, rect: MmRect) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            rect,
            font: None,
            to_ascii: false,
            wrap: WrapPolicy::default(),
        }
    }

    /// Classify the part by its path.
    ///
    /// An existing directory, or a path without an extension, is an image
    /// folder. Otherwise the extension decides between a text table and a
    /// fixed image; anything else is rejected.
    pub fn kind(&self) -> Result<PartKind> {
        if self.path.is_dir() {
            return Ok(PartKind::ImageFolder);
        }

        let Some(extension) = self.path.extension() else {
            return Ok(PartKind::ImageFolder);
        };
        let extension = extension.to_string_lossy().to_lowercase();

        if extension == TEXT_TABLE_EXTENSION {
            Ok(PartKind::TextTable)
        } else if SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(PartKind::FixedImage)
        } else {
            Err(CarderError::part(
                &self.name,
                format!("path {} cannot be processed", self.path.display()),
            ))
        }
    }
}

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub metadata: CardMetadata,
    pub parts: Vec<PartDeclaration>,
}

impl Template {
    /// Read and parse a template file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CarderError::source_io(path, e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&source, base_dir)
    }

    /// Parse template text, resolving relative paths against `base_dir`
    pub fn parse(source: &str, base_dir: &Path) -> Result<Self> {
        let table: toml::Table = toml::from_str(source)?;

        let card = table.get(CARD_TABLE).ok_or_else(|| {
            CarderError::Configuration(format!("missing [{}] table", CARD_TABLE))
        })?;
        let metadata = parse_metadata(card, base_dir)?;

        let mut parts = Vec::new();
        for (name, value) in table.iter() {
            if name == CARD_TABLE {
                continue;
            }
            parts.push(parse_part(name, value, base_dir)?);
        }

        log::debug!("Parsed template with {} parts", parts.len());
        Ok(Self { metadata, parts })
    }
}

// =============================================================================
// Raw TOML shapes
// =============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCard {
    rect: [f64; 4],
    resolution: u32,
    #[serde(default = "default_background")]
    background_color: Color,
    #[serde(default)]
    border: Option<RawBorder>,
    #[serde(default)]
    font: Option<PathBuf>,
    #[serde(default)]
    font_size: Option<f32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBorder {
    #[serde(default)]
    size: f64,
    #[serde(default = "default_border")]
    color: Color,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPart {
    path: PathBuf,
    rect: [f64; 4],
    #[serde(default)]
    font: Option<PathBuf>,
    #[serde(default)]
    to_ascii: bool,
    #[serde(default)]
    wrap: WrapPolicy,
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_border() -> Color {
    Color::BLACK
}

fn parse_metadata(value: &toml::Value, base_dir: &Path) -> Result<CardMetadata> {
    let raw: RawCard = value
        .clone()
        .try_into()
        .map_err(|e| CarderError::Configuration(format!("[{}]: {}", CARD_TABLE, e)))?;

    if raw.resolution == 0 {
        return Err(CarderError::Configuration(
            "resolution must be greater than 0".to_string(),
        ));
    }

    let [x, y, width, height] = raw.rect;
    if x != 0.0 || y != 0.0 {
        return Err(CarderError::Configuration(format!(
            "card rect must start at the origin, got [{}, {}]",
            x, y
        )));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(CarderError::Configuration(format!(
            "card size must be positive, got {}x{}mm",
            width, height
        )));
    }

    let font_size = raw.font_size.unwrap_or(DEFAULT_FONT_SIZE_PX);
    if font_size <= 0.0 {
        return Err(CarderError::Configuration(
            "font_size must be greater than 0".to_string(),
        ));
    }

    Ok(CardMetadata {
        rect: raw.rect.into(),
        resolution: raw.resolution,
        background_color: raw.background_color,
        border: raw.border.map(|border| Border {
            size_mm: border.size,
            color: border.color,
        }),
        font: raw.font.map(|font| base_dir.join(font)),
        font_size,
    })
}

fn parse_part(name: &str, value: &toml::Value, base_dir: &Path) -> Result<PartDeclaration> {
    if !value.is_table() {
        return Err(CarderError::part(name, "expected a table"));
    }
    if value.get("path").is_none() {
        return Err(CarderError::part(name, "no path"));
    }

    let raw: RawPart = value
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| CarderError::part(name, e.message()))?;

    let rect = MmRect::from(raw.rect);
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(CarderError::part(
            name,
            format!("rect size must be positive, got {}x{}mm", rect.width, rect.height),
        ));
    }

    Ok(PartDeclaration {
        name: name.to_string(),
        path: base_dir.join(raw.path),
        rect,
        font: raw.font.map(|font| base_dir.join(font)),
        to_ascii: raw.to_ascii,
        wrap: raw.wrap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
[card]
rect = [0, 0, 63, 88]
background_color = [250, 250, 250]
resolution = 300

[card.border]
size = 0.2
color = 0

[image]
path = "imgs"
rect = [1, 1, 50, 86]

[text]
path = "texts.csv"
rect = [1, 1, 10, 10]
to_ascii = true
wrap = "punctuated"

[logo]
path = "logo.png"
rect = [52, 1, 10, 86]
"#;

    #[test]
    fn test_parse_metadata() {
        let template = Template::parse(TEMPLATE, Path::new("/tpl")).unwrap();
        let meta = &template.metadata;
        assert_eq!(meta.resolution, 300);
        assert_eq!(meta.rect, MmRect::new(0.0, 0.0, 63.0, 88.0));
        assert_eq!(meta.background_color.rgb(), [250, 250, 250]);
        assert_eq!(
            meta.border,
            Some(Border {
                size_mm: 0.2,
                color: Color::Gray(0)
            })
        );
        assert_eq!(meta.font_size, DEFAULT_FONT_SIZE_PX);
    }

    #[test]
    fn test_parts_keep_document_order() {
        let template = Template::parse(TEMPLATE, Path::new("/tpl")).unwrap();
        let names: Vec<_> = template.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["image", "text", "logo"]);
        assert_eq!(template.parts[1].path, PathBuf::from("/tpl/texts.csv"));
        assert!(template.parts[1].to_ascii);
        assert_eq!(template.parts[1].wrap, WrapPolicy::Punctuated);
    }

    #[test]
    fn test_defaults() {
        let template = Template::parse(
            "[card]\nrect = [0, 0, 10, 10]\nresolution = 100\n",
            Path::new(""),
        )
        .unwrap();
        assert_eq!(template.metadata.background_color, Color::WHITE);
        assert!(template.metadata.border.is_none());
        assert!(template.parts.is_empty());
    }

    #[test]
    fn test_missing_card_table() {
        let result = Template::parse("[text]\npath = \"a.csv\"\nrect = [0, 0, 1, 1]\n", Path::new(""));
        assert!(matches!(result, Err(CarderError::Configuration(_))));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let result = Template::parse("[card]\nrect = [0, 0, 10, 10]\nresolution = 0\n", Path::new(""));
        assert!(matches!(result, Err(CarderError::Configuration(_))));
    }

    #[test]
    fn test_part_without_path() {
        let source = "[card]\nrect = [0, 0, 10, 10]\nresolution = 100\n[title]\nrect = [0, 0, 1, 1]\n";
        match Template::parse(source, Path::new("")) {
            Err(CarderError::TemplatePart { part, reason }) => {
                assert_eq!(part, "title");
                assert_eq!(reason, "no path");
            }
            other => panic!("Expected TemplatePart error, got {:?}", other),
        }
    }

    #[test]
    fn test_part_kind_from_extension() {
        let rect = MmRect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            PartDeclaration::new("t", "/nowhere/t.csv", rect).kind().unwrap(),
            PartKind::TextTable
        );
        assert_eq!(
            PartDeclaration::new("l", "/nowhere/logo.PNG", rect).kind().unwrap(),
            PartKind::FixedImage
        );
        assert_eq!(
            PartDeclaration::new("i", "/nowhere/images", rect).kind().unwrap(),
            PartKind::ImageFolder
        );
        assert!(
            PartDeclaration::new("x", "/nowhere/notes.txt", rect)
                .kind()
                .is_err()
        );
    }
}
