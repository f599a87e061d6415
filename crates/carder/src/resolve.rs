//! Template resolution: from part declarations to per-card records
//!
//! Per-card sources (text tables and image folders) are processed first, in
//! declaration order, and each contributes entries only for the card ids it
//! carries. Fixed images are processed last and copied into every card that
//! exists at that point, so they never shadow per-card data and a template
//! made only of fixed images yields no cards.

use crate::csv::load_text_table;
use crate::fonts::Fonts;
use crate::template::{PartDeclaration, PartKind, SUPPORTED_IMAGE_EXTENSIONS};
use crate::types::*;
use crate::wrap::fit_text_with;
use image::RgbaImage;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Resolve every part of a template into per-card records.
///
/// Rects are converted to pixels at `resolution`, images are resized to
/// their rect and text is wrapped to the rect width.
pub fn resolve(
    parts: &[PartDeclaration],
    locale: &str,
    resolution: u32,
    fonts: &mut Fonts,
) -> Result<CardRecords> {
    let mut queue = Vec::with_capacity(parts.len());
    for part in parts {
        queue.push((part, part.kind()?));
    }
    // Stable: declaration order is kept within each class
    queue.sort_by_key(|(_, kind)| kind.is_default());

    let mut cards = CardRecords::new();

    for (part, kind) in queue {
        let rect = part.rect.to_pixels(resolution);
        log::debug!("Resolving part `{}` ({:?}) at {:?}", part.name, kind, rect);

        match kind {
            PartKind::TextTable => resolve_text(part, rect, locale, fonts, &mut cards)?,
            PartKind::ImageFolder => resolve_folder(part, rect, &mut cards)?,
            PartKind::FixedImage => resolve_fixed(part, rect, &mut cards)?,
        }
    }

    log::info!(
        "Resolved {} cards from {} template parts",
        cards.len(),
        parts.len()
    );
    Ok(cards)
}

fn resolve_text(
    part: &PartDeclaration,
    rect: PixelRect,
    locale: &str,
    fonts: &mut Fonts,
    cards: &mut CardRecords,
) -> Result<()> {
    let rows = load_text_table(&part.name, &part.path, locale, part.to_ascii)
        .map_err(|e| part_error(&part.name, &part.path, e))?;
    let font = fonts.resolve(part.font.as_deref()).map_err(|e| {
        part_error(&part.name, part.font.as_deref().unwrap_or(&part.path), e)
    })?;

    for row in rows {
        let text = fit_text_with(&row.text, &*font, rect.width as f32, part.wrap);
        cards.entry(row.card_id).or_default().insert(
            part.name.as_str(),
            ResolvedPart::Text {
                rect,
                text,
                font: Arc::clone(&font),
            },
        );
    }
    Ok(())
}

fn resolve_folder(part: &PartDeclaration, rect: PixelRect, cards: &mut CardRecords) -> Result<()> {
    let images =
        unfold_image_folder(&part.path).map_err(|e| part_error(&part.name, &part.path, e))?;
    if images.is_empty() {
        log::warn!(
            "Part `{}`: no images found under {}",
            part.name,
            part.path.display()
        );
    }

    for (card_id, path) in images {
        let image = load_resized(&path, rect).map_err(|e| part_error(&part.name, &path, e))?;
        cards.entry(card_id).or_default().insert(
            part.name.as_str(),
            ResolvedPart::Image {
                rect,
                image: Arc::new(image),
            },
        );
    }
    Ok(())
}

fn resolve_fixed(part: &PartDeclaration, rect: PixelRect, cards: &mut CardRecords) -> Result<()> {
    if cards.is_empty() {
        log::warn!(
            "Part `{}`: fixed image has no cards to apply to",
            part.name
        );
        return Ok(());
    }

    let image =
        load_resized(&part.path, rect).map_err(|e| part_error(&part.name, &part.path, e))?;
    let image = Arc::new(image);
    for parts in cards.values_mut() {
        parts.insert(
            part.name.as_str(),
            ResolvedPart::Image {
                rect,
                image: Arc::clone(&image),
            },
        );
    }
    Ok(())
}

/// Name the part and the source file in errors raised while reading it.
///
/// Errors that already name a part, and locale errors, pass through.
fn part_error(part: &str, path: &Path, err: CarderError) -> CarderError {
    match err {
        CarderError::TemplatePart { .. } | CarderError::UnknownLocale { .. } => err,
        CarderError::SourceIo {
            path: unreadable,
            source,
        } => CarderError::part(
            part,
            format!("cannot read {}: {}", unreadable.display(), source),
        ),
        other => CarderError::part(part, format!("{}: {}", path.display(), other)),
    }
}

/// Image files under `dir` keyed by lower-cased file stem.
///
/// Walks recursively in file-name order; when two files share a stem the
/// one visited last wins. A missing path or a plain file yields nothing.
pub fn unfold_image_folder(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut images: Vec<(String, PathBuf)> = Vec::new();
    if !dir.is_dir() {
        return Ok(images);
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            CarderError::source_io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !has_image_extension(path) {
            log::debug!("Skipping non-image file {}", path.display());
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };

        let card_id = stem.to_string_lossy().to_lowercase();
        match images.iter_mut().find(|(id, _)| *id == card_id) {
            Some((_, existing)) => *existing = path.to_path_buf(),
            None => images.push((card_id, path.to_path_buf())),
        }
    }

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Decode an image and resize it to the rect size
fn load_resized(path: &Path, rect: PixelRect) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|e| CarderError::source_io(path, e))?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();

    if image.dimensions() == rect.size() {
        return Ok(image);
    }
    Ok(image::imageops::resize(
        &image,
        rect.width,
        rect.height,
        FilterType::Lanczos3,
    ))
}
