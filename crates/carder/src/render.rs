//! End-to-end rendering: template file in, PDF out
//!
//! 1. Load and validate the template
//! 2. Resolve parts into per-card records
//! 3. Compose each card on the shared background
//! 4. Tile cards onto pages and write the PDF

use crate::compose::{card_background, compose_cards};
use crate::fonts::Fonts;
use crate::options::RenderOptions;
use crate::pdf::save_pdf;
use crate::resolve::resolve;
use crate::template::{CardMetadata, Template};
use crate::tile::{calculate_statistics, tile};
use crate::types::*;
use crate::units::size_to_px;
use image::RgbaImage;
use std::path::Path;

/// Font context for a template: its own default font if set, else the
/// built-in one.
pub fn template_fonts(metadata: &CardMetadata) -> Result<Fonts> {
    match &metadata.font {
        Some(path) => Fonts::from_file(path, metadata.font_size),
        None => Fonts::builtin(metadata.font_size),
    }
}

/// Page size in pixels at the template resolution
pub fn page_size_px(metadata: &CardMetadata, options: &RenderOptions) -> (u32, u32) {
    size_to_px(options.page_size_mm(), metadata.resolution)
}

/// Render all pages of a template in memory
pub fn render_pages(
    template: &Template,
    options: &RenderOptions,
) -> Result<(Vec<RgbaImage>, RenderStatistics)> {
    options.validate()?;
    let metadata = &template.metadata;

    let mut fonts = template_fonts(metadata)?;
    let records = resolve(
        &template.parts,
        &options.locale,
        metadata.resolution,
        &mut fonts,
    )?;
    if records.is_empty() {
        return Err(CarderError::NoCards);
    }

    let background = card_background(metadata);
    let cards = compose_cards(&records, &background);

    let page_size = page_size_px(metadata, options);
    let pages = tile(&cards, page_size, options.repeat)?;
    let stats = calculate_statistics(
        cards.len(),
        background.dimensions(),
        page_size,
        options.repeat,
    )?;

    Ok((pages, stats))
}

/// Render the template at `template_path` into a PDF at `output_path`
pub async fn render_template(
    template_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<RenderStatistics> {
    let template = Template::load(template_path).await?;
    let resolution = template.metadata.resolution;
    let options = options.clone();

    // Resolution and compositing are CPU-bound, spawn blocking
    let (pages, stats) =
        tokio::task::spawn_blocking(move || render_pages(&template, &options)).await??;

    save_pdf(pages, resolution, output_path).await?;
    Ok(stats)
}

/// Resolve the template and report the page layout without drawing
pub async fn template_statistics(
    template_path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<RenderStatistics> {
    let template = Template::load(template_path).await?;
    let options = options.clone();

    tokio::task::spawn_blocking(move || {
        options.validate()?;
        let metadata = &template.metadata;
        let mut fonts = template_fonts(metadata)?;
        let records = resolve(
            &template.parts,
            &options.locale,
            metadata.resolution,
            &mut fonts,
        )?;

        let background = card_background(metadata);
        calculate_statistics(
            records.len(),
            background.dimensions(),
            page_size_px(metadata, &options),
            options.repeat,
        )
    })
    .await?
}
