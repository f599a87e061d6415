//! Card compositing
//!
//! Every card starts as a copy of one shared background; parts are drawn
//! in record order, so later parts cover earlier ones.

use crate::template::CardMetadata;
use crate::types::{CardParts, CardRecords, Color, ResolvedPart};
use crate::units::mm_to_px;
use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

/// Colour of all drawn text
pub const TEXT_COLOR: Color = Color::BLACK;

/// Blank card: the card rect filled with the background colour and grown
/// on every side by the border, if any.
pub fn card_background(metadata: &CardMetadata) -> RgbaImage {
    let dpi = metadata.resolution;
    let width = mm_to_px(metadata.rect.width, dpi);
    let height = mm_to_px(metadata.rect.height, dpi);

    let (border_px, border_color) = match metadata.border {
        Some(border) => (mm_to_px(border.size_mm, dpi), border.color),
        None => (0, Color::BLACK),
    };

    let total_width = width + 2 * border_px;
    let total_height = height + 2 * border_px;
    let mut background =
        RgbaImage::from_pixel(total_width, total_height, metadata.background_color.to_rgba());

    if border_px > 0 {
        let border = border_color.to_rgba();
        for (x, y, pixel) in background.enumerate_pixels_mut() {
            let inside_x = x >= border_px && x < total_width - border_px;
            let inside_y = y >= border_px && y < total_height - border_px;
            if !(inside_x && inside_y) {
                *pixel = border;
            }
        }
    }

    background
}

/// Draw one card's parts onto a fresh copy of `background`
pub fn compose(card: &CardParts, background: &RgbaImage) -> RgbaImage {
    let mut canvas = background.clone();
    let text_color: Rgba<u8> = TEXT_COLOR.to_rgba();

    for (_, part) in card.iter() {
        match part {
            ResolvedPart::Image { rect, image } => {
                imageops::overlay(&mut canvas, &**image, rect.x as i64, rect.y as i64);
            }
            ResolvedPart::Text { rect, text, font } => {
                let line_height = font.line_height() as i64;
                for (i, line) in text.lines().enumerate() {
                    let origin = (rect.x as i64, rect.y as i64 + i as i64 * line_height);
                    font.draw_line(&mut canvas, origin, line, text_color);
                }
            }
        }
    }

    canvas
}

/// Compose every card, in card id order.
///
/// Cards are independent, so they are drawn in parallel.
pub fn compose_cards(records: &CardRecords, background: &RgbaImage) -> Vec<RgbaImage> {
    let cards: Vec<&CardParts> = records.values().collect();
    let composed: Vec<RgbaImage> = cards
        .par_iter()
        .map(|card| compose(card, background))
        .collect();

    log::info!("Composed {} cards", composed.len());
    composed
}
