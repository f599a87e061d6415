//! Page tiling
//!
//! Cards are laid out on a uniform grid, filling each row left to right and
//! rows top to bottom. A page is sealed when its grid is full or the card
//! sequence ends, so only the last page can have empty slots.

use crate::types::{CarderError, RenderStatistics, Result};
use image::{Rgba, RgbaImage, imageops};

/// Colour of page areas not covered by a card
pub const PAGE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Grid of card slots on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGrid {
    pub columns: usize,
    pub rows: usize,
    pub card_width: u32,
    pub card_height: u32,
}

impl PageGrid {
    /// Fit as many whole cards as possible on a page.
    ///
    /// Fails when not even one card fits.
    pub fn new(page_size: (u32, u32), card_size: (u32, u32)) -> Result<Self> {
        let (page_width, page_height) = page_size;
        let (card_width, card_height) = card_size;

        if card_width == 0 || card_height == 0 {
            return Err(CarderError::Configuration(format!(
                "card size must be positive, got {}x{}px",
                card_width, card_height
            )));
        }

        let grid = Self {
            columns: (page_width / card_width) as usize,
            rows: (page_height / card_height) as usize,
            card_width,
            card_height,
        };

        if grid.capacity() == 0 {
            return Err(CarderError::Configuration(format!(
                "a {}x{}px card does not fit on a {}x{}px page",
                card_width, card_height, page_width, page_height
            )));
        }
        Ok(grid)
    }

    /// Card slots per page
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Pixel position of the `index`-th card of the whole sequence on its page
    pub fn slot_position(&self, index: usize) -> (u32, u32) {
        let slot = index % self.capacity();
        let row = slot / self.columns;
        let col = slot % self.columns;
        (
            self.card_width * col as u32,
            self.card_height * row as u32,
        )
    }

    /// Pages needed for `cards` cards
    pub fn page_count(&self, cards: usize) -> usize {
        cards.div_ceil(self.capacity())
    }
}

/// Tile `cards`, repeated `repeat` times, onto pages of `page_size` pixels.
///
/// The first card's size sets the grid. No cards means no pages.
pub fn tile(cards: &[RgbaImage], page_size: (u32, u32), repeat: usize) -> Result<Vec<RgbaImage>> {
    let total = sequence_length(cards.len(), repeat)?;
    let Some(first) = cards.first() else {
        return Ok(Vec::new());
    };

    let grid = PageGrid::new(page_size, first.dimensions())?;
    log::info!(
        "Tiling {} cards ({} x {}) on {} pages of {} slots",
        total,
        cards.len(),
        repeat,
        grid.page_count(total),
        grid.capacity()
    );

    let mut pages: Vec<RgbaImage> = Vec::new();
    for (index, card) in cards.iter().cycle().take(total).enumerate() {
        if index % grid.capacity() == 0 {
            pages.push(RgbaImage::from_pixel(page_size.0, page_size.1, PAGE_COLOR));
        }
        let (x, y) = grid.slot_position(index);
        if let Some(page) = pages.last_mut() {
            imageops::replace(page, card, x as i64, y as i64);
        }
    }

    Ok(pages)
}

/// Number of cards printed: `cards` repeated `repeat` times
fn sequence_length(cards: usize, repeat: usize) -> Result<usize> {
    if repeat == 0 {
        return Err(CarderError::Configuration(
            "repeat must be at least 1".to_string(),
        ));
    }
    cards.checked_mul(repeat).ok_or_else(|| {
        CarderError::Configuration(format!(
            "{} cards repeated {} times is too many to print",
            cards, repeat
        ))
    })
}

/// Page statistics without rendering anything
pub fn calculate_statistics(
    cards: usize,
    card_size: (u32, u32),
    page_size: (u32, u32),
    repeat: usize,
) -> Result<RenderStatistics> {
    let total = sequence_length(cards, repeat)?;
    let grid = PageGrid::new(page_size, card_size)?;

    Ok(RenderStatistics {
        cards,
        repeat,
        columns: grid.columns,
        rows: grid.rows,
        slots_per_page: grid.capacity(),
        pages: grid.page_count(total),
    })
}
