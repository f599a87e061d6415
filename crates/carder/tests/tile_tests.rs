use carder::*;
use image::{Rgba, RgbaImage};

const PAGE: (u32, u32) = (300, 300);

/// Distinct solid cards, 100x100px, so nine fit on a page
fn cards(count: usize) -> Vec<RgbaImage> {
    (0..count)
        .map(|i| RgbaImage::from_pixel(100, 100, Rgba([i as u8 * 10, 0, 0, 255])))
        .collect()
}

fn card_color(index: usize) -> Rgba<u8> {
    Rgba([index as u8 * 10, 0, 0, 255])
}

#[test]
fn test_page_count_matches_capacity() {
    for count in 1..=20 {
        for repeat in 1..=3 {
            let pages = tile(&cards(count), PAGE, repeat).unwrap();
            assert_eq!(
                pages.len(),
                (count * repeat).div_ceil(9),
                "{} cards x {}",
                count,
                repeat
            );
        }
    }
}

#[test]
fn test_pages_have_page_size() {
    let pages = tile(&cards(4), (350, 320), 1).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].dimensions(), (350, 320));
    // Leftover strip stays page-coloured
    assert_eq!(*pages[0].get_pixel(340, 10), tile::PAGE_COLOR);
}

#[test]
fn test_only_last_page_has_empty_slots() {
    let pages = tile(&cards(11), PAGE, 1).unwrap();
    assert_eq!(pages.len(), 2);

    // First page is full, in row-major order
    for slot in 0..9 {
        let (x, y) = ((slot % 3) as u32 * 100 + 50, (slot / 3) as u32 * 100 + 50);
        assert_eq!(*pages[0].get_pixel(x, y), card_color(slot));
    }

    // Second page: cards 9 and 10, then blank slots
    assert_eq!(*pages[1].get_pixel(50, 50), card_color(9));
    assert_eq!(*pages[1].get_pixel(150, 50), card_color(10));
    assert_eq!(*pages[1].get_pixel(250, 50), tile::PAGE_COLOR);
    assert_eq!(*pages[1].get_pixel(50, 150), tile::PAGE_COLOR);
}

#[test]
fn test_repeat_cycles_whole_sequence() {
    let pages = tile(&cards(2), PAGE, 9).unwrap();
    assert_eq!(pages.len(), 2);

    // 18 cards: a, b, a, b, ... filling both pages
    for (page_index, page) in pages.iter().enumerate() {
        for slot in 0..9 {
            let (x, y) = ((slot % 3) as u32 * 100 + 50, (slot / 3) as u32 * 100 + 50);
            let index = page_index * 9 + slot;
            assert_eq!(*page.get_pixel(x, y), card_color(index % 2));
        }
    }
}

#[test]
fn test_two_cards_single_page() {
    let pages = tile(&cards(2), PAGE, 1).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(*pages[0].get_pixel(50, 50), card_color(0));
    assert_eq!(*pages[0].get_pixel(150, 50), card_color(1));
    assert_eq!(*pages[0].get_pixel(250, 50), tile::PAGE_COLOR);
}

#[test]
fn test_no_cards_no_pages() {
    let pages = tile(&[], PAGE, 3).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn test_zero_repeat_rejected() {
    let result = tile(&cards(2), PAGE, 0);
    assert!(matches!(result, Err(CarderError::Configuration(_))));
}

#[test]
fn test_statistics_agree_with_tiling() {
    let stats = calculate_statistics(11, (100, 100), PAGE, 2).unwrap();
    assert_eq!(stats.columns, 3);
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.slots_per_page, 9);
    assert_eq!(stats.pages, tile(&cards(11), PAGE, 2).unwrap().len());
}
