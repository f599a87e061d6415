use crate::types::{CarderError, Result};
use crate::units::px_to_mm;
use image::RgbaImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, RawImageData, RawImageFormat,
    XObjectTransform,
};
use std::path::Path;

/// Encode page images as a multi-page PDF.
///
/// Each page is sized so the image covers it exactly at `resolution` DPI.
pub fn encode_pdf(pages: &[RgbaImage], resolution: u32) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(CarderError::NoCards);
    }

    let mut doc = PdfDocument::new("Cards");

    for page in pages {
        let (width_px, height_px) = page.dimensions();
        let image = RawImage {
            pixels: RawImageData::U8(rgb_bytes(page)),
            width: width_px as usize,
            height: height_px as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let image_id = doc.add_image(&image);

        let ops = vec![Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                dpi: Some(resolution as f32),
                ..Default::default()
            },
        }];

        doc.pages.push(PdfPage::new(
            Mm(px_to_mm(width_px, resolution) as f32),
            Mm(px_to_mm(height_px, resolution) as f32),
            ops,
        ));
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    for warning in &warnings {
        log::debug!("PDF warning: {:?}", warning);
    }

    Ok(bytes)
}

/// Pages are opaque, so alpha is dropped
fn rgb_bytes(page: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(page.width() as usize * page.height() as usize * 3);
    for pixel in page.pixels() {
        bytes.extend_from_slice(&pixel.0[..3]);
    }
    bytes
}

/// Encode `pages` and write the PDF to `output_path`
pub async fn save_pdf(
    pages: Vec<RgbaImage>,
    resolution: u32,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let output_path = output_path.as_ref().to_owned();

    // PDF encoding is CPU-bound, spawn blocking
    let bytes = tokio::task::spawn_blocking(move || encode_pdf(&pages, resolution)).await??;

    tokio::fs::write(&output_path, bytes).await?;
    log::info!("Wrote {}", output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_rgb_bytes_drops_alpha() {
        let mut page = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
        page.put_pixel(1, 0, Rgba([40, 50, 60, 128]));
        assert_eq!(rgb_bytes(&page), vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_one_pdf_page_per_image() {
        let pages = vec![
            RgbaImage::from_pixel(30, 40, Rgba([255, 255, 255, 255])),
            RgbaImage::from_pixel(30, 40, Rgba([0, 0, 255, 255])),
        ];
        let bytes = encode_pdf(&pages, 300).unwrap();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
