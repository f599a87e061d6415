//! Physical to device unit conversion
//!
//! Every geometry in a template is written in millimetres and rasterised at
//! the template resolution (dots per inch).

// =============================================================================
// Constants
// =============================================================================

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

// =============================================================================
// Conversions
// =============================================================================

/// Convert millimetres to whole device pixels at `dpi`.
///
/// Fractions are truncated and negative lengths clamp to zero.
#[inline]
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (dpi as f64 * mm / MM_PER_INCH) as u32
}

/// Convert device pixels at `dpi` back to millimetres
#[inline]
pub fn px_to_mm(px: u32, dpi: u32) -> f64 {
    px as f64 * MM_PER_INCH / dpi as f64
}

/// Convert a `(width, height)` size in millimetres to pixels
pub fn size_to_px((width_mm, height_mm): (f64, f64), dpi: u32) -> (u32, u32) {
    (mm_to_px(width_mm, dpi), mm_to_px(height_mm, dpi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_px_truncates() {
        // 63mm at 300 DPI is 744.09px
        assert_eq!(mm_to_px(63.0, 300), 744);
        assert_eq!(mm_to_px(88.0, 300), 1039);
        assert_eq!(mm_to_px(0.2, 300), 2);
    }

    #[test]
    fn test_mm_to_px_clamps_negative() {
        assert_eq!(mm_to_px(-5.0, 300), 0);
    }

    #[test]
    fn test_px_to_mm_inverse() {
        assert!((px_to_mm(300, 300) - MM_PER_INCH).abs() < 1e-9);
    }

    #[test]
    fn test_a4_at_300_dpi() {
        assert_eq!(size_to_px((210.0, 297.0), 300), (2480, 3507));
    }
}
