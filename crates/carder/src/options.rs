use crate::types::{CarderError, Result};
use serde::{Deserialize, Serialize};

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Base dimensions, portrait for the standard sizes
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Per-run settings that are not part of the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Text table column to use; empty selects the first locale column
    pub locale: String,
    /// How many times the whole card sequence is printed
    pub repeat: usize,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            locale: String::new(),
            repeat: 1,
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
        }
    }
}

impl RenderOptions {
    /// Load options from JSON file
    #[cfg(feature = "json")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes).map_err(|e| {
            CarderError::Configuration(format!("Failed to parse options: {}", e))
        })?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "json")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            CarderError::Configuration(format!("Failed to serialize options: {}", e))
        })?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Page size in millimetres, orientation applied
    pub fn page_size_mm(&self) -> (f64, f64) {
        self.paper_size
            .dimensions_with_orientation(self.orientation)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(CarderError::Configuration(
                "repeat must be at least 1".to_string(),
            ));
        }

        let (width, height) = self.paper_size.dimensions_mm();
        if width <= 0.0 || height <= 0.0 {
            return Err(CarderError::Configuration(format!(
                "paper size must be positive, got {}x{}mm",
                width, height
            )));
        }

        Ok(())
    }
}
