use serde::{Deserialize, Serialize};

/// Extent of a rendered string relative to its baseline origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextBounds {
    pub width: f64,
    /// Distance above the baseline.
    pub ascent: f64,
    /// Distance below the baseline.
    pub descent: f64,
}

/// Measures label text the way the renderer will draw it.
pub trait TextMetrics {
    fn measure(&self, text: &str, size: f64) -> TextBounds;
}

/// Fixed-advance approximation for when no font rasterizer is available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApproximateMetrics {
    pub advance: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            advance: 0.55,
            ascent: 0.72,
            descent: 0.21,
        }
    }
}

impl TextMetrics for ApproximateMetrics {
    fn measure(&self, text: &str, size: f64) -> TextBounds {
        TextBounds {
            width: text.chars().count() as f64 * size * self.advance,
            ascent: size * self.ascent,
            descent: size * self.descent,
        }
    }
}
