use crate::calibration::PersistedSettings;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of the camera preview the overlay is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Common error type for the overlay core.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid calibration: field of view {fov:.1} must be positive")]
    InvalidCalibration { fov: f64 },
    #[error("heading filter not warm: {samples} of {window} samples")]
    FilterNotWarm { samples: usize, window: usize },
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// Load/save boundary for the calibration triple kept between sessions.
pub trait SettingsStore {
    fn load(&mut self) -> OverlayResult<PersistedSettings>;
    fn save(&mut self, settings: &PersistedSettings) -> OverlayResult<()>;
}
