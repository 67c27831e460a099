use serde::{Deserialize, Serialize};

/// Accuracy reported by the platform alongside an orientation reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorAccuracy {
    Unreliable,
    Low,
    Medium,
    #[default]
    High,
}

/// Orientation reading already corrected for device rotation and declination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub heading_rad: f64,
    pub pitch_rad: f64,
    #[serde(default)]
    pub accuracy: SensorAccuracy,
}

impl OrientationSample {
    pub fn new(heading_rad: f64, pitch_rad: f64) -> Self {
        Self {
            timestamp: None,
            heading_rad,
            pitch_rad,
            accuracy: SensorAccuracy::High,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.accuracy != SensorAccuracy::Unreliable
            && self.heading_rad.is_finite()
            && self.pitch_rad.is_finite()
    }
}
