use crate::prelude::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};

/// Hill as seen from the observer, precomputed by the spatial layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub id: u32,
    pub name: String,
    /// Bearing from the observer, degrees clockwise from north.
    pub bearing_deg: f64,
    /// Great-circle distance from the observer, kilometres.
    pub distance: f64,
    /// Summit height, metres.
    pub height: f64,
    /// Angle above the observer's horizon, radians.
    pub visual_elevation: f64,
}

impl Peak {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        bearing_deg: f64,
        distance: f64,
        height: f64,
        visual_elevation: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            bearing_deg,
            distance,
            height,
            visual_elevation,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.bearing_deg.is_finite()
            && self.distance.is_finite()
            && self.height.is_finite()
            && self.visual_elevation.is_finite()
    }
}

/// Parses a JSON array of peaks, rejecting entries with non-finite values.
pub fn parse_peak_list(json: &str) -> OverlayResult<Vec<Peak>> {
    let peaks: Vec<Peak> =
        serde_json::from_str(json).map_err(|err| OverlayError::MalformedInput(err.to_string()))?;
    if let Some(bad) = peaks.iter().find(|peak| !peak.is_well_formed()) {
        return Err(OverlayError::MalformedInput(format!(
            "peak {} ({}) has non-finite geometry",
            bad.id, bad.name
        )));
    }
    Ok(peaks)
}
