use peakcore::calibration::ScreenEdge;
use peakcore::projection::ScreenHitRegion;
use peakcore::Frame;
use serde::{Deserialize, Serialize};

/// Label as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLabel {
    pub id: u32,
    pub name: String,
    pub rank: usize,
    pub x: f64,
    pub y: f64,
    pub anchor_y: f64,
    pub label_y: f64,
    pub subtitle_y: Option<f64>,
    pub text_size: f64,
    pub alpha: u8,
}

/// Owned snapshot of the latest frame, served to the renderer as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OverlayModel {
    pub heading_deg: f64,
    pub variance: u32,
    pub warm: bool,
    pub phase: String,
    pub guide_edge: Option<ScreenEdge>,
    pub horizontal_fov: f64,
    pub compass_adjustment: f64,
    pub labels: Vec<OverlayLabel>,
    pub hit_regions: Vec<ScreenHitRegion>,
}

impl OverlayModel {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let labels = frame
            .projection
            .peaks
            .iter()
            .map(|placed| OverlayLabel {
                id: placed.peak.id,
                name: placed.peak.name.clone(),
                rank: placed.rank,
                x: placed.x,
                y: placed.y,
                anchor_y: placed.anchor_y,
                label_y: placed.label_y,
                subtitle_y: placed.subtitle_y,
                text_size: placed.text_size,
                alpha: placed.alpha,
            })
            .collect();

        Self {
            heading_deg: frame.heading_deg,
            variance: frame.variance,
            warm: frame.warm,
            phase: frame.phase.label().to_string(),
            guide_edge: frame.guide_edge,
            horizontal_fov: frame.horizontal_fov,
            compass_adjustment: frame.compass_adjustment,
            labels,
            hit_regions: frame.projection.hit_regions.clone(),
        }
    }
}
