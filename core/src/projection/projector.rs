use crate::interface::Peak;
use crate::prelude::{OverlayError, OverlayResult, Viewport};
use crate::projection::hit::{LabelRect, ScreenHitRegion};
use crate::projection::text::{ApproximateMetrics, TextMetrics};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// Layout constants for the label stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Vertical field of view of the camera, degrees.
    pub vertical_fov: f64,
    /// Font size of the first (nearest) label.
    pub text_size: f64,
    /// Labels stop once the shrinking font size falls to this floor.
    pub min_text_size: f64,
    pub text_size_step: f64,
    pub alpha_step: u8,
    /// The label stack starts at `height / label_top_ratio`.
    pub label_top_ratio: f64,
    /// Gap between a baseline and the bottom of its slot, pixels.
    pub label_gap: f64,
    pub show_direction: bool,
    pub show_distance: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            vertical_fov: 20.0,
            text_size: 25.0,
            min_text_size: 5.0,
            text_size_step: 1.0,
            alpha_step: 10,
            label_top_ratio: 1.6,
            label_gap: 5.0,
            show_direction: false,
            show_distance: false,
        }
    }
}

impl ProjectorConfig {
    /// Whether each label carries a second (direction/distance) line.
    pub fn annotated(&self) -> bool {
        self.show_direction || self.show_distance
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.vertical_fov.is_finite() && self.vertical_fov > 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "vertical field of view must be positive, got {}",
                self.vertical_fov
            )));
        }
        if !(self.label_top_ratio.is_finite() && self.label_top_ratio > 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "label top ratio must be positive, got {}",
                self.label_top_ratio
            )));
        }
        if !(self.text_size_step.is_finite() && self.text_size_step > 0.0) {
            return Err(OverlayError::InvalidConfig(
                "text size step must be positive".into(),
            ));
        }
        if !(self.text_size.is_finite() && self.min_text_size.is_finite()) {
            return Err(OverlayError::InvalidConfig(format!(
                "text sizes must be finite, got {} over a floor of {}",
                self.text_size, self.min_text_size
            )));
        }
        if self.text_size <= self.min_text_size {
            return Err(OverlayError::InvalidConfig(format!(
                "text size {} leaves no room above the floor {}",
                self.text_size, self.min_text_size
            )));
        }
        Ok(())
    }
}

/// Filtered camera orientation for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub heading_deg: f64,
    pub elevation_rad: f64,
    pub horizontal_fov: f64,
}

/// A peak placed on screen for the current frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPeak<'a> {
    pub peak: &'a Peak,
    /// Position in the label stack, 0 for the most prominent label.
    pub rank: usize,
    /// Horizontal offset as a fraction of the field of view, in (-0.5, 0.5).
    pub ratio: f64,
    pub x: f64,
    pub y: f64,
    /// Row where the leader line from the summit meets the label stack.
    pub anchor_y: f64,
    pub label_y: f64,
    pub subtitle_y: Option<f64>,
    pub text_size: f64,
    pub alpha: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection<'a> {
    pub peaks: Vec<ProjectedPeak<'a>>,
    pub hit_regions: Vec<ScreenHitRegion>,
}

impl Projection<'_> {
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Id of the most prominent label under the given point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<u32> {
        self.hit_regions
            .iter()
            .find(|region| region.rect.contains(x, y))
            .map(|region| region.peak_id)
    }
}

struct StackSlot<'a> {
    peak: &'a Peak,
    ratio: f64,
    top: f64,
    text_size: f64,
}

/// Selects the peaks inside the camera's field of view and lays out their labels.
pub struct VisibilityProjector<M: TextMetrics = ApproximateMetrics> {
    config: ProjectorConfig,
    metrics: M,
    logger: LogManager,
}

impl VisibilityProjector<ApproximateMetrics> {
    pub fn new(config: ProjectorConfig) -> OverlayResult<Self> {
        Self::with_metrics(config, ApproximateMetrics::default())
    }
}

impl<M: TextMetrics> VisibilityProjector<M> {
    pub fn with_metrics(config: ProjectorConfig, metrics: M) -> OverlayResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metrics,
            logger: LogManager::new("projector"),
        })
    }

    /// Fraction of the field of view separating `bearing_deg` from the heading,
    /// or `None` when the bearing falls outside the view.
    ///
    /// The three offsets cover the wrap at north; when several qualify the
    /// last one wins.
    pub fn horizontal_ratio(heading_deg: f64, bearing_deg: f64, horizontal_fov: f64) -> Option<f64> {
        let offsets = [
            heading_deg - bearing_deg,
            heading_deg - (360.0 + bearing_deg),
            (360.0 + heading_deg) - bearing_deg,
        ];
        offsets
            .iter()
            .filter(|offset| offset.abs() * 2.0 < horizontal_fov)
            .last()
            .map(|offset| -offset / horizontal_fov)
    }

    /// Projects the peaks visible from `view` onto `viewport`.
    ///
    /// Candidates are taken nearest first; `peaks` itself is left untouched.
    /// An unusable field of view or viewport yields an empty projection.
    pub fn project<'a>(&self, view: &ViewState, peaks: &'a [Peak], viewport: Viewport) -> Projection<'a> {
        if !(view.horizontal_fov.is_finite() && view.horizontal_fov > 0.0) {
            self.logger.warn(&format!(
                "skipping projection, horizontal field of view {}",
                view.horizontal_fov
            ));
            return Projection::default();
        }
        if !viewport.is_drawable() {
            self.logger.warn("skipping projection, viewport has no area");
            return Projection::default();
        }

        let mut candidates: Vec<&Peak> = peaks.iter().collect();
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let slots = self.stack(view, &candidates, viewport);
        // bottom of the finished stack; every label is placed relative to it
        let stack_floor = slots
            .last()
            .map(|slot| slot.top - self.slot_height(slot.text_size))
            .unwrap_or(0.0);

        let mut projection = Projection::default();
        for (rank, slot) in slots.into_iter().enumerate() {
            let placed = self.place(view, viewport, rank, slot, stack_floor);
            let bounds = self.metrics.measure(&placed.peak.name, placed.text_size);
            let subtitle_baseline = placed.subtitle_y.unwrap_or(placed.label_y);
            projection.hit_regions.push(ScreenHitRegion {
                peak_id: placed.peak.id,
                rect: LabelRect {
                    left: placed.x - bounds.width / 2.0,
                    top: placed.label_y - bounds.ascent,
                    right: placed.x + bounds.width / 2.0,
                    bottom: subtitle_baseline + bounds.descent,
                },
            });
            projection.peaks.push(placed);
        }

        self.logger.trace(&format!(
            "heading {:.1} -> {} of {} peaks in view",
            view.heading_deg,
            projection.len(),
            peaks.len()
        ));
        projection
    }

    fn slot_height(&self, text_size: f64) -> f64 {
        if self.config.annotated() {
            text_size * 2.0
        } else {
            text_size
        }
    }

    fn stack<'a>(&self, view: &ViewState, candidates: &[&'a Peak], viewport: Viewport) -> Vec<StackSlot<'a>> {
        let mut top = viewport.height / self.config.label_top_ratio;
        let mut text_size = self.config.text_size;
        let mut slots = Vec::new();

        for &peak in candidates {
            if text_size <= self.config.min_text_size || top <= 0.0 {
                break;
            }
            let Some(ratio) =
                Self::horizontal_ratio(view.heading_deg, peak.bearing_deg, view.horizontal_fov)
            else {
                continue;
            };
            slots.push(StackSlot {
                peak,
                ratio,
                top,
                text_size,
            });
            top -= self.slot_height(text_size);
            text_size -= self.config.text_size_step;
        }
        slots
    }

    fn place<'a>(
        &self,
        view: &ViewState,
        viewport: Viewport,
        rank: usize,
        slot: StackSlot<'a>,
        stack_floor: f64,
    ) -> ProjectedPeak<'a> {
        let x = slot.ratio * viewport.width + viewport.width / 2.0;
        let vertical_deg = (slot.peak.visual_elevation - view.elevation_rad).to_degrees();
        let y = viewport.height * vertical_deg / self.config.vertical_fov + viewport.height / 2.0;

        let anchor_y = slot.top - stack_floor;
        let bottom_baseline = anchor_y - self.config.label_gap;
        let (label_y, subtitle_y) = if self.config.annotated() {
            (bottom_baseline - slot.text_size, Some(bottom_baseline))
        } else {
            (bottom_baseline, None)
        };

        let fade = (self.config.alpha_step as usize).saturating_mul(rank).min(255);
        ProjectedPeak {
            peak: slot.peak,
            rank,
            ratio: slot.ratio,
            x,
            y,
            anchor_y,
            label_y,
            subtitle_y,
            text_size: slot.text_size,
            alpha: (255 - fade) as u8,
        }
    }
}
