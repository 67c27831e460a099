use crate::math::{normalize_degrees, StatsHelper};
use crate::prelude::{OverlayError, OverlayResult};
use num_complex::Complex64;

pub const DEFAULT_WINDOW: usize = 10;

/// Sliding-window circular mean over angle samples.
///
/// Every sample is stored as a unit phasor (`cos + i·sin`) in a fixed ring.
/// Slots that have not been written yet hold angle zero, so a fresh filter
/// reports 0° until real samples displace the defaults. Use
/// [`CircularFilter::is_warm`] to tell a real reading from the default.
#[derive(Debug, Clone)]
pub struct CircularFilter {
    phasors: Vec<Complex64>,
    cursor: usize,
    mean: f64,
    offset_deg: f64,
    samples_seen: usize,
}

impl Default for CircularFilter {
    fn default() -> Self {
        Self::build(DEFAULT_WINDOW)
    }
}

impl CircularFilter {
    pub fn with_window(window: usize) -> OverlayResult<Self> {
        if window < 2 {
            return Err(OverlayError::InvalidConfig(format!(
                "circular filter window must be at least 2, got {}",
                window
            )));
        }
        Ok(Self::build(window))
    }

    fn build(window: usize) -> Self {
        Self {
            phasors: vec![Complex64::new(1.0, 0.0); window],
            cursor: 0,
            mean: 0.0,
            offset_deg: 0.0,
            samples_seen: 0,
        }
    }

    /// Records one angle (radians) and recomputes the mean over the full window.
    pub fn add_sample(&mut self, angle: f64) {
        self.phasors[self.cursor] = Complex64::from_polar(1.0, angle);
        self.cursor = (self.cursor + 1) % self.phasors.len();
        self.samples_seen = self.samples_seen.saturating_add(1);

        let sum: Complex64 = self.phasors.iter().sum();
        let mean = sum / self.phasors.len() as f64;
        self.mean = mean.im.atan2(mean.re);
    }

    /// Mean angle in radians, in `(-π, π]`, without the compass offset.
    pub fn mean_radians(&self) -> f64 {
        self.mean
    }

    /// Mean direction in degrees with the compass offset applied, in `[0, 360)`.
    pub fn direction(&self) -> f64 {
        normalize_degrees(self.mean.to_degrees() + self.offset_deg)
    }

    /// Dispersion score: sample variance of the cosines plus that of the
    /// sines, times 10000, truncated. Zero for a perfectly steady input.
    pub fn variance(&self) -> u32 {
        let cosines: Vec<f64> = self.phasors.iter().map(|p| p.re).collect();
        let sines: Vec<f64> = self.phasors.iter().map(|p| p.im).collect();
        let q = StatsHelper::sample_variance(&cosines) + StatsHelper::sample_variance(&sines);
        (q * 10_000.0) as u32
    }

    pub fn set_offset(&mut self, offset_deg: f64) {
        self.offset_deg = offset_deg;
    }

    pub fn window(&self) -> usize {
        self.phasors.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples_seen
    }

    /// True once a full window of real samples has replaced the defaults.
    pub fn is_warm(&self) -> bool {
        self.samples_seen >= self.phasors.len()
    }
}
