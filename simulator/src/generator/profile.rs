use anyhow::Context;
use peakcore::interface::{OrientationSample, SensorAccuracy};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A run of samples held at (or sweeping away from) one heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingSegment {
    pub heading_deg: f64,
    pub samples: usize,
    #[serde(default)]
    pub sweep_deg_per_sample: f64,
}

/// Configuration for generating a synthetic orientation trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub segments: Vec<HeadingSegment>,
    pub pitch_rad: f64,
    /// Uniform heading jitter amplitude, degrees.
    pub noise_deg: f64,
    pub seed: u64,
    /// Marks every n-th sample unreliable, as a flaky magnetometer would.
    pub unreliable_every: Option<usize>,
    pub sample_interval: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            segments: vec![HeadingSegment {
                heading_deg: 30.0,
                samples: 60,
                sweep_deg_per_sample: 0.0,
            }],
            pitch_rad: 0.02,
            noise_deg: 1.5,
            seed: 0,
            unreliable_every: None,
            sample_interval: 0.02,
        }
    }
}

impl TraceConfig {
    pub fn total_samples(&self) -> usize {
        self.segments.iter().map(|segment| segment.samples).sum()
    }
}

pub fn build_trace(config: &TraceConfig) -> anyhow::Result<Vec<OrientationSample>> {
    let total = config
        .segments
        .iter()
        .try_fold(0usize, |acc, segment| acc.checked_add(segment.samples))
        .context("overflow computing trace length")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut trace = Vec::with_capacity(total);

    for segment in &config.segments {
        for step in 0..segment.samples {
            let jitter = if config.noise_deg > 0.0 {
                rng.gen_range(-config.noise_deg..config.noise_deg)
            } else {
                0.0
            };
            let heading = segment.heading_deg + segment.sweep_deg_per_sample * step as f64 + jitter;
            let index = trace.len();
            let accuracy = match config.unreliable_every {
                Some(every) if every > 0 && (index + 1) % every == 0 => SensorAccuracy::Unreliable,
                _ => SensorAccuracy::High,
            };
            trace.push(OrientationSample {
                timestamp: Some(index as f64 * config.sample_interval),
                heading_rad: heading.to_radians(),
                pitch_rad: config.pitch_rad,
                accuracy,
            });
        }
    }

    Ok(trace)
}
