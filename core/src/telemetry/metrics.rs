use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub samples_accepted: usize,
    pub samples_dropped: usize,
    pub frames_projected: usize,
    pub calibration_failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_sample(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.samples_accepted += 1;
        }
    }

    pub fn record_dropped_sample(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.samples_dropped += 1;
        }
    }

    pub fn record_frame(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_projected += 1;
        }
    }

    pub fn record_calibration_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.calibration_failures += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
