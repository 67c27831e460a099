use crate::gui_bridge::model::OverlayModel;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use peakcore::calibration::CalibrationEvent;
use peakcore::interface::{OrientationSample, Peak};
use peakcore::telemetry::Metrics;
use peakcore::{OverlayError, OverlaySession, SettingsStore};

pub struct WorkflowResult {
    pub model: OverlayModel,
    pub metrics: Metrics,
    pub calibration_notes: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Replays `trace` through the session, tapping calibration at the
    /// configured indices, then renders one frame over `peaks`.
    pub fn execute<S: SettingsStore>(
        &self,
        session: &mut OverlaySession<S>,
        trace: &[OrientationSample],
        peaks: &[Peak],
    ) -> anyhow::Result<WorkflowResult> {
        let mut calibration_notes = Vec::new();

        for (index, sample) in trace.iter().enumerate() {
            session.on_orientation(sample);
            if !self.config.calibration_taps.contains(&index) {
                continue;
            }
            match session.record_calibration_tap() {
                Ok(CalibrationEvent::FirstPointCaptured { bearing }) => {
                    calibration_notes.push(format!("sample {}: first point {:.1}", index, bearing));
                }
                Ok(CalibrationEvent::Calibrated { horizontal_fov }) => {
                    calibration_notes
                        .push(format!("sample {}: calibrated fov {:.1}", index, horizontal_fov));
                }
                Ok(CalibrationEvent::Ignored) => {
                    calibration_notes.push(format!("sample {}: tap ignored, already calibrated", index));
                }
                Err(OverlayError::InvalidCalibration { fov }) => {
                    log::warn!("calibration at sample {} rejected (fov {:.1}), retry needed", index, fov);
                    calibration_notes.push(format!("sample {}: rejected fov {:.1}", index, fov));
                }
                Err(OverlayError::FilterNotWarm { samples, window }) => {
                    log::warn!("calibration at sample {} skipped, filter holds {} of {} samples", index, samples, window);
                    calibration_notes.push(format!("sample {}: filter not warm ({}/{})", index, samples, window));
                }
                Err(OverlayError::Persistence(reason)) => {
                    log::warn!("calibration at sample {} not saved: {}", index, reason);
                    calibration_notes.push(format!("sample {}: calibration not saved, {}", index, reason));
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("calibration tap at sample {}", index));
                }
            }
        }

        let frame = session.frame(peaks, self.config.viewport);
        let model = OverlayModel::from_frame(&frame);
        log::info!(
            "workflow finished: heading {:.1}, variance {}, {} labels",
            model.heading_deg,
            model.variance,
            model.labels.len()
        );

        Ok(WorkflowResult {
            model,
            metrics: session.metrics(),
            calibration_notes,
        })
    }

    pub fn open_session<S: SettingsStore>(&self, store: S) -> anyhow::Result<OverlaySession<S>> {
        OverlaySession::open(self.config.session.clone(), store).context("opening overlay session")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_trace, HeadingSegment, TraceConfig};
    use crate::generator::template::peak_ring;
    use peakcore::calibration::{MemorySettingsStore, PersistedSettings};

    fn calibration_workflow() -> WorkflowConfig {
        let mut cfg = WorkflowConfig::from_args(10, 1000.0, 600.0, 0.0, 0);
        cfg.trace = TraceConfig {
            segments: vec![
                HeadingSegment {
                    heading_deg: 50.0,
                    samples: 20,
                    sweep_deg_per_sample: 0.0,
                },
                HeadingSegment {
                    heading_deg: 5.0,
                    samples: 20,
                    sweep_deg_per_sample: 0.0,
                },
            ],
            noise_deg: 0.0,
            ..Default::default()
        };
        cfg.calibration_taps = vec![19, 39];
        cfg
    }

    #[test]
    fn runner_calibrates_and_projects() {
        let cfg = calibration_workflow();
        let runner = Runner::new(cfg.clone());
        let mut session = runner.open_session(MemorySettingsStore::default()).unwrap();
        let trace = build_trace(&cfg.trace).unwrap();
        let peaks = peak_ring(24, 15.0, 1.5);

        let result = runner.execute(&mut session, &trace, &peaks).unwrap();
        assert_eq!(result.calibration_notes.len(), 2);
        assert_eq!(result.model.phase, "Calibrated");
        assert!((result.model.horizontal_fov - 45.0).abs() < 1e-6);
        assert!(!result.model.labels.is_empty());
        assert_eq!(result.metrics.samples_accepted, 40);
    }

    #[test]
    fn rejected_calibration_is_reported_not_fatal() {
        let mut cfg = calibration_workflow();
        cfg.calibration_taps = vec![12, 13];
        let runner = Runner::new(cfg.clone());
        let mut session = runner.open_session(MemorySettingsStore::default()).unwrap();
        let trace = build_trace(&cfg.trace).unwrap();

        let result = runner.execute(&mut session, &trace, &[]).unwrap();
        assert!(result.calibration_notes[1].contains("rejected"));
        assert_eq!(result.model.phase, "Uncalibrated");
        assert_eq!(result.metrics.calibration_failures, 1);
    }

    #[test]
    fn early_tap_is_skipped_until_filter_warms() {
        let mut cfg = calibration_workflow();
        cfg.calibration_taps = vec![3, 19, 39];
        let runner = Runner::new(cfg.clone());
        let mut session = runner.open_session(MemorySettingsStore::default()).unwrap();
        let trace = build_trace(&cfg.trace).unwrap();

        let result = runner.execute(&mut session, &trace, &[]).unwrap();
        assert!(result.calibration_notes[0].contains("not warm"));
        assert_eq!(result.model.phase, "Calibrated");
        assert!((result.model.horizontal_fov - 45.0).abs() < 1e-6);
        assert_eq!(session.store().save_count(), 1);
    }

    struct ReadOnlyStore;

    impl SettingsStore for ReadOnlyStore {
        fn load(&mut self) -> peakcore::OverlayResult<PersistedSettings> {
            Ok(PersistedSettings::default())
        }

        fn save(&mut self, _settings: &PersistedSettings) -> peakcore::OverlayResult<()> {
            Err(OverlayError::Persistence("read-only store".into()))
        }
    }

    #[test]
    fn unsaved_calibration_is_reported_not_fatal() {
        let cfg = calibration_workflow();
        let runner = Runner::new(cfg.clone());
        let mut session = runner.open_session(ReadOnlyStore).unwrap();
        let trace = build_trace(&cfg.trace).unwrap();

        let result = runner.execute(&mut session, &trace, &[]).unwrap();
        assert!(result.calibration_notes[1].contains("not saved"));
        assert_eq!(result.model.phase, "Uncalibrated");
    }
}
