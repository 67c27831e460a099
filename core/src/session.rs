use crate::calibration::{
    CalibrationController, CalibrationEvent, CalibrationPhase, CompassStep, PersistedSettings,
    ScreenEdge,
};
use crate::filter::{CircularFilter, DEFAULT_WINDOW};
use crate::interface::{OrientationSample, Peak};
use crate::prelude::{OverlayError, OverlayResult, SettingsStore, Viewport};
use crate::projection::{Projection, ProjectorConfig, ViewState, VisibilityProjector};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Samples averaged by each orientation filter.
    pub window: usize,
    pub projector: ProjectorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            projector: ProjectorConfig::default(),
        }
    }
}

/// Everything the renderer needs for one redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame<'a> {
    pub heading_deg: f64,
    pub elevation_rad: f64,
    pub variance: u32,
    /// False until the heading filter has seen a full window of samples.
    pub warm: bool,
    pub phase: CalibrationPhase,
    pub guide_edge: Option<ScreenEdge>,
    pub horizontal_fov: f64,
    pub compass_adjustment: f64,
    pub projection: Projection<'a>,
}

/// One overlay session: both orientation filters, calibration and projection,
/// with settings loaded from and written back to `S`.
pub struct OverlaySession<S: SettingsStore> {
    heading: CircularFilter,
    elevation: CircularFilter,
    calibration: CalibrationController,
    projector: VisibilityProjector,
    store: S,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl<S: SettingsStore> OverlaySession<S> {
    pub fn open(config: SessionConfig, mut store: S) -> OverlayResult<Self> {
        let settings = store.load()?;
        let mut heading = CircularFilter::with_window(config.window)?;
        heading.set_offset(settings.compass_adjustment);
        let elevation = CircularFilter::with_window(config.window)?;
        let projector = VisibilityProjector::new(config.projector)?;
        let calibration = CalibrationController::from_settings(&settings);

        let logger = LogManager::new("session");
        logger.record(&format!(
            "session opened: {}, fov {:.1}, compass adjustment {:+.1}",
            calibration.phase().label(),
            settings.horizontal_fov,
            settings.compass_adjustment
        ));

        Ok(Self {
            heading,
            elevation,
            calibration,
            projector,
            store,
            metrics: MetricsRecorder::new(),
            logger,
        })
    }

    /// Applies one orientation reading. Unreliable readings are dropped and
    /// `false` is returned.
    pub fn on_orientation(&mut self, sample: &OrientationSample) -> bool {
        if !sample.is_usable() {
            self.metrics.record_dropped_sample();
            self.logger.trace("dropping unreliable orientation sample");
            return false;
        }
        self.heading.add_sample(sample.heading_rad);
        self.elevation.add_sample(sample.pitch_rad);
        self.metrics.record_sample();
        true
    }

    /// Uses the current filtered heading as a calibration tap.
    ///
    /// Refused until the heading filter holds a full window of samples. When
    /// a completed calibration cannot be saved, the controller falls back to
    /// the last saved state and the save error is returned.
    pub fn record_calibration_tap(&mut self) -> OverlayResult<CalibrationEvent> {
        if !self.heading.is_warm() {
            let (samples, window) = (self.heading.sample_count(), self.heading.window());
            self.logger.warn(&format!(
                "calibration tap refused, heading filter has {} of {} samples",
                samples, window
            ));
            return Err(OverlayError::FilterNotWarm { samples, window });
        }

        let previous = self.calibration.settings();
        match self.calibration.record_tap(self.heading.direction()) {
            Ok(event) => {
                if let CalibrationEvent::Calibrated { .. } = event {
                    if let Err(err) = self.persist() {
                        self.calibration.restore(&previous);
                        self.metrics.record_calibration_failure();
                        return Err(err);
                    }
                }
                Ok(event)
            }
            Err(err) => {
                self.metrics.record_calibration_failure();
                Err(err)
            }
        }
    }

    pub fn recalibrate(&mut self) -> OverlayResult<()> {
        self.calibration.recalibrate();
        self.persist()
    }

    /// Nudges the compass offset; persisted by [`OverlaySession::release_compass`].
    pub fn adjust_compass(&mut self, step: CompassStep) -> f64 {
        let adjustment = self.calibration.adjust_compass(step);
        self.heading.set_offset(adjustment);
        adjustment
    }

    pub fn release_compass(&mut self) -> OverlayResult<()> {
        self.persist()
    }

    /// Builds the frame for the given peak snapshot. Peaks are only projected
    /// once calibrated and once the heading filter is warm.
    pub fn frame<'a>(&self, peaks: &'a [Peak], viewport: Viewport) -> Frame<'a> {
        let warm = self.heading.is_warm();
        let phase = self.calibration.phase();
        let view = self.view_state();

        let projection = if phase == CalibrationPhase::Calibrated && warm {
            self.metrics.record_frame();
            self.projector.project(&view, peaks, viewport)
        } else {
            Projection::default()
        };

        Frame {
            heading_deg: view.heading_deg,
            elevation_rad: view.elevation_rad,
            variance: self.heading.variance(),
            warm,
            phase,
            guide_edge: phase.guide_edge(),
            horizontal_fov: view.horizontal_fov,
            compass_adjustment: self.calibration.compass_adjustment(),
            projection,
        }
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            heading_deg: self.heading.direction(),
            elevation_rad: self.elevation.mean_radians(),
            horizontal_fov: self.calibration.horizontal_fov(),
        }
    }

    pub fn heading(&self) -> &CircularFilter {
        &self.heading
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.calibration.phase()
    }

    pub fn settings(&self) -> PersistedSettings {
        self.calibration.settings()
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> OverlayResult<()> {
        let settings = self.calibration.settings();
        if let Err(err) = self.store.save(&settings) {
            self.logger.warn(&format!("failed to persist settings: {}", err));
            return Err(err);
        }
        Ok(())
    }
}
