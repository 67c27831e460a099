use crate::calibration::settings::PersistedSettings;
use crate::prelude::{OverlayError, OverlayResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// Size of one compass nudge, in degrees.
pub const COMPASS_STEP_DEG: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPhase {
    Uncalibrated,
    FirstPointCaptured,
    Calibrated,
}

impl CalibrationPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uncalibrated => "Uncalibrated",
            Self::FirstPointCaptured => "FirstPointCaptured",
            Self::Calibrated => "Calibrated",
        }
    }

    /// Screen edge the reference object should sit on before the next tap.
    pub fn guide_edge(self) -> Option<ScreenEdge> {
        match self {
            Self::Uncalibrated => Some(ScreenEdge::Left),
            Self::FirstPointCaptured => Some(ScreenEdge::Right),
            Self::Calibrated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenEdge {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassStep {
    Increase,
    Decrease,
}

/// Outcome of a calibration tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationEvent {
    FirstPointCaptured { bearing: f64 },
    Calibrated { horizontal_fov: f64 },
    /// Tap arrived while already calibrated; it belongs to label selection.
    Ignored,
}

/// Two-tap horizontal field-of-view calibration.
///
/// The user puts a distant object on the left screen edge and taps, then turns
/// until the same object sits on the right edge and taps again. The heading
/// difference between the taps is the horizontal field of view.
pub struct CalibrationController {
    phase: CalibrationPhase,
    first_bearing: Option<f64>,
    horizontal_fov: f64,
    compass_adjustment: f64,
    logger: LogManager,
}

impl CalibrationController {
    pub fn from_settings(settings: &PersistedSettings) -> Self {
        let phase = if settings.is_calibrated {
            CalibrationPhase::Calibrated
        } else {
            CalibrationPhase::Uncalibrated
        };
        Self {
            phase,
            first_bearing: None,
            horizontal_fov: settings.horizontal_fov,
            compass_adjustment: settings.compass_adjustment,
            logger: LogManager::new("calibration"),
        }
    }

    /// Feeds the current filtered heading (degrees) as a calibration tap.
    pub fn record_tap(&mut self, heading_deg: f64) -> OverlayResult<CalibrationEvent> {
        match self.phase {
            CalibrationPhase::Uncalibrated => {
                self.first_bearing = Some(heading_deg);
                self.phase = CalibrationPhase::FirstPointCaptured;
                self.logger
                    .record(&format!("first calibration point {:.1}", heading_deg));
                Ok(CalibrationEvent::FirstPointCaptured {
                    bearing: heading_deg,
                })
            }
            CalibrationPhase::FirstPointCaptured => {
                let mut first = self.first_bearing.take().unwrap_or(heading_deg);
                if first - heading_deg < 0.0 {
                    first += 360.0;
                }
                let fov = first - heading_deg;
                self.logger
                    .record(&format!("second calibration point {:.1}", heading_deg));

                if !fov.is_finite() || fov <= 0.0 {
                    self.phase = CalibrationPhase::Uncalibrated;
                    self.logger
                        .warn(&format!("rejected calibration, field of view {:.1}", fov));
                    return Err(OverlayError::InvalidCalibration { fov });
                }

                self.horizontal_fov = fov;
                self.phase = CalibrationPhase::Calibrated;
                self.logger
                    .record(&format!("horizontal field of view calibrated to {:.1}", fov));
                Ok(CalibrationEvent::Calibrated {
                    horizontal_fov: fov,
                })
            }
            CalibrationPhase::Calibrated => Ok(CalibrationEvent::Ignored),
        }
    }

    /// Drops back to `Uncalibrated`; the last field of view stays as the default.
    pub fn recalibrate(&mut self) {
        self.phase = CalibrationPhase::Uncalibrated;
        self.first_bearing = None;
        self.logger.record("recalibration requested");
    }

    /// Returns to a previously saved state, dropping any captured first point.
    pub fn restore(&mut self, settings: &PersistedSettings) {
        self.phase = if settings.is_calibrated {
            CalibrationPhase::Calibrated
        } else {
            CalibrationPhase::Uncalibrated
        };
        self.first_bearing = None;
        self.horizontal_fov = settings.horizontal_fov;
        self.compass_adjustment = settings.compass_adjustment;
    }

    /// Nudges the compass offset by one step and returns the new offset.
    pub fn adjust_compass(&mut self, step: CompassStep) -> f64 {
        let delta = match step {
            CompassStep::Increase => COMPASS_STEP_DEG,
            CompassStep::Decrease => -COMPASS_STEP_DEG,
        };
        // keep the offset on the 0.1° grid instead of accumulating float drift
        self.compass_adjustment = ((self.compass_adjustment + delta) * 10.0).round() / 10.0;
        self.compass_adjustment
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_calibrated(&self) -> bool {
        self.phase == CalibrationPhase::Calibrated
    }

    pub fn horizontal_fov(&self) -> f64 {
        self.horizontal_fov
    }

    pub fn compass_adjustment(&self) -> f64 {
        self.compass_adjustment
    }

    pub fn settings(&self) -> PersistedSettings {
        PersistedSettings {
            horizontal_fov: self.horizontal_fov,
            is_calibrated: self.is_calibrated(),
            compass_adjustment: self.compass_adjustment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncalibrated() -> CalibrationController {
        CalibrationController::from_settings(&PersistedSettings::default())
    }

    #[test]
    fn taps_moving_right_subtract_directly() {
        let mut controller = uncalibrated();
        controller.record_tap(350.0).unwrap();
        let event = controller.record_tap(10.0).unwrap();
        assert_eq!(event, CalibrationEvent::Calibrated { horizontal_fov: 340.0 });
        assert_eq!(controller.phase(), CalibrationPhase::Calibrated);
    }

    #[test]
    fn taps_crossing_north_add_full_turn() {
        let mut controller = uncalibrated();
        controller.record_tap(10.0).unwrap();
        let event = controller.record_tap(350.0).unwrap();
        assert_eq!(event, CalibrationEvent::Calibrated { horizontal_fov: 20.0 });

        let mut controller = uncalibrated();
        controller.record_tap(60.0).unwrap();
        controller.record_tap(10.0).unwrap();
        assert!((controller.horizontal_fov() - 50.0).abs() < 1e-9);
        assert!(controller.settings().is_calibrated);
    }

    #[test]
    fn identical_taps_are_rejected() {
        let mut controller = uncalibrated();
        controller.record_tap(120.0).unwrap();
        let err = controller.record_tap(120.0).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidCalibration { .. }));
        assert_eq!(controller.phase(), CalibrationPhase::Uncalibrated);
        assert_eq!(controller.horizontal_fov(), 50.2);
    }

    #[test]
    fn recalibrate_keeps_previous_fov() {
        let mut controller = uncalibrated();
        controller.record_tap(80.0).unwrap();
        controller.record_tap(40.0).unwrap();
        controller.recalibrate();
        assert_eq!(controller.phase(), CalibrationPhase::Uncalibrated);
        assert!((controller.horizontal_fov() - 40.0).abs() < 1e-9);
        assert!(!controller.settings().is_calibrated);
    }

    #[test]
    fn restore_discards_unsaved_calibration() {
        let mut controller = uncalibrated();
        let saved = controller.settings();
        controller.record_tap(70.0).unwrap();
        controller.record_tap(20.0).unwrap();
        controller.restore(&saved);
        assert_eq!(controller.phase(), CalibrationPhase::Uncalibrated);
        assert_eq!(controller.horizontal_fov(), 50.2);
        assert_eq!(controller.settings(), saved);
    }

    #[test]
    fn taps_after_calibration_are_ignored() {
        let settings = PersistedSettings {
            is_calibrated: true,
            ..Default::default()
        };
        let mut controller = CalibrationController::from_settings(&settings);
        assert_eq!(controller.record_tap(15.0).unwrap(), CalibrationEvent::Ignored);
    }

    #[test]
    fn guide_edge_follows_phase() {
        let mut controller = uncalibrated();
        assert_eq!(controller.phase().guide_edge(), Some(ScreenEdge::Left));
        controller.record_tap(30.0).unwrap();
        assert_eq!(controller.phase().guide_edge(), Some(ScreenEdge::Right));
    }

    #[test]
    fn compass_steps_stay_on_tenth_grid() {
        let mut controller = uncalibrated();
        for _ in 0..3 {
            controller.adjust_compass(CompassStep::Increase);
        }
        assert_eq!(controller.compass_adjustment(), 0.3);
        for _ in 0..5 {
            controller.adjust_compass(CompassStep::Decrease);
        }
        assert_eq!(controller.compass_adjustment(), -0.2);
    }
}
