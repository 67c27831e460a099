use crate::gui_bridge::model::OverlayModel;
use crate::workflow::settings_store::YamlSettingsStore;
use anyhow::Result;
use peakcore::calibration::{CalibrationEvent, CompassStep};
use peakcore::interface::{OrientationSample, Peak};
use peakcore::{OverlayError, OverlaySession, Viewport};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub type SharedSession = Arc<Mutex<OverlaySession<YamlSettingsStore>>>;

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug, Deserialize)]
struct CompassRequest {
    step: CompassStep,
    #[serde(default)]
    release: bool,
}

/// State shared between the bridge handle and its HTTP routes.
#[derive(Clone)]
struct BridgeContext {
    session: SharedSession,
    peaks: Arc<Vec<Peak>>,
    viewport: Viewport,
    state: Arc<RwLock<OverlayModel>>,
}

impl BridgeContext {
    /// Renders a frame from the session and stores it as the latest model.
    fn refresh(&self) -> OverlayModel {
        let model = {
            let session = self
                .session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            OverlayModel::from_frame(&session.frame(&self.peaks, self.viewport))
        };
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = model.clone();
        model
    }

    fn ingest(&self, sample: &OrientationSample) -> bool {
        let accepted = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .on_orientation(sample);
        self.refresh();
        accepted
    }

    fn calibrate(&self) -> Result<CalibrationEvent, OverlayError> {
        let outcome = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record_calibration_tap();
        self.refresh();
        outcome
    }

    fn adjust_compass(&self, request: &CompassRequest) -> Result<f64, OverlayError> {
        let adjustment = {
            let mut session = self
                .session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let adjustment = session.adjust_compass(request.step);
            if request.release {
                session.release_compass()?;
            }
            adjustment
        };
        self.refresh();
        Ok(adjustment)
    }
}

/// Bridge that hosts the overlay HTTP endpoint and feeds incoming readings to the session.
pub struct GuiBridge {
    context: BridgeContext,
}

impl GuiBridge {
    pub fn new(session: SharedSession, peaks: Arc<Vec<Peak>>, viewport: Viewport) -> Self {
        Self {
            context: BridgeContext {
                session,
                peaks,
                viewport,
                state: Arc::new(RwLock::new(OverlayModel::default())),
            },
        }
    }

    /// Starts the HTTP routes on a background thread.
    pub fn serve(&self, address: SocketAddr) {
        let context_filter = {
            let context = self.context.clone();
            warp::any().map(move || context.clone())
        };

        let overlay_route = warp::path("overlay")
            .and(warp::get())
            .and(context_filter.clone())
            .map(|context: BridgeContext| {
                let guard = context
                    .state
                    .read()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                warp::reply::json(&*guard)
            });

        let orientation_route = warp::path("orientation")
            .and(warp::post())
            .and(warp::body::json())
            .and(context_filter.clone())
            .map(|sample: OrientationSample, context: BridgeContext| {
                let accepted = context.ingest(&sample);
                warp::reply::with_status(
                    warp::reply::json(&json!({"status": "ok", "accepted": accepted})),
                    StatusCode::OK,
                )
            });

        let calibrate_route = warp::path("calibrate")
            .and(warp::post())
            .and(context_filter.clone())
            .map(|context: BridgeContext| match context.calibrate() {
                Ok(event) => warp::reply::with_status(
                    warp::reply::json(&json!({"status": "ok", "event": format!("{:?}", event)})),
                    StatusCode::OK,
                ),
                Err(OverlayError::InvalidCalibration { fov }) => warp::reply::with_status(
                    warp::reply::json(&json!({
                        "status": "retry",
                        "message": format!("field of view {:.1} rejected, tap both edges again", fov)
                    })),
                    StatusCode::UNPROCESSABLE_ENTITY,
                ),
                Err(OverlayError::FilterNotWarm { samples, window }) => warp::reply::with_status(
                    warp::reply::json(&json!({
                        "status": "retry",
                        "message": format!("hold steady, heading filter has {} of {} samples", samples, window)
                    })),
                    StatusCode::UNPROCESSABLE_ENTITY,
                ),
                Err(err) => {
                    log::error!("calibrate error: {}", err);
                    warp::reply::with_status(
                        warp::reply::json(&json!({"status": "error", "message": err.to_string()})),
                        StatusCode::INTERNAL_SERVER_ERROR,
                    )
                }
            });

        let compass_route = warp::path("compass")
            .and(warp::post())
            .and(warp::body::json())
            .and(context_filter)
            .map(|request: CompassRequest, context: BridgeContext| {
                match context.adjust_compass(&request) {
                    Ok(adjustment) => warp::reply::with_status(
                        warp::reply::json(&json!({"status": "ok", "adjustment": adjustment})),
                        StatusCode::OK,
                    ),
                    Err(err) => {
                        log::error!("compass error: {}", err);
                        warp::reply::with_status(
                            warp::reply::json(&json!({"status": "error", "message": err.to_string()})),
                            StatusCode::INTERNAL_SERVER_ERROR,
                        )
                    }
                }
            });

        let routes = overlay_route
            .or(orientation_route)
            .or(calibrate_route)
            .or(compass_route);

        thread::spawn(move || {
            match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(async move {
                    warp::serve(routes).run(address).await;
                }),
                Err(err) => log::error!("failed to build bridge runtime: {}", err),
            }
        });
    }

    pub fn publish(&self, model: &OverlayModel) -> Result<()> {
        let mut guard = self
            .context
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("overlay state lock poisoned"))?;
        *guard = model.clone();
        println!(
            "[GUI] heading {:.1}, labels: {}, phase: {}",
            guard.heading_deg,
            guard.labels.len(),
            guard.phase
        );
        Ok(())
    }

    /// Re-renders from the live session and publishes the result.
    pub fn refresh(&self) -> OverlayModel {
        self.context.refresh()
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> OverlayModel {
        self.context.state.read().unwrap().clone()
    }

    #[cfg(test)]
    fn context(&self) -> &BridgeContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template::peak_ring;
    use peakcore::SessionConfig;
    use tempfile::tempdir;

    fn bridge(dir: &std::path::Path) -> GuiBridge {
        let store = YamlSettingsStore::new(dir.join("settings.yaml"));
        let session = OverlaySession::open(SessionConfig::default(), store).unwrap();
        GuiBridge::new(
            Arc::new(Mutex::new(session)),
            Arc::new(peak_ring(12, 30.0, 2.0)),
            Viewport::new(1000.0, 600.0),
        )
    }

    #[test]
    fn gui_bridge_updates_state() {
        let dir = tempdir().unwrap();
        let gui = bridge(dir.path());
        let model = OverlayModel {
            heading_deg: 42.0,
            phase: "Calibrated".into(),
            ..Default::default()
        };
        gui.publish(&model).unwrap();
        assert_eq!(gui.snapshot().heading_deg, 42.0);
    }

    #[test]
    fn ingest_and_calibrate_flow_through_session() {
        let dir = tempdir().unwrap();
        let gui = bridge(dir.path());
        let context = gui.context();

        assert!(matches!(
            context.calibrate(),
            Err(OverlayError::FilterNotWarm { samples: 0, .. })
        ));
        assert_eq!(gui.snapshot().phase, "Uncalibrated");

        for _ in 0..10 {
            assert!(context.ingest(&OrientationSample::new(f64::to_radians(40.0), 0.0)));
        }
        assert!(matches!(
            context.calibrate().unwrap(),
            CalibrationEvent::FirstPointCaptured { .. }
        ));
        assert!(matches!(
            context.calibrate(),
            Err(OverlayError::InvalidCalibration { .. })
        ));

        for _ in 0..10 {
            context.ingest(&OrientationSample::new(f64::to_radians(40.0), 0.0));
        }
        context.calibrate().unwrap();
        for _ in 0..10 {
            context.ingest(&OrientationSample::new(0.0, 0.0));
        }
        assert!(matches!(
            context.calibrate().unwrap(),
            CalibrationEvent::Calibrated { .. }
        ));

        let model = gui.refresh();
        assert_eq!(model.phase, "Calibrated");
        assert!(!model.labels.is_empty());
        assert!(dir.path().join("settings.yaml").exists());
    }

    #[test]
    fn compass_release_persists_adjustment() {
        let dir = tempdir().unwrap();
        let gui = bridge(dir.path());
        let request = CompassRequest {
            step: CompassStep::Decrease,
            release: true,
        };
        let adjustment = gui.context().adjust_compass(&request).unwrap();
        assert_eq!(adjustment, -0.1);
        let saved = std::fs::read_to_string(dir.path().join("settings.yaml")).unwrap();
        assert!(saved.contains("compass_adjustment: -0.1"));
    }
}
