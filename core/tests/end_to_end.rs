use peakcore::calibration::{MemorySettingsStore, PersistedSettings};
use peakcore::interface::{OrientationSample, Peak};
use peakcore::{OverlaySession, SessionConfig, Viewport};

fn calibrated_session(horizontal_fov: f64) -> OverlaySession<MemorySettingsStore> {
    let store = MemorySettingsStore::with_settings(PersistedSettings {
        horizontal_fov,
        is_calibrated: true,
        compass_adjustment: 0.0,
    });
    OverlaySession::open(SessionConfig::default(), store).unwrap()
}

#[test]
fn single_peak_lands_right_of_centre_and_below_midline() {
    let mut session = calibrated_session(50.0);
    for _ in 0..10 {
        session.on_orientation(&OrientationSample::new(0.0, 0.05));
    }

    let peaks = vec![Peak::new(1, "Beacon", 5.0, 4.0, 320.0, 0.06)];
    let frame = session.frame(&peaks, Viewport::new(1000.0, 600.0));

    assert_eq!(frame.projection.len(), 1);
    let placed = &frame.projection.peaks[0];
    assert!((placed.ratio - 0.1).abs() < 1e-9);
    assert!((placed.x - 600.0).abs() < 1e-6);
    let expected_y = 600.0 * 0.01_f64.to_degrees() / 20.0 + 300.0;
    assert!((placed.y - expected_y).abs() < 1e-6, "y {}", placed.y);
    assert_eq!(frame.projection.hit_regions.len(), 1);
}

#[test]
fn calibrate_then_project_from_live_samples() {
    let store = MemorySettingsStore::default();
    let mut session = OverlaySession::open(SessionConfig::default(), store).unwrap();

    for _ in 0..10 {
        session.on_orientation(&OrientationSample::new(f64::to_radians(30.0), 0.0));
    }
    session.record_calibration_tap().unwrap();
    for _ in 0..10 {
        session.on_orientation(&OrientationSample::new(f64::to_radians(350.0), 0.0));
    }
    session.record_calibration_tap().unwrap();
    assert!((session.settings().horizontal_fov - 40.0).abs() < 1e-6);

    let peaks = vec![
        Peak::new(1, "Inside", 355.0, 2.0, 400.0, 0.0),
        Peak::new(2, "Outside", 30.0, 1.0, 400.0, 0.0),
    ];
    let frame = session.frame(&peaks, Viewport::new(800.0, 480.0));
    let ids: Vec<u32> = frame.projection.peaks.iter().map(|p| p.peak.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(session.store().save_count(), 1);
}
