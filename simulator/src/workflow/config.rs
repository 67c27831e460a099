use crate::generator::profile::{HeadingSegment, TraceConfig};
use crate::generator::template::peak_ring;
use anyhow::Context;
use peakcore::interface::{parse_peak_list, Peak};
use peakcore::{SessionConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_PATH: &str = "tools/data/overlay_settings.yaml";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub session: SessionConfig,
    pub viewport: Viewport,
    pub trace: TraceConfig,
    /// Trace indices after which the current heading is used as a calibration tap.
    pub calibration_taps: Vec<usize>,
    pub settings_path: Option<PathBuf>,
    /// JSON peak list; a synthetic ring is used when absent.
    pub peaks_path: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            viewport: Viewport::new(1280.0, 720.0),
            trace: TraceConfig::default(),
            calibration_taps: Vec::new(),
            settings_path: None,
            peaks_path: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(window: usize, width: f64, height: f64, heading_deg: f64, samples: usize) -> Self {
        let mut config = Self::default();
        config.session.window = window;
        config.viewport = Viewport::new(width, height);
        config.trace.segments = vec![HeadingSegment {
            heading_deg,
            samples,
            sweep_deg_per_sample: 0.0,
        }];
        config
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH))
    }

    pub fn load_peaks(&self) -> anyhow::Result<Vec<Peak>> {
        match &self.peaks_path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading peak list {}", path.display()))?;
                let peaks = parse_peak_list(&contents)
                    .with_context(|| format!("parsing peak list {}", path.display()))?;
                Ok(peaks)
            }
            None => Ok(peak_ring(24, 15.0, 1.5)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_sets_viewport_and_trace() {
        let cfg = WorkflowConfig::from_args(12, 1000.0, 600.0, 45.0, 30);
        assert_eq!(cfg.session.window, 12);
        assert_eq!(cfg.viewport, Viewport::new(1000.0, 600.0));
        assert_eq!(cfg.trace.total_samples(), 30);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"session:\n  window: 8\n  projector:\n    vertical_fov: 24.0\n    show_distance: true\nviewport:\n  width: 800.0\n  height: 480.0\ncalibration_taps: [9, 19]\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.session.window, 8);
        assert_eq!(cfg.session.projector.vertical_fov, 24.0);
        assert!(cfg.session.projector.show_distance);
        assert_eq!(cfg.session.projector.text_size, 25.0);
        assert_eq!(cfg.calibration_taps, vec![9, 19]);
    }

    #[test]
    fn bundled_calibration_workflow_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../tools/workflows/calibration.yaml");
        let cfg = WorkflowConfig::load(path).unwrap();
        assert_eq!(cfg.calibration_taps, vec![29, 59]);
        assert_eq!(cfg.trace.total_samples(), 100);
        assert_eq!(cfg.trace.segments[2].sweep_deg_per_sample, 0.25);
    }

    #[test]
    fn peaks_default_to_synthetic_ring() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.load_peaks().unwrap().len(), 24);
    }

    #[test]
    fn peaks_load_from_json_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"[{"id": 3, "name": "Cadair Idris", "bearing_deg": 200.0, "distance": 8.5, "height": 893.0, "visual_elevation": 0.1}]"#,
        )
        .unwrap();
        let cfg = WorkflowConfig {
            peaks_path: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let peaks = cfg.load_peaks().unwrap();
        assert_eq!(peaks[0].id, 3);
    }
}
