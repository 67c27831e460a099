use peakcore::calibration::PersistedSettings;
use peakcore::prelude::{OverlayError, OverlayResult, SettingsStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps the calibration triple in a YAML file between runs.
pub struct YamlSettingsStore {
    path: PathBuf,
}

impl YamlSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&mut self) -> OverlayResult<PersistedSettings> {
        if !self.path.exists() {
            log::info!(
                "no settings at {}, starting uncalibrated",
                self.path.display()
            );
            return Ok(PersistedSettings::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| {
            OverlayError::Persistence(format!("reading {}: {}", self.path.display(), err))
        })?;
        serde_yaml::from_str(&contents).map_err(|err| {
            OverlayError::Persistence(format!("parsing {}: {}", self.path.display(), err))
        })
    }

    fn save(&mut self, settings: &PersistedSettings) -> OverlayResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    OverlayError::Persistence(format!("creating {}: {}", parent.display(), err))
                })?;
            }
        }
        let contents = serde_yaml::to_string(settings)
            .map_err(|err| OverlayError::Persistence(err.to_string()))?;
        fs::write(&self.path, contents).map_err(|err| {
            OverlayError::Persistence(format!("writing {}: {}", self.path.display(), err))
        })
    }
}
