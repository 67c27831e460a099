use crate::prelude::{OverlayResult, SettingsStore};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HORIZONTAL_FOV: f64 = 50.2;

/// Calibration values carried between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub horizontal_fov: f64,
    pub is_calibrated: bool,
    pub compass_adjustment: f64,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            horizontal_fov: DEFAULT_HORIZONTAL_FOV,
            is_calibrated: false,
            compass_adjustment: 0.0,
        }
    }
}

/// Store that keeps settings in memory; used by tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: PersistedSettings,
    saves: usize,
}

impl MemorySettingsStore {
    pub fn with_settings(settings: PersistedSettings) -> Self {
        Self { settings, saves: 0 }
    }

    pub fn current(&self) -> PersistedSettings {
        self.settings
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&mut self) -> OverlayResult<PersistedSettings> {
        Ok(self.settings)
    }

    fn save(&mut self, settings: &PersistedSettings) -> OverlayResult<()> {
        self.settings = *settings;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: PersistedSettings = serde_json::from_str(r#"{"is_calibrated": true}"#).unwrap();
        assert!(settings.is_calibrated);
        assert_eq!(settings.horizontal_fov, DEFAULT_HORIZONTAL_FOV);
        assert_eq!(settings.compass_adjustment, 0.0);
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemorySettingsStore::default();
        let settings = PersistedSettings {
            horizontal_fov: 44.0,
            is_calibrated: true,
            compass_adjustment: -0.3,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
        assert_eq!(store.save_count(), 1);
    }
}
