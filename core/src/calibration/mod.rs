pub mod controller;
pub mod settings;

pub use controller::{
    CalibrationController, CalibrationEvent, CalibrationPhase, CompassStep, ScreenEdge,
    COMPASS_STEP_DEG,
};
pub use settings::{MemorySettingsStore, PersistedSettings, DEFAULT_HORIZONTAL_FOV};
