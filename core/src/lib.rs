//! Orientation filtering and peak projection core for the hill overlay.
//!
//! Sensor readings are smoothed by circular filters, the camera's horizontal
//! field of view is calibrated with two taps, and every frame the peaks inside
//! the view are placed on screen with stacked, non-overlapping labels.

pub mod calibration;
pub mod filter;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod projection;
pub mod session;
pub mod telemetry;

pub use prelude::{OverlayError, OverlayResult, SettingsStore, Viewport};
pub use session::{Frame, OverlaySession, SessionConfig};
