pub mod orientation;
pub mod peak;

pub use orientation::{OrientationSample, SensorAccuracy};
pub use peak::{parse_peak_list, Peak};
