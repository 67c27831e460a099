pub mod hit;
pub mod projector;
pub mod text;

pub use hit::{LabelRect, ScreenHitRegion};
pub use projector::{ProjectedPeak, Projection, ProjectorConfig, ViewState, VisibilityProjector};
pub use text::{ApproximateMetrics, TextBounds, TextMetrics};
