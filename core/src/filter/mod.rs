pub mod circular;

pub use circular::{CircularFilter, DEFAULT_WINDOW};
