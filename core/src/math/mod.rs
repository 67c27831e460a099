pub mod angles;
pub mod stats;

pub use angles::normalize_degrees;
pub use stats::StatsHelper;
