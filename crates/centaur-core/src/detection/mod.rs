pub mod components;
pub mod stars;

pub use components::{label_regions, Region};
pub use stars::{star_metrics, StarMetrics};
