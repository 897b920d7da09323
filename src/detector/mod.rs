//! Chart detector: parameters and the staged pipeline.

mod params;
mod pipeline;

pub use self::params::{default_regions, DetectorParams, RegionSpec};
pub use self::pipeline::ChartDetector;
