#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod calibrate;
pub mod dataset;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod interp;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
// (You can tighten or feature-gate these later.)
pub mod cache;
pub mod classify;
pub mod cluster;
pub mod config;
pub mod scan;
pub mod smooth;
pub mod trace;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{ChartDetector, DetectorParams, RegionSpec};
pub use crate::types::{ChartCurves, ChartResult, PercentileResult};

// High-level diagnostics returned by the detector.
pub use crate::diagnostics::{DetectionReport, PipelineTrace};

// Manual calibration entry points.
pub use crate::calibrate::{CalibrationSession, SessionParams};

// Errors surfaced by dataset loading and classification.
pub use crate::error::{ClassifyError, DatasetError};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use curve_detector::prelude::*;
/// use curve_detector::interp::{classify, InterpParams};
///
/// # fn main() {
/// let raster = RgbaBuffer::filled(2500, 3500, Rgba::gray(255));
///
/// let det = ChartDetector::new(DetectorParams::default());
/// let result = det.process(&raster.as_view());
/// println!(
///     "curves={} coverage={:.2} latency_ms={:.3}",
///     result.curves.curve_count(),
///     result.coverage,
///     result.latency_ms
/// );
///
/// if let Some(set) = result.curves.get(MeasurementType::Height) {
///     if let Ok(hit) = classify(set, 1200.0, 800.0, &InterpParams::default()) {
///         println!("(1200, 800) -> {hit} [{}]", hit.confidence());
///     }
/// }
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{Rgba, RgbaBuffer, RgbaView};
    pub use crate::types::{MeasurementType, PercentileLabel};
    pub use crate::{ChartCurves, ChartDetector, ChartResult, DetectorParams, PercentileResult};
}
