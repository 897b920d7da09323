//! Serializable reports describing one detection run.
//!
//! [`ChartDetector::process_with_diagnostics`] fills these structures so
//! a run can be archived as JSON and compared across parameter changes.
//! Field names serialize in camelCase to line up with the dataset files.
//!
//! [`ChartDetector::process_with_diagnostics`]: crate::detector::ChartDetector::process_with_diagnostics

use crate::scan::ScanRegion;
use crate::types::{ChartResult, Curve, MeasurementType, PercentileLabel};
use serde::Serialize;

/// Full outcome of a detection run: the compact result plus the stage
/// trace behind it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub result: ChartResult,
    pub trace: PipelineTrace,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub regions: Vec<RegionStage>,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
}

/// What happened inside one scanned region.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStage {
    pub measurement: MeasurementType,
    pub region: ScanRegion,
    pub columns_scanned: usize,
    pub candidates: usize,
    pub clusters_found: usize,
    pub clusters_discarded: usize,
    pub curves: Vec<CurveSummary>,
    pub elapsed_ms: f64,
}

/// Compact per-curve record for the trace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveSummary {
    pub label: PercentileLabel,
    pub points: usize,
    pub mean_intensity: f32,
    pub x_min: f32,
    pub x_max: f32,
}

impl CurveSummary {
    pub fn from_curve(curve: &Curve) -> Self {
        let mean_intensity = if curve.is_empty() {
            0.0
        } else {
            curve.points.iter().map(|p| p.intensity).sum::<f32>() / curve.len() as f32
        };
        let (x_min, x_max) = curve.x_span().unwrap_or((0.0, 0.0));
        Self {
            label: curve.label,
            points: curve.len(),
            mean_intensity,
            x_min,
            x_max,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub stage: &'static str,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub stages: Vec<StageTiming>,
    pub total_ms: f64,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            stages: Vec::new(),
            total_ms,
        }
    }

    pub fn push(&mut self, stage: &'static str, elapsed_ms: f64) {
        self.stages.push(StageTiming { stage, elapsed_ms });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurvePoint;

    #[test]
    fn curve_summary_aggregates_points() {
        let curve = Curve::new(
            MeasurementType::Height,
            PercentileLabel::P75,
            vec![
                CurvePoint::new(40.0, 110.0, 210.0),
                CurvePoint::new(10.0, 100.0, 190.0),
            ],
        );
        let summary = CurveSummary::from_curve(&curve);
        assert_eq!(summary.points, 2);
        assert_eq!(summary.mean_intensity, 200.0);
        assert_eq!(summary.x_min, 10.0);
        assert_eq!(summary.x_max, 40.0);
    }

    #[test]
    fn trace_serializes_in_camel_case() {
        let trace = PipelineTrace {
            input: InputDescriptor {
                width: 2500,
                height: 3500,
            },
            timings: TimingBreakdown::with_total(12.5),
            regions: vec![RegionStage {
                measurement: MeasurementType::Weight,
                region: ScanRegion::new(400, 2200, 1500, 3200),
                columns_scanned: 73,
                candidates: 511,
                clusters_found: 7,
                clusters_discarded: 2,
                curves: Vec::new(),
                elapsed_ms: 6.25,
            }],
        };
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["regions"][0]["columnsScanned"], 73);
        assert_eq!(json["regions"][0]["clustersDiscarded"], 2);
        assert_eq!(json["timings"]["totalMs"], 12.5);
        assert_eq!(json["regions"][0]["measurement"], "weight");
    }
}
