//! End-to-end detection pipeline.
//!
//! One run walks every configured panel region: scan columns for stroke
//! runs, cluster the candidates into trajectories, rank and label them,
//! smooth the labeled curves. The compact [`ChartResult`] carries the
//! curves plus a coverage-based confidence; the full report adds
//! per-region stage traces and timings.

use std::time::Instant;

use log::debug;

use crate::classify::PixelClassifier;
use crate::cluster::{cluster_candidates, label_clusters};
use crate::diagnostics::{
    CurveSummary, DetectionReport, InputDescriptor, PipelineTrace, RegionStage, TimingBreakdown,
};
use crate::image::RgbaView;
use crate::scan::scan_region;
use crate::smooth::smooth_y;
use crate::types::{ChartCurves, ChartResult, Confidence, Curve, PercentileLabel};

use super::params::{DetectorParams, RegionSpec};

const COVERAGE_HIGH: f32 = 0.8;
const COVERAGE_MEDIUM: f32 = 0.4;

/// Percentile curve detector for scanned growth charts.
#[derive(Clone, Debug, Default)]
pub struct ChartDetector {
    params: DetectorParams,
}

impl ChartDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut DetectorParams {
        &mut self.params
    }

    pub fn set_regions(&mut self, regions: Vec<RegionSpec>) {
        self.params.regions = regions;
    }

    /// Runs the pipeline and returns the compact result.
    pub fn process(&self, view: &RgbaView) -> ChartResult {
        self.process_with_diagnostics(view).result
    }

    /// Runs the pipeline and returns the result plus the stage trace.
    pub fn process_with_diagnostics(&self, view: &RgbaView) -> DetectionReport {
        let total_start = Instant::now();
        debug!(
            "detector: start {}x{}, {} regions",
            view.w,
            view.h,
            self.params.regions.len()
        );

        let classifier = PixelClassifier::new(view.clone(), self.params.classifier.clone());
        let mut charts = ChartCurves::default();
        let mut stages = Vec::with_capacity(self.params.regions.len());

        for spec in &self.params.regions {
            let stage = self.process_region(&classifier, spec, &mut charts);
            stages.push(stage);
        }

        let latency_ms = total_start.elapsed().as_secs_f64() * 1e3;
        let expected = self.params.regions.len() * PercentileLabel::ALL.len();
        let found = charts.curve_count();
        let coverage = if expected == 0 {
            0.0
        } else {
            found as f32 / expected as f32
        };
        let confidence = if coverage >= COVERAGE_HIGH {
            Confidence::High
        } else if coverage >= COVERAGE_MEDIUM {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        debug!(
            "detector: done, {found}/{expected} curves, coverage {coverage:.2}, \
             confidence {confidence}, {latency_ms:.1} ms"
        );

        let mut timings = TimingBreakdown::with_total(latency_ms);
        for stage in &stages {
            timings.push(stage.measurement.as_str(), stage.elapsed_ms);
        }

        DetectionReport {
            result: ChartResult {
                curves: charts,
                coverage,
                confidence,
                latency_ms,
            },
            trace: PipelineTrace {
                input: InputDescriptor {
                    width: view.w,
                    height: view.h,
                },
                timings,
                regions: stages,
            },
        }
    }

    fn process_region(
        &self,
        classifier: &PixelClassifier,
        spec: &RegionSpec,
        charts: &mut ChartCurves,
    ) -> RegionStage {
        let start = Instant::now();

        let candidates = scan_region(classifier, spec.region, &self.params.scan);
        let outcome = cluster_candidates(&candidates, &self.params.cluster);
        let clusters_found = outcome.clusters.len();
        let clusters_discarded = outcome.discarded_small + outcome.discarded_gapped;
        let labeled = label_clusters(outcome.clusters, spec.measurement, &self.params.cluster);

        let mut summaries = Vec::with_capacity(labeled.len());
        for curve in labeled {
            let smoothed = Curve::new(curve.measurement, curve.label, smooth_y(&curve.points));
            summaries.push(CurveSummary::from_curve(&smoothed));
            charts.insert_curve(smoothed);
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
        debug!(
            "detector: region {} -> {} candidates, {clusters_found} clusters \
             ({clusters_discarded} dropped), {} curves in {elapsed_ms:.1} ms",
            spec.measurement,
            candidates.len(),
            summaries.len()
        );

        RegionStage {
            measurement: spec.measurement,
            region: spec.region,
            columns_scanned: spec.region.column_count(self.params.scan.column_spacing),
            candidates: candidates.len(),
            clusters_found,
            clusters_discarded,
            curves: summaries,
            elapsed_ms,
        }
    }
}
