//! Trajectory clustering of column candidates into labeled curves.
//!
//! Candidates are sorted by x and greedily linked while they stay close
//! in x and y and follow the local trend. Surviving clusters are ranked
//! by mean y and mapped onto the printed percentile order.

use crate::scan::ColumnCandidate;
use crate::types::{Curve, CurvePoint, MeasurementType, PercentileLabel, MIN_CURVE_POINTS};
use log::debug;
use serde::{Deserialize, Serialize};

/// Printed label direction of the weight panel. Height and head panels
/// always run P97 at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeightLabelOrder {
    /// P3 nearest the top, percentile grows downward.
    AscendingDown,
    /// P97 nearest the top, same as the height panel.
    DescendingDown,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Maximum x distance between consecutive linked candidates.
    pub max_x_gap: f32,
    /// Maximum |dy| from the last linked candidate.
    pub y_tolerance: f32,
    /// Maximum deviation from the trend of the last two candidates.
    pub trend_tolerance: f32,
    /// Clusters below this size are dropped as noise.
    pub min_points: usize,
    /// Largest internal x gap a surviving cluster may contain.
    pub max_internal_gap: f32,
    /// Clusters must reach this size to receive a rank label.
    pub min_labeled_points: usize,
    pub weight_label_order: WeightLabelOrder,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            max_x_gap: 100.0,
            y_tolerance: 50.0,
            trend_tolerance: 30.0,
            min_points: MIN_CURVE_POINTS,
            max_internal_gap: 150.0,
            min_labeled_points: 10,
            weight_label_order: WeightLabelOrder::AscendingDown,
        }
    }
}

/// Clustering result with drop counters for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct ClusterOutcome {
    pub clusters: Vec<Vec<ColumnCandidate>>,
    pub discarded_small: usize,
    pub discarded_gapped: usize,
}

/// Greedily links candidates into clusters and filters out noise.
pub fn cluster_candidates(candidates: &[ColumnCandidate], params: &ClusterParams) -> ClusterOutcome {
    let mut sorted: Vec<ColumnCandidate> = candidates.to_vec();
    sorted.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let mut outcome = ClusterOutcome::default();
    let mut processed = vec![false; sorted.len()];

    for i in 0..sorted.len() {
        if processed[i] {
            continue;
        }
        processed[i] = true;
        let mut cluster = vec![sorted[i]];

        for j in (i + 1)..sorted.len() {
            if processed[j] {
                continue;
            }
            let last = cluster[cluster.len() - 1];
            let x_diff = sorted[j].x - last.x;
            let y_diff = (sorted[j].y - last.y).abs();
            if x_diff > params.max_x_gap || y_diff > params.y_tolerance {
                continue;
            }
            if cluster.len() >= 2 && !follows_trend(&cluster, sorted[j], params.trend_tolerance) {
                continue;
            }
            processed[j] = true;
            cluster.push(sorted[j]);
        }

        if cluster.len() < params.min_points {
            outcome.discarded_small += 1;
        } else if largest_x_gap(&cluster) > params.max_internal_gap {
            outcome.discarded_gapped += 1;
        } else {
            outcome.clusters.push(cluster);
        }
    }

    debug!(
        "clusterer: {} candidates -> {} clusters ({} small, {} gapped dropped)",
        candidates.len(),
        outcome.clusters.len(),
        outcome.discarded_small,
        outcome.discarded_gapped
    );
    outcome
}

/// Ranks clusters by mean y and maps them onto the printed label order of
/// the panel. Clusters below the labeling size and ranks past the label
/// list are skipped.
pub fn label_clusters(
    mut clusters: Vec<Vec<ColumnCandidate>>,
    measurement: MeasurementType,
    params: &ClusterParams,
) -> Vec<Curve> {
    if clusters.len() > PercentileLabel::ALL.len() {
        // Keep the seven best supported clusters: larger first, steadier
        // intensity breaking ties.
        clusters.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| total_ord(intensity_variance(a), intensity_variance(b)))
        });
        let dropped = clusters.len() - PercentileLabel::ALL.len();
        clusters.truncate(PercentileLabel::ALL.len());
        debug!("labeler: {dropped} excess clusters dropped");
    }

    clusters.sort_by(|a, b| total_ord(mean_y(a), mean_y(b)));

    let labels = label_order(measurement, params.weight_label_order);
    let mut curves = Vec::new();
    for (rank, cluster) in clusters.iter().enumerate() {
        if rank >= labels.len() {
            break;
        }
        if cluster.len() < params.min_labeled_points {
            debug!(
                "labeler: rank {rank} cluster with {} points too small to label",
                cluster.len()
            );
            continue;
        }
        let points = cluster
            .iter()
            .map(|c| CurvePoint::new(c.x, c.y, c.intensity))
            .collect();
        curves.push(Curve::new(measurement, labels[rank], points));
    }
    curves
}

/// Top-to-bottom label order of the panel.
fn label_order(measurement: MeasurementType, weight_order: WeightLabelOrder) -> [PercentileLabel; 7] {
    let descending = [
        PercentileLabel::P97,
        PercentileLabel::P90,
        PercentileLabel::P75,
        PercentileLabel::P50,
        PercentileLabel::P25,
        PercentileLabel::P10,
        PercentileLabel::P3,
    ];
    match measurement {
        MeasurementType::Weight => match weight_order {
            WeightLabelOrder::AscendingDown => PercentileLabel::ALL,
            WeightLabelOrder::DescendingDown => descending,
        },
        _ => descending,
    }
}

fn follows_trend(cluster: &[ColumnCandidate], next: ColumnCandidate, tolerance: f32) -> bool {
    let p1 = cluster[cluster.len() - 2];
    let p2 = cluster[cluster.len() - 1];
    let x_progress = (next.x - p2.x) / (p2.x - p1.x);
    let expected = p2.y + (p2.y - p1.y) * x_progress;
    // NaN from a zero x step fails the comparison and rejects the link.
    (next.y - expected).abs() <= tolerance
}

fn largest_x_gap(cluster: &[ColumnCandidate]) -> f32 {
    cluster
        .windows(2)
        .map(|w| w[1].x - w[0].x)
        .fold(0.0, f32::max)
}

fn mean_y(cluster: &[ColumnCandidate]) -> f32 {
    if cluster.is_empty() {
        return 0.0;
    }
    cluster.iter().map(|c| c.y).sum::<f32>() / cluster.len() as f32
}

fn intensity_variance(cluster: &[ColumnCandidate]) -> f32 {
    if cluster.is_empty() {
        return 0.0;
    }
    let mean = cluster.iter().map(|c| c.intensity).sum::<f32>() / cluster.len() as f32;
    cluster
        .iter()
        .map(|c| (c.intensity - mean).powi(2))
        .sum::<f32>()
        / cluster.len() as f32
}

fn total_ord(a: f32, b: f32) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}
