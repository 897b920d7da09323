//! Percentile classification of a query point against labeled curves.
//!
//! The classifier evaluates every curve of the set at the query x, then
//! decides between four outcomes: exactly on a curve, interpolated
//! between two brackets, extrapolated past the outermost curve, or
//! extreme when the query clears the outermost curve by a margin.
//!
//! Weight panels are printed with either label direction, so the
//! orientation is inferred from the P3/P97 geometry before picking the
//! bracket sides.

use crate::error::ClassifyError;
use crate::smooth::y_at;
use crate::types::{CurveSet, ExtremeSide, MeasurementType, PercentileLabel, PercentileResult};
use log::debug;

#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(default)]
pub struct InterpParams {
    /// Distance within which a query is on a curve unconditionally.
    pub exact_distance: f32,
    /// Broader on-curve threshold paired with the relative gap check.
    pub exact_distance_relaxed: f32,
    /// Relaxed threshold applies when distance over bracket gap stays
    /// below this fraction.
    pub exact_gap_fraction: f32,
    /// Margin past the outermost curve before a query counts as extreme.
    pub extreme_margin: f32,
    /// Queries further than this from both brackets sit mid-gap.
    pub mid_gap_distance: f32,
}

impl Default for InterpParams {
    fn default() -> Self {
        Self {
            exact_distance: 7.0,
            exact_distance_relaxed: 15.0,
            exact_gap_fraction: 0.22,
            extreme_margin: 8.0,
            mid_gap_distance: 20.0,
        }
    }
}

/// Vertical orientation of the percentile order at the query x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orientation {
    /// Higher percentile sits at smaller y. Height and head panels.
    Standard,
    /// Higher percentile sits at larger y.
    Inverted,
}

#[derive(Clone, Copy, Debug)]
struct CurveMatch {
    label: PercentileLabel,
    curve_y: f32,
    distance: f32,
}

/// Classifies the pixel `(x, y)` against the set. Curves with fewer than
/// two points cannot be evaluated and are ignored; an error comes back
/// only when no curve of the set has data at all.
pub fn classify(
    set: &CurveSet,
    x: f32,
    y: f32,
    params: &InterpParams,
) -> Result<PercentileResult, ClassifyError> {
    let matches: Vec<CurveMatch> = set
        .iter()
        .filter_map(|curve| {
            let curve_y = y_at(&curve.points, x)?;
            Some(CurveMatch {
                label: curve.label,
                curve_y,
                distance: (y - curve_y).abs(),
            })
        })
        .collect();

    if matches.is_empty() {
        return Err(ClassifyError::NoCurveData { x });
    }

    let orientation = infer_orientation(set.measurement(), &matches);
    let closest = matches
        .iter()
        .copied()
        .min_by(|a, b| total_ord(a.distance, b.distance))
        .ok_or(ClassifyError::NoCurveData { x })?;

    if let Some(extreme) = check_extreme(y, &matches, orientation, params) {
        return Ok(extreme);
    }

    // Bracket the query between the nearest curve on the higher-percentile
    // side and the nearest on the lower side.
    let (high, low) = find_brackets(y, &matches, orientation);
    let gap = match (high, low) {
        (Some(h), Some(l)) if h.label != l.label => Some((l.curve_y - h.curve_y).abs()),
        _ => None,
    };

    if closest.distance <= params.exact_distance {
        return Ok(PercentileResult::Exact {
            label: closest.label,
            distance_px: closest.distance,
        });
    }
    if let Some(gap) = gap {
        if gap > 0.0
            && closest.distance <= params.exact_distance_relaxed
            && closest.distance / gap <= params.exact_gap_fraction
        {
            debug!(
                "classify: relative exact match on {} (distance {:.1}, gap {:.1})",
                closest.label, closest.distance, gap
            );
            return Ok(PercentileResult::Exact {
                label: closest.label,
                distance_px: closest.distance,
            });
        }
    }

    if let (Some(high), Some(low), Some(gap)) = (high, low, gap) {
        if gap > 0.0 {
            let dist_high = (y - high.curve_y).abs();
            let dist_low = (y - low.curve_y).abs();
            let ratio = dist_high / gap;
            let percentile = high.label.value() + ratio * (low.label.value() - high.label.value());
            let mid_gap =
                dist_high > params.mid_gap_distance && dist_low > params.mid_gap_distance;
            return Ok(PercentileResult::Interpolated {
                percentile,
                low: low.label,
                high: high.label,
                mid_gap,
            });
        }
    }

    debug!(
        "classify: no bracket at x={x:.0}, extrapolating from {}",
        closest.label
    );
    Ok(PercentileResult::Extrapolated {
        percentile: closest.label.value(),
        nearest: closest.label,
        distance_px: closest.distance,
    })
}

/// Weight panels flip when the printed P97 sits below the printed P3.
fn infer_orientation(measurement: MeasurementType, matches: &[CurveMatch]) -> Orientation {
    if measurement != MeasurementType::Weight {
        return Orientation::Standard;
    }
    let y97 = matches
        .iter()
        .find(|m| m.label == PercentileLabel::P97)
        .map(|m| m.curve_y);
    let y3 = matches
        .iter()
        .find(|m| m.label == PercentileLabel::P3)
        .map(|m| m.curve_y);
    match (y97, y3) {
        (Some(y97), Some(y3)) if y97 > y3 => {
            debug!("classify: inverted weight panel (P97 below P3)");
            Orientation::Inverted
        }
        _ => Orientation::Standard,
    }
}

fn check_extreme(
    y: f32,
    matches: &[CurveMatch],
    orientation: Orientation,
    params: &InterpParams,
) -> Option<PercentileResult> {
    let min_y = matches
        .iter()
        .map(|m| m.curve_y)
        .fold(f32::INFINITY, f32::min);
    let max_y = matches
        .iter()
        .map(|m| m.curve_y)
        .fold(f32::NEG_INFINITY, f32::max);

    let (top_bound, bottom_bound) = match orientation {
        Orientation::Standard => (PercentileLabel::P97, PercentileLabel::P3),
        Orientation::Inverted => (PercentileLabel::P3, PercentileLabel::P97),
    };
    let (top_side, bottom_side) = match orientation {
        Orientation::Standard => (ExtremeSide::Above, ExtremeSide::Below),
        Orientation::Inverted => (ExtremeSide::Below, ExtremeSide::Above),
    };

    if y < min_y - params.extreme_margin {
        return Some(PercentileResult::Extreme {
            bound: top_bound,
            side: top_side,
            distance_px: (y - min_y).abs(),
        });
    }
    if y > max_y + params.extreme_margin {
        return Some(PercentileResult::Extreme {
            bound: bottom_bound,
            side: bottom_side,
            distance_px: (y - max_y).abs(),
        });
    }
    None
}

/// Nearest curve on the higher-percentile side of the query, and nearest
/// on the lower side. Either may be missing near the band edges.
fn find_brackets(
    y: f32,
    matches: &[CurveMatch],
    orientation: Orientation,
) -> (Option<CurveMatch>, Option<CurveMatch>) {
    let mut high: Option<CurveMatch> = None;
    let mut low: Option<CurveMatch> = None;
    for m in matches.iter().copied() {
        match orientation {
            Orientation::Standard => {
                // higher percentile is up (smaller y)
                if m.curve_y <= y && high.map_or(true, |h| m.curve_y > h.curve_y) {
                    high = Some(m);
                }
                if m.curve_y >= y && low.map_or(true, |l| m.curve_y < l.curve_y) {
                    low = Some(m);
                }
            }
            Orientation::Inverted => {
                if m.curve_y >= y && high.map_or(true, |h| m.curve_y < h.curve_y) {
                    high = Some(m);
                }
                if m.curve_y <= y && low.map_or(true, |l| m.curve_y > l.curve_y) {
                    low = Some(m);
                }
            }
        }
    }
    (high, low)
}

fn total_ord(a: f32, b: f32) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Curve, CurvePoint, CurveSet};
    use approx::assert_relative_eq;

    /// Horizontal reference curves at fixed heights over x in 0..=100.
    fn flat_set(
        measurement: MeasurementType,
        heights: &[(PercentileLabel, f32)],
    ) -> CurveSet {
        let mut set = CurveSet::new(measurement);
        for &(label, y) in heights {
            let points = (0..=10)
                .map(|i| CurvePoint::from_xy(i as f32 * 10.0, y))
                .collect();
            set.insert(Curve::new(measurement, label, points));
        }
        set
    }

    fn height_set() -> CurveSet {
        flat_set(
            MeasurementType::Height,
            &[
                (PercentileLabel::P97, 100.0),
                (PercentileLabel::P90, 140.0),
                (PercentileLabel::P75, 180.0),
                (PercentileLabel::P50, 220.0),
                (PercentileLabel::P25, 260.0),
                (PercentileLabel::P10, 300.0),
                (PercentileLabel::P3, 340.0),
            ],
        )
    }

    #[test]
    fn on_curve_is_exact() {
        let set = height_set();
        let result = classify(&set, 50.0, 222.0, &InterpParams::default()).unwrap();
        match result {
            PercentileResult::Exact { label, distance_px } => {
                assert_eq!(label, PercentileLabel::P50);
                assert_relative_eq!(distance_px, 2.0);
            }
            other => panic!("expected exact, got {other:?}"),
        }
        assert_eq!(result.confidence(), crate::types::Confidence::High);
    }

    #[test]
    fn halfway_interpolates_between_brackets() {
        let set = height_set();
        // halfway between P50 (220) and P25 (260)
        let result = classify(&set, 50.0, 240.0, &InterpParams::default()).unwrap();
        match result {
            PercentileResult::Interpolated {
                percentile,
                low,
                high,
                mid_gap,
            } => {
                assert_relative_eq!(percentile, 37.5);
                assert_eq!(low, PercentileLabel::P25);
                assert_eq!(high, PercentileLabel::P50);
                assert!(!mid_gap);
            }
            other => panic!("expected interpolated, got {other:?}"),
        }
        assert_eq!(result.range_label().as_deref(), Some("P25-50"));
    }

    #[test]
    fn wide_gap_marks_mid_gap() {
        let set = flat_set(
            MeasurementType::Height,
            &[
                (PercentileLabel::P50, 100.0),
                (PercentileLabel::P25, 160.0),
            ],
        );
        let result = classify(&set, 50.0, 130.0, &InterpParams::default()).unwrap();
        match result {
            PercentileResult::Interpolated { mid_gap, .. } => assert!(mid_gap),
            other => panic!("expected interpolated, got {other:?}"),
        }
        assert_eq!(format!("{result}"), "P25-50");
    }

    #[test]
    fn relaxed_exact_needs_narrow_relative_distance() {
        // gap 60 px, query 10 px from P50: 10 <= 15 and 10/60 <= 0.22
        let set = flat_set(
            MeasurementType::Height,
            &[
                (PercentileLabel::P50, 100.0),
                (PercentileLabel::P25, 160.0),
            ],
        );
        let result = classify(&set, 50.0, 110.0, &InterpParams::default()).unwrap();
        assert!(matches!(
            result,
            PercentileResult::Exact {
                label: PercentileLabel::P50,
                ..
            }
        ));
    }

    #[test]
    fn above_all_is_extreme_p97() {
        let set = height_set();
        let result = classify(&set, 50.0, 80.0, &InterpParams::default()).unwrap();
        match result {
            PercentileResult::Extreme { bound, side, .. } => {
                assert_eq!(bound, PercentileLabel::P97);
                assert_eq!(side, ExtremeSide::Above);
            }
            other => panic!("expected extreme, got {other:?}"),
        }
        assert_eq!(format!("{result}"), ">P97");
    }

    #[test]
    fn below_all_is_extreme_p3() {
        let set = height_set();
        let result = classify(&set, 50.0, 360.0, &InterpParams::default()).unwrap();
        assert!(matches!(
            result,
            PercentileResult::Extreme {
                bound: PercentileLabel::P3,
                side: ExtremeSide::Below,
                ..
            }
        ));
    }

    #[test]
    fn inverted_weight_panel_flips_extremes() {
        // P3 printed on top: lighter than every curve means below P3
        let set = flat_set(
            MeasurementType::Weight,
            &[
                (PercentileLabel::P3, 100.0),
                (PercentileLabel::P50, 200.0),
                (PercentileLabel::P97, 300.0),
            ],
        );
        let result = classify(&set, 50.0, 80.0, &InterpParams::default()).unwrap();
        assert!(matches!(
            result,
            PercentileResult::Extreme {
                bound: PercentileLabel::P3,
                side: ExtremeSide::Below,
                ..
            }
        ));

        let result = classify(&set, 50.0, 320.0, &InterpParams::default()).unwrap();
        assert!(matches!(
            result,
            PercentileResult::Extreme {
                bound: PercentileLabel::P97,
                side: ExtremeSide::Above,
                ..
            }
        ));
    }

    #[test]
    fn inverted_weight_panel_interpolates() {
        let set = flat_set(
            MeasurementType::Weight,
            &[
                (PercentileLabel::P3, 100.0),
                (PercentileLabel::P50, 200.0),
                (PercentileLabel::P97, 300.0),
            ],
        );
        // halfway between P50 (200) and P97 (300)
        let result = classify(&set, 50.0, 250.0, &InterpParams::default()).unwrap();
        match result {
            PercentileResult::Interpolated {
                percentile,
                low,
                high,
                ..
            } => {
                assert_relative_eq!(percentile, 73.5);
                assert_eq!(high, PercentileLabel::P97);
                assert_eq!(low, PercentileLabel::P50);
            }
            other => panic!("expected interpolated, got {other:?}"),
        }
    }

    #[test]
    fn outside_span_clamps_to_endpoints() {
        let set = height_set();
        let at_edge = classify(&set, 100.0, 222.0, &InterpParams::default()).unwrap();
        let beyond = classify(&set, 400.0, 222.0, &InterpParams::default()).unwrap();
        assert_eq!(format!("{at_edge}"), format!("{beyond}"));
    }

    #[test]
    fn empty_set_is_an_error() {
        let set = CurveSet::new(MeasurementType::Height);
        let err = classify(&set, 50.0, 100.0, &InterpParams::default()).unwrap_err();
        assert!(matches!(err, ClassifyError::NoCurveData { .. }));
    }

    #[test]
    fn single_point_curves_cannot_be_evaluated() {
        let mut set = CurveSet::new(MeasurementType::Height);
        set.insert(Curve::new(
            MeasurementType::Height,
            PercentileLabel::P50,
            vec![CurvePoint::from_xy(10.0, 100.0)],
        ));
        assert!(classify(&set, 10.0, 100.0, &InterpParams::default()).is_err());
    }

    #[test]
    fn extrapolated_inside_margin_keeps_nearest_label() {
        let set = height_set();
        // 7.5 px below P3: past exact, inside the 8 px extreme margin,
        // no lower bracket
        let result = classify(&set, 50.0, 347.5, &InterpParams::default()).unwrap();
        match result {
            PercentileResult::Extrapolated {
                nearest,
                distance_px,
                ..
            } => {
                assert_eq!(nearest, PercentileLabel::P3);
                assert_relative_eq!(distance_px, 7.5);
            }
            other => panic!("expected extrapolated, got {other:?}"),
        }
        assert_eq!(result.confidence(), crate::types::Confidence::Medium);
    }
}
