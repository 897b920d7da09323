mod common;

use common::synthetic_chart::{height_curve_y, weight_curve_y};
use curve_detector::dataset::{parse_dataset, DatasetQuality};
use curve_detector::interp::{classify, InterpParams};
use curve_detector::types::{ExtremeSide, MeasurementType, PercentileLabel, PercentileResult};

/// Serializes the synthetic chart centerlines as a bare 14-slot dataset:
/// height curves top to bottom, then weight curves top to bottom.
fn bare_dataset_json() -> String {
    let mut slots: Vec<Vec<[f32; 2]>> = Vec::with_capacity(14);
    for rank in 0..7 {
        slots.push(sampled(|x| height_curve_y(rank, x)));
    }
    for rank in 0..7 {
        slots.push(sampled(|x| weight_curve_y(rank, x)));
    }
    serde_json::json!({ "curves": slots }).to_string()
}

fn sampled(centerline: impl Fn(f32) -> f32) -> Vec<[f32; 2]> {
    (0..=36)
        .map(|i| {
            let x = 400.0 + i as f32 * 50.0;
            [x, centerline(x)]
        })
        .collect()
}

#[test]
fn bare_dataset_supports_the_full_lookup_range() {
    let loaded = parse_dataset(&bare_dataset_json(), None).expect("dataset parses");
    assert_eq!(loaded.quality, DatasetQuality::PositionalOrder);
    assert_eq!(loaded.discarded, 0);
    assert_eq!(loaded.curves.curve_count(), 14);

    let params = InterpParams::default();
    let heights = loaded
        .curves
        .get(MeasurementType::Height)
        .expect("height set");
    let weights = loaded
        .curves
        .get(MeasurementType::Weight)
        .expect("weight set");

    // On the median line.
    let on_median = classify(heights, 1200.0, height_curve_y(3, 1200.0), &params).unwrap();
    assert!(
        matches!(
            on_median,
            PercentileResult::Exact {
                label: PercentileLabel::P50,
                ..
            }
        ),
        "got {on_median}"
    );

    // Halfway between P50 and P25 the range is reported, not a number.
    let y_mid = (height_curve_y(3, 1200.0) + height_curve_y(4, 1200.0)) / 2.0;
    let between = classify(heights, 1200.0, y_mid, &params).unwrap();
    match &between {
        PercentileResult::Interpolated {
            percentile,
            mid_gap,
            ..
        } => {
            assert!((percentile - 37.5).abs() < 0.5, "percentile {percentile}");
            assert!(*mid_gap, "37 px from both brackets should flag mid_gap");
            assert_eq!(between.to_string(), "P25-50");
        }
        other => panic!("expected an interpolated result, got {other}"),
    }

    // Just off the median line, close enough to trust the number.
    let near = classify(heights, 1200.0, height_curve_y(3, 1200.0) + 18.0, &params).unwrap();
    match &near {
        PercentileResult::Interpolated {
            percentile,
            mid_gap,
            ..
        } => {
            assert!((percentile - 44.0).abs() < 0.5, "percentile {percentile}");
            assert!(!*mid_gap);
        }
        other => panic!("expected an interpolated result, got {other}"),
    }

    // Above the tallest height curve.
    let above = classify(heights, 1200.0, height_curve_y(0, 1200.0) - 30.0, &params).unwrap();
    assert!(
        matches!(
            above,
            PercentileResult::Extreme {
                bound: PercentileLabel::P97,
                side: ExtremeSide::Above,
                ..
            }
        ),
        "got {above}"
    );

    // Weight panels run the other way: above the top curve means below P3.
    let light = classify(weights, 1200.0, weight_curve_y(0, 1200.0) - 40.0, &params).unwrap();
    assert!(
        matches!(
            light,
            PercentileResult::Extreme {
                bound: PercentileLabel::P3,
                side: ExtremeSide::Below,
                ..
            }
        ),
        "got {light}"
    );

    // And interpolation follows the inverted order too.
    let y_mid = (weight_curve_y(3, 1200.0) + weight_curve_y(4, 1200.0)) / 2.0;
    let between = classify(weights, 1200.0, y_mid, &params).unwrap();
    match between {
        PercentileResult::Interpolated { percentile, .. } => {
            assert!((percentile - 62.5).abs() < 0.5, "percentile {percentile}");
        }
        other => panic!("expected an interpolated result, got {other}"),
    }
}

#[test]
fn keyed_and_ordered_forms_carry_their_own_labels() {
    let keyed = serde_json::json!({
        "curves": {
            "height-P10": { "points": sampled(|x| height_curve_y(5, x)), "percentile": "P10", "type": "height" },
            "height-P90": { "points": sampled(|x| height_curve_y(1, x)), "percentile": "P90", "type": "height" },
        }
    })
    .to_string();
    let loaded = parse_dataset(&keyed, None).expect("keyed dataset parses");
    assert_eq!(loaded.quality, DatasetQuality::Keyed);
    let heights = loaded
        .curves
        .get(MeasurementType::Height)
        .expect("height set");
    assert!(heights.get(PercentileLabel::P10).is_some());
    assert!(heights.get(PercentileLabel::P90).is_some());

    let ordered = serde_json::json!({
        "curves": [
            sampled(|x| height_curve_y(2, x)),
            sampled(|x| height_curve_y(4, x)),
        ],
        "curveArrayOrder": { "height": ["P75", "P25"] }
    })
    .to_string();
    let loaded = parse_dataset(&ordered, None).expect("ordered dataset parses");
    assert_eq!(loaded.quality, DatasetQuality::ExplicitOrder);
    let heights = loaded
        .curves
        .get(MeasurementType::Height)
        .expect("height set");
    assert!(heights.get(PercentileLabel::P75).is_some());
    assert!(heights.get(PercentileLabel::P25).is_some());
}
