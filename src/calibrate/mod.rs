//! Guided manual calibration.
//!
//! When automatic detection fails (photographed charts, unusual print
//! layouts) the curves are traced by hand: the session walks a fixed
//! sequence of reference lines, snaps every click onto the printed
//! stroke and turns the collected points into smoothed, densely
//! resampled curves on completion.

pub mod fitter;

pub use self::fitter::{fit_click, FittedPoint, LineFitParams};

use crate::image::RgbaView;
use crate::smooth::{resample_dense, smooth_y};
use crate::types::{ChartCurves, Curve, CurvePoint, MeasurementType, PercentileLabel};
use log::debug;
use nalgebra::Point2;
use serde::Serialize;

/// One reference line to trace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStep {
    pub measurement: MeasurementType,
    pub label: PercentileLabel,
    /// Operator-facing prompt, e.g. "Height P97 (tallest curve)".
    pub description: String,
}

impl CalibrationStep {
    pub fn new(measurement: MeasurementType, label: PercentileLabel) -> Self {
        Self {
            measurement,
            label,
            description: describe(measurement, label),
        }
    }
}

/// The standard 14-step sequence: height curves top to bottom, then
/// weight curves bottom to top as printed.
pub fn standard_sequence() -> Vec<CalibrationStep> {
    let mut steps = Vec::with_capacity(14);
    for label in PercentileLabel::ALL.iter().rev() {
        steps.push(CalibrationStep::new(MeasurementType::Height, *label));
    }
    for label in PercentileLabel::ALL {
        steps.push(CalibrationStep::new(MeasurementType::Weight, label));
    }
    steps
}

/// Seven-step sequence for head circumference charts.
pub fn head_sequence() -> Vec<CalibrationStep> {
    PercentileLabel::ALL
        .iter()
        .rev()
        .map(|label| CalibrationStep::new(MeasurementType::Head, *label))
        .collect()
}

#[derive(Clone, Copy, Debug)]
pub struct SessionParams {
    /// X step of the dense resample applied on completion.
    pub resample_step: f32,
    /// Steps with fewer points than this are skipped on completion.
    pub min_step_points: usize,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            resample_step: 2.0,
            min_step_points: 2,
        }
    }
}

/// Interactive calibration state. Clicks accumulate per step; nothing is
/// smoothed or resampled until [`CalibrationSession::finish`].
#[derive(Clone, Debug)]
pub struct CalibrationSession {
    steps: Vec<CalibrationStep>,
    collected: Vec<Vec<FittedPoint>>,
    index: usize,
    params: SessionParams,
}

impl CalibrationSession {
    pub fn new(steps: Vec<CalibrationStep>, params: SessionParams) -> Self {
        let collected = vec![Vec::new(); steps.len()];
        Self {
            steps,
            collected,
            index: 0,
            params,
        }
    }

    /// Session over the standard height plus weight sequence.
    pub fn standard(params: SessionParams) -> Self {
        Self::new(standard_sequence(), params)
    }

    pub fn steps(&self) -> &[CalibrationStep] {
        &self.steps
    }

    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Step the next click belongs to, `None` once the sequence is done.
    pub fn current_step(&self) -> Option<&CalibrationStep> {
        self.steps.get(self.index)
    }

    /// Points collected so far for the current step.
    pub fn current_points(&self) -> &[FittedPoint] {
        match self.collected.get(self.index) {
            Some(points) => points,
            None => &[],
        }
    }

    /// Snaps a click onto the stroke and records it for the current step.
    /// Fit thresholds follow the stroke weight of the step label.
    pub fn add_click(&mut self, view: &RgbaView, click: Point2<f32>) -> Option<FittedPoint> {
        let step = self.steps.get(self.index)?;
        let fit = LineFitParams::for_label(step.label);
        let fitted = fit_click(view, click, &fit);
        self.collected[self.index].push(fitted);
        Some(fitted)
    }

    /// Records a point for the current step with caller-chosen thresholds.
    pub fn add_click_with(
        &mut self,
        view: &RgbaView,
        click: Point2<f32>,
        fit: &LineFitParams,
    ) -> Option<FittedPoint> {
        self.steps.get(self.index)?;
        let fitted = fit_click(view, click, fit);
        self.collected[self.index].push(fitted);
        Some(fitted)
    }

    /// Removes the most recent point of the current step.
    pub fn undo_last(&mut self) -> Option<FittedPoint> {
        self.collected.get_mut(self.index)?.pop()
    }

    /// Drops every point of the current step.
    pub fn reset_step(&mut self) {
        if let Some(points) = self.collected.get_mut(self.index) {
            points.clear();
        }
    }

    /// Moves on to the next step. Returns false when already complete.
    pub fn advance(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Builds curves from the collected points. Steps with too few points
    /// are skipped; everything else is sorted, smoothed and densely
    /// resampled.
    pub fn finish(self) -> CalibrationOutcome {
        let mut curves = ChartCurves::default();
        let mut reports = Vec::with_capacity(self.steps.len());

        for (step, points) in self.steps.iter().zip(&self.collected) {
            let clicks = points.len();
            let snapped = points.iter().filter(|p| p.snapped).count();

            if clicks < self.params.min_step_points {
                debug!(
                    "calibration: skipping {} {} with {clicks} points",
                    step.measurement, step.label
                );
                reports.push(CalibrationStepReport {
                    measurement: step.measurement,
                    label: step.label,
                    clicks,
                    snapped,
                    curve_points: 0,
                });
                continue;
            }

            let raw: Vec<CurvePoint> = points
                .iter()
                .map(|p| CurvePoint::from_xy(p.x, p.y))
                .collect();
            let sorted = Curve::new(step.measurement, step.label, raw);
            let smoothed = smooth_y(&sorted.points);
            let dense = resample_dense(&smoothed, self.params.resample_step);
            let curve = Curve::new(step.measurement, step.label, dense);

            reports.push(CalibrationStepReport {
                measurement: step.measurement,
                label: step.label,
                clicks,
                snapped,
                curve_points: curve.len(),
            });
            curves.insert_curve(curve);
        }

        debug!(
            "calibration: finished with {} curves from {} steps",
            curves.curve_count(),
            self.steps.len()
        );
        CalibrationOutcome {
            curves,
            export: CalibrationExport { steps: reports },
        }
    }
}

/// Completed calibration: the curves plus a per-step record suitable for
/// JSON export.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationOutcome {
    pub curves: ChartCurves,
    pub export: CalibrationExport,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationExport {
    pub steps: Vec<CalibrationStepReport>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStepReport {
    pub measurement: MeasurementType,
    pub label: PercentileLabel,
    pub clicks: usize,
    pub snapped: usize,
    /// Points in the produced curve, zero when the step was skipped.
    pub curve_points: usize,
}

fn describe(measurement: MeasurementType, label: PercentileLabel) -> String {
    let panel = match measurement {
        MeasurementType::Height => "Height",
        MeasurementType::Weight => "Weight",
        MeasurementType::Head => "Head",
    };
    let hint = match (measurement, label) {
        (MeasurementType::Height, PercentileLabel::P97) => " (tallest curve)",
        (MeasurementType::Height, PercentileLabel::P50) => " (median)",
        (MeasurementType::Height, PercentileLabel::P3) => " (shortest curve)",
        (MeasurementType::Weight, PercentileLabel::P97) => " (heaviest curve)",
        (MeasurementType::Weight, PercentileLabel::P50) => " (median)",
        (MeasurementType::Weight, PercentileLabel::P3) => " (lightest curve)",
        (MeasurementType::Head, PercentileLabel::P97) => " (largest curve)",
        (MeasurementType::Head, PercentileLabel::P50) => " (median)",
        (MeasurementType::Head, PercentileLabel::P3) => " (smallest curve)",
        _ => "",
    };
    format!("{panel} {label}{hint}")
}
