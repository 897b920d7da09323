//! Deterministic curve tracing from a seed point.
//!
//! The tracer grows a polyline one step at a time. Each step probes
//! rings of increasing radius around the current point and scores every
//! curve-classified candidate by angular deviation from the travel
//! direction plus a radius penalty; the best-scoring candidate wins.
//! Ties keep the first candidate in ring order, so a trace over the same
//! raster always yields the same polyline. When no ring candidate exists
//! the tracer skips ahead a few pixels and searches a small vertical
//! window before giving up.

use crate::classify::PixelClassifier;
use crate::types::CurvePoint;
use log::debug;
use nalgebra::{Point2, Vector2};

/// Horizontal growth direction of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceDirection {
    Left,
    Right,
}

impl TraceDirection {
    fn sign(self) -> f32 {
        match self {
            TraceDirection::Left => -1.0,
            TraceDirection::Right => 1.0,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct TraceParams {
    /// Hard cap on trace length in points.
    pub max_points: usize,
    /// Largest ring radius probed around the current point.
    pub max_radius: i32,
    /// Angular step of the ring probe in degrees.
    pub angle_step_deg: f32,
    /// Horizontal skip used when the ring probe finds nothing.
    pub gap_stride: f32,
    /// Vertical half range searched after a gap skip.
    pub gap_y_range: i32,
    /// Score penalty per pixel of ring radius.
    pub radius_penalty: f32,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            max_points: 300,
            max_radius: 5,
            angle_step_deg: 15.0,
            gap_stride: 3.0,
            gap_y_range: 10,
            radius_penalty: 0.15,
        }
    }
}

/// Traces a curve from `seed` in the given direction. The seed itself is
/// the first point of the result whether or not it classifies as curve.
pub fn trace_curve(
    classifier: &PixelClassifier,
    seed: Point2<f32>,
    direction: TraceDirection,
    params: &TraceParams,
) -> Vec<CurvePoint> {
    let mut points = vec![sample(classifier, seed)];
    let mut current = seed;
    let mut travel = Vector2::new(direction.sign(), 0.0);

    while points.len() < params.max_points {
        let next = match best_ring_candidate(classifier, current, travel, params) {
            Some(p) => p,
            None => match gap_skip(classifier, current, direction, params) {
                Some(p) => p,
                None => break,
            },
        };
        let step = next - current;
        travel = step / step.norm();
        current = next;
        points.push(sample(classifier, current));
    }

    debug!(
        "tracer: {} points from seed ({:.0}, {:.0}) going {:?}",
        points.len(),
        seed.x,
        seed.y,
        direction
    );
    points
}

/// Best forward candidate on the probe rings, lowest score first. Ring
/// order is fixed, so equal scores resolve deterministically.
fn best_ring_candidate(
    classifier: &PixelClassifier,
    current: Point2<f32>,
    travel: Vector2<f32>,
    params: &TraceParams,
) -> Option<Point2<f32>> {
    let mut best: Option<(f32, Point2<f32>)> = None;
    let step_deg = params.angle_step_deg.max(1.0);

    for radius in 1..=params.max_radius {
        let mut angle_deg = 0.0_f32;
        while angle_deg < 360.0 {
            let angle = angle_deg.to_radians();
            let offset = Vector2::new(angle.cos(), angle.sin()) * radius as f32;
            let candidate = current + offset;
            angle_deg += step_deg;

            let (px, py) = (candidate.x.floor() as i32, candidate.y.floor() as i32);
            if !classifier.is_curve_pixel(px, py) {
                continue;
            }
            let dir = offset / offset.norm();
            let along = dir.dot(&travel);
            // Backward candidates would bounce the trace onto itself.
            if along <= 0.0 {
                continue;
            }
            let deviation = along.clamp(-1.0, 1.0).acos();
            let score = deviation + params.radius_penalty * radius as f32;
            if best.map_or(true, |(s, _)| score < s) {
                best = Some((score, candidate));
            }
        }
    }
    best.map(|(_, p)| p)
}

/// Skips over a short break in the stroke, scanning a vertical window at
/// the shifted x for the first curve pixel from the top.
fn gap_skip(
    classifier: &PixelClassifier,
    current: Point2<f32>,
    direction: TraceDirection,
    params: &TraceParams,
) -> Option<Point2<f32>> {
    let x = current.x + direction.sign() * params.gap_stride;
    for dy in -params.gap_y_range..=params.gap_y_range {
        let y = current.y + dy as f32;
        if classifier.is_curve_pixel(x.floor() as i32, y.floor() as i32) {
            return Some(Point2::new(x, y));
        }
    }
    None
}

fn sample(classifier: &PixelClassifier, pos: Point2<f32>) -> CurvePoint {
    let intensity = classifier.intensity_at(pos.x.floor() as i32, pos.y.floor() as i32);
    CurvePoint::new(pos.x, pos.y, intensity)
}
