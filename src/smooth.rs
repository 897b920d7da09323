//! Moving-average smoothing, dense resampling and y lookup for polylines.
//!
//! All helpers assume points sorted by ascending x, which [`Curve::new`]
//! guarantees. Endpoints are never moved so curves keep their span.
//!
//! [`Curve::new`]: crate::types::Curve::new

use crate::types::CurvePoint;

/// Centered window-3 moving average over y. Endpoints and x values stay
/// untouched; inputs with two points or fewer come back unchanged.
pub fn smooth_y(points: &[CurvePoint]) -> Vec<CurvePoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for i in 1..points.len() - 1 {
        let avg = (points[i - 1].y() + points[i].y() + points[i + 1].y()) / 3.0;
        out.push(CurvePoint::new(points[i].x(), avg, points[i].intensity));
    }
    out.push(points[points.len() - 1]);
    out
}

/// Linear interpolation of y at `x`. Queries outside the x span clamp to
/// the nearest endpoint. `None` when fewer than two points are present.
pub fn y_at(points: &[CurvePoint], x: f32) -> Option<f32> {
    if points.len() < 2 {
        return None;
    }
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        if p1.x() <= x && x <= p2.x() {
            let dx = p2.x() - p1.x();
            if dx == 0.0 {
                return Some(p1.y());
            }
            let t = (x - p1.x()) / dx;
            return Some(p1.y() + t * (p2.y() - p1.y()));
        }
    }
    if x < points[0].x() {
        Some(points[0].y())
    } else {
        Some(points[points.len() - 1].y())
    }
}

/// Resamples the polyline at a fixed x step. Inputs with fewer than three
/// points come back unchanged. Resampled points carry no intensity.
pub fn resample_dense(points: &[CurvePoint], step: f32) -> Vec<CurvePoint> {
    if points.len() < 3 || step <= 0.0 {
        return points.to_vec();
    }
    let first = points[0].x();
    let last = points[points.len() - 1].x();
    let mut out = Vec::with_capacity(((last - first) / step) as usize + 1);
    let mut x = first;
    while x <= last {
        if let Some(y) = y_at(points, x) {
            out.push(CurvePoint::from_xy(x, y));
        }
        x += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn poly(pts: &[(f32, f32)]) -> Vec<CurvePoint> {
        pts.iter().map(|&(x, y)| CurvePoint::from_xy(x, y)).collect()
    }

    #[test]
    fn smoothing_keeps_endpoints_and_damps_spikes() {
        let pts = poly(&[(0.0, 10.0), (1.0, 40.0), (2.0, 10.0), (3.0, 10.0)]);
        let out = smooth_y(&pts);
        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[0].y(), 10.0);
        assert_relative_eq!(out[3].y(), 10.0);
        assert_relative_eq!(out[1].y(), 20.0);
        assert!(out[1].y() < pts[1].y());
    }

    #[test]
    fn repeated_smoothing_converges() {
        let mut pts = poly(&[
            (0.0, 0.0),
            (1.0, 30.0),
            (2.0, -20.0),
            (3.0, 25.0),
            (4.0, 0.0),
        ]);
        let spread = |p: &[CurvePoint]| {
            let ys: Vec<f32> = p.iter().map(|q| q.y()).collect();
            let max = ys.iter().cloned().fold(f32::MIN, f32::max);
            let min = ys.iter().cloned().fold(f32::MAX, f32::min);
            max - min
        };
        let initial = spread(&pts);
        for _ in 0..10 {
            pts = smooth_y(&pts);
        }
        assert!(spread(&pts) < initial * 0.8);
    }

    #[test]
    fn short_inputs_pass_through() {
        let pts = poly(&[(0.0, 5.0), (10.0, 7.0)]);
        assert_eq!(smooth_y(&pts), pts);
        assert_eq!(resample_dense(&pts, 2.0), pts);
        assert!(y_at(&pts[..1], 3.0).is_none());
    }

    #[test]
    fn lookup_interpolates_and_clamps() {
        let pts = poly(&[(10.0, 100.0), (20.0, 200.0), (30.0, 100.0)]);
        assert_relative_eq!(y_at(&pts, 15.0).unwrap(), 150.0);
        assert_relative_eq!(y_at(&pts, 20.0).unwrap(), 200.0);
        assert_relative_eq!(y_at(&pts, 0.0).unwrap(), 100.0);
        assert_relative_eq!(y_at(&pts, 99.0).unwrap(), 100.0);
    }

    #[test]
    fn resampling_preserves_piecewise_linear_shape() {
        let pts = poly(&[(0.0, 0.0), (10.0, 20.0), (20.0, 10.0)]);
        let dense = resample_dense(&pts, 2.0);
        assert_eq!(dense.len(), 11);
        for p in &dense {
            let expected = y_at(&pts, p.x()).unwrap();
            assert_relative_eq!(p.y(), expected, epsilon = 1e-4);
        }
        assert_relative_eq!(dense[0].x(), 0.0);
        assert_relative_eq!(dense[10].x(), 20.0);
    }
}
