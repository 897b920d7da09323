//! Click-to-stroke snapping for manual calibration.
//!
//! A raw click rarely lands on the printed line. The fitter scans a
//! square window around the click, scores every dark pixel by stroke
//! width and darkness, discounts by distance from the click and snaps
//! to the best candidate. A click with no scoring candidate comes back
//! unchanged so calibration still works on damaged scans.

use crate::image::RgbaView;
use crate::types::PercentileLabel;
use nalgebra::Point2;

/// Search thresholds for one fit call.
#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(default)]
pub struct LineFitParams {
    /// Half size of the square search window in pixels.
    pub search_radius: i32,
    /// Brightness below which a pixel counts as stroke.
    pub brightness_threshold: f32,
    /// Minimum stroke width across the best direction.
    pub min_line_width: usize,
}

impl LineFitParams {
    /// Thresholds matched to the printed stroke weight of the label.
    /// P3, P50 and P97 are printed heavier than the rest.
    pub fn for_label(label: PercentileLabel) -> Self {
        if label.is_heavy_stroke() {
            Self {
                search_radius: 20,
                brightness_threshold: 60.0,
                min_line_width: 2,
            }
        } else {
            Self::default()
        }
    }
}

impl Default for LineFitParams {
    fn default() -> Self {
        Self {
            search_radius: 20,
            brightness_threshold: 40.0,
            min_line_width: 1,
        }
    }
}

/// One snapped calibration point.
#[derive(Clone, Copy, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedPoint {
    pub x: f32,
    pub y: f32,
    /// False when no candidate scored and the click passed through.
    pub snapped: bool,
    pub score: f32,
    pub distance_px: f32,
}

impl FittedPoint {
    pub fn pos(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

/// Snaps a click onto the nearest stroke inside the search window.
pub fn fit_click(view: &RgbaView, click: Point2<f32>, params: &LineFitParams) -> FittedPoint {
    let mut best_score = -1.0_f32;
    let mut best = FittedPoint {
        x: click.x,
        y: click.y,
        snapped: false,
        score: 0.0,
        distance_px: 0.0,
    };

    let r = params.search_radius;
    for dx in -r..=r {
        for dy in -r..=r {
            let tx = (click.x + dx as f32).round() as i32;
            let ty = (click.y + dy as f32).round() as i32;
            if view.get(tx, ty).is_none() {
                continue;
            }
            let score = line_score(view, tx, ty, params);
            if score <= 0.0 {
                continue;
            }
            let distance = ((dx * dx + dy * dy) as f32).sqrt();
            let combined = score / (1.0 + 0.1 * distance);
            if combined > best_score {
                best_score = combined;
                best = FittedPoint {
                    x: tx as f32,
                    y: ty as f32,
                    snapped: true,
                    score: combined,
                    distance_px: distance,
                };
            }
        }
    }
    best
}

/// Stroke likelihood at a pixel: width across the widest of four
/// directions times darkness relative to the threshold. Zero when the
/// pixel is bright or the stroke is too thin.
fn line_score(view: &RgbaView, x: i32, y: i32, params: &LineFitParams) -> f32 {
    let Some(brightness) = view.brightness_at(x, y) else {
        return 0.0;
    };
    if brightness >= params.brightness_threshold {
        return 0.0;
    }

    let directions = [(1, 0), (0, 1), (1, 1), (1, -1)];
    let max_width = directions
        .iter()
        .map(|&(dx, dy)| stroke_width(view, x, y, dx, dy, params.brightness_threshold))
        .max()
        .unwrap_or(0);
    if max_width < params.min_line_width {
        return 0.0;
    }

    let width_score = (max_width as f32 / (params.min_line_width as f32 * 2.0)).min(3.0);
    let darkness_score = (params.brightness_threshold - brightness) / params.brightness_threshold;
    width_score * darkness_score
}

/// Width of the dark run through `(x, y)` along `(dx, dy)`, probing up
/// to five pixels each way and stopping at the first bright or
/// out-of-range sample.
fn stroke_width(view: &RgbaView, x: i32, y: i32, dx: i32, dy: i32, threshold: f32) -> usize {
    let mut width = 1usize;
    for i in 1..=5 {
        match view.brightness_at(x + dx * i, y + dy * i) {
            Some(b) if b < threshold => width += 1,
            _ => break,
        }
    }
    for i in 1..=5 {
        match view.brightness_at(x - dx * i, y - dy * i) {
            Some(b) if b < threshold => width += 1,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Rgba, RgbaBuffer};

    /// Vertical 3 px wide stroke at the given x.
    fn vertical_stroke(width: usize, height: usize, at_x: i32) -> RgbaBuffer {
        let mut buf = RgbaBuffer::filled(width, height, Rgba::gray(255));
        for y in 0..height as i32 {
            for dx in -1..=1 {
                buf.put(at_x + dx, y, Rgba::gray(10));
            }
        }
        buf
    }

    #[test]
    fn click_on_stroke_stays_within_a_pixel() {
        let buf = vertical_stroke(100, 100, 40);
        let fitted = fit_click(
            &buf.as_view(),
            Point2::new(40.0, 50.0),
            &LineFitParams::default(),
        );
        assert!(fitted.snapped);
        assert!((fitted.x - 40.0).abs() <= 1.0);
    }

    #[test]
    fn nearby_click_snaps_onto_stroke() {
        let buf = vertical_stroke(100, 100, 40);
        let fitted = fit_click(
            &buf.as_view(),
            Point2::new(52.0, 50.0),
            &LineFitParams::default(),
        );
        assert!(fitted.snapped);
        assert!((fitted.x - 40.0).abs() <= 1.0);
        assert!((fitted.y - 50.0).abs() <= 1.0);
        assert!(fitted.distance_px >= 11.0);
    }

    #[test]
    fn blank_raster_passes_click_through() {
        let buf = RgbaBuffer::filled(60, 60, Rgba::gray(255));
        let click = Point2::new(30.5, 31.5);
        let fitted = fit_click(&buf.as_view(), click, &LineFitParams::default());
        assert!(!fitted.snapped);
        assert_eq!(fitted.x, click.x);
        assert_eq!(fitted.y, click.y);
        assert_eq!(fitted.score, 0.0);
    }

    #[test]
    fn heavy_labels_get_thicker_thresholds() {
        let heavy = LineFitParams::for_label(PercentileLabel::P50);
        let light = LineFitParams::for_label(PercentileLabel::P25);
        assert_eq!(heavy.min_line_width, 2);
        assert_eq!(light.min_line_width, 1);
        assert!(heavy.brightness_threshold > light.brightness_threshold);
    }

    #[test]
    fn thin_faint_marks_do_not_score() {
        // single isolated dark pixel is below the heavy stroke width
        let mut buf = RgbaBuffer::filled(60, 60, Rgba::gray(255));
        buf.put(30, 30, Rgba::gray(10));
        let heavy = LineFitParams::for_label(PercentileLabel::P97);
        let fitted = fit_click(&buf.as_view(), Point2::new(30.0, 30.0), &heavy);
        assert!(!fitted.snapped);
    }
}
