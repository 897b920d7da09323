//! Column scanning for curve-colored runs.
//!
//! The scanner walks vertical columns of a chart region with a fixed
//! stride, groups consecutive curve-classified samples into runs and
//! emits one candidate per run at the run midpoint.

use crate::classify::PixelClassifier;

/// One candidate sample found during a column scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnCandidate {
    pub x: f32,
    pub y: f32,
    /// Darkness at the run midpoint, 0..=255.
    pub intensity: f32,
}

/// Rectangular chart region to scan, inclusive bounds in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScanRegion {
    pub x_start: i32,
    pub x_end: i32,
    pub y_start: i32,
    pub y_end: i32,
}

impl ScanRegion {
    pub fn new(x_start: i32, x_end: i32, y_start: i32, y_end: i32) -> Self {
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    /// Number of columns visited with the given spacing.
    pub fn column_count(&self, spacing: i32) -> usize {
        if self.x_end < self.x_start {
            return 0;
        }
        ((self.x_end - self.x_start) / spacing.max(1)) as usize + 1
    }
}

/// Scan stride settings.
#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(default)]
pub struct ScanParams {
    /// Vertical stride between classified samples within a column.
    pub stride: i32,
    /// Horizontal spacing between scanned columns.
    pub column_spacing: i32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            stride: 2,
            column_spacing: 25,
        }
    }
}

/// Scans one column, returning a candidate per vertical run of curve
/// pixels. An open run is closed at the bottom region bound.
pub fn scan_column(
    classifier: &PixelClassifier,
    x: i32,
    y_start: i32,
    y_end: i32,
    params: &ScanParams,
) -> Vec<ColumnCandidate> {
    let stride = params.stride.max(1);
    let mut candidates = Vec::new();
    let mut run_start: Option<i32> = None;

    let mut y = y_start;
    while y <= y_end {
        if classifier.is_curve_pixel(x, y) {
            if run_start.is_none() {
                run_start = Some(y);
            }
        } else if let Some(start) = run_start.take() {
            candidates.push(candidate_at(classifier, x, start, y));
        }
        y += stride;
    }
    if let Some(start) = run_start {
        candidates.push(candidate_at(classifier, x, start, y_end));
    }
    candidates
}

/// Scans every column of the region.
pub fn scan_region(
    classifier: &PixelClassifier,
    region: ScanRegion,
    params: &ScanParams,
) -> Vec<ColumnCandidate> {
    let spacing = params.column_spacing.max(1);
    let mut candidates = Vec::new();
    let mut x = region.x_start;
    while x <= region.x_end {
        candidates.extend(scan_column(
            classifier,
            x,
            region.y_start,
            region.y_end,
            params,
        ));
        x += spacing;
    }
    candidates
}

fn candidate_at(classifier: &PixelClassifier, x: i32, run_start: i32, run_end: i32) -> ColumnCandidate {
    let mid = (run_start + run_end) / 2;
    ColumnCandidate {
        x: x as f32,
        y: mid as f32,
        intensity: classifier.intensity_at(x, mid),
    }
}
