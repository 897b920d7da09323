//! Pixel heuristics separating curve strokes from grid lines and text.
//!
//! A sample counts as part of a curve when
//! - its color passes the dark gate (blackish or low-saturation gray),
//! - it lies outside the header/footer text bands,
//! - it is not part of a long straight run (grid line),
//! - it has enough similarly colored neighbors (continuity).
//!
//! All checks are pure functions of the raster view. Out-of-range
//! coordinates classify as "not a curve".

use crate::image::{Rgba, RgbaView};

/// Thresholds for the pixel gates. Defaults are tuned for 2500x3500
/// grayscale chart scans with black curve strokes.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Per-channel maximum for the blackish gate.
    pub black_channel_max: u8,
    /// Brightness maximum for the grayish gate.
    pub gray_brightness_max: f32,
    /// Maximum channel delta for the grayish gate.
    pub gray_channel_delta: i32,
    /// Summed channel delta below which two samples count as similar.
    pub similarity_threshold: i32,
    /// Half length of the straight-line probe in pixels.
    pub grid_probe_half_len: i32,
    /// Stride of the straight-line probe.
    pub grid_probe_stride: i32,
    /// Similar probe samples above this count mark a grid line.
    pub grid_similar_max: usize,
    /// Rows above this belong to the header text band.
    pub header_max_y: i32,
    /// Rows below this belong to the footer text band.
    pub footer_min_y: i32,
    /// Similar neighbors within +-3 px horizontally needed for continuity.
    pub min_horizontal_neighbors: usize,
    /// Similar neighbors within +-2 px vertically needed for continuity.
    pub min_vertical_neighbors: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            black_channel_max: 80,
            gray_brightness_max: 120.0,
            gray_channel_delta: 20,
            similarity_threshold: 40,
            grid_probe_half_len: 20,
            grid_probe_stride: 2,
            grid_similar_max: 15,
            header_max_y: 180,
            footer_min_y: 3400,
            min_horizontal_neighbors: 2,
            min_vertical_neighbors: 1,
        }
    }
}

/// Classifier bound to one raster view.
#[derive(Clone, Debug)]
pub struct PixelClassifier<'a> {
    view: RgbaView<'a>,
    params: ClassifierParams,
}

impl<'a> PixelClassifier<'a> {
    pub fn new(view: RgbaView<'a>, params: ClassifierParams) -> Self {
        Self { view, params }
    }

    pub fn view(&self) -> &RgbaView<'a> {
        &self.view
    }

    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    /// True when the sample at `(x, y)` looks like part of a curve stroke.
    pub fn is_curve_pixel(&self, x: i32, y: i32) -> bool {
        let Some(color) = self.view.get(x, y) else {
            return false;
        };
        if y < self.params.header_max_y || y > self.params.footer_min_y {
            return false;
        }
        if !self.is_stroke_color(color) {
            return false;
        }
        if self.is_grid_line(x, y) {
            return false;
        }

        // Curves keep a few similar neighbors; isolated specks and thin
        // text strokes mostly do not.
        let mut horizontal = 0usize;
        for dx in -3..=3i32 {
            if dx == 0 {
                continue;
            }
            if let Some(neighbor) = self.view.get(x + dx, y) {
                if self.similar(color, neighbor) {
                    horizontal += 1;
                }
            }
        }
        let mut vertical = 0usize;
        for dy in -2..=2i32 {
            if dy == 0 {
                continue;
            }
            if let Some(neighbor) = self.view.get(x, y + dy) {
                if self.similar(color, neighbor) {
                    vertical += 1;
                }
            }
        }
        horizontal >= self.params.min_horizontal_neighbors
            || vertical >= self.params.min_vertical_neighbors
    }

    /// True when the sample sits on a long straight run of similar color.
    /// Grid rulings are long and straight; curve strokes are not.
    pub fn is_grid_line(&self, x: i32, y: i32) -> bool {
        let Some(center) = self.view.get(x, y) else {
            return false;
        };
        let half = self.params.grid_probe_half_len;
        let stride = self.params.grid_probe_stride.max(1);

        let mut horizontal_similar = 0usize;
        let mut d = -half;
        while d <= half {
            if let Some(c) = self.view.get(x + d, y) {
                if self.similar(center, c) {
                    horizontal_similar += 1;
                }
            }
            d += stride;
        }

        let mut vertical_similar = 0usize;
        let mut d = -half;
        while d <= half {
            if let Some(c) = self.view.get(x, y + d) {
                if self.similar(center, c) {
                    vertical_similar += 1;
                }
            }
            d += stride;
        }

        horizontal_similar > self.params.grid_similar_max
            || vertical_similar > self.params.grid_similar_max
    }

    /// Darkness score at the sample, 0 = white or out of range, 255 = black.
    #[inline]
    pub fn intensity_at(&self, x: i32, y: i32) -> f32 {
        match self.view.get(x, y) {
            Some(c) => 255.0 - c.brightness(),
            None => 0.0,
        }
    }

    fn is_stroke_color(&self, color: Rgba) -> bool {
        let max = self.params.black_channel_max;
        let blackish = color.r < max && color.g < max && color.b < max;

        let delta = self.params.gray_channel_delta;
        let grayish = color.brightness() < self.params.gray_brightness_max
            && (color.r as i32 - color.g as i32).abs() < delta
            && (color.g as i32 - color.b as i32).abs() < delta;

        blackish || grayish
    }

    #[inline]
    fn similar(&self, a: Rgba, b: Rgba) -> bool {
        let sum = (a.r as i32 - b.r as i32).abs()
            + (a.g as i32 - b.g as i32).abs()
            + (a.b as i32 - b.b as i32).abs();
        sum < self.params.similarity_threshold
    }
}
