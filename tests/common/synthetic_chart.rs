use curve_detector::image::{Rgba, RgbaBuffer};

pub const CHART_W: usize = 2500;
pub const CHART_H: usize = 3500;

const PAPER: Rgba = Rgba {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};
const RULING: Rgba = Rgba {
    r: 70,
    g: 70,
    b: 70,
    a: 255,
};
const STROKE: Rgba = Rgba {
    r: 25,
    g: 25,
    b: 25,
    a: 255,
};

/// Centerline of the `rank`-th height-panel curve (rank 0 is the topmost).
pub fn height_curve_y(rank: usize, x: f32) -> f32 {
    assert!(rank < 7, "height panel has seven curves");
    900.0 + rank as f32 * 75.0 - 0.35 * (x - 400.0)
}

/// Centerline of the `rank`-th weight-panel curve (rank 0 is the topmost).
pub fn weight_curve_y(rank: usize, x: f32) -> f32 {
    assert!(rank < 7, "weight panel has seven curves");
    2100.0 + rank as f32 * 90.0 - 0.3 * (x - 400.0)
}

/// Renders a simplified growth chart at print resolution: white paper,
/// dark rulings every 300 px, a text-like header band, and seven sloped
/// curve strokes per panel. Ranks 0, 3 and 6 get the heavy stroke that
/// printed charts use for the outer and median percentiles.
pub fn chart_raster() -> RgbaBuffer {
    let mut buf = RgbaBuffer::filled(CHART_W, CHART_H, PAPER);

    for gx in (300..2500).step_by(300) {
        for y in 200..3300 {
            buf.put(gx as i32, y, RULING);
            buf.put(gx as i32 + 1, y, RULING);
        }
    }
    for gy in (300..3300).step_by(300) {
        for x in 200..2400 {
            buf.put(x, gy as i32, RULING);
            buf.put(x, gy as i32 + 1, RULING);
        }
    }

    // Short dashes standing in for the header text.
    for dash in 0..50 {
        let x0 = 120 + dash * 44;
        for dx in 0..12 {
            for dy in 0..6 {
                buf.put(x0 + dx, 96 + dy, STROKE);
            }
        }
    }

    for rank in 0..7 {
        let thickness = if rank % 3 == 0 { 4 } else { 2 };
        draw_curve(&mut buf, thickness, |x| height_curve_y(rank, x));
        draw_curve(&mut buf, thickness, |x| weight_curve_y(rank, x));
    }
    buf
}

fn draw_curve(buf: &mut RgbaBuffer, thickness: i32, centerline: impl Fn(f32) -> f32) {
    assert!(thickness > 0, "stroke needs at least one row");
    for x in 400..=2200 {
        let yc = centerline(x as f32);
        let top = (yc - thickness as f32 / 2.0).round() as i32;
        for t in 0..thickness {
            buf.put(x, top + t, STROKE);
        }
    }
}
