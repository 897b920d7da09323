use curve_detector::image::{Rgba, RgbaBuffer};
use curve_detector::{ChartDetector, DetectorParams};

fn main() {
    // Demo stub: runs the detector over a blank chart-sized raster
    let raster = RgbaBuffer::filled(2500, 3500, Rgba::gray(255));
    let det = ChartDetector::new(DetectorParams::default());
    let res = det.process(&raster.as_view());
    println!(
        "curves={} coverage={:.2} confidence={} latency_ms={:.3}",
        res.curves.curve_count(),
        res.coverage,
        res.confidence,
        res.latency_ms
    );
}
