use curve_detector::dataset::load_dataset;
use curve_detector::interp::{classify, InterpParams};
use curve_detector::types::MeasurementType;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let program = args
        .first()
        .map(String::as_str)
        .unwrap_or("classify_demo");
    if args.len() != 5 {
        return Err(format!(
            "Usage: {program} <dataset.json> <height|weight|head> <x> <y>"
        ));
    }

    let measurement = MeasurementType::parse(&args[2])
        .ok_or_else(|| format!("Unknown measurement type '{}'", args[2]))?;
    let x: f32 = args[3]
        .parse()
        .map_err(|_| format!("Invalid x coordinate '{}'", args[3]))?;
    let y: f32 = args[4]
        .parse()
        .map_err(|_| format!("Invalid y coordinate '{}'", args[4]))?;

    let loaded = load_dataset(Path::new(&args[1]), None).map_err(|e| e.to_string())?;
    println!(
        "Dataset: {} curves, labeling {:?}, {} duplicates dropped",
        loaded.curves.curve_count(),
        loaded.quality,
        loaded.discarded
    );

    let set = loaded
        .curves
        .get(measurement)
        .ok_or_else(|| format!("Dataset has no {measurement} curves"))?;

    let result = classify(set, x, y, &InterpParams::default()).map_err(|e| e.to_string())?;
    println!("({x:.0}, {y:.0}) on the {measurement} panel -> {result}");
    println!("  percentile: {:.1}", result.percentile());
    if let Some(range) = result.range_label() {
        println!("  range: {range}");
    }
    println!("  confidence: {}", result.confidence());
    Ok(())
}
