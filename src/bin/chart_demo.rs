use curve_detector::config::chart::{self, OutputFormat, RuntimeConfig};
use curve_detector::diagnostics::DetectionReport;
use curve_detector::image::io::{load_rgba_image, write_json_file};
use curve_detector::interp::{classify, InterpParams};
use curve_detector::ChartDetector;
use std::env;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "chart_demo".to_string());
    let config = chart::parse_cli(&program)?;

    let raster = load_rgba_image(&config.input_path)?;
    let view = raster.as_view();

    let detector = ChartDetector::new(config.detector_params.clone());
    let report = detector.process_with_diagnostics(&view);

    if config.output.format.includes_text() {
        print_text_summary(&report);
        print_queries(&config, &report);
    }

    if config.output.format.includes_json() {
        if let Some(path) = &config.output.json_out {
            write_json_file(path, &report)?;
            if config.output.format.includes_text() {
                println!("\nJSON report written to {}", path.display());
            } else {
                println!("JSON report written to {}", path.display());
            }
        } else {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            if config.output.format == OutputFormat::Both {
                println!("\nJSON report:\n{json}");
            } else {
                println!("{json}");
            }
        }
    }

    Ok(())
}

fn print_text_summary(report: &DetectionReport) {
    let res = &report.result;
    println!("Detection summary");
    println!(
        "  curves: {} ({} points)",
        res.curves.curve_count(),
        res.curves.point_count()
    );
    println!("  coverage: {:.2}", res.coverage);
    println!("  confidence: {}", res.confidence);
    println!("  latency_ms: {:.3}", res.latency_ms);

    for set in &res.curves.sets {
        let labels: Vec<String> = set.iter().map(|c| c.label.to_string()).collect();
        println!("  {}: {}", set.measurement(), labels.join(" "));
    }

    println!("\nRegions");
    for stage in &report.trace.regions {
        println!(
            "  {} x {}..{} y {}..{}: {} columns, {} candidates, {} clusters ({} dropped), {} curves in {:.3} ms",
            stage.measurement,
            stage.region.x_start,
            stage.region.x_end,
            stage.region.y_start,
            stage.region.y_end,
            stage.columns_scanned,
            stage.candidates,
            stage.clusters_found,
            stage.clusters_discarded,
            stage.curves.len(),
            stage.elapsed_ms
        );
        for curve in &stage.curves {
            println!(
                "    {}: {} points, x {:.0}..{:.0}, mean intensity {:.1}",
                curve.label, curve.points, curve.x_min, curve.x_max, curve.mean_intensity
            );
        }
    }
}

fn print_queries(config: &RuntimeConfig, report: &DetectionReport) {
    if config.queries.is_empty() {
        return;
    }
    let Some(anchors) = &config.anchors else {
        println!("\nQueries skipped: config has no axis anchors");
        return;
    };

    println!("\nQueries");
    let params = InterpParams::default();
    for query in &config.queries {
        let Some((x, y)) = anchors.point_for(query.measurement, query.age, query.value) else {
            println!(
                "  {} {} at {} mo: no axis anchors for this panel",
                query.measurement, query.value, query.age
            );
            continue;
        };
        let Some(set) = report.result.curves.get(query.measurement) else {
            println!(
                "  {} {} at {} mo: no curves detected for this panel",
                query.measurement, query.value, query.age
            );
            continue;
        };
        match classify(set, x, y, &params) {
            Ok(result) => {
                let range = result
                    .range_label()
                    .map(|r| format!(", range {r}"))
                    .unwrap_or_default();
                println!(
                    "  {} {} at {} mo -> {} (percentile {:.1}{}, confidence {})",
                    query.measurement,
                    query.value,
                    query.age,
                    result,
                    result.percentile(),
                    range,
                    result.confidence()
                );
            }
            Err(err) => {
                println!(
                    "  {} {} at {} mo: {err}",
                    query.measurement, query.value, query.age
                );
            }
        }
    }
}
