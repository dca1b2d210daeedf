use marker_scale::config::runtime::{self, OutputFormat};
use marker_scale::diagnostics::EstimationReport;
use marker_scale::image::io::{load_rgb_image, save_grayscale_u8, save_rgb, write_json_file};
use marker_scale::image::{to_grayscale, ImageRgb8};
use marker_scale::ScaleEstimator;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "marker_scale".to_string());
    let config = runtime::parse_cli(&program)?;

    let rgb = load_rgb_image(&config.input)?;
    let view = ImageRgb8::from(&rgb);
    let estimator = ScaleEstimator::new(config.estimator.clone());
    let report = estimator.estimate_with_report(&view);

    if config.output.format.includes_text() {
        print_text_summary(&config.input, &report);
    }

    if config.output.format.includes_json() {
        if let Some(path) = &config.output.json_out {
            write_json_file(path, &report)?;
            println!("JSON report written to {}", path.display());
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

    if let Some(dir) = &config.output.debug_dir {
        save_debug_artifacts(dir, &view, &report)?;
        if config.output.format.includes_text() {
            println!("Debug artifacts written to {}", dir.display());
        } else {
            eprintln!("Debug artifacts written to {}", dir.display());
        }
    }

    if !report.result.success {
        return Err(report
            .result
            .error
            .unwrap_or_else(|| "Scale estimation failed".to_string()));
    }
    Ok(())
}

fn print_text_summary(input: &Path, report: &EstimationReport) {
    let res = &report.result;
    println!("Scale estimate for {}", input.display());
    println!(
        "  image: {}x{} px (mean intensity {:.1})",
        report.input.width, report.input.height, report.input.mean_intensity
    );
    println!("  quality: {:?}", report.quality);
    match (res.pixels_per_mm, res.image_width_mm, res.image_height_mm) {
        (Some(ppm), Some(w_mm), Some(h_mm)) => {
            println!("  pixels_per_mm: {ppm:.4}");
            println!("  image size: {w_mm:.1} x {h_mm:.1} mm");
        }
        _ => println!(
            "  failed: {}",
            res.error.as_deref().unwrap_or("unknown error")
        ),
    }

    println!(
        "\nDetection: contours={} quads={} candidates={} markers={}",
        report.detection.contours,
        report.detection.quads,
        report.detection.candidates,
        report.markers.len()
    );
    if let Some(marker) = report.reference_marker() {
        println!("  reference id={} hamming={}", marker.id, marker.hamming);
    }
    if let Some(m) = &report.measurement {
        println!(
            "  edges_px=[{:.2}, {:.2}, {:.2}, {:.2}] side_px={:.3} marker={} mm",
            m.edge_lengths_px[0],
            m.edge_lengths_px[1],
            m.edge_lengths_px[2],
            m.edge_lengths_px[3],
            m.side_px,
            m.marker_size_mm
        );
    }
    if let Some(refined) = &report.refinement {
        for (i, r) in refined.iter().enumerate() {
            println!(
                "  corner {i}: ({:.3}, {:.3}) iters={}{}",
                r.point[0],
                r.point[1],
                r.iterations,
                if r.reverted { " reverted" } else { "" }
            );
        }
    }

    let stages: Vec<String> = report
        .timings
        .stages
        .iter()
        .map(|s| format!("{}={:.3}", s.label, s.elapsed_ms))
        .collect();
    println!(
        "\nTimings (ms): {} total={:.3}",
        stages.join(" "),
        report.timings.total_ms
    );
}

fn save_debug_artifacts(
    dir: &Path,
    view: &ImageRgb8<'_>,
    report: &EstimationReport,
) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create debug dir {}: {e}", dir.display()))?;

    write_json_file(&dir.join("report.json"), report)?;
    save_grayscale_u8(&to_grayscale(view), &dir.join("gray.png"))?;
    if let Some(patch) = &report.rectified {
        save_rgb(patch, &dir.join("rectified.png"))?;
    }
    Ok(())
}
