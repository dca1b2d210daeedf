mod common;

use common::init_logging;
use common::synthetic_image::{blank_rgb, marker_scene, plain_squares};
use marker_scale::image::{to_grayscale, ImageRgb8};
use marker_scale::synthetic::{render_scene, SceneSpec};
use marker_scale::{
    EstimatorConfig, MarkerDetector, QualityLevel, ScaleEstimator, ScaleFailure, ScaleResult,
};

fn estimate(img: &image::RgbImage) -> ScaleResult {
    ScaleEstimator::default().estimate(&ImageRgb8::from(img))
}

fn assert_no_marker(result: &ScaleResult) {
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No ArUco markers detected"));
    assert!(result.pixels_per_mm.is_none());
    assert!(result.image_width_mm.is_none());
    assert!(result.image_height_mm.is_none());
}

#[test]
fn axis_aligned_marker_gives_two_pixels_per_mm() {
    init_logging();
    let img = marker_scene(0.0);
    let result = estimate(&img);

    assert!(result.success, "{result:?}");
    assert!(result.error.is_none());
    let ppm = result.pixels_per_mm.unwrap();
    let w_mm = result.image_width_mm.unwrap();
    let h_mm = result.image_height_mm.unwrap();
    assert!((ppm - 2.0).abs() < 0.02, "ppm {ppm}");
    assert!((w_mm - 200.0).abs() < 2.0, "width {w_mm}");
    assert!((h_mm - 150.0).abs() < 1.5, "height {h_mm}");
}

#[test]
fn blank_image_reports_missing_marker() {
    init_logging();
    assert_no_marker(&estimate(&blank_rgb(400, 300, 255)));
    assert_no_marker(&estimate(&blank_rgb(400, 300, 0)));
}

#[test]
fn codeless_squares_are_not_markers() {
    init_logging();
    let img = plain_squares(400, 300);
    let view = ImageRgb8::from(&img);
    let gray = to_grayscale(&view);
    let (found, stats) = MarkerDetector::default().detect_with_stats(&gray.as_view());
    assert!(found.is_empty(), "{found:?}");
    assert!(stats.quads > 0, "squares should reach decoding: {stats:?}");
    assert_no_marker(&estimate(&img));
}

#[test]
fn scale_tracks_marker_size() {
    init_logging();
    for (marker_px, marker_mm) in [(60.0f32, 30.0f64), (100.0, 40.0), (120.0, 25.0)] {
        let img = render_scene(&SceneSpec {
            marker_px,
            ..SceneSpec::default()
        })
        .unwrap();
        let est = ScaleEstimator::new(EstimatorConfig {
            marker_size_mm: marker_mm,
            ..EstimatorConfig::default()
        });
        let result = est.estimate(&ImageRgb8::from(&img));
        let expected = marker_px as f64 / marker_mm;
        let ppm = result.pixels_per_mm.unwrap_or_else(|| panic!("{marker_px}px: {result:?}"));
        assert!(ppm > 0.0 && ppm.is_finite());
        assert!(
            ((ppm - expected) / expected).abs() < 0.01,
            "{marker_px}px / {marker_mm}mm: got {ppm}, expected {expected}"
        );
    }
}

#[test]
fn image_size_in_mm_matches_pixel_size() {
    init_logging();
    for rotation in [0.0, 20.0] {
        let img = marker_scene(rotation);
        let result = estimate(&img);
        let ppm = result.pixels_per_mm.unwrap();
        let w = result.image_width_mm.unwrap() * ppm;
        let h = result.image_height_mm.unwrap() * ppm;
        assert!((w - img.width() as f64).abs() < 1e-6, "{w}");
        assert!((h - img.height() as f64).abs() < 1e-6, "{h}");
    }
}

#[test]
fn in_plane_rotation_barely_changes_scale() {
    init_logging();
    let reference = estimate(&marker_scene(0.0)).pixels_per_mm.unwrap();
    for rotation in [15.0f32, 30.0, 45.0, 90.0, 160.0, 250.0, 333.0] {
        let result = estimate(&marker_scene(rotation));
        let ppm = result
            .pixels_per_mm
            .unwrap_or_else(|| panic!("rotation {rotation}: {result:?}"));
        let rel = ((ppm - reference) / reference).abs();
        assert!(rel < 0.02, "rotation {rotation}: {ppm} vs {reference}");
    }
}

#[test]
fn rotated_marker_keeps_id_and_corner_order() {
    init_logging();
    let spec = SceneSpec {
        marker_id: 7,
        rotation_deg: 30.0,
        ..SceneSpec::default()
    };
    let img = render_scene(&spec).unwrap();
    let gray = to_grayscale(&ImageRgb8::from(&img));
    let found = MarkerDetector::default().detect(&gray.as_view());
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].id, 7);
    for (got, want) in found[0].corners.iter().zip(spec.marker_corners()) {
        let d = ((got[0] - want[0]).powi(2) + (got[1] - want[1]).powi(2)).sqrt();
        assert!(d < 2.5, "corner {got:?} vs {want:?}");
    }
}

#[test]
fn repeated_estimates_are_identical() {
    init_logging();
    let img = marker_scene(23.0);
    let est = ScaleEstimator::default();
    let view = ImageRgb8::from(&img);
    let first = est.estimate(&view);
    let second = est.estimate(&view);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn refinement_beats_raw_corners() {
    init_logging();
    let img = marker_scene(0.0);
    let view = ImageRgb8::from(&img);
    let ppm_for = |quality| {
        ScaleEstimator::new(EstimatorConfig {
            quality,
            ..EstimatorConfig::default()
        })
        .estimate(&view)
        .pixels_per_mm
        .unwrap()
    };
    let raw = ppm_for(QualityLevel::Averaged);
    let refined = ppm_for(QualityLevel::Rectified);
    // raw contour vertices sit on pixel centres, one pixel short per side
    assert!((raw - 79.0 / 40.0).abs() < 1e-3, "{raw}");
    assert!((refined - 2.0).abs() < (raw - 2.0).abs(), "{refined} vs {raw}");
}

#[test]
fn report_failure_matches_result() {
    init_logging();
    let img = blank_rgb(200, 100, 200);
    let report = ScaleEstimator::default().estimate_with_report(&ImageRgb8::from(&img));
    assert_eq!(report.failure, Some(ScaleFailure::NoMarkerDetected));
    assert!(report.markers.is_empty());
    assert!(report.measurement.is_none());
    assert_eq!((report.input.width, report.input.height), (200, 100));
    let json = serde_json::to_value(&report.result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"success": false, "error": "No ArUco markers detected"})
    );
}
