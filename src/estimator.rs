//! Pixel-to-millimeter scale estimation from a single fiducial marker.
//!
//! Pipeline: grayscale → detect → refine corners → homography to the
//! canonical square → mean edge length / marker size → image size in mm.
//!
//! The whole-image conversion assumes the camera looks roughly straight at
//! the marker plane; the homography is computed (and the rectified patch
//! kept in the report) but the scale itself is the mean side length.
//!
//! ```no_run
//! use marker_scale::estimator::{EstimatorConfig, ScaleEstimator};
//! use marker_scale::image::ImageRgb8;
//!
//! # fn example(rgb: &image::RgbImage) {
//! let estimator = ScaleEstimator::new(EstimatorConfig::default());
//! let result = estimator.estimate(&ImageRgb8::from(rgb));
//! if let Some(ppm) = result.pixels_per_mm {
//!     println!("{ppm:.3} px/mm");
//! }
//! # }
//! ```
use crate::detector::{DetectorParams, MarkerDetector};
use crate::diagnostics::{elapsed_ms, EstimationReport, InputDescriptor, MarkerMeasurement};
use crate::homography::{apply_homography_points, homography_from_quads, warp_perspective};
use crate::image::{mean_intensity, to_grayscale, ImageRgb8};
use crate::polygon::edge_lengths;
use crate::refine::{refine_quad, SubPixOptions};
use crate::types::{Point, ScaleFailure, ScaleResult};
use image::RgbImage;
use log::{debug, warn};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Marker edge length assumed when none is configured (mm).
pub const DEFAULT_MARKER_SIZE_MM: f64 = 40.0;

/// Upper bound on the side of the rectified marker patch (px).
pub const MAX_RECTIFIED_PX: u32 = 1024;

/// How much work goes into measuring the marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    /// Top edge of the raw detected quad.
    Basic,
    /// Mean of the four raw edges.
    Averaged,
    /// Subpixel corners, homography to the canonical square, mean of the
    /// four refined edges.
    #[default]
    Rectified,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Physical edge length of the marker including its black border.
    pub marker_size_mm: f64,
    pub quality: QualityLevel,
    pub detector: DetectorParams,
    pub subpix: SubPixOptions,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            marker_size_mm: DEFAULT_MARKER_SIZE_MM,
            quality: QualityLevel::default(),
            detector: DetectorParams::default(),
            subpix: SubPixOptions::default(),
        }
    }
}

/// Stateless scale estimator; share it by reference or `Arc`.
#[derive(Clone, Debug)]
pub struct ScaleEstimator {
    config: EstimatorConfig,
    detector: MarkerDetector,
}

impl Default for ScaleEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl ScaleEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        let detector = MarkerDetector::new(config.detector.clone());
        Self { config, detector }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate the scale with the configured marker size.
    pub fn estimate(&self, image: &ImageRgb8<'_>) -> ScaleResult {
        self.estimate_with_size(image, self.config.marker_size_mm)
    }

    /// Estimate the scale for a marker of `marker_size_mm`.
    pub fn estimate_with_size(&self, image: &ImageRgb8<'_>, marker_size_mm: f64) -> ScaleResult {
        self.run(image, marker_size_mm, false).result
    }

    /// Estimate with the configured marker size, keeping intermediates.
    pub fn estimate_with_report(&self, image: &ImageRgb8<'_>) -> EstimationReport {
        self.run(image, self.config.marker_size_mm, true)
    }

    /// `keep_patch` controls whether the rectified marker image is rendered.
    fn run(&self, image: &ImageRgb8<'_>, marker_size_mm: f64, keep_patch: bool) -> EstimationReport {
        let start = Instant::now();
        let quality = self.config.quality;
        let mut report = EstimationReport::new(
            quality,
            InputDescriptor {
                width: image.w,
                height: image.h,
                mean_intensity: 0.0,
            },
        );
        if !marker_size_mm.is_finite() || marker_size_mm <= 0.0 {
            warn!("ScaleEstimator: invalid marker size {marker_size_mm} mm");
            return report.fail(ScaleFailure::InvalidMarkerSize);
        }

        let gray = report.timings.measure("grayscale", || to_grayscale(image));
        let view = gray.as_view();
        report.input.mean_intensity = mean_intensity(&view);

        let (markers, stats) = report
            .timings
            .measure("detect", || self.detector.detect_with_stats(&view));
        report.detection = stats;
        report.markers = markers;
        let Some(reference) = report.markers.first().cloned() else {
            debug!(
                "ScaleEstimator: no marker in {}x{} image ({} candidates)",
                image.w, image.h, report.detection.candidates
            );
            report.timings.total_ms = elapsed_ms(start);
            return report.fail(ScaleFailure::NoMarkerDetected);
        };
        debug!(
            "ScaleEstimator: {} marker(s), reference id={} corners={:?}",
            report.markers.len(),
            reference.id,
            reference.corners
        );

        let corners: [Point; 4] = match quality {
            QualityLevel::Rectified => {
                let refined = report
                    .timings
                    .measure("refine", || refine_quad(&view, &reference.corners, &self.config.subpix));
                report.refinement = Some(refined);
                std::array::from_fn(|i| refined[i].point)
            }
            QualityLevel::Basic | QualityLevel::Averaged => reference.corners,
        };

        self.measure(image, corners, marker_size_mm, keep_patch, start, report)
    }

    /// Homography, scale factor and image size from the final marker corners.
    fn measure(
        &self,
        image: &ImageRgb8<'_>,
        corners: [Point; 4],
        marker_size_mm: f64,
        keep_patch: bool,
        start: Instant,
        mut report: EstimationReport,
    ) -> EstimationReport {
        let quality = self.config.quality;
        let mut canonical_corners = None;
        if quality == QualityLevel::Rectified {
            let s = marker_size_mm as f32;
            let square = [[0.0, 0.0], [s, 0.0], [s, s], [0.0, s]];
            let warp_start = Instant::now();
            match homography_from_quads(&corners, &square) {
                Some(h) => {
                    canonical_corners = apply_homography_points(&h, &corners);
                    if keep_patch {
                        report.rectified = rectify(image, &h, marker_size_mm);
                    }
                    report.homography = Some(h);
                }
                None => warn!(
                    "ScaleEstimator: homography failed for corners {corners:?}; using edge lengths only"
                ),
            }
            report.timings.push("homography", elapsed_ms(warp_start));
        }

        let edges = edge_lengths(&corners);
        let side_px = match quality {
            QualityLevel::Basic => edges[0] as f64,
            QualityLevel::Averaged | QualityLevel::Rectified => {
                edges.iter().map(|&e| e as f64).sum::<f64>() / 4.0
            }
        };
        report.measurement = Some(MarkerMeasurement {
            corners,
            edge_lengths_px: edges,
            side_px,
            marker_size_mm,
            canonical_corners,
        });

        let pixels_per_mm = side_px / marker_size_mm;
        report.timings.total_ms = elapsed_ms(start);
        if !pixels_per_mm.is_finite() || pixels_per_mm <= 0.0 {
            warn!("ScaleEstimator: degenerate marker edges {edges:?}");
            return report.fail(ScaleFailure::DegenerateMarker);
        }

        let width_mm = image.w as f64 / pixels_per_mm;
        let height_mm = image.h as f64 / pixels_per_mm;
        debug!(
            "ScaleEstimator: side={side_px:.3}px ppm={pixels_per_mm:.4} size={width_mm:.1}x{height_mm:.1}mm total={:.2}ms",
            report.timings.total_ms
        );
        report.result = ScaleResult::success(pixels_per_mm, width_mm, height_mm);
        report
    }
}

/// Resample the marker into a square patch of `min(⌊size⌋, MAX_RECTIFIED_PX)`
/// pixels per side; `h` maps image pixels to millimetres.
fn rectify(image: &ImageRgb8<'_>, h: &Matrix3<f64>, marker_size_mm: f64) -> Option<RgbImage> {
    let side = marker_size_mm.floor().clamp(1.0, MAX_RECTIFIED_PX as f64) as u32;
    let k = side as f64 / marker_size_mm;
    let mm_to_px = Matrix3::new(k, 0.0, 0.0, 0.0, k, 0.0, 0.0, 0.0, 1.0);
    warp_perspective(image, &(mm_to_px * h), side)
}
