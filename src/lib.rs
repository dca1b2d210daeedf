#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod detector;
pub mod diagnostics;
pub mod estimator;
pub mod homography;
pub mod image;
pub mod service;
pub mod types;

// Building blocks of the detector and refiner. Public for tools and tests,
// but their signatures may still move.
pub mod config;
pub mod contours;
pub mod dictionary;
pub mod edges;
pub mod polygon;
pub mod refine;
pub mod synthetic;
pub mod threshold;

// --- High-level re-exports -------------------------------------------------

// Main entry points: estimator + results.
pub use crate::estimator::{EstimatorConfig, QualityLevel, ScaleEstimator};
pub use crate::types::{MarkerDetection, ScaleFailure, ScaleResult};

// Detector on its own, for callers that only need marker corners.
pub use crate::detector::{DetectorParams, MarkerDetector};

// Full diagnostics of one estimate.
pub use crate::diagnostics::EstimationReport;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use marker_scale::prelude::*;
///
/// # fn main() -> Result<(), String> {
/// let rgb = marker_scale::image::io::load_rgb_image(std::path::Path::new("photo.jpg"))?;
/// let estimator = ScaleEstimator::new(EstimatorConfig::default());
/// let result = estimator.estimate(&ImageRgb8::from(&rgb));
/// if let Some(ppm) = result.pixels_per_mm {
///     println!("{ppm:.3} px/mm");
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageRgb8, ImageU8};
    pub use crate::{EstimatorConfig, QualityLevel, ScaleEstimator, ScaleResult};
}
