use super::timing::TimingBreakdown;
use crate::detector::DetectionStats;
use crate::estimator::QualityLevel;
use crate::refine::CornerRefinement;
use crate::types::{MarkerDetection, Point, ScaleFailure, ScaleResult};
use image::RgbImage;
use nalgebra::Matrix3;
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub mean_intensity: f32,
}

/// Measurement derived from the reference marker.
#[derive(Clone, Debug, Serialize)]
pub struct MarkerMeasurement {
    /// Corners the lengths were taken from (refined when enabled)
    pub corners: [Point; 4],
    /// Wrapped edge lengths `c0→c1, c1→c2, c2→c3, c3→c0` in pixels
    pub edge_lengths_px: [f32; 4],
    /// Length actually divided by the marker size
    pub side_px: f64,
    pub marker_size_mm: f64,
    /// `corners` mapped through the homography (mm); absent without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_corners: Option<Vec<Point>>,
}

/// Everything one `estimate` call produced, for tooling and debugging.
#[derive(Clone, Debug, Serialize)]
pub struct EstimationReport {
    pub result: ScaleResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ScaleFailure>,
    pub quality: QualityLevel,
    pub input: InputDescriptor,
    pub detection: DetectionStats,
    /// All detections in detector order; the first one is the reference.
    pub markers: Vec<MarkerDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement: Option<[CornerRefinement; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<MarkerMeasurement>,
    /// Image → canonical-square homography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homography: Option<Matrix3<f64>>,
    pub timings: TimingBreakdown,
    /// Marker rectified to `⌊size_mm⌋ × ⌊size_mm⌋` pixels.
    #[serde(skip)]
    pub rectified: Option<RgbImage>,
}

impl EstimationReport {
    pub(crate) fn new(quality: QualityLevel, input: InputDescriptor) -> Self {
        Self {
            result: ScaleResult::default(),
            failure: None,
            quality,
            input,
            detection: DetectionStats::default(),
            markers: Vec::new(),
            refinement: None,
            measurement: None,
            homography: None,
            timings: TimingBreakdown::default(),
            rectified: None,
        }
    }

    pub(crate) fn fail(mut self, failure: ScaleFailure) -> Self {
        self.result = failure.into();
        self.failure = Some(failure);
        self
    }

    pub fn reference_marker(&self) -> Option<&MarkerDetection> {
        self.markers.first()
    }
}
