//! Parameter types configuring the marker detector stages.
//!
//! Knobs are grouped by stage: binarization, contour/candidate filtering and
//! bit extraction. Defaults follow the usual ArUco detector settings and
//! work for markers from roughly 20 px up to a full frame.
use serde::Deserialize;

/// Detector-wide parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Box sizes (odd, px) of the adaptive threshold passes.
    pub adaptive_thresh_windows: Vec<usize>,
    /// Constant subtracted from the local mean.
    pub adaptive_thresh_constant: f32,
    /// Contour length bounds relative to `max(width, height)`.
    pub min_perimeter_rate: f32,
    pub max_perimeter_rate: f32,
    /// Polygon approximation tolerance relative to contour length.
    pub polygonal_approx_accuracy_rate: f32,
    /// Shortest accepted quad side relative to contour length.
    pub min_corner_distance_rate: f32,
    /// Corners closer than this to the image border are rejected (px).
    pub min_distance_to_border: u32,
    /// Mean corner distance, relative to the smaller perimeter, below which
    /// two candidates count as the same marker.
    pub min_marker_distance_rate: f32,
    /// Resolution of the rectified patch used for bit extraction.
    pub perspective_pixels_per_cell: usize,
    /// Fraction of each cell ignored at its edges.
    pub perspective_ignored_margin_per_cell: f32,
    /// Patches flatter than this standard deviation are rejected.
    pub min_otsu_std_dev: f32,
    /// Allowed white border cells relative to the payload size.
    pub max_erroneous_bits_in_border_rate: f32,
    /// Fraction of the dictionary's correction capability actually used.
    pub error_correction_rate: f32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            adaptive_thresh_windows: vec![3, 13, 23],
            adaptive_thresh_constant: 7.0,
            min_perimeter_rate: 0.03,
            max_perimeter_rate: 4.0,
            polygonal_approx_accuracy_rate: 0.03,
            min_corner_distance_rate: 0.05,
            min_distance_to_border: 3,
            min_marker_distance_rate: 0.05,
            perspective_pixels_per_cell: 4,
            perspective_ignored_margin_per_cell: 0.13,
            min_otsu_std_dev: 5.0,
            max_erroneous_bits_in_border_rate: 0.35,
            error_correction_rate: 0.6,
        }
    }
}
