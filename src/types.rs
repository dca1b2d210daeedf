use serde::Serialize;
use std::fmt;

/// Image-space point `[x, y]` with pixel centres on integer coordinates.
pub type Point = [f32; 2];

/// A decoded marker as reported by the detector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerDetection {
    /// Dictionary index of the decoded code
    pub id: u16,
    /// Clockwise on screen, starting at the marker's own top-left corner
    pub corners: [Point; 4],
    /// Bit errors corrected while decoding
    pub hamming: u32,
}

/// Reason a scale could not be derived from the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFailure {
    /// The detector found nothing.
    NoMarkerDetected,
    /// A marker was found but its edges yield no usable length.
    DegenerateMarker,
    /// The requested marker size is not a positive, finite length.
    InvalidMarkerSize,
}

impl ScaleFailure {
    /// User-visible message. A degenerate marker reads like a missing one.
    pub fn message(self) -> &'static str {
        match self {
            ScaleFailure::NoMarkerDetected | ScaleFailure::DegenerateMarker => {
                "No ArUco markers detected"
            }
            ScaleFailure::InvalidMarkerSize => "Marker size must be a positive length in mm",
        }
    }
}

impl fmt::Display for ScaleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of one scale estimation.
///
/// Either all three numeric fields are set (`success == true`) or only
/// `error` is.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScaleResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels_per_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScaleResult {
    pub fn success(pixels_per_mm: f64, image_width_mm: f64, image_height_mm: f64) -> Self {
        Self {
            success: true,
            pixels_per_mm: Some(pixels_per_mm),
            image_width_mm: Some(image_width_mm),
            image_height_mm: Some(image_height_mm),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

impl From<ScaleFailure> for ScaleResult {
    fn from(failure: ScaleFailure) -> Self {
        ScaleResult::failure(failure.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serializes_without_numeric_fields() {
        let json = serde_json::to_value(ScaleResult::from(ScaleFailure::NoMarkerDetected)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "No ArUco markers detected"})
        );
    }

    #[test]
    fn success_serializes_all_dimensions() {
        let json = serde_json::to_value(ScaleResult::success(2.0, 200.0, 150.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "pixels_per_mm": 2.0,
                "image_width_mm": 200.0,
                "image_height_mm": 150.0
            })
        );
    }

    #[test]
    fn degenerate_marker_reads_like_missing_marker() {
        assert_eq!(
            ScaleFailure::DegenerateMarker.to_string(),
            ScaleFailure::NoMarkerDetected.to_string()
        );
    }
}
