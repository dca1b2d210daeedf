//! Transport-independent request handling.
//!
//! Input side: pull the `image` field out of a JSON body, strip an optional
//! `data:<mime>;base64,` header, base64-decode (standard alphabet, embedded
//! whitespace ignored) and decode the image bytes into RGB8.
//!
//! Output side: map a [`ScaleResult`] to an HTTP-style status code. Every
//! failure is a client error (400); success is 200.
use crate::estimator::ScaleEstimator;
use crate::image::io::decode_rgb_image;
use crate::image::ImageRgb8;
use crate::types::ScaleResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbImage;
use log::debug;
use serde::Deserialize;
use std::fmt;

/// JSON body accepted by the scale endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// Reasons a request never reaches the estimator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputError {
    /// No `image` field (or a body that is not a JSON object).
    MissingImage,
    InvalidBase64(String),
    InvalidImage(String),
    /// The payload decoded to zero bytes or a zero-sized image.
    EmptyImage,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::MissingImage => write!(f, "No image provided"),
            InputError::InvalidBase64(e) => write!(f, "Invalid base64 image data: {e}"),
            InputError::InvalidImage(e) => write!(f, "{e}"),
            InputError::EmptyImage => write!(f, "Image payload is empty"),
        }
    }
}

impl std::error::Error for InputError {}

impl From<InputError> for ScaleResult {
    fn from(err: InputError) -> Self {
        ScaleResult::failure(err.to_string())
    }
}

/// Status code plus JSON body of a handled request.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: ScaleResult,
}

impl ServiceResponse {
    pub fn from_result(body: ScaleResult) -> Self {
        Self {
            status: status_for(&body),
            body,
        }
    }
}

/// 200 on success, 400 for every failure.
pub fn status_for(result: &ScaleResult) -> u16 {
    if result.success {
        200
    } else {
        400
    }
}

/// Drop a `data:<mime>;base64,` header if present.
pub fn strip_data_uri(payload: &str) -> &str {
    let trimmed = payload.trim_start();
    if trimmed.starts_with("data:") {
        if let Some((_, rest)) = trimmed.split_once(',') {
            return rest;
        }
    }
    payload
}

/// Decode a (possibly data-URI prefixed) base64 image into RGB8.
pub fn decode_image_payload(payload: &str) -> Result<RgbImage, InputError> {
    let cleaned: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| InputError::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(InputError::EmptyImage);
    }
    let img = decode_rgb_image(&bytes).map_err(InputError::InvalidImage)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(InputError::EmptyImage);
    }
    Ok(img)
}

/// Handle a parsed request.
pub fn handle_request(estimator: &ScaleEstimator, request: &ImageRequest) -> ServiceResponse {
    let Some(payload) = request.image.as_deref() else {
        return ServiceResponse::from_result(InputError::MissingImage.into());
    };
    let img = match decode_image_payload(payload) {
        Ok(img) => img,
        Err(err) => {
            debug!("service: rejected payload: {err}");
            return ServiceResponse::from_result(err.into());
        }
    };
    let result = estimator.estimate(&ImageRgb8::from(&img));
    ServiceResponse::from_result(result)
}

/// Handle a raw JSON body; anything that is not an object with an `image`
/// string counts as a missing image.
pub fn handle_json_body(estimator: &ScaleEstimator, body: &[u8]) -> ServiceResponse {
    match serde_json::from_slice::<ImageRequest>(body) {
        Ok(request) => handle_request(estimator, &request),
        Err(err) => {
            debug!("service: unreadable request body: {err}");
            ServiceResponse::from_result(InputError::MissingImage.into())
        }
    }
}
