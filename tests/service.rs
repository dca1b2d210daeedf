mod common;

use common::init_logging;
use common::synthetic_image::{blank_rgb, marker_scene, png_base64};
use marker_scale::service::{handle_json_body, handle_request, ImageRequest};
use marker_scale::ScaleEstimator;

fn body_for(payload: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "image": payload })).unwrap()
}

#[test]
fn data_uri_png_is_measured() {
    init_logging();
    let est = ScaleEstimator::default();
    let payload = png_base64(&marker_scene(0.0), true);
    let resp = handle_json_body(&est, &body_for(&payload));

    assert_eq!(resp.status, 200, "{:?}", resp.body);
    let json = serde_json::to_value(&resp.body).unwrap();
    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    let ppm = json["pixels_per_mm"].as_f64().unwrap();
    assert!((ppm - 2.0).abs() < 0.02, "{ppm}");
    assert!((json["image_width_mm"].as_f64().unwrap() - 200.0).abs() < 2.0);
    assert!((json["image_height_mm"].as_f64().unwrap() - 150.0).abs() < 1.5);
}

#[test]
fn bare_base64_matches_data_uri() {
    init_logging();
    let est = ScaleEstimator::default();
    let img = marker_scene(10.0);
    let bare = handle_request(
        &est,
        &ImageRequest {
            image: Some(png_base64(&img, false)),
        },
    );
    let prefixed = handle_request(
        &est,
        &ImageRequest {
            image: Some(png_base64(&img, true)),
        },
    );
    assert_eq!(bare.status, 200);
    assert_eq!(bare, prefixed);
}

#[test]
fn marker_free_image_is_a_client_error() {
    init_logging();
    let est = ScaleEstimator::default();
    let payload = png_base64(&blank_rgb(400, 300, 255), true);
    let resp = handle_json_body(&est, &body_for(&payload));
    assert_eq!(resp.status, 400);
    assert_eq!(
        serde_json::to_value(&resp.body).unwrap(),
        serde_json::json!({"success": false, "error": "No ArUco markers detected"})
    );
}

#[test]
fn missing_or_malformed_input_is_rejected() {
    init_logging();
    let est = ScaleEstimator::default();

    for body in [&b"{}"[..], &b"not json"[..], &b"{\"image\": null}"[..]] {
        let resp = handle_json_body(&est, body);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body.error.as_deref(), Some("No image provided"));
    }

    let resp = handle_json_body(&est, &body_for("data:image/png;base64,@@@not-base64@@@"));
    assert_eq!(resp.status, 400);
    assert!(resp
        .body
        .error
        .as_deref()
        .unwrap()
        .starts_with("Invalid base64 image data"));

    // valid base64, but not an image
    let resp = handle_json_body(&est, &body_for("aGVsbG8gd29ybGQ="));
    assert_eq!(resp.status, 400);
    assert!(!resp.body.success);
    assert!(resp.body.pixels_per_mm.is_none());
}
