//! I/O helpers for color/grayscale images and JSON.
//!
//! - `load_rgb_image`: read a PNG/JPEG/etc. from disk into an owned RGB buffer.
//! - `decode_rgb_image`: decode an in-memory encoded image (PNG/JPEG/...).
//! - `encode_png`: encode an RGB buffer into PNG bytes.
//! - `save_grayscale_u8` / `save_rgb`: write buffers to disk.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::GrayImageU8;
use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Load an image from disk and convert to 8-bit RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbImage, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    Ok(img.into_rgb8())
}

/// Decode encoded image bytes (any format enabled in the `image` crate).
pub fn decode_rgb_image(bytes: &[u8]) -> Result<RgbImage, String> {
    image::load_from_memory(bytes)
        .map(DynamicImage::into_rgb8)
        .map_err(|e| format!("Failed to decode image: {e}"))
}

/// Encode an RGB image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| format!("Failed to encode PNG: {e}"))?;
    Ok(bytes)
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &GrayImageU8, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let gray = buffer
        .to_gray_image()
        .ok_or_else(|| "Failed to create image buffer".to_string())?;
    DynamicImage::ImageLuma8(gray)
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save an RGB image (format chosen from the extension).
pub fn save_rgb(img: &RgbImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    img.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_roundtrips_png_bytes() {
        let img = RgbImage::from_pixel(5, 3, image::Rgb([12, 34, 56]));
        let bytes = encode_png(&img).expect("png encoding");
        let decoded = decode_rgb_image(&bytes).expect("decode");
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.get_pixel(4, 2).0, [12, 34, 56]);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_rgb_image(b"definitely not an image").unwrap_err();
        assert!(err.starts_with("Failed to decode image"), "{err}");
    }
}
