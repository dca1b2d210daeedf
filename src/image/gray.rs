//! Owned 8-bit grayscale buffer plus the color → luminance conversion.
use super::{ImageRgb8, ImageU8, ImageView};

/// Owned 8-bit grayscale buffer with borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer given raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            stride: width,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }

    /// Copy into an `image::GrayImage`.
    pub fn to_gray_image(&self) -> Option<image::GrayImage> {
        image::GrayImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
    }
}

/// BT.601 luma, rounded to the nearest integer.
#[inline]
pub fn luma(rgb: [u8; 3]) -> u8 {
    let v = 0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32;
    (v + 0.5).min(255.0) as u8
}

/// Convert a color raster to a single-channel luminance image.
pub fn to_grayscale(src: &ImageRgb8<'_>) -> GrayImageU8 {
    let mut data = Vec::with_capacity(src.w * src.h);
    for y in 0..src.h {
        data.extend(src.row_bytes(y).chunks_exact(3).map(|px| luma([px[0], px[1], px[2]])));
    }
    GrayImageU8::new(src.w, src.h, data)
}

/// Mean intensity of a grayscale view; used for diagnostics.
pub fn mean_intensity<I: ImageView>(img: &I) -> f32 {
    let n = img.width() * img.height();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = img
        .rows()
        .map(|row| row.iter().map(|&p| f64::from(Into::<f32>::into(p))).sum::<f64>())
        .sum();
    (sum / n as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_matches_bt601_weights() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        // 100*0.299 + 150*0.587 + 200*0.114 = 140.75
        assert_eq!(luma([100, 150, 200]), 141);
        assert_eq!(luma([255, 0, 0]), 76);
    }

    #[test]
    fn grayscale_preserves_dimensions() {
        let data = vec![
            255, 255, 255, 0, 0, 0, 10, 10, 10, //
            50, 50, 50, 200, 200, 200, 0, 255, 0,
        ];
        let rgb = ImageRgb8 {
            w: 3,
            h: 2,
            stride: 9,
            data: &data,
        };
        let gray = to_grayscale(&rgb);
        assert_eq!(gray.width(), 3);
        assert_eq!(gray.height(), 2);
        assert_eq!(gray.data(), &[255, 0, 10, 50, 200, 150]);
        let mean = mean_intensity(&gray.as_view());
        assert!((mean - 110.833).abs() < 1e-2);
    }
}
