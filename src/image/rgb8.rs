/// Borrowed 8-bit, 3-channel color view (R, G, B interleaved, row-major).
#[derive(Clone, Debug)]
pub struct ImageRgb8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageRgb8<'a> {
    /// Wrap a tightly packed RGB buffer; `None` when the length does not match.
    pub fn from_packed(w: usize, h: usize, data: &'a [u8]) -> Option<Self> {
        (data.len() == w * h * 3).then_some(Self {
            w,
            h,
            stride: w * 3,
            data,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = y * self.stride + x * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn row_bytes(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w * 3]
    }

    /// Bilinear color sample; `None` outside the pixel-centre hull.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> Option<[u8; 3]> {
        if self.is_empty() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let max_x = (self.w - 1) as f32;
        let max_y = (self.h - 1) as f32;
        if x < 0.0 || y < 0.0 || x > max_x || y > max_y {
            return None;
        }
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.w - 1);
        let y1 = (y0 + 1).min(self.h - 1);
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;
        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
            let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
            out[c] = (top * (1.0 - ty) + bottom * ty + 0.5).min(255.0) as u8;
        }
        Some(out)
    }
}

impl<'a> From<&'a image::RgbImage> for ImageRgb8<'a> {
    fn from(img: &'a image::RgbImage) -> Self {
        let w = img.width() as usize;
        Self {
            w,
            h: img.height() as usize,
            stride: w * 3,
            data: img.as_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_packed_rejects_wrong_length() {
        let data = vec![0u8; 11];
        assert!(ImageRgb8::from_packed(2, 2, &data).is_none());
        let data = vec![0u8; 12];
        assert!(ImageRgb8::from_packed(2, 2, &data).is_some());
    }

    #[test]
    fn sample_outside_returns_none() {
        let data = vec![0u8, 0, 0, 255, 255, 255];
        let img = ImageRgb8::from_packed(2, 1, &data).unwrap();
        assert_eq!(img.sample_bilinear(0.5, 0.0), Some([128, 128, 128]));
        assert!(img.sample_bilinear(-0.1, 0.0).is_none());
        assert!(img.sample_bilinear(1.5, 0.0).is_none());
    }
}
