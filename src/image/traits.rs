/// Read access to a single-channel raster laid out row by row.
///
/// Implementors expose rows as slices of `width()` pixels; `stride()` is the
/// distance between row starts in pixels of the backing storage.
pub trait ImageView {
    type Pixel: Copy + Into<f32>;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    fn row(&self, y: usize) -> &[Self::Pixel];

    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { image: self, y: 0 }
    }

    /// Bilinear sample at a sub-pixel position with replicated borders.
    ///
    /// Pixel `(i, j)` is centred on integer coordinates, matching the
    /// convention used for corner positions throughout the crate.
    fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let w = self.width();
        let h = self.height();
        if w == 0 || h == 0 {
            return 0.0;
        }
        let max_x = (w - 1) as f32;
        let max_y = (h - 1) as f32;
        let xc = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
        let yc = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };
        let x0 = xc.floor() as usize;
        let y0 = yc.floor() as usize;
        let x1 = (x0 + 1).min(w - 1);
        let y1 = (y0 + 1).min(h - 1);
        let tx = xc - x0 as f32;
        let ty = yc - y0 as f32;
        let r0 = self.row(y0);
        let r1 = self.row(y1);
        let px = |row: &[Self::Pixel], x: usize| -> f32 { row[x].into() };
        let top = px(r0, x0) * (1.0 - tx) + px(r0, x1) * tx;
        let bottom = px(r1, x0) * (1.0 - tx) + px(r1, x1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];
}

pub struct Rows<'a, I: ?Sized + ImageView> {
    image: &'a I,
    y: usize,
}

impl<'a, I: ImageView> Iterator for Rows<'a, I> {
    type Item = &'a [I::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.y >= self.image.height() {
            return None;
        }
        let y = self.y;
        self.y += 1;
        Some(self.image.row(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageU8;

    #[test]
    fn bilinear_interpolates_between_neighbours() {
        let data = [0u8, 100, 200, 100];
        let img = ImageU8 {
            w: 2,
            h: 2,
            stride: 2,
            data: &data,
        };
        assert!((img.sample_bilinear(0.5, 0.0) - 50.0).abs() < 1e-4);
        assert!((img.sample_bilinear(0.0, 0.5) - 100.0).abs() < 1e-4);
        assert!((img.sample_bilinear(0.5, 0.5) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn bilinear_replicates_borders() {
        let data = [10u8, 20, 30, 40];
        let img = ImageU8 {
            w: 2,
            h: 2,
            stride: 2,
            data: &data,
        };
        assert_eq!(img.sample_bilinear(-3.0, -3.0), 10.0);
        assert_eq!(img.sample_bilinear(5.0, 5.0), 40.0);
    }

    #[test]
    fn rows_iterates_each_row_once() {
        let data = [1u8, 2, 3, 9, 4, 5, 6, 9];
        let img = ImageU8 {
            w: 3,
            h: 2,
            stride: 4,
            data: &data,
        };
        let rows: Vec<&[u8]> = img.rows().collect();
        assert_eq!(rows, vec![&[1u8, 2, 3][..], &[4u8, 5, 6][..]]);
    }
}
