//! Binarization primitives used by marker detection.
//!
//! - `adaptive_threshold_inv`: local-mean threshold that marks pixels darker
//!   than their neighbourhood as foreground (255).
//! - `otsu_threshold`: global histogram split used on sampled marker patches.
use crate::image::{GrayImageU8, ImageView};

/// Summed-area table with one row/column of zero padding.
struct Integral {
    w: usize,
    sums: Vec<u64>,
}

impl Integral {
    fn build<I: ImageView<Pixel = u8>>(img: &I) -> Self {
        let w = img.width();
        let h = img.height();
        let mut sums = vec![0u64; (w + 1) * (h + 1)];
        for y in 0..h {
            let mut acc = 0u64;
            let row = img.row(y);
            for x in 0..w {
                acc += row[x] as u64;
                sums[(y + 1) * (w + 1) + x + 1] = sums[y * (w + 1) + x + 1] + acc;
            }
        }
        Self { w, sums }
    }

    /// Sum over the half-open box `[x0, x1) × [y0, y1)`.
    #[inline]
    fn box_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let s = self.w + 1;
        self.sums[y1 * s + x1] + self.sums[y0 * s + x0]
            - self.sums[y0 * s + x1]
            - self.sums[y1 * s + x0]
    }
}

/// Inverted adaptive threshold against the local box mean.
///
/// A pixel becomes foreground (255) when `value <= mean - c`, where `mean`
/// is taken over the `window × window` box around it, clipped at the image
/// border. Even window sizes are bumped to the next odd size; windows
/// larger than the image are clamped to `max(width, height)`.
pub fn adaptive_threshold_inv<I: ImageView<Pixel = u8>>(
    img: &I,
    window: usize,
    c: f32,
) -> GrayImageU8 {
    let w = img.width();
    let h = img.height();
    let mut out = vec![0u8; w * h];
    if w == 0 || h == 0 {
        return GrayImageU8::new(w, h, out);
    }
    let window = window.clamp(3, w.max(h).max(3)) | 1;
    let r = window / 2;
    let integral = Integral::build(img);

    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r + 1).min(h);
        let row = img.row(y);
        let dst = &mut out[y * w..(y + 1) * w];
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let area = ((x1 - x0) * (y1 - y0)) as f32;
            let mean = integral.box_sum(x0, y0, x1, y1) as f32 / area;
            if row[x] as f32 <= mean - c {
                dst[x] = 255;
            }
        }
    }

    GrayImageU8::new(w, h, out)
}

/// Otsu threshold over a sample of intensities.
///
/// Returns the level `t` maximizing the between-class variance; callers
/// treat values `> t` as white.
pub fn otsu_threshold(values: &[u8]) -> u8 {
    let mut hist = [0u32; 256];
    for &v in values {
        hist[v as usize] += 1;
    }
    let total = values.len() as f64;
    let sum: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let mut threshold = 0u8;
    let mut sum_b = 0.0;
    let mut w_b = 0.0;
    let mut best = 0.0;
    for (i, &n) in hist.iter().enumerate() {
        w_b += n as f64;
        if w_b == 0.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0.0 {
            break;
        }
        sum_b += i as f64 * n as f64;
        let mu = sum_b / w_b - (sum - sum_b) / w_f;
        let between = w_b * w_f * mu * mu;
        if between > best {
            best = between;
            threshold = i as u8;
        }
    }
    threshold
}

/// Population mean and standard deviation of a sample.
pub fn mean_stddev(values: &[u8]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean as f32, var.sqrt() as f32)
}
