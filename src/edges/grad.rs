//! 3×3 image gradients (Sobel/Scharr) with border clamping.
//!
//! Outputs per-pixel `gx`, `gy`. Only the ratios between gradient products
//! matter to the corner refiner, so the kernels are left unnormalised.
//!
//! Complexity: O(W·H) per pass; memory: two float buffers.
use crate::image::{ImageF32, ImageView, ImageViewMut};
use serde::Deserialize;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const SCHARR_KERNEL_X: Kernel3 = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_KERNEL_Y: Kernel3 = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];

const CENTRAL_KERNEL_X: Kernel3 = [[0.0, 0.0, 0.0], [-1.0, 0.0, 1.0], [0.0, 0.0, 0.0]];
const CENTRAL_KERNEL_Y: Kernel3 = [[0.0, -1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// Derivative kernel used when differentiating a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKernel {
    /// Plain central differences `I(x+1) - I(x-1)`.
    Central,
    #[default]
    Sobel,
    /// Better rotational symmetry than Sobel.
    Scharr,
}

impl GradientKernel {
    fn kernels(self) -> (&'static Kernel3, &'static Kernel3) {
        match self {
            GradientKernel::Central => (&CENTRAL_KERNEL_X, &CENTRAL_KERNEL_Y),
            GradientKernel::Sobel => (&SOBEL_KERNEL_X, &SOBEL_KERNEL_Y),
            GradientKernel::Scharr => (&SCHARR_KERNEL_X, &SCHARR_KERNEL_Y),
        }
    }
}

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: ImageF32,
}

fn gradients_with_kernels(l: &ImageF32, kernel_x: &Kernel3, kernel_y: &Kernel3) -> Grad {
    let w = l.w;
    let h = l.h;
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);

    if w == 0 || h == 0 {
        return Grad { gx, gy };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out_gx = gx.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum = 0.0;
            for (yy_row, k_row) in rows.iter().zip(kernel_x.iter()) {
                sum += yy_row[x_idx[0]] * k_row[0]
                    + yy_row[x_idx[1]] * k_row[1]
                    + yy_row[x_idx[2]] * k_row[2];
            }
            out_gx[x] = sum;
        }
        let out_gy = gy.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum = 0.0;
            for (yy_row, k_row) in rows.iter().zip(kernel_y.iter()) {
                sum += yy_row[x_idx[0]] * k_row[0]
                    + yy_row[x_idx[1]] * k_row[1]
                    + yy_row[x_idx[2]] * k_row[2];
            }
            out_gy[x] = sum;
        }
    }

    Grad { gx, gy }
}

/// Compute gradients of a float tile with the selected kernel.
pub fn gradients(l: &ImageF32, kernel: GradientKernel) -> Grad {
    let (kx, ky) = kernel.kernels();
    gradients_with_kernels(l, kx, ky)
}

/// Compute Sobel gradients on a single-channel float image.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    gradients(l, GradientKernel::Sobel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_step(w: usize, h: usize, edge_x: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in edge_x..w {
                img.set(x, y, 1.0);
            }
        }
        img
    }

    #[test]
    fn sobel_responds_to_vertical_edge_only_in_x() {
        let img = vertical_step(6, 5, 3);
        let grad = sobel_gradients(&img);
        assert_eq!(grad.gx.get(2, 2), 4.0);
        assert_eq!(grad.gx.get(3, 2), 4.0);
        assert_eq!(grad.gx.get(0, 2), 0.0);
        assert_eq!(grad.gx.get(5, 2), 0.0);
        for y in 0..5 {
            for x in 0..6 {
                assert_eq!(grad.gy.get(x, y), 0.0);
            }
        }
    }

    #[test]
    fn central_kernel_is_symmetric_difference() {
        let img = vertical_step(6, 3, 3);
        let grad = gradients(&img, GradientKernel::Central);
        assert_eq!(grad.gx.get(2, 1), 1.0);
        assert_eq!(grad.gx.get(3, 1), 1.0);
        assert_eq!(grad.gx.get(1, 1), 0.0);
    }

    #[test]
    fn empty_image_yields_empty_gradients() {
        let grad = gradients(&ImageF32::new(0, 0), GradientKernel::Scharr);
        assert!(grad.gx.data.is_empty());
        assert!(grad.gy.data.is_empty());
    }
}
