//! Gradient-orthogonality corner refinement.
//!
//! At the true corner `q`, every image gradient `g_i` sampled at a nearby
//! point `p_i` is orthogonal to `p_i - q` (flat regions have `g_i = 0`,
//! edge points have `g_i ⊥ edge`). Each iteration resamples the window
//! around the current estimate and solves the Gaussian-weighted normal
//! equations `Σ w g gᵀ · q = Σ w g gᵀ · p` for the update.
use super::options::SubPixOptions;
use crate::edges::gradients;
use crate::image::{ImageF32, ImageView};
use crate::types::Point;
use serde::Serialize;

/// Outcome of refining one corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CornerRefinement {
    /// Refined position (equals the start when `reverted`)
    pub point: Point,
    pub iterations: usize,
    /// The estimate left the search window and was discarded.
    pub reverted: bool,
}

/// Separable Gaussian window weights `exp(-(i/win)²)` for offsets
/// `-win..=win`, with the dead zone zeroed.
fn window_weights(opts: &SubPixOptions) -> Vec<f64> {
    let win = opts.half_window as i64;
    let side = (2 * win + 1) as usize;
    let axis: Vec<f64> = (-win..=win)
        .map(|i| {
            let t = i as f64 / win as f64;
            (-t * t).exp()
        })
        .collect();
    let mut weights = vec![0.0; side * side];
    for (r, wy) in axis.iter().enumerate() {
        for (c, wx) in axis.iter().enumerate() {
            weights[r * side + c] = wy * wx;
        }
    }
    if opts.zero_zone >= 0 {
        let zz = opts.zero_zone as i64;
        for dy in -zz..=zz {
            for dx in -zz..=zz {
                let (r, c) = (dy + win, dx + win);
                if (0..side as i64).contains(&r) && (0..side as i64).contains(&c) {
                    weights[r as usize * side + c as usize] = 0.0;
                }
            }
        }
    }
    weights
}

/// Refine a single corner estimate.
pub fn refine_corner<I: ImageView>(img: &I, start: Point, opts: &SubPixOptions) -> CornerRefinement {
    let win = opts.half_window.max(1);
    let opts = SubPixOptions {
        half_window: win,
        ..opts.clone()
    };
    let side = 2 * win + 1;
    let tile_side = side + 2;
    let weights = window_weights(&opts);
    let eps_sq = (opts.epsilon as f64) * (opts.epsilon as f64);
    let (w, h) = (img.width() as f64, img.height() as f64);

    let mut cur = [start[0] as f64, start[1] as f64];
    let mut iterations = 0usize;
    while iterations < opts.max_iters.max(1) {
        iterations += 1;
        let x0 = cur[0] - (win + 1) as f64;
        let y0 = cur[1] - (win + 1) as f64;
        let tile = ImageF32::sample_tile(img, x0 as f32, y0 as f32, tile_side, tile_side);
        let grad = gradients(&tile, opts.gradient);

        let (mut a, mut b, mut c, mut bb1, mut bb2) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for i in 0..side {
            let py = i as f64 - win as f64;
            for j in 0..side {
                let px = j as f64 - win as f64;
                let m = weights[i * side + j];
                let gx = grad.gx.get(j + 1, i + 1) as f64;
                let gy = grad.gy.get(j + 1, i + 1) as f64;
                let gxx = gx * gx * m;
                let gxy = gx * gy * m;
                let gyy = gy * gy * m;
                a += gxx;
                b += gxy;
                c += gyy;
                bb1 += gxx * px + gxy * py;
                bb2 += gxy * px + gyy * py;
            }
        }

        let det = a * c - b * b;
        if det.abs() <= f64::EPSILON * f64::EPSILON {
            break;
        }
        let next = [
            cur[0] + (c * bb1 - b * bb2) / det,
            cur[1] + (a * bb2 - b * bb1) / det,
        ];
        let dx = next[0] - cur[0];
        let dy = next[1] - cur[1];
        cur = next;
        if cur[0] < 0.0 || cur[0] >= w || cur[1] < 0.0 || cur[1] >= h {
            break;
        }
        if dx * dx + dy * dy <= eps_sq {
            break;
        }
    }

    let drift_x = (cur[0] - start[0] as f64).abs();
    let drift_y = (cur[1] - start[1] as f64).abs();
    let finite = cur[0].is_finite() && cur[1].is_finite();
    if !finite || drift_x > win as f64 || drift_y > win as f64 {
        return CornerRefinement {
            point: start,
            iterations,
            reverted: true,
        };
    }
    CornerRefinement {
        point: [cur[0] as f32, cur[1] as f32],
        iterations,
        reverted: false,
    }
}

/// Refine all four corners of a quad, keeping their order.
pub fn refine_quad<I: ImageView>(
    img: &I,
    corners: &[Point; 4],
    opts: &SubPixOptions,
) -> [CornerRefinement; 4] {
    std::array::from_fn(|i| refine_corner(img, corners[i], opts))
}
