//! Four-point homographies and perspective warping.
//!
//! `homography_from_quads` solves the normalized DLT with `h33 = 1` via an
//! 8×8 LU factorization. Degenerate correspondences (collinear corners,
//! singular systems, non-finite output) yield `None`.
use crate::image::ImageRgb8;
use crate::types::Point;
use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

const EPS: f64 = 1e-9;

/// Similarity that moves the centroid to the origin and scales the mean
/// distance to √2.
fn normalization(pts: &[Point; 4]) -> Option<Matrix3<f64>> {
    let (mut cx, mut cy) = (0.0f64, 0.0f64);
    for p in pts {
        cx += p[0] as f64;
        cy += p[1] as f64;
    }
    cx /= 4.0;
    cy /= 4.0;
    let mean = pts
        .iter()
        .map(|p| ((p[0] as f64 - cx).powi(2) + (p[1] as f64 - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;
    if !mean.is_finite() || mean <= EPS {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean;
    Some(Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0))
}

fn transform(t: &Matrix3<f64>, p: Point) -> (f64, f64) {
    let v = t * Vector3::new(p[0] as f64, p[1] as f64, 1.0);
    (v[0] / v[2], v[1] / v[2])
}

/// True when any three of the four points are (numerically) collinear.
pub fn has_collinear_triple(pts: &[Point; 4]) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    let scale = pts
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(1.0f32, f32::max) as f64;
    TRIPLES.iter().any(|&(a, b, c)| {
        let (pa, pb, pc) = (pts[a], pts[b], pts[c]);
        let z = (pb[0] - pa[0]) as f64 * (pc[1] - pa[1]) as f64
            - (pb[1] - pa[1]) as f64 * (pc[0] - pa[0]) as f64;
        !z.is_finite() || z.abs() <= 1e-6 * scale * scale
    })
}

/// Homography mapping `src[i]` onto `dst[i]`.
pub fn homography_from_quads(src: &[Point; 4], dst: &[Point; 4]) -> Option<Matrix3<f64>> {
    if has_collinear_triple(src) || has_collinear_triple(dst) {
        return None;
    }
    let t_src = normalization(src)?;
    let t_dst = normalization(dst)?;

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for i in 0..4 {
        let (x, y) = transform(&t_src, src[i]);
        let (u, v) = transform(&t_dst, dst[i]);
        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;
        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }
    let h = a.lu().solve(&b)?;
    let hn = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
    let t_dst_inv = t_dst.try_inverse()?;
    let mut hm = t_dst_inv * hn * t_src;
    let w = hm[(2, 2)];
    if !w.is_finite() || w.abs() <= EPS {
        return None;
    }
    hm /= w;
    hm.iter().all(|v| v.is_finite()).then_some(hm)
}

/// Map one point through `h`; `None` at infinity.
#[inline]
pub fn apply_homography(h: &Matrix3<f64>, p: Point) -> Option<Point> {
    let v = h * Vector3::new(p[0] as f64, p[1] as f64, 1.0);
    let w = v[2];
    if !w.is_finite() || w.abs() <= EPS || !v[0].is_finite() || !v[1].is_finite() {
        return None;
    }
    Some([(v[0] / w) as f32, (v[1] / w) as f32])
}

pub fn apply_homography_points(h: &Matrix3<f64>, pts: &[Point]) -> Option<Vec<Point>> {
    pts.iter().map(|&p| apply_homography(h, p)).collect()
}

/// Warp `src` into a `size × size` image through `h` (source → destination).
///
/// Each destination pixel is pulled back through `h⁻¹` and sampled
/// bilinearly; samples falling outside the source are black.
pub fn warp_perspective(src: &ImageRgb8<'_>, h: &Matrix3<f64>, size: u32) -> Option<RgbImage> {
    let inv = h.try_inverse()?;
    Some(RgbImage::from_fn(size, size, |u, v| {
        let px = apply_homography(&inv, [u as f32, v as f32])
            .and_then(|p| src.sample_bilinear(p[0], p[1]))
            .unwrap_or([0, 0, 0]);
        Rgb(px)
    }))
}
