//! Closed-curve polygon approximation and small polygon predicates.
use crate::types::Point;

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn line_distance(p: [i32; 2], a: [i32; 2], b: [i32; 2]) -> f64 {
    let dx = (b[0] - a[0]) as f64;
    let dy = (b[1] - a[1]) as f64;
    let px = (p[0] - a[0]) as f64;
    let py = (p[1] - a[1]) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return (px * px + py * py).sqrt();
    }
    (px * dy - py * dx).abs() / len
}

fn dist_sq(a: [i32; 2], b: [i32; 2]) -> i64 {
    let dx = (a[0] - b[0]) as i64;
    let dy = (a[1] - b[1]) as i64;
    dx * dx + dy * dy
}

/// Douglas–Peucker over the open chain `contour[start..=end]` (indices taken
/// modulo the contour length). Appends kept vertices except `end`.
fn simplify_chain(contour: &[[i32; 2]], start: usize, end: usize, eps: f64, out: &mut Vec<[i32; 2]>) {
    let n = contour.len();
    let mut stack = vec![(start, end)];
    let mut kept = Vec::new();
    while let Some((s, e)) = stack.pop() {
        let a = contour[s % n];
        let b = contour[e % n];
        let mut best = 0.0;
        let mut best_i = s;
        for i in (s + 1)..e {
            let d = line_distance(contour[i % n], a, b);
            if d > best {
                best = d;
                best_i = i;
            }
        }
        if best > eps {
            stack.push((best_i, e));
            stack.push((s, best_i));
        } else {
            kept.push(s);
        }
    }
    out.extend(kept.into_iter().map(|i| contour[i % n]));
}

/// Approximate a closed contour with a polygon whose vertices stay within
/// `eps` pixels of the curve.
///
/// The curve is split at its two mutually farthest points (found from the
/// first point in three refinement passes) and each half is simplified
/// independently. Vertex order follows the contour.
pub fn approx_closed_polygon(contour: &[[i32; 2]], eps: f64) -> Vec<[i32; 2]> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }
    let mut a = 0usize;
    let mut b = 0usize;
    for _ in 0..3 {
        let mut far = 0i64;
        let mut far_i = a;
        for (i, &p) in contour.iter().enumerate() {
            let d = dist_sq(contour[a], p);
            if d > far {
                far = d;
                far_i = i;
            }
        }
        b = a;
        a = far_i;
    }
    if a == b {
        return vec![contour[a]];
    }
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    let mut poly = Vec::new();
    simplify_chain(contour, first, second, eps, &mut poly);
    simplify_chain(contour, second, first + n, eps, &mut poly);
    poly
}

/// Signed z-component of `(b - a) × (c - a)`; positive means clockwise on
/// screen (y down).
#[inline]
pub fn cross(a: Point, b: Point, c: Point) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Strict convexity test for a closed polygon.
pub fn is_convex(poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let z = cross(poly[i], poly[(i + 1) % n], poly[(i + 2) % n]);
        if z == 0.0 {
            return false;
        }
        if sign == 0.0 {
            sign = z.signum();
        } else if z.signum() != sign {
            return false;
        }
    }
    true
}

#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Lengths of the closed polygon edges `p_i → p_{i+1}`.
pub fn edge_lengths<const N: usize>(poly: &[Point; N]) -> [f32; N] {
    std::array::from_fn(|i| distance(poly[i], poly[(i + 1) % N]))
}

pub fn perimeter(poly: &[Point]) -> f32 {
    let n = poly.len();
    (0..n).map(|i| distance(poly[i], poly[(i + 1) % n])).sum()
}

/// Reorder a quadrilateral so that it runs clockwise on screen, keeping the
/// first corner in place.
pub fn order_clockwise(quad: &mut [Point; 4]) {
    if cross(quad[0], quad[1], quad[2]) < 0.0 {
        quad.swap(1, 3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_contour(x0: i32, y0: i32, side: i32) -> Vec<[i32; 2]> {
        let mut pts = Vec::new();
        for x in x0..x0 + side {
            pts.push([x, y0]);
        }
        for y in y0..y0 + side {
            pts.push([x0 + side, y]);
        }
        for x in (x0 + 1..=x0 + side).rev() {
            pts.push([x, y0 + side]);
        }
        for y in (y0 + 1..=y0 + side).rev() {
            pts.push([x0, y]);
        }
        pts
    }

    #[test]
    fn square_contour_collapses_to_four_corners() {
        let contour = square_contour(10, 20, 30);
        let poly = approx_closed_polygon(&contour, 0.03 * contour.len() as f64);
        assert_eq!(poly.len(), 4, "{poly:?}");
        for corner in [[10, 20], [40, 20], [40, 50], [10, 50]] {
            assert!(poly.contains(&corner), "missing {corner:?} in {poly:?}");
        }
    }

    #[test]
    fn noisy_edge_is_smoothed() {
        let mut contour = square_contour(0, 0, 40);
        contour[15][1] = 1;
        let poly = approx_closed_polygon(&contour, 0.03 * contour.len() as f64);
        assert_eq!(poly.len(), 4);
    }

    #[test]
    fn convexity_and_winding() {
        let mut quad = [[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]];
        assert!(is_convex(&quad));
        assert!(cross(quad[0], quad[1], quad[2]) < 0.0);
        order_clockwise(&mut quad);
        assert_eq!(quad, [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        assert!(cross(quad[0], quad[1], quad[2]) > 0.0);

        let dart = [[0.0, 0.0], [10.0, 0.0], [3.0, 3.0], [0.0, 10.0]];
        assert!(!is_convex(&dart));
    }

    #[test]
    fn edge_lengths_wrap_around() {
        let quad = [[0.0, 0.0], [4.0, 0.0], [4.0, 3.0], [0.0, 3.0]];
        assert_eq!(edge_lengths(&quad), [4.0, 3.0, 4.0, 3.0]);
        assert_eq!(perimeter(&quad), 14.0);
    }
}
