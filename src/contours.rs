//! Outer borders of 8-connected foreground components.
//!
//! Components are discovered in raster order; for each one the outer border
//! is traced with Moore-neighbour tracing and Jacob's stopping criterion.
//! Inner borders (holes) are not reported.
use crate::image::GrayImageU8;

/// A traced border as integer pixel coordinates.
pub type Contour = Vec<[i32; 2]>;

/// Clockwise neighbourhood in image coordinates (y down), starting west.
const DIRS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

struct Mask<'a> {
    w: i32,
    h: i32,
    data: &'a [u8],
}

impl Mask<'_> {
    #[inline]
    fn is_set(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.w && y < self.h && self.data[(y * self.w + x) as usize] != 0
    }
}

fn dir_index(dx: i32, dy: i32) -> Option<usize> {
    DIRS.iter().position(|&d| d == (dx, dy))
}

/// Find the outer border of every foreground component of `mask`.
///
/// Contours are returned in the raster order of their first pixel and run
/// clockwise on screen.
pub fn find_outer_contours(mask: &GrayImageU8) -> Vec<Contour> {
    let w = mask.width();
    let h = mask.height();
    let m = Mask {
        w: w as i32,
        h: h as i32,
        data: mask.data(),
    };
    let mut visited = vec![false; w * h];
    let mut stack = Vec::new();
    let mut contours = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if visited[i] || m.data[i] == 0 {
                continue;
            }
            flood_fill(&m, &mut visited, &mut stack, x as i32, y as i32);
            contours.push(trace_border(&m, [x as i32, y as i32]));
        }
    }
    contours
}

fn flood_fill(m: &Mask<'_>, visited: &mut [bool], stack: &mut Vec<[i32; 2]>, x: i32, y: i32) {
    stack.clear();
    visited[(y * m.w + x) as usize] = true;
    stack.push([x, y]);
    while let Some([cx, cy]) = stack.pop() {
        for &(dx, dy) in &DIRS {
            let (nx, ny) = (cx + dx, cy + dy);
            if m.is_set(nx, ny) {
                let j = (ny * m.w + nx) as usize;
                if !visited[j] {
                    visited[j] = true;
                    stack.push([nx, ny]);
                }
            }
        }
    }
}

/// Moore-neighbour trace starting at the raster-first pixel of a component.
///
/// The west neighbour of `start` is background by construction, which seeds
/// the backtrack direction.
fn trace_border(m: &Mask<'_>, start: [i32; 2]) -> Contour {
    let mut contour = vec![start];
    let max_steps = 4 * (m.w as usize) * (m.h as usize) + 8;
    let mut cur = start;
    let mut back = 0usize;
    let mut second: Option<[i32; 2]> = None;

    for _ in 0..max_steps {
        let Some((next, next_back)) = moore_step(m, cur, back) else {
            break;
        };
        if cur == start {
            match second {
                Some(s) if s == next => {
                    contour.pop();
                    break;
                }
                Some(_) => {}
                None => second = Some(next),
            }
        }
        contour.push(next);
        cur = next;
        back = next_back;
    }
    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }
    contour
}

/// Scan the neighbours of `cur` clockwise, starting after the backtrack
/// direction. Returns the next border pixel and its backtrack direction.
fn moore_step(m: &Mask<'_>, cur: [i32; 2], back: usize) -> Option<([i32; 2], usize)> {
    for k in 1..=8 {
        let d = (back + k) % 8;
        let (dx, dy) = DIRS[d];
        let next = [cur[0] + dx, cur[1] + dy];
        if m.is_set(next[0], next[1]) {
            let (px, py) = DIRS[(back + k - 1) % 8];
            let prev = [cur[0] + px, cur[1] + py];
            let nb = dir_index(prev[0] - next[0], prev[1] - next[1])?;
            return Some((next, nb));
        }
    }
    None
}
