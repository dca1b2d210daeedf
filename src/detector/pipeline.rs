//! Detector pipeline: binarize, trace, filter quads, decode.
//!
//! ```no_run
//! use marker_scale::detector::{DetectorParams, MarkerDetector};
//! use marker_scale::image::ImageU8;
//!
//! # fn example(gray: ImageU8) {
//! let detector = MarkerDetector::new(DetectorParams::default());
//! for marker in detector.detect(&gray) {
//!     println!("id={} corners={:?}", marker.id, marker.corners);
//! }
//! # }
//! ```
use super::decode::decode_candidate;
use super::params::DetectorParams;
use crate::contours::{find_outer_contours, Contour};
use crate::dictionary::{Dictionary, ARUCO_4X4_50};
use crate::image::{GrayImageU8, ImageView};
use crate::polygon::{approx_closed_polygon, distance, is_convex, order_clockwise};
use crate::threshold::adaptive_threshold_inv;
use crate::types::{MarkerDetection, Point};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

/// Convex quadrilateral that may be a marker.
#[derive(Clone, Debug)]
struct Candidate {
    /// Clockwise corners, raw contour vertices
    corners: [Point; 4],
    /// Contour length in pixels
    perimeter: f32,
    /// First contour pixel; defines scan order
    origin: [i32; 2],
}

/// Per-stage counts collected during one detection run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DetectionStats {
    pub threshold_passes: usize,
    pub contours: usize,
    pub quads: usize,
    pub candidates: usize,
    pub decoded: usize,
}

/// Square fiducial detector over 8-bit grayscale images.
#[derive(Clone, Debug)]
pub struct MarkerDetector {
    params: DetectorParams,
    dictionary: Dictionary,
}

impl Default for MarkerDetector {
    fn default() -> Self {
        Self::new(DetectorParams::default())
    }
}

impl MarkerDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self {
            params,
            dictionary: ARUCO_4X4_50,
        }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Detect markers; results follow candidate scan order (top-to-bottom,
    /// left-to-right by first contour pixel).
    pub fn detect<I>(&self, gray: &I) -> Vec<MarkerDetection>
    where
        I: ImageView<Pixel = u8> + Sync,
    {
        self.detect_with_stats(gray).0
    }

    /// Same as [`detect`](Self::detect), also returning stage counts.
    pub fn detect_with_stats<I>(&self, gray: &I) -> (Vec<MarkerDetection>, DetectionStats)
    where
        I: ImageView<Pixel = u8> + Sync,
    {
        let mut stats = DetectionStats::default();
        let (w, h) = (gray.width(), gray.height());
        if w == 0 || h == 0 || self.dictionary.is_empty() {
            return (Vec::new(), stats);
        }

        let masks: Vec<GrayImageU8> = self
            .params
            .adaptive_thresh_windows
            .par_iter()
            .map(|&win| adaptive_threshold_inv(gray, win, self.params.adaptive_thresh_constant))
            .collect();
        stats.threshold_passes = masks.len();

        let mut quads = Vec::new();
        for mask in &masks {
            let contours = find_outer_contours(mask);
            stats.contours += contours.len();
            quads.extend(contours.iter().filter_map(|c| self.quad_from_contour(c, w, h)));
        }
        stats.quads = quads.len();
        quads.sort_by_key(|c| (c.origin[1], c.origin[0]));

        let candidates = self.remove_near_duplicates(quads);
        stats.candidates = candidates.len();

        let detections: Vec<MarkerDetection> = candidates
            .par_iter()
            .map(|c| decode_candidate(gray, &c.corners, &self.dictionary, &self.params))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();
        stats.decoded = detections.len();

        debug!(
            "MarkerDetector::detect passes={} contours={} quads={} candidates={} decoded={}",
            stats.threshold_passes, stats.contours, stats.quads, stats.candidates, stats.decoded
        );
        (detections, stats)
    }

    fn quad_from_contour(&self, contour: &Contour, w: usize, h: usize) -> Option<Candidate> {
        let p = &self.params;
        let max_dim = w.max(h) as f32;
        let len = contour.len() as f32;
        if len < p.min_perimeter_rate * max_dim || len > p.max_perimeter_rate * max_dim {
            return None;
        }
        let poly = approx_closed_polygon(contour, (len * p.polygonal_approx_accuracy_rate) as f64);
        if poly.len() != 4 {
            return None;
        }
        let mut corners: [Point; 4] = std::array::from_fn(|i| [poly[i][0] as f32, poly[i][1] as f32]);
        if !is_convex(&corners) {
            return None;
        }

        let min_side = (0..4)
            .map(|i| distance(corners[i], corners[(i + 1) % 4]))
            .fold(f32::INFINITY, f32::min);
        if min_side < len * p.min_corner_distance_rate {
            return None;
        }

        let margin = p.min_distance_to_border as f32;
        let (max_x, max_y) = ((w - 1) as f32 - margin, (h - 1) as f32 - margin);
        if corners
            .iter()
            .any(|c| c[0] < margin || c[1] < margin || c[0] > max_x || c[1] > max_y)
        {
            return None;
        }

        order_clockwise(&mut corners);
        Some(Candidate {
            corners,
            perimeter: len,
            origin: contour[0],
        })
    }

    /// Drop candidates whose corners nearly coincide with another one,
    /// keeping the longer contour (the earlier one on ties).
    fn remove_near_duplicates(&self, quads: Vec<Candidate>) -> Vec<Candidate> {
        let rate = self.params.min_marker_distance_rate;
        let mut keep = vec![true; quads.len()];
        for i in 0..quads.len() {
            for j in (i + 1)..quads.len() {
                if !keep[i] || !keep[j] {
                    continue;
                }
                let limit = quads[i].perimeter.min(quads[j].perimeter) * rate;
                if mean_corner_distance_sq(&quads[i].corners, &quads[j].corners) < limit * limit {
                    if quads[j].perimeter > quads[i].perimeter {
                        keep[i] = false;
                    } else {
                        keep[j] = false;
                    }
                }
            }
        }
        quads
            .into_iter()
            .zip(keep)
            .filter_map(|(q, k)| k.then_some(q))
            .collect()
    }
}

/// Mean squared corner distance over the best cyclic alignment.
fn mean_corner_distance_sq(a: &[Point; 4], b: &[Point; 4]) -> f32 {
    (0..4)
        .map(|shift| {
            (0..4)
                .map(|i| {
                    let d = distance(a[i], b[(i + shift) % 4]);
                    d * d
                })
                .sum::<f32>()
                / 4.0
        })
        .fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageU8;

    fn scene_with_marker(w: usize, h: usize, id: u16, cell: u32, x0: usize, y0: usize) -> Vec<u8> {
        let marker = ARUCO_4X4_50.draw_marker(id, cell).unwrap();
        let mut data = vec![255u8; w * h];
        for (x, y, p) in marker.enumerate_pixels() {
            data[(y0 + y as usize) * w + x0 + x as usize] = p.0[0];
        }
        data
    }

    #[test]
    fn finds_single_upright_marker() {
        let (w, h) = (200usize, 160usize);
        let data = scene_with_marker(w, h, 5, 10, 60, 40);
        let img = ImageU8 { w, h, stride: w, data: &data };
        let detector = MarkerDetector::default();
        let (found, stats) = detector.detect_with_stats(&img);
        assert_eq!(found.len(), 1, "{stats:?}");
        let m = &found[0];
        assert_eq!(m.id, 5);
        assert_eq!(m.corners[0], [60.0, 40.0]);
        assert_eq!(m.corners[1], [119.0, 40.0]);
        assert_eq!(m.corners[2], [119.0, 99.0]);
        assert_eq!(m.corners[3], [60.0, 99.0]);
    }

    #[test]
    fn blank_image_yields_nothing() {
        let data = vec![255u8; 120 * 90];
        let img = ImageU8 { w: 120, h: 90, stride: 120, data: &data };
        assert!(MarkerDetector::default().detect(&img).is_empty());
    }

    #[test]
    fn marker_touching_border_is_ignored() {
        let (w, h) = (100usize, 100usize);
        let data = scene_with_marker(w, h, 1, 10, 1, 20);
        let img = ImageU8 { w, h, stride: w, data: &data };
        assert!(MarkerDetector::default().detect(&img).is_empty());
    }

    #[test]
    fn near_duplicates_keep_longer_contour() {
        let det = MarkerDetector::default();
        let square = |o: f32, s: f32| [[o, o], [o + s, o], [o + s, o + s], [o, o + s]];
        let quads = vec![
            Candidate { corners: square(10.0, 40.0), perimeter: 160.0, origin: [10, 10] },
            Candidate { corners: square(10.5, 39.0), perimeter: 156.0, origin: [10, 10] },
            Candidate { corners: square(100.0, 40.0), perimeter: 160.0, origin: [100, 100] },
        ];
        let kept = det.remove_near_duplicates(quads);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].perimeter, 160.0);
        assert_eq!(kept[1].origin, [100, 100]);
    }
}
