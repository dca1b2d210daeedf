//! Bit extraction and identification of a single candidate quad.
//!
//! The quad is resampled into a small fronto-parallel patch, binarized with
//! Otsu, and read cell by cell. The border cells must be black; the payload
//! is matched against the dictionary in all four frames.
use super::params::DetectorParams;
use crate::dictionary::Dictionary;
use crate::homography::{apply_homography, homography_from_quads};
use crate::image::ImageView;
use crate::threshold::{mean_stddev, otsu_threshold};
use crate::types::{MarkerDetection, Point};

/// Sample the quad into a `side × side` patch (`side = cells · ppc`).
fn sample_patch<I: ImageView>(gray: &I, corners: &[Point; 4], side: usize) -> Option<Vec<u8>> {
    let s = side as f32;
    let canonical = [[0.0, 0.0], [s, 0.0], [s, s], [0.0, s]];
    let h = homography_from_quads(&canonical, corners)?;
    let mut patch = Vec::with_capacity(side * side);
    for v in 0..side {
        for u in 0..side {
            let p = apply_homography(&h, [u as f32 + 0.5, v as f32 + 0.5])?;
            let value = gray.sample_bilinear(p[0], p[1]);
            patch.push((value + 0.5).clamp(0.0, 255.0) as u8);
        }
    }
    Some(patch)
}

/// Read the `cells × cells` bit grid (row-major, white = true).
fn extract_bits(patch: &[u8], cells: usize, ppc: usize, params: &DetectorParams) -> Option<Vec<bool>> {
    let (_, std) = mean_stddev(patch);
    if std < params.min_otsu_std_dev {
        return None;
    }
    let t = otsu_threshold(patch);
    let side = cells * ppc;
    let margin = (ppc as f32 * params.perspective_ignored_margin_per_cell) as usize;
    let inner = ppc.saturating_sub(2 * margin).max(1);
    let lo = margin.min(ppc - 1);

    let mut bits = Vec::with_capacity(cells * cells);
    for cy in 0..cells {
        for cx in 0..cells {
            let mut white = 0usize;
            for y in (cy * ppc + lo)..(cy * ppc + lo + inner) {
                let row = &patch[y * side..(y + 1) * side];
                white += row[cx * ppc + lo..cx * ppc + lo + inner]
                    .iter()
                    .filter(|&&v| v > t)
                    .count();
            }
            bits.push(2 * white > inner * inner);
        }
    }
    Some(bits)
}

/// Decode a clockwise candidate quad; corners of the result start at the
/// marker's own top-left corner.
pub(crate) fn decode_candidate<I: ImageView>(
    gray: &I,
    corners: &[Point; 4],
    dictionary: &Dictionary,
    params: &DetectorParams,
) -> Option<MarkerDetection> {
    let n = dictionary.marker_bits;
    let cells = dictionary.total_cells();
    let ppc = params.perspective_pixels_per_cell.max(1);
    let patch = sample_patch(gray, corners, cells * ppc)?;
    let bits = extract_bits(&patch, cells, ppc, params)?;

    let border_errors = (0..cells)
        .flat_map(|y| (0..cells).map(move |x| (x, y)))
        .filter(|&(x, y)| x == 0 || y == 0 || x == cells - 1 || y == cells - 1)
        .filter(|&(x, y)| bits[y * cells + x])
        .count();
    let max_border_errors = ((n * n) as f32 * params.max_erroneous_bits_in_border_rate) as usize;
    if border_errors > max_border_errors {
        return None;
    }

    let mut payload = 0u64;
    for y in 0..n {
        for x in 0..n {
            if bits[(y + 1) * cells + x + 1] {
                payload |= 1 << (y * n + x);
            }
        }
    }

    let max_errors = (dictionary.max_correction_bits as f32 * params.error_correction_rate) as u32;
    let m = dictionary.identify(payload, max_errors)?;
    let k = m.rotation;
    Some(MarkerDetection {
        id: m.id,
        corners: std::array::from_fn(|i| corners[(k + i) % 4]),
        hamming: m.hamming,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::ARUCO_4X4_50;
    use crate::image::ImageU8;

    /// Marker `id` drawn at `cell` px per cell with a white margin of one cell.
    fn marker_scene(id: u16, cell: u32) -> (Vec<u8>, usize) {
        let marker = ARUCO_4X4_50.draw_marker(id, cell).unwrap();
        let side = marker.width() as usize + 2 * cell as usize;
        let mut data = vec![255u8; side * side];
        for (x, y, p) in marker.enumerate_pixels() {
            data[(y as usize + cell as usize) * side + x as usize + cell as usize] = p.0[0];
        }
        (data, side)
    }

    #[test]
    fn decodes_upright_marker() {
        let (data, side) = marker_scene(3, 10);
        let img = ImageU8 { w: side, h: side, stride: side, data: &data };
        let corners = [[10.0, 10.0], [69.0, 10.0], [69.0, 69.0], [10.0, 69.0]];
        let det = decode_candidate(&img, &corners, &ARUCO_4X4_50, &DetectorParams::default())
            .expect("marker decodes");
        assert_eq!(det.id, 3);
        assert_eq!(det.hamming, 0);
        assert_eq!(det.corners, corners);
    }

    #[test]
    fn shifted_corner_order_is_undone() {
        let (data, side) = marker_scene(3, 10);
        let img = ImageU8 { w: side, h: side, stride: side, data: &data };
        // start the quad at the marker's bottom-left corner
        let corners = [[10.0, 69.0], [10.0, 10.0], [69.0, 10.0], [69.0, 69.0]];
        let det = decode_candidate(&img, &corners, &ARUCO_4X4_50, &DetectorParams::default())
            .expect("marker decodes");
        assert_eq!(det.id, 3);
        assert_eq!(det.corners[0], [10.0, 10.0]);
        assert_eq!(det.corners[2], [69.0, 69.0]);
    }

    #[test]
    fn flat_patch_is_rejected() {
        let data = vec![128u8; 80 * 80];
        let img = ImageU8 { w: 80, h: 80, stride: 80, data: &data };
        let corners = [[10.0, 10.0], [69.0, 10.0], [69.0, 69.0], [10.0, 69.0]];
        assert!(decode_candidate(&img, &corners, &ARUCO_4X4_50, &DetectorParams::default()).is_none());
    }
}
