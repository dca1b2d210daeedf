//! Square fiducial dictionary: code table, frame rotation, decoding and
//! marker rendering.
//!
//! Bit `i` of a code (LSB first) is the payload cell at column `i % n`, row
//! `i / n`; a set bit is a white cell. Markers carry a one-cell black border
//! around the `n × n` payload.
use image::{GrayImage, Luma};

/// ArUco 4x4_50 code table.
#[rustfmt::skip]
const ARUCO_4X4_50_CODES: [u64; 50] = [
    0x4cad, 0x59f0, 0xb4cc, 0x6299, 0x792a, 0xb39e, 0x7479, 0x4f23,
    0x5b7f, 0x6af3, 0x899f, 0xe588, 0xed70, 0xf054, 0x8d24, 0x7c64,
    0xa662, 0x0066, 0x7a36, 0xf56e, 0xd161, 0xd40d, 0xab33, 0x41bb,
    0xe27f, 0x8e29, 0x2735, 0x2aa5, 0xc484, 0xf62c, 0xa822, 0x4dea,
    0xf379, 0xd30f, 0x7510, 0x9490, 0xae18, 0xff20, 0x6fb0, 0x5a38,
    0x18e8, 0x1454, 0x314c, 0x4d1c, 0x1724, 0xd774, 0xfcb4, 0x26d2,
    0x740a, 0xc80a,
];

/// A fixed family of square binary codes.
#[derive(Clone, Copy, Debug)]
pub struct Dictionary {
    pub name: &'static str,
    /// Payload cells per side
    pub marker_bits: usize,
    /// Correctable bit errors implied by the family's minimum distance
    pub max_correction_bits: u32,
    pub codes: &'static [u64],
}

/// The dictionary used for scale estimation. Markers of any other family
/// (6X6_250 included) are never decoded.
pub const ARUCO_4X4_50: Dictionary = Dictionary {
    name: "4X4_50",
    marker_bits: 4,
    max_correction_bits: 1,
    codes: &ARUCO_4X4_50_CODES,
};

/// A dictionary match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeMatch {
    pub id: u16,
    pub hamming: u32,
    /// Number of frame rotations applied to the sampled bits
    pub rotation: usize,
}

impl Dictionary {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn code(&self, id: u16) -> Option<u64> {
        self.codes.get(id as usize).copied()
    }

    /// Cells per side including the border.
    pub fn total_cells(&self) -> usize {
        self.marker_bits + 2
    }

    /// Match sampled payload bits against the table in all four frames.
    ///
    /// `bits` is read with the candidate's first corner at the top-left.
    /// A match at `rotation = k` means the marker's own top-left corner is
    /// candidate corner `k`. The lowest Hamming distance wins; ties go to
    /// the smaller rotation, then the smaller id.
    pub fn identify(&self, bits: u64, max_errors: u32) -> Option<CodeMatch> {
        let n = self.marker_bits;
        let mut best: Option<CodeMatch> = None;
        let mut frame = bits;
        for rotation in 0..4 {
            for (id, &code) in self.codes.iter().enumerate() {
                let hamming = (frame ^ code).count_ones();
                if hamming <= max_errors && best.map_or(true, |b| hamming < b.hamming) {
                    best = Some(CodeMatch {
                        id: id as u16,
                        hamming,
                        rotation,
                    });
                }
            }
            frame = rotate_frame(frame, n);
        }
        best
    }

    /// Render marker `id` as a `(n + 2) · cell_px` square image, black
    /// border included.
    pub fn draw_marker(&self, id: u16, cell_px: u32) -> Option<GrayImage> {
        let code = self.code(id)?;
        let n = self.marker_bits as u32;
        let cells = n + 2;
        let cell_px = cell_px.max(1);
        Some(GrayImage::from_fn(cells * cell_px, cells * cell_px, |x, y| {
            let (cx, cy) = (x / cell_px, y / cell_px);
            let white = (1..=n).contains(&cx)
                && (1..=n).contains(&cy)
                && (code >> ((cy - 1) * n + (cx - 1))) & 1 == 1;
            Luma([if white { 255 } else { 0 }])
        }))
    }
}

/// Re-index an `n × n` bit grid as seen from the next corner clockwise.
///
/// The new origin is the old top-right corner, so
/// `new(x, y) = old(n - 1 - y, x)`.
pub fn rotate_frame(bits: u64, n: usize) -> u64 {
    let mut out = 0u64;
    for y in 0..n {
        for x in 0..n {
            if (bits >> (x * n + (n - 1 - y))) & 1 == 1 {
                out |= 1 << (y * n + x);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_dictionary_is_four_by_four_fifty() {
        assert_eq!(ARUCO_4X4_50.name, "4X4_50");
        assert_eq!(ARUCO_4X4_50.marker_bits, 4);
        assert_eq!(ARUCO_4X4_50.len(), 50);
        assert!(ARUCO_4X4_50.code(50).is_none());
    }

    #[test]
    fn four_rotations_are_identity() {
        let mut bits = 0x4cad;
        for _ in 0..4 {
            bits = rotate_frame(bits, 4);
        }
        assert_eq!(bits, 0x4cad);
        assert_ne!(rotate_frame(0x4cad, 4), 0x4cad);
    }

    #[test]
    fn rotate_frame_moves_top_right_to_origin() {
        // only the top-right cell (x = 3, y = 0) set
        let bits = 1u64 << 3;
        assert_eq!(rotate_frame(bits, 4), 1);
    }

    #[test]
    fn identify_reports_rotation() {
        let code = ARUCO_4X4_50.code(7).unwrap();
        let m = ARUCO_4X4_50.identify(code, 0).unwrap();
        assert_eq!(m, CodeMatch { id: 7, hamming: 0, rotation: 0 });

        // bits sampled from a frame one step counter-clockwise of the true one
        let mut sampled = code;
        for _ in 0..3 {
            sampled = rotate_frame(sampled, 4);
        }
        let m = ARUCO_4X4_50.identify(sampled, 0).unwrap();
        assert_eq!((m.id, m.rotation), (7, 1));
    }

    #[test]
    fn identify_respects_error_budget() {
        let corrupted = ARUCO_4X4_50.code(0).unwrap() ^ 0b1;
        assert!(ARUCO_4X4_50.identify(corrupted, 0).is_none());
        let m = ARUCO_4X4_50.identify(corrupted, 1).unwrap();
        assert_eq!((m.id, m.hamming), (0, 1));
    }

    #[test]
    fn drawn_marker_has_black_border_and_payload() {
        let img = ARUCO_4X4_50.draw_marker(0, 10).unwrap();
        assert_eq!(img.dimensions(), (60, 60));
        assert_eq!(img.get_pixel(5, 5).0, [0]);
        assert_eq!(img.get_pixel(55, 30).0, [0]);
        // 0x4cad: bit 0 set -> payload cell (0, 0) is white
        assert_eq!(img.get_pixel(15, 15).0, [255]);
        // bit 1 clear -> payload cell (1, 0) is black
        assert_eq!(img.get_pixel(25, 15).0, [0]);
        assert!(ARUCO_4X4_50.draw_marker(50, 10).is_none());
    }
}
