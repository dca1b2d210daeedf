//! Square fiducial marker detector.
//!
//! Overview
//! - Binarizes the grayscale image with an inverted local-mean threshold at
//!   several window sizes (in parallel).
//! - Traces the outer border of every dark connected component and keeps
//!   contours whose length is plausible for a marker.
//! - Approximates each contour by a polygon and keeps convex quadrilaterals
//!   with reasonable sides that stay clear of the image border, ordered
//!   clockwise on screen.
//! - Drops near-duplicate quads found by different threshold passes.
//! - Rectifies each candidate into a small patch, reads the cell grid and
//!   identifies the code in all four frame rotations.
//!
//! Modules
//! - [`params`] – tunable thresholds of every stage.
//! - `pipeline` – the [`MarkerDetector`] implementation.
//! - `decode` – bit extraction and dictionary lookup for one candidate.

mod decode;
pub mod params;
mod pipeline;

pub use params::DetectorParams;
pub use pipeline::{DetectionStats, MarkerDetector};
