//! Subpixel corner refinement.
//!
//! Marker corners come out of the detector as integer contour vertices, i.e.
//! the centres of the outermost dark pixels. [`refine_quad`] moves them onto
//! the intensity corner with an iterative gradient solve in a small window.

mod corner;
mod options;

pub use corner::{refine_corner, refine_quad, CornerRefinement};
pub use options::SubPixOptions;
