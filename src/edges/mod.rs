//! Image gradient kernels.
//!
//! The corner refiner differentiates small resampled tiles around each
//! corner; this module keeps the kernels and the border-clamped convolution
//! in one place.

pub mod grad;

pub use grad::{gradients, sobel_gradients, Grad, GradientKernel};
