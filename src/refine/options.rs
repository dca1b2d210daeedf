use crate::edges::GradientKernel;
use serde::Deserialize;

/// Parameters of the iterative subpixel corner refinement.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SubPixOptions {
    /// Half side of the search window; the window spans `2·half_window + 1`
    /// pixels per axis.
    pub half_window: usize,
    /// Half side of the central dead zone excluded from the sums; negative
    /// disables it.
    pub zero_zone: i32,
    /// Iteration cap.
    pub max_iters: usize,
    /// Stop once a step moves the corner by less than this (px).
    pub epsilon: f32,
    /// Derivative kernel applied to the resampled window.
    pub gradient: GradientKernel,
}

impl Default for SubPixOptions {
    fn default() -> Self {
        Self {
            half_window: 5,
            zero_zone: -1,
            max_iters: 30,
            epsilon: 0.001,
            gradient: GradientKernel::Central,
        }
    }
}
