//! Diagnostics data model returned alongside scale estimates.
//!
//! [`EstimationReport`] bundles the user-facing [`ScaleResult`](crate::types::ScaleResult)
//! with the intermediate artifacts of each stage (detections, refined
//! corners, homography, rectified patch) and a [`TimingBreakdown`].

pub mod report;
pub mod timing;

pub use report::{EstimationReport, InputDescriptor, MarkerMeasurement};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
