//! Curve synthesis: spline fitting and dateline segmentation
//!
//! Line generators produce ordered anchor points; this module turns them
//! into dense, smooth and antimeridian-safe polylines.

pub mod dateline;
pub mod fitter;
pub mod spline;

pub use dateline::{split_dateline, DatelineSegmenter};
pub use fitter::{CurveFitter, FittedCurve};
pub use spline::{Boundary, CubicSpline, SplineError};
