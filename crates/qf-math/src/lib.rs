//! # qf-math
//!
//! Mathematical utilities for quantfd: bounded log grids, the transformed
//! grid used by PDE operator builders, the `SampledCurve` (grid, values)
//! container, and normal distribution helpers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Normal distribution helpers (pdf / cdf).
pub mod distributions;

/// Grid construction and log-transformed grid spacing.
pub mod grid;

/// A sampled (grid, values) curve with center accessors.
pub mod sampled_curve;

pub use distributions::{normal_cdf, normal_pdf};
pub use grid::{bounded_log_grid, LogGrid, TransformedGrid};
pub use sampled_curve::SampledCurve;
