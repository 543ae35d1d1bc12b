//! # qf-termstructures
//!
//! Yield and Black volatility term structures, indexed directly by year
//! fraction. Calendar and date arithmetic live outside this workspace;
//! every lookup takes a `Time` already measured from the valuation date.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Black volatility term structures.
pub mod volatility;

/// Yield (discount) term structures.
pub mod yield_curve;

pub use volatility::{BlackConstantVol, BlackVarianceCurve, BlackVolTermStructure};
pub use yield_curve::{FlatForward, YieldTermStructure};
