//! Normal distribution helpers.
//!
//! Thin wrappers over `statrs` for the standard normal pdf and cdf used by
//! the closed-form Black-Scholes-Merton formulas.

use qf_core::Real;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

fn standard_normal() -> Normal {
    // Unit mean/variance construction cannot fail.
    Normal::new(0.0, 1.0).unwrap()
}

/// The standard normal probability density function `φ(x)`.
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    standard_normal().pdf(x)
}

/// The standard normal cumulative distribution function `Φ(x)`.
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    standard_normal().cdf(x)
}
