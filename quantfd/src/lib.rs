//! # quantfd
//!
//! Finite-difference and lattice option-pricing methods in Rust.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `qf-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! quantfd = "0.1"
//! ```
//!
//! ```rust
//! use std::sync::Arc;
//! use quantfd::instruments::{Exercise, OptionType, PlainVanillaPayoff, VanillaOption};
//!
//! let option = VanillaOption::new(
//!     Arc::new(PlainVanillaPayoff::new(OptionType::Put, 40.0)),
//!     Exercise::european(1.0),
//! );
//! assert_eq!(option.payoff.strike(), 40.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use qf_core as core;

/// Mathematical utilities: grids, sampled curves, distributions.
pub use qf_math as math;

/// Term structure implementations.
pub use qf_termstructures as termstructures;

/// Stochastic process definitions.
pub use qf_processes as processes;

/// Payoffs, exercises, and pricing results.
pub use qf_instruments as instruments;

/// Numerical methods (finite differences, lattices).
pub use qf_methods as methods;

/// Pricing engines.
pub use qf_pricingengines as pricingengines;
