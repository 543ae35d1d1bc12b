//! # qf-processes
//!
//! One-dimensional stochastic processes: the `StochasticProcess1D` trait and
//! the generalized Black-Scholes process consumed by the finite-difference
//! and lattice pricing methods.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Generalized Black-Scholes process.
pub mod black_scholes;

/// Base trait for 1-D stochastic processes.
pub mod stochastic_process;

pub use black_scholes::GeneralizedBlackScholesProcess;
pub use stochastic_process::StochasticProcess1D;
