//! # qf-pricingengines
//!
//! Pricing engines for vanilla options and convertible bonds: the
//! closed-form Black-Scholes-Merton engine, finite-difference engines
//! (European, American, shout) on a bounded log grid, a binomial-tree
//! engine over the classical tree variants, and the Tsiveriotis-Fernandes
//! convertible engine.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Closed-form Black-Scholes-Merton engine.
pub mod analytic_european;

/// Binomial-tree vanilla engine.
pub mod binomial_vanilla_engine;

/// Convertible bond discretized for the TF lattice.
pub mod discretized_convertible;

/// Vanilla option discretized on a lattice.
pub mod discretized_vanilla_option;

/// Finite-difference European engine.
pub mod fd_european_engine;

/// Finite-difference engines with an exercise condition.
pub mod fd_step_condition_engine;

/// Shared finite-difference machinery.
pub mod fd_vanilla_engine;

/// Tsiveriotis-Fernandes convertible engine.
pub mod tf_convertible_engine;

pub use analytic_european::{black_scholes_merton, AnalyticEuropeanEngine};
pub use binomial_vanilla_engine::BinomialVanillaEngine;
pub use discretized_convertible::{ConvertibleBond, DiscretizedConvertible};
pub use discretized_vanilla_option::DiscretizedVanillaOption;
pub use fd_european_engine::FdEuropeanEngine;
pub use fd_step_condition_engine::{FdAmericanEngine, FdShoutEngine};
pub use fd_vanilla_engine::FdVanillaEngine;
pub use tf_convertible_engine::TsiveriotisFernandesEngine;
