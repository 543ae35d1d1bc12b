//! # qf-instruments
//!
//! Option payoffs, exercise schedules, and the pricing-result container
//! shared by the numerical engines.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Exercise schedules (European, American, Bermudan).
pub mod exercise;

/// Payoff definitions.
pub mod payoff;

/// Pricing results and the engine trait.
pub mod results;

pub use exercise::Exercise;
pub use payoff::{OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
pub use results::{OneAssetResults, PricingEngine, VanillaOption};
