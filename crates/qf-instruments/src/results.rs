//! Pricing results and the engine seam.

use std::sync::Arc;

use qf_core::{Real, Result};
use qf_math::SampledCurve;

use crate::exercise::Exercise;
use crate::payoff::StrikedPayoff;

/// A vanilla option: a striked payoff plus an exercise schedule.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    /// Terminal / exercise payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// Exercise schedule.
    pub exercise: Exercise,
}

impl VanillaOption {
    /// Create a vanilla option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }
}

/// Results of pricing a one-asset option.
///
/// Greeks are populated when the engine provides them; `price_curve` carries
/// the final sampled solution of grid-based engines as a diagnostic artifact.
#[derive(Debug, Clone, Default)]
pub struct OneAssetResults {
    /// Present value.
    pub value: Real,
    /// dV/dS at the spot.
    pub delta: Option<Real>,
    /// d²V/dS² at the spot.
    pub gamma: Option<Real>,
    /// dV/dt at the spot (calendar theta).
    pub theta: Option<Real>,
    /// dV/dσ at the spot.
    pub vega: Option<Real>,
    /// dV/dr at the spot.
    pub rho: Option<Real>,
    /// The solved price curve on the spatial grid, when the method has one.
    pub price_curve: Option<SampledCurve>,
}

impl OneAssetResults {
    /// A value-only result.
    pub fn with_value(value: Real) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

/// A pricing engine for one-asset options.
pub trait PricingEngine: std::fmt::Debug {
    /// Price the option, returning the value and whatever Greeks the method
    /// produces.
    fn calculate(&self, option: &VanillaOption) -> Result<OneAssetResults>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{OptionType, PlainVanillaPayoff};

    #[test]
    fn default_results_carry_no_greeks() {
        let r = OneAssetResults::with_value(4.2);
        assert_eq!(r.value, 4.2);
        assert!(r.delta.is_none());
        assert!(r.price_curve.is_none());
    }

    #[test]
    fn option_exposes_payoff_and_exercise() {
        let opt = VanillaOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 40.0)),
            Exercise::european(1.0),
        );
        assert_eq!(opt.payoff.strike(), 40.0);
        assert_eq!(opt.exercise.last_time(), 1.0);
    }
}
