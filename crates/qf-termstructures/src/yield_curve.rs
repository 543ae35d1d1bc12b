//! Yield term structures.

use qf_core::{DiscountFactor, Rate, Real, Time};

/// A yield term structure consumed as discount-factor / rate lookups.
pub trait YieldTermStructure: std::fmt::Debug + Send + Sync {
    /// Discount factor for maturity `t` (in years).
    fn discount(&self, t: Time) -> DiscountFactor;

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate;

    /// Instantaneous forward rate at `t`.
    ///
    /// Default: finite-difference of the log discount over a short interval.
    fn forward_rate(&self, t: Time) -> Rate {
        let dt = 0.0001;
        let t = t.max(0.0);
        (self.discount(t) / self.discount(t + dt)).ln() / dt
    }
}

/// A flat (constant) forward-rate yield term structure.
///
/// Discount factors are `P(t) = exp(-r·t)` with `r` the continuously
/// compounded flat rate.
#[derive(Debug, Clone)]
pub struct FlatForward {
    rate: Rate,
}

impl FlatForward {
    /// Create a flat curve with a continuously-compounded rate.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// The flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl YieldTermStructure for FlatForward {
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }

    fn zero_rate(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate(&self, _t: Time) -> Rate {
        self.rate
    }
}
