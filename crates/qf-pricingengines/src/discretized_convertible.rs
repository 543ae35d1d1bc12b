//! Convertible bond discretized for the Tsiveriotis-Fernandes lattice.

use qf_core::{Rate, Real, Size, Spread, Time};
use qf_methods::lattices::{ConvertibleAsset, DiscretizedAsset};

/// Terms of a zero-coupon convertible bond.
///
/// The holder may convert into `conversion_ratio` shares at any time up to
/// maturity; otherwise the bond redeems at `redemption`.
#[derive(Debug, Clone)]
pub struct ConvertibleBond {
    /// Shares received per bond upon conversion.
    pub conversion_ratio: Real,
    /// Redemption amount at maturity.
    pub redemption: Real,
    /// Maturity, in years.
    pub maturity: Time,
    /// Issuer credit spread over the risk-free rate.
    pub credit_spread: Spread,
}

/// The bond's state on the lattice: values plus the two auxiliary arrays
/// of the Tsiveriotis-Fernandes scheme.
///
/// At reset each terminal node takes the larger of conversion and
/// redemption value; the conversion probability is 1 where conversion wins
/// and 0 otherwise, and the blended rate follows it. The adjustment pass
/// applies the conversion clamp at every slice, marking clamped nodes as
/// equity (probability 1, risk-free discounting).
#[derive(Debug)]
pub struct DiscretizedConvertible {
    bond: ConvertibleBond,
    risk_free_rate: Rate,
    time: Time,
    values: Vec<Real>,
    conversion_probability: Vec<Real>,
    spread_adjusted_rate: Vec<Rate>,
}

impl DiscretizedConvertible {
    /// Create the discretized bond; state arrays are set by the lattice's
    /// `initialize`.
    pub fn new(bond: ConvertibleBond, risk_free_rate: Rate) -> Self {
        Self {
            bond,
            risk_free_rate,
            time: 0.0,
            values: vec![],
            conversion_probability: vec![],
            spread_adjusted_rate: vec![],
        }
    }

    fn conversion_value(&self, s: Real) -> Real {
        self.bond.conversion_ratio * s
    }

    fn risky_rate(&self) -> Rate {
        self.risk_free_rate + self.bond.credit_spread
    }
}

impl DiscretizedAsset for DiscretizedConvertible {
    fn time(&self) -> Time {
        self.time
    }

    fn set_time(&mut self, t: Time) {
        self.time = t;
    }

    fn values(&self) -> &[Real] {
        &self.values
    }

    fn set_values(&mut self, values: Vec<Real>) {
        self.values = values;
    }

    fn reset(&mut self, size: Size, grid: &[Real]) {
        assert_eq!(size, grid.len(), "slice size does not match its grid");
        self.values = Vec::with_capacity(size);
        self.conversion_probability = Vec::with_capacity(size);
        self.spread_adjusted_rate = Vec::with_capacity(size);
        for &s in grid {
            let conversion = self.conversion_value(s);
            let converts = conversion > self.bond.redemption;
            self.values.push(conversion.max(self.bond.redemption));
            self.conversion_probability
                .push(if converts { 1.0 } else { 0.0 });
            self.spread_adjusted_rate.push(if converts {
                self.risk_free_rate
            } else {
                self.risky_rate()
            });
        }
    }

    fn mandatory_times(&self) -> Vec<Time> {
        vec![self.bond.maturity]
    }

    fn post_adjust_values(&mut self, grid: &[Real]) {
        // conversion clamp: a clamped node is pure equity from here on
        for (j, &s) in grid.iter().enumerate() {
            let conversion = self.conversion_value(s);
            if conversion > self.values[j] {
                self.values[j] = conversion;
                self.conversion_probability[j] = 1.0;
                self.spread_adjusted_rate[j] = self.risk_free_rate;
            }
        }
    }
}

impl ConvertibleAsset for DiscretizedConvertible {
    fn conversion_probability(&self) -> &[Real] {
        &self.conversion_probability
    }

    fn set_conversion_probability(&mut self, values: Vec<Real>) {
        self.conversion_probability = values;
    }

    fn spread_adjusted_rate(&self) -> &[Rate] {
        &self.spread_adjusted_rate
    }

    fn set_spread_adjusted_rate(&mut self, values: Vec<Rate>) {
        self.spread_adjusted_rate = values;
    }
}
