//! Tsiveriotis-Fernandes lattice for convertible bonds.
//!
//! The scheme rolls two quantities back together: the bond value and the
//! probability that the bond ends up converted. The discount rate at each
//! node blends the risk-free rate (equity-like part) with the risky rate
//! `r + spread` (debt-like part), weighted by the conversion probability
//! computed at that same step.

use qf_core::{Rate, Real, Size, Spread, Time};

use super::discretized_asset::DiscretizedAsset;
use super::time_grid::TimeGrid;
use super::tree::Tree;

const TIME_TOLERANCE: Real = 1e-9;

/// A discretized asset carrying the two auxiliary arrays of the
/// Tsiveriotis-Fernandes scheme.
pub trait ConvertibleAsset: DiscretizedAsset {
    /// Probability of conversion per node.
    fn conversion_probability(&self) -> &[Real];

    /// Replace the conversion probabilities.
    fn set_conversion_probability(&mut self, values: Vec<Real>);

    /// Blended discount rate per node.
    fn spread_adjusted_rate(&self) -> &[Rate];

    /// Replace the blended discount rates.
    fn set_spread_adjusted_rate(&mut self, values: Vec<Rate>);
}

/// The Tsiveriotis-Fernandes backward-induction lattice.
#[derive(Debug, Clone)]
pub struct TsiveriotisFernandesLattice<T: Tree> {
    tree: T,
    risk_free_rate: Rate,
    credit_spread: Spread,
    dt: Time,
    time_grid: TimeGrid,
    pd: Real,
    pu: Real,
}

impl<T: Tree> TsiveriotisFernandesLattice<T> {
    /// Create a lattice from a binomial-style tree, a flat risk-free rate,
    /// and the issuer credit spread.
    pub fn new(
        tree: T,
        risk_free_rate: Rate,
        end: Time,
        steps: Size,
        credit_spread: Spread,
    ) -> Self {
        assert!(credit_spread >= 0.0, "negative credit spread {credit_spread}");
        let pd = tree.probability(0, 0, 0);
        let pu = tree.probability(0, 0, 1);
        Self {
            tree,
            risk_free_rate,
            credit_spread,
            dt: end / steps as Real,
            time_grid: TimeGrid::uniform(end, steps),
            pd,
            pu,
        }
    }

    /// The tree.
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// The time grid.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// The issuer credit spread.
    pub fn credit_spread(&self) -> Spread {
        self.credit_spread
    }

    /// Underlying levels of the time slice at `t`.
    pub fn grid(&self, t: Time) -> Vec<Real> {
        let i = self.time_grid.index_of(t);
        (0..self.tree.size(i))
            .map(|j| self.tree.underlying(i, j))
            .collect()
    }

    /// Set the asset to time `t` and initialize its terminal state there.
    pub fn initialize(&self, asset: &mut dyn ConvertibleAsset, t: Time) {
        let i = self.time_grid.index_of(t);
        asset.set_time(t);
        asset.reset(self.tree.size(i), &self.grid(t));
    }

    /// One coupled backward step over slice `i`.
    ///
    /// The conversion probability is rolled first; the blended rate for the
    /// node is computed from the just-updated probability, while the value
    /// is discounted branch-wise at the descendants' blended rates.
    pub fn stepback(
        &self,
        i: Size,
        values: &[Real],
        conversion_prob: &[Real],
        spread_adjusted_rate: &[Rate],
    ) -> (Vec<Real>, Vec<Real>, Vec<Rate>) {
        let n = self.tree.size(i);
        let mut new_values = vec![0.0; n];
        let mut new_conversion = vec![0.0; n];
        let mut new_rates = vec![0.0; n];
        for j in 0..n {
            let down = self.tree.descendant(i, j, 0);
            let up = self.tree.descendant(i, j, 1);

            new_conversion[j] = self.pd * conversion_prob[down] + self.pu * conversion_prob[up];
            new_rates[j] = new_conversion[j] * self.risk_free_rate
                + (1.0 - new_conversion[j]) * (self.risk_free_rate + self.credit_spread);

            new_values[j] = self.pd * values[down] / (1.0 + spread_adjusted_rate[down] * self.dt)
                + self.pu * values[up] / (1.0 + spread_adjusted_rate[up] * self.dt);
        }
        (new_values, new_conversion, new_rates)
    }

    /// Roll the asset back to `to`, adjusting at every intermediate slice
    /// and once more at arrival.
    pub fn rollback(&self, asset: &mut dyn ConvertibleAsset, to: Time) {
        self.partial_rollback(asset, to);
        let grid = self.grid(asset.time());
        asset.adjust_values(&grid);
    }

    /// Roll the asset back to `to` without the final adjustment.
    pub fn partial_rollback(&self, asset: &mut dyn ConvertibleAsset, to: Time) {
        let from = asset.time();
        if (from - to).abs() < TIME_TOLERANCE {
            return;
        }
        assert!(from > to, "trying to roll back from {from} to {to}");
        let i_from = self.time_grid.index_of(from);
        let i_to = self.time_grid.index_of(to);

        for i in (i_to..i_from).rev() {
            let (values, conversion, rates) = self.stepback(
                i,
                asset.values(),
                asset.conversion_probability(),
                asset.spread_adjusted_rate(),
            );
            asset.set_time(self.time_grid.time(i));
            asset.set_values(values);
            asset.set_conversion_probability(conversion);
            asset.set_spread_adjusted_rate(rates);
            if i != i_to {
                let grid = self.grid(self.time_grid.time(i));
                asset.adjust_values(&grid);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattices::binomial_tree::BinomialTree;
    use approx::assert_abs_diff_eq;
    use qf_processes::GeneralizedBlackScholesProcess;
    use qf_termstructures::{BlackConstantVol, FlatForward};
    use std::sync::Arc;

    struct PlainConvertible {
        time: Time,
        values: Vec<Real>,
        conversion: Vec<Real>,
        rates: Vec<Rate>,
        terminal_conversion: Real,
    }

    impl DiscretizedAsset for PlainConvertible {
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
        fn reset(&mut self, size: Size, _grid: &[Real]) {
            self.values = vec![1.0; size];
            self.conversion = vec![self.terminal_conversion; size];
            self.rates = vec![0.0; size];
        }
        fn mandatory_times(&self) -> Vec<Time> {
            vec![]
        }
    }

    impl ConvertibleAsset for PlainConvertible {
        fn conversion_probability(&self) -> &[Real] {
            &self.conversion
        }
        fn set_conversion_probability(&mut self, values: Vec<Real>) {
            self.conversion = values;
        }
        fn spread_adjusted_rate(&self) -> &[Rate] {
            &self.rates
        }
        fn set_spread_adjusted_rate(&mut self, values: Vec<Rate>) {
            self.rates = values;
        }
    }

    fn lattice(spread: Spread, steps: Size) -> TsiveriotisFernandesLattice<BinomialTree> {
        let process = GeneralizedBlackScholesProcess::new(
            100.0,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(BlackConstantVol::new(0.20)),
        );
        let tree = BinomialTree::cox_ross_rubinstein(&process, 1.0, steps).unwrap();
        TsiveriotisFernandesLattice::new(tree, 0.05, 1.0, steps, spread)
    }

    fn roll_unit_cash_flow(spread: Spread, terminal_conversion: Real, steps: Size) -> Real {
        let lat = lattice(spread, steps);
        let mut asset = PlainConvertible {
            time: 0.0,
            values: vec![],
            conversion: vec![],
            rates: vec![],
            terminal_conversion,
        };
        lat.initialize(&mut asset, 1.0);
        // terminal blended rate follows the terminal conversion probability
        let r = terminal_conversion * 0.05 + (1.0 - terminal_conversion) * (0.05 + spread);
        asset.rates = vec![r; asset.values.len()];
        lat.rollback(&mut asset, 0.0);
        asset.values[0]
    }

    #[test]
    fn fully_converted_bond_discounts_at_the_risk_free_rate() {
        let steps = 100;
        let value = roll_unit_cash_flow(0.03, 1.0, steps);
        let dt = 1.0 / steps as Real;
        let expected = (1.0 / (1.0 + 0.05 * dt)).powi(steps as i32);
        assert_abs_diff_eq!(value, expected, epsilon = 1e-10);
    }

    #[test]
    fn pure_debt_discounts_at_the_risky_rate() {
        let steps = 100;
        let value = roll_unit_cash_flow(0.03, 0.0, steps);
        let dt = 1.0 / steps as Real;
        let expected = (1.0 / (1.0 + 0.08 * dt)).powi(steps as i32);
        assert_abs_diff_eq!(value, expected, epsilon = 1e-10);
    }

    #[test]
    fn blended_value_sits_between_the_pure_cases() {
        let steps = 50;
        let debt = roll_unit_cash_flow(0.03, 0.0, steps);
        let equity = roll_unit_cash_flow(0.03, 1.0, steps);
        let mixed = roll_unit_cash_flow(0.03, 0.5, steps);
        assert!(debt < mixed && mixed < equity, "{debt} < {mixed} < {equity}");
    }

    #[test]
    fn conversion_probability_rolls_as_an_expectation() {
        let lat = lattice(0.02, 10);
        let mut asset = PlainConvertible {
            time: 0.0,
            values: vec![],
            conversion: vec![],
            rates: vec![],
            terminal_conversion: 0.7,
        };
        lat.initialize(&mut asset, 1.0);
        asset.rates = vec![0.05; asset.values.len()];
        lat.rollback(&mut asset, 0.0);
        // constant terminal probability is a martingale under (pd, pu)
        assert_abs_diff_eq!(asset.conversion[0], 0.7, epsilon = 1e-12);
    }
}
