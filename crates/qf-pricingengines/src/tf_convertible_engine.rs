//! Tsiveriotis-Fernandes engine for convertible bonds.

use std::sync::Arc;

use qf_core::{ensure, Result};
use qf_instruments::OneAssetResults;
use qf_methods::lattices::{BinomialTree, DiscretizedAsset, TsiveriotisFernandesLattice};
use qf_processes::GeneralizedBlackScholesProcess;

use crate::discretized_convertible::{ConvertibleBond, DiscretizedConvertible};

/// Prices convertible bonds on a Cox-Ross-Rubinstein tree with the
/// Tsiveriotis-Fernandes coupled rollback: node values split between an
/// equity-like part discounted risk-free and a debt-like part discounted
/// at the issuer's risky rate, weighted by the conversion probability.
#[derive(Debug)]
pub struct TsiveriotisFernandesEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    steps: usize,
}

impl TsiveriotisFernandesEngine {
    /// Create an engine building `steps`-step trees.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>, steps: usize) -> Self {
        Self { process, steps }
    }

    /// Price the bond.
    pub fn calculate(&self, bond: &ConvertibleBond) -> Result<OneAssetResults> {
        ensure!(
            bond.maturity > 0.0,
            "non-positive bond maturity ({})",
            bond.maturity
        );
        ensure!(
            bond.conversion_ratio >= 0.0,
            "negative conversion ratio ({})",
            bond.conversion_ratio
        );
        ensure!(
            bond.credit_spread >= 0.0,
            "negative credit spread ({})",
            bond.credit_spread
        );

        let r = self.process.risk_free_rate().zero_rate(bond.maturity);
        let tree =
            BinomialTree::cox_ross_rubinstein(self.process.as_ref(), bond.maturity, self.steps)?;
        let lattice = TsiveriotisFernandesLattice::new(
            tree,
            r,
            bond.maturity,
            self.steps,
            bond.credit_spread,
        );

        let mut asset = DiscretizedConvertible::new(bond.clone(), r);
        lattice.initialize(&mut asset, bond.maturity);
        lattice.rollback(&mut asset, 0.0);

        Ok(OneAssetResults::with_value(asset.values()[0]))
    }
}
