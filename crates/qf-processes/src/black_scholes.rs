//! Generalized Black-Scholes-Merton process.
//!
//! `dS = (r(t) - q(t) - σ²(t,S)/2) S dt + σ(t,S) S dW`
//!
//! with `r` the risk-free curve, `q` the dividend curve and `σ` the Black
//! volatility surface. Drift and diffusion are quoted at the price level;
//! consumers working in log-space divide by the asset level themselves.

use std::sync::Arc;

use qf_core::{Rate, Real, Time};
use qf_termstructures::{BlackVolTermStructure, YieldTermStructure};

use crate::stochastic_process::StochasticProcess1D;

/// The Black-Scholes-Merton process with term-structure inputs.
#[derive(Clone)]
pub struct GeneralizedBlackScholesProcess {
    x0: Real,
    risk_free: Arc<dyn YieldTermStructure>,
    dividend: Arc<dyn YieldTermStructure>,
    volatility: Arc<dyn BlackVolTermStructure>,
}

impl std::fmt::Debug for GeneralizedBlackScholesProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralizedBlackScholesProcess")
            .field("x0", &self.x0)
            .field("risk_free", &self.risk_free)
            .field("dividend", &self.dividend)
            .field("volatility", &self.volatility)
            .finish()
    }
}

impl GeneralizedBlackScholesProcess {
    /// Create a process from the spot value and its three term structures.
    pub fn new(
        x0: Real,
        risk_free: Arc<dyn YieldTermStructure>,
        dividend: Arc<dyn YieldTermStructure>,
        volatility: Arc<dyn BlackVolTermStructure>,
    ) -> Self {
        Self { x0, risk_free, dividend, volatility }
    }

    /// Risk-free term structure.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free
    }

    /// Dividend term structure.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend
    }

    /// Black volatility term structure.
    pub fn black_volatility(&self) -> &Arc<dyn BlackVolTermStructure> {
        &self.volatility
    }

    /// Local volatility at `(t, x)`; with a Black surface this is the
    /// strike-level Black vol.
    pub fn local_volatility(&self, t: Time, x: Real) -> Real {
        self.volatility.black_vol(t, x)
    }

    /// Instantaneous risk-free forward rate at `t`.
    pub fn forward_rate(&self, t: Time) -> Rate {
        self.risk_free.forward_rate(t)
    }

    /// Instantaneous dividend forward rate at `t`.
    pub fn dividend_forward_rate(&self, t: Time) -> Rate {
        self.dividend.forward_rate(t)
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let sigma = self.local_volatility(t, x);
        let r = self.risk_free.forward_rate(t);
        let q = self.dividend.forward_rate(t);
        (r - q - 0.5 * sigma * sigma) * x
    }

    fn diffusion(&self, t: Time, x: Real) -> Real {
        self.local_volatility(t, x) * x
    }
}
