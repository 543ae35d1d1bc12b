//! Analytic European option engine (Black-Scholes-Merton).
//!
//! Prices European vanilla options using the closed-form
//! Black-Scholes-Merton formula, producing NPV and first/second-order
//! Greeks. The step-condition finite-difference engines also use the
//! closed form as their control variate.

use std::sync::Arc;

use qf_core::{ensure, Real, Result};
use qf_instruments::{Exercise, OneAssetResults, OptionType, PricingEngine, VanillaOption};
use qf_math::{normal_cdf, normal_pdf};
use qf_processes::{GeneralizedBlackScholesProcess, StochasticProcess1D};

/// Analytic pricing engine for European vanilla options.
///
/// Implements the Black-Scholes-Merton closed-form solution:
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
#[derive(Debug)]
pub struct AnalyticEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl AnalyticEuropeanEngine {
    /// Create a new engine with the given Black-Scholes process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }
}

/// Compute Black-Scholes price and Greeks for a European option.
///
/// Returns `(price, delta, gamma, vega, theta, rho)`.
#[allow(clippy::too_many_arguments)]
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Real,
) -> (Real, Real, Real, Real, Real, Real) {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return (intrinsic, 0.0, 0.0, 0.0, 0.0, 0.0);
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = df_q * npd1 / (spot * std_dev);
    // vega per 1.0 absolute vol, theta per year, rho per 1.0 rate shift
    let vega = spot * df_q * npd1 * sqrt_t;
    let theta = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
        + phi * q * spot * df_q * nd1;
    let rho = phi * strike * t * df_r * nd2;

    (price, delta, gamma, vega, theta, rho)
}

impl PricingEngine for AnalyticEuropeanEngine {
    fn calculate(&self, option: &VanillaOption) -> Result<OneAssetResults> {
        ensure!(
            matches!(option.exercise, Exercise::European { .. }),
            "analytic engine requires European exercise"
        );
        let t = option.exercise.last_time();
        let spot = self.process.x0();
        let strike = option.payoff.strike();
        ensure!(spot > 0.0, "non-positive underlying value ({spot})");
        ensure!(strike > 0.0, "non-positive strike ({strike})");

        let r = self.process.risk_free_rate().zero_rate(t);
        let q = self.process.dividend_yield().zero_rate(t);
        let sigma = self.process.black_volatility().black_vol(t, strike);

        let (price, delta, gamma, vega, theta, rho) =
            black_scholes_merton(option.payoff.option_type(), spot, strike, r, q, sigma, t);

        Ok(OneAssetResults {
            value: price,
            delta: Some(delta),
            gamma: Some(gamma),
            theta: Some(theta),
            vega: Some(vega),
            rho: Some(rho),
            price_curve: None,
        })
    }
}
