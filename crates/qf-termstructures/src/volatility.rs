//! Black volatility term structures.

use qf_core::{ensure, Real, Result, Time, Volatility};

/// A Black volatility surface consumed as vol / variance lookups.
pub trait BlackVolTermStructure: std::fmt::Debug + Send + Sync {
    /// Black volatility for maturity `t` and strike.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility;

    /// Black variance `σ²(t, K) · t`.
    fn black_variance(&self, t: Time, strike: Real) -> Real {
        let v = self.black_vol(t, strike);
        v * v * t
    }
}

/// A constant Black volatility.
#[derive(Debug, Clone)]
pub struct BlackConstantVol {
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Create a constant-vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }
}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }
}

/// A strike-independent Black variance curve, linearly interpolated in
/// total variance.
///
/// Total variance must be non-decreasing in time; a decreasing segment
/// indicates bad market data and is rejected at construction.
#[derive(Debug, Clone)]
pub struct BlackVarianceCurve {
    times: Vec<Time>,
    variances: Vec<Real>,
}

impl BlackVarianceCurve {
    /// Build from maturities (strictly increasing, positive) and the Black
    /// volatilities quoted at them.
    pub fn new(times: Vec<Time>, vols: Vec<Volatility>) -> Result<Self> {
        ensure!(
            times.len() == vols.len(),
            "mismatched times ({}) and vols ({})",
            times.len(),
            vols.len()
        );
        ensure!(!times.is_empty(), "empty variance curve");
        ensure!(times[0] > 0.0, "first maturity ({}) must be positive", times[0]);
        let mut variances = Vec::with_capacity(times.len());
        for (i, (&t, &v)) in times.iter().zip(vols.iter()).enumerate() {
            if i > 0 {
                ensure!(
                    t > times[i - 1],
                    "maturities must be increasing: {} after {}",
                    t,
                    times[i - 1]
                );
            }
            let var = v * v * t;
            if let Some(&prev) = variances.last() {
                ensure!(
                    var >= prev,
                    "decreasing total variance {var} at t={t} (previous {prev})"
                );
            }
            variances.push(var);
        }
        Ok(Self { times, variances })
    }

    fn variance_at(&self, t: Time) -> Real {
        if t <= 0.0 {
            return 0.0;
        }
        if t <= self.times[0] {
            // flat vol before the first quote
            return self.variances[0] * t / self.times[0];
        }
        let last = self.times.len() - 1;
        if t >= self.times[last] {
            // extrapolate with the last forward variance slope
            if last == 0 {
                return self.variances[0] * t / self.times[0];
            }
            let slope = (self.variances[last] - self.variances[last - 1])
                / (self.times[last] - self.times[last - 1]);
            return self.variances[last] + slope * (t - self.times[last]);
        }
        let i = self.times.iter().position(|&ti| ti >= t).unwrap();
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.variances[i - 1], self.variances[i]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }
}

impl BlackVolTermStructure for BlackVarianceCurve {
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            return (self.variances[0] / self.times[0]).sqrt();
        }
        (self.black_variance(t, strike) / t).sqrt()
    }

    fn black_variance(&self, t: Time, _strike: Real) -> Real {
        self.variance_at(t)
    }
}
