//! `StochasticProcess1D` — base trait for 1-D stochastic processes.
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift (`μ`),
//! diffusion (`σ`), and the derived moments over a short interval.

use qf_core::{Real, Time};

/// A 1-dimensional stochastic process `dX = μ(t,X) dt + σ(t,X) dW`.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// Expected value `E[x(t+Δt) | x(t) = x]`.
    ///
    /// Default: first-order Euler `x + μ(t,x)·Δt`.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// Standard deviation `σ(t,x) · √Δt`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.diffusion(t, x) * dt.sqrt()
    }

    /// Variance of the process over `Δt`.
    fn variance(&self, t: Time, x: Real, dt: Time) -> Real {
        let s = self.diffusion(t, x);
        s * s * dt
    }

    /// Euler step: `E + σ·√Δt · dw`.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw
    }
}
