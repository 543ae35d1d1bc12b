//! Recombining binomial trees.
//!
//! All seven classical variants:
//!
//! | Variant | Type | Reference |
//! |---|---|---|
//! | [`BinomialTree::jarrow_rudd`] | Equal probabilities | Jarrow & Rudd (1983) |
//! | [`BinomialTree::cox_ross_rubinstein`] | Equal jumps | Cox, Ross & Rubinstein (1979) |
//! | [`BinomialTree::additive_eqp`] | Equal probabilities | Additive EQP |
//! | [`BinomialTree::trigeorgis`] | Equal jumps | Trigeorgis (1991) |
//! | [`BinomialTree::tian`] | Multiplicative | Tian (1993) |
//! | [`BinomialTree::leisen_reimer`] | Multiplicative | Leisen & Reimer (1996) |
//! | [`BinomialTree::joshi4`] | Multiplicative | Joshi (2008) |
//!
//! Every constructor validates its up-probability into `[0, 1]` and returns
//! `Error::InvalidProbability` otherwise.

use qf_core::{ensure, Error, Real, Result, Size, Time};
use qf_processes::StochasticProcess1D;

use super::tree::Tree;

/// The kind of underlying model for node values.
#[derive(Debug, Clone)]
enum UnderlyingKind {
    /// `x0 * exp(i * drift_per_step + (2j − i) * step)`
    ///
    /// Used by equal-probability (JR, AdditiveEQP) and equal-jump
    /// (CRR, Trigeorgis) trees.
    LogSpace { step: Real },
    /// `x0 * down^(i − j) * up^j`
    ///
    /// Used by multiplicative trees (Tian, Leisen-Reimer, Joshi4).
    Multiplicative { up: Real, down: Real },
}

/// Selects a binomial tree construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinomialVariant {
    /// Cox-Ross-Rubinstein (equal jumps).
    CoxRossRubinstein,
    /// Jarrow-Rudd (equal probabilities).
    JarrowRudd,
    /// Additive equal-probabilities.
    AdditiveEqp,
    /// Trigeorgis (additive equal jumps).
    Trigeorgis,
    /// Tian third-moment matching.
    Tian,
    /// Leisen-Reimer (strike-centered, Peizer-Pratt method 2).
    LeisenReimer,
    /// Joshi fourth-order (strike-centered).
    Joshi4,
}

impl BinomialVariant {
    /// Build a tree of this variant. `strike` is used only by the
    /// strike-centered variants (Leisen-Reimer, Joshi4).
    pub fn build(
        self,
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
        strike: Real,
    ) -> Result<BinomialTree> {
        match self {
            BinomialVariant::CoxRossRubinstein => {
                BinomialTree::cox_ross_rubinstein(process, end, steps)
            }
            BinomialVariant::JarrowRudd => BinomialTree::jarrow_rudd(process, end, steps),
            BinomialVariant::AdditiveEqp => BinomialTree::additive_eqp(process, end, steps),
            BinomialVariant::Trigeorgis => BinomialTree::trigeorgis(process, end, steps),
            BinomialVariant::Tian => BinomialTree::tian(process, end, steps),
            BinomialVariant::LeisenReimer => {
                BinomialTree::leisen_reimer(process, end, steps, strike)
            }
            BinomialVariant::Joshi4 => BinomialTree::joshi4(process, end, steps, strike),
        }
    }
}

/// A recombining binomial tree approximating a 1-D stochastic process.
///
/// The tree has `steps + 1` time layers, with layer `i` having `i + 1` nodes.
/// Node `(i, j)` represents the state after `j` up-moves and `i − j`
/// down-moves.
#[derive(Debug, Clone)]
pub struct BinomialTree {
    x0: Real,
    dt: Time,
    steps: Size,
    drift_per_step: Real,
    underlying: UnderlyingKind,
    pu: Real,
    pd: Real,
}

impl BinomialTree {
    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Time increment per step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Initial underlying value (spot price).
    pub fn x0(&self) -> Real {
        self.x0
    }

    /// Up-branch probability.
    pub fn pu(&self) -> Real {
        self.pu
    }

    /// Down-branch probability.
    pub fn pd(&self) -> Real {
        self.pd
    }

    // ── Named constructors ───────────────────────────────────────────────

    /// Jarrow-Rudd tree (equal probabilities).
    ///
    /// `p_up = p_down = 0.5`, step size `= σ √Δt`.
    pub fn jarrow_rudd(
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
    ) -> Result<Self> {
        let p = LogParams::from(process, end, steps)?;
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps,
            drift_per_step: p.drift_per_step,
            underlying: UnderlyingKind::LogSpace { step: p.std_dev },
            pu: 0.5,
            pd: 0.5,
        })
    }

    /// Cox-Ross-Rubinstein tree (equal jumps).
    ///
    /// `dx = σ √Δt`, `p_up = ½ + ½ μΔt / dx`. Drift is captured entirely by
    /// the probabilities, not in node values.
    pub fn cox_ross_rubinstein(
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
    ) -> Result<Self> {
        let p = LogParams::from(process, end, steps)?;
        let dx = p.std_dev;
        let pu = 0.5 + 0.5 * p.drift_per_step / dx;
        check_probability(pu, "Cox-Ross-Rubinstein up probability; try more steps")?;
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps,
            drift_per_step: 0.0,
            underlying: UnderlyingKind::LogSpace { step: dx },
            pu,
            pd: 1.0 - pu,
        })
    }

    /// Additive equal-probabilities tree.
    ///
    /// `p_up = p_down = 0.5`, step size chosen to match variance.
    pub fn additive_eqp(
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
    ) -> Result<Self> {
        let p = LogParams::from(process, end, steps)?;
        let var = log_variance(process, p.dt);
        let dps = p.drift_per_step;
        let up = -0.5 * dps + 0.5 * (4.0 * var - 3.0 * dps * dps).sqrt();
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps,
            drift_per_step: dps,
            underlying: UnderlyingKind::LogSpace { step: up },
            pu: 0.5,
            pd: 0.5,
        })
    }

    /// Trigeorgis tree (additive equal jumps).
    ///
    /// `dx = √(σ²Δt + μ²Δt²)`, `p_up = ½ + ½ μΔt / dx`.
    pub fn trigeorgis(
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
    ) -> Result<Self> {
        let p = LogParams::from(process, end, steps)?;
        let var = log_variance(process, p.dt);
        let dps = p.drift_per_step;
        let dx = (var + dps * dps).sqrt();
        let pu = 0.5 + 0.5 * dps / dx;
        check_probability(pu, "Trigeorgis up probability")?;
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps,
            drift_per_step: 0.0,
            underlying: UnderlyingKind::LogSpace { step: dx },
            pu,
            pd: 1.0 - pu,
        })
    }

    /// Tian tree: third-moment matching, multiplicative.
    pub fn tian(process: &dyn StochasticProcess1D, end: Time, steps: Size) -> Result<Self> {
        let p = LogParams::from(process, end, steps)?;
        let var = log_variance(process, p.dt);
        let q = var.exp(); // exp(σ²Δt)
        let r_m = p.drift_per_step.exp() * q.sqrt(); // exp((r-q)Δt)
        let root = (q * q + 2.0 * q - 3.0).sqrt();
        let up = 0.5 * r_m * q * (q + 1.0 + root);
        let down = 0.5 * r_m * q * (q + 1.0 - root);
        let pu = (r_m - down) / (up - down);
        check_probability(pu, "Tian up probability")?;
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps,
            drift_per_step: p.drift_per_step,
            underlying: UnderlyingKind::Multiplicative { up, down },
            pu,
            pd: 1.0 - pu,
        })
    }

    /// Leisen-Reimer tree: multiplicative, strike-centered.
    ///
    /// Uses the Peizer-Pratt method 2 inversion for improved convergence;
    /// the step count is forced odd.
    pub fn leisen_reimer(
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
        strike: Real,
    ) -> Result<Self> {
        let (p, total_var, d2) = strike_centered_params(process, end, steps, strike)?;
        let odd_steps = p.steps;
        let ermqdt = (p.drift_per_step + 0.5 * total_var / odd_steps as Real).exp();
        let pu = peizer_pratt_2(d2, odd_steps);
        check_probability(pu, "Leisen-Reimer up probability")?;
        let pdash = peizer_pratt_2(d2 + total_var.sqrt(), odd_steps);
        let up = ermqdt * pdash / pu;
        let down = (ermqdt - pu * up) / (1.0 - pu);
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps: odd_steps,
            drift_per_step: p.drift_per_step,
            underlying: UnderlyingKind::Multiplicative { up, down },
            pu,
            pd: 1.0 - pu,
        })
    }

    /// Joshi fourth-order tree: multiplicative, strike-centered.
    ///
    /// Fourth-order convergence in the number of steps; the step count is
    /// forced odd.
    pub fn joshi4(
        process: &dyn StochasticProcess1D,
        end: Time,
        steps: Size,
        strike: Real,
    ) -> Result<Self> {
        let (p, total_var, d2) = strike_centered_params(process, end, steps, strike)?;
        let odd_steps = p.steps;
        let ermqdt = (p.drift_per_step + 0.5 * total_var / odd_steps as Real).exp();
        let k = (odd_steps as Real - 1.0) / 2.0;
        let pu = joshi4_up_prob(k, d2);
        check_probability(pu, "Joshi4 up probability")?;
        let pdash = joshi4_up_prob(k, d2 + total_var.sqrt());
        let up = ermqdt * pdash / pu;
        let down = (ermqdt - pu * up) / (1.0 - pu);
        Ok(Self {
            x0: p.x0,
            dt: p.dt,
            steps: odd_steps,
            drift_per_step: p.drift_per_step,
            underlying: UnderlyingKind::Multiplicative { up, down },
            pu,
            pd: 1.0 - pu,
        })
    }
}

impl Tree for BinomialTree {
    fn branches(&self) -> Size {
        2
    }

    /// Always `i + 1` for a binomial tree.
    fn size(&self, i: Size) -> Size {
        i + 1
    }

    fn underlying(&self, i: Size, index: Size) -> Real {
        match &self.underlying {
            UnderlyingKind::LogSpace { step } => {
                let j = 2 * index as isize - i as isize;
                self.x0 * (i as Real * self.drift_per_step + j as Real * step).exp()
            }
            UnderlyingKind::Multiplicative { up, down } => {
                self.x0 * down.powi((i - index) as i32) * up.powi(index as i32)
            }
        }
    }

    /// `branch = 0` → down, `branch = 1` → up.
    fn descendant(&self, _i: Size, index: Size, branch: Size) -> Size {
        index + branch
    }

    fn probability(&self, _i: Size, _index: Size, branch: Size) -> Real {
        if branch == 1 {
            self.pu
        } else {
            self.pd
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────

/// Log-space per-step parameters extracted from a price-level process.
struct LogParams {
    x0: Real,
    dt: Time,
    steps: Size,
    drift_per_step: Real,
    std_dev: Real,
}

impl LogParams {
    fn from(process: &dyn StochasticProcess1D, end: Time, steps: Size) -> Result<Self> {
        ensure!(end > 0.0, "tree end time ({end}) must be positive");
        ensure!(steps >= 1, "tree needs at least one step");
        let x0 = process.x0();
        ensure!(x0 > 0.0, "non-positive initial value ({x0})");
        let dt = end / steps as Real;
        // the process models S directly; dividing by x0 gives log-space terms
        let drift_per_step = process.drift(0.0, x0) * dt / x0;
        let std_dev = process.std_deviation(0.0, x0, dt) / x0;
        Ok(Self {
            x0,
            dt,
            steps,
            drift_per_step,
            std_dev,
        })
    }
}

/// Log-space variance per step: `σ²·Δt`.
fn log_variance(process: &dyn StochasticProcess1D, dt: Time) -> Real {
    let x0 = process.x0();
    process.variance(0.0, x0, dt) / (x0 * x0)
}

/// Shared setup for the strike-centered variants: odd step count,
/// total log variance, and the `d2` quantile against the strike.
fn strike_centered_params(
    process: &dyn StochasticProcess1D,
    end: Time,
    steps: Size,
    strike: Real,
) -> Result<(LogParams, Real, Real)> {
    ensure!(strike > 0.0, "strike ({strike}) must be positive");
    let odd_steps = if steps % 2 != 0 { steps } else { steps + 1 };
    let p = LogParams::from(process, end, odd_steps)?;
    let x0 = p.x0;
    let total_var = process.variance(0.0, x0, end) / (x0 * x0);
    let d2 = ((x0 / strike).ln() + p.drift_per_step * odd_steps as Real) / total_var.sqrt();
    Ok((p, total_var, d2))
}

fn check_probability(pu: Real, context: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&pu) {
        return Err(Error::InvalidProbability {
            value: pu,
            context: context.to_string(),
        });
    }
    Ok(())
}

/// Peizer-Pratt method 2 inversion.
///
/// Maps a normal quantile `z` to a probability for an odd `n`-step binomial
/// approximation.
fn peizer_pratt_2(z: Real, n: Size) -> Real {
    let nf = n as Real;
    let r = z / (nf + 1.0 / 3.0 + 0.1 / (nf + 1.0));
    let ex = (-r * r * (nf + 1.0 / 6.0)).exp();
    0.5 + z.signum() * 0.5 * (1.0 - ex).sqrt()
}

/// Joshi fourth-order up-probability (higher-order Peizer-Pratt correction).
fn joshi4_up_prob(k: Real, dj: Real) -> Real {
    let alpha = dj / (8.0_f64).sqrt();
    let alpha2 = alpha * alpha;
    let alpha3 = alpha * alpha2;
    let alpha5 = alpha3 * alpha2;
    let alpha7 = alpha5 * alpha2;
    let beta = -0.375 * alpha - alpha3;
    let gamma = (5.0 / 6.0) * alpha5 + (13.0 / 12.0) * alpha3 + (25.0 / 128.0) * alpha;
    let delta = -0.1025 * alpha - 0.9285 * alpha3 - 1.43 * alpha5 - 0.5 * alpha7;
    let rootk = k.sqrt();
    let mut p = 0.5;
    p += alpha / rootk;
    p += beta / (k * rootk);
    p += gamma / (k * k * rootk);
    p += delta / (k * k * k * rootk);
    p
}

// ─── Tests ────────────────────────────────────────────────────────────────
