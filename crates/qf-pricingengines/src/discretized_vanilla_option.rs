//! Vanilla option discretized on a lattice.

use std::sync::Arc;

use qf_core::{Real, Size, Time};
use qf_instruments::{Exercise, StrikedPayoff};
use qf_methods::lattices::DiscretizedAsset;

const TIME_TOLERANCE: Real = 1e-9;

/// A vanilla option priced by backward induction.
///
/// Terminal values are the payoff sampled on the final time slice; for
/// early-exercise schedules the post-adjustment clamps every eligible
/// slice to intrinsic value.
#[derive(Debug)]
pub struct DiscretizedVanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    time: Time,
    values: Vec<Real>,
}

impl DiscretizedVanillaOption {
    /// Create the discretized option; values are set by the lattice's
    /// `initialize`.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            payoff,
            exercise,
            time: 0.0,
            values: vec![],
        }
    }

    fn exercisable_now(&self) -> bool {
        match &self.exercise {
            // terminal payoff is set at reset, nothing to clamp afterwards
            Exercise::European { .. } => false,
            Exercise::American { earliest, latest } => {
                self.time >= *earliest - TIME_TOLERANCE && self.time <= *latest + TIME_TOLERANCE
            }
            Exercise::Bermudan { times } => times
                .iter()
                .any(|&t| (t - self.time).abs() < TIME_TOLERANCE),
        }
    }
}

impl DiscretizedAsset for DiscretizedVanillaOption {
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
        self.values = grid.iter().map(|&s| self.payoff.value(s)).collect();
    }

    fn mandatory_times(&self) -> Vec<Time> {
        self.exercise.stopping_times()
    }

    fn post_adjust_values(&mut self, grid: &[Real]) {
        if !self.exercisable_now() {
            return;
        }
        for (v, &s) in self.values.iter_mut().zip(grid.iter()) {
            *v = v.max(self.payoff.value(s));
        }
    }
}
