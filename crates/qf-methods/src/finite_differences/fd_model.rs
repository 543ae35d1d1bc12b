//! Backward-in-time rollback of a solution array across stopping times.

use qf_core::{Real, Result, Time};

use super::mixed_scheme::MixedScheme;
use super::step_condition::StepCondition;

/// Rolls a solution array backward through time with a theta-scheme evolver,
/// landing exactly on every stopping time so the step condition can be
/// applied there.
#[derive(Debug, Clone)]
pub struct FiniteDifferenceModel {
    evolver: MixedScheme,
    stopping_times: Vec<Time>,
}

impl FiniteDifferenceModel {
    /// Create a model from an evolver and the stopping times that must be
    /// hit exactly. The times are sorted ascending and deduplicated.
    pub fn new(evolver: MixedScheme, mut stopping_times: Vec<Time>) -> Self {
        stopping_times.sort_by(|a, b| a.total_cmp(b));
        stopping_times.dedup();
        Self {
            evolver,
            stopping_times,
        }
    }

    /// The evolver.
    pub fn evolver(&self) -> &MixedScheme {
        &self.evolver
    }

    /// Roll `a` backward from `from` to `to` in `steps` uniform steps,
    /// applying `condition` at the end of every step and at every stopping
    /// time inside the interval.
    ///
    /// # Panics
    ///
    /// Panics unless `from > to` (rollback direction only).
    pub fn rollback(
        &mut self,
        a: &mut Vec<Real>,
        from: Time,
        to: Time,
        steps: usize,
        condition: &StepCondition,
    ) -> Result<()> {
        assert!(
            from > to,
            "trying to roll back from {from} to {to}"
        );
        let dt = (from - to) / steps as Real;
        let time_tolerance = f64::EPSILON.sqrt();
        let mut t = from;
        self.evolver.set_step(dt);

        for _ in 0..steps {
            let mut now = t;
            let mut next = t - dt;
            if (to - next).abs() < time_tolerance {
                next = to;
            }
            let mut hit = false;
            // descending scan so several stopping times in one interval are
            // each landed on in order
            for j in (0..self.stopping_times.len()).rev() {
                let stop = self.stopping_times[j];
                if next < stop && stop <= now {
                    hit = true;
                    if now - stop > time_tolerance {
                        self.evolver.set_step(now - stop);
                        self.evolver.step(a, now)?;
                    }
                    condition.apply_to(a, stop)?;
                    now = stop;
                }
            }
            if hit {
                if now - next > time_tolerance {
                    self.evolver.set_step(now - next);
                    self.evolver.step(a, now)?;
                    condition.apply_to(a, next)?;
                }
                self.evolver.set_step(dt);
            } else {
                self.evolver.step(a, now)?;
                condition.apply_to(a, next)?;
            }
            t -= dt;
        }
        Ok(())
    }
}
