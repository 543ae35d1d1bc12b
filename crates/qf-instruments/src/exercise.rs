//! Exercise schedules, expressed in year fractions from the evaluation date.

use qf_core::Time;

/// When an option may be exercised.
#[derive(Debug, Clone, PartialEq)]
pub enum Exercise {
    /// Exercisable only at expiry.
    European {
        /// Expiry, in years.
        expiry: Time,
    },
    /// Exercisable at any time up to expiry.
    American {
        /// Earliest exercise, in years (0 for a standard contract).
        earliest: Time,
        /// Expiry, in years.
        latest: Time,
    },
    /// Exercisable at a discrete set of dates.
    Bermudan {
        /// Exercise times, strictly increasing.
        times: Vec<Time>,
    },
}

impl Exercise {
    /// European exercise at `expiry`.
    pub fn european(expiry: Time) -> Self {
        Exercise::European { expiry }
    }

    /// American exercise over `[0, expiry]`.
    pub fn american(expiry: Time) -> Self {
        Exercise::American {
            earliest: 0.0,
            latest: expiry,
        }
    }

    /// The last possible exercise time.
    ///
    /// # Panics
    ///
    /// Panics on an empty Bermudan schedule.
    pub fn last_time(&self) -> Time {
        match self {
            Exercise::European { expiry } => *expiry,
            Exercise::American { latest, .. } => *latest,
            Exercise::Bermudan { times } => {
                *times.last().unwrap_or_else(|| panic!("empty Bermudan exercise schedule"))
            }
        }
    }

    /// The stopping times relevant for lattice / rollback methods.
    pub fn stopping_times(&self) -> Vec<Time> {
        match self {
            Exercise::European { expiry } => vec![*expiry],
            Exercise::American { earliest, latest } => vec![*earliest, *latest],
            Exercise::Bermudan { times } => times.clone(),
        }
    }

    /// Whether early exercise is possible.
    pub fn is_early_exercise(&self) -> bool {
        !matches!(self, Exercise::European { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_time_per_style() {
        assert_eq!(Exercise::european(1.0).last_time(), 1.0);
        assert_eq!(Exercise::american(2.0).last_time(), 2.0);
        let b = Exercise::Bermudan {
            times: vec![0.5, 1.0, 1.5],
        };
        assert_eq!(b.last_time(), 1.5);
    }

    #[test]
    fn american_stopping_times_bracket_the_window() {
        let e = Exercise::american(1.0);
        assert_eq!(e.stopping_times(), vec![0.0, 1.0]);
        assert!(e.is_early_exercise());
        assert!(!Exercise::european(1.0).is_early_exercise());
    }
}
