//! Time grids for lattice methods.

use qf_core::{Real, Size, Time};

const TIME_TOLERANCE: Real = 1e-12;

/// A grid of time points used by lattice methods.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    times: Vec<Time>,
    dts: Vec<Time>,
}

impl TimeGrid {
    /// Create a uniform time grid from 0 to `end` with `steps` intervals.
    pub fn uniform(end: Time, steps: Size) -> Self {
        assert!(steps > 0, "steps must be > 0");
        assert!(end > 0.0, "end time must be positive");
        let dt = end / steps as Real;
        let times: Vec<Time> = (0..=steps).map(|i| i as Real * dt).collect();
        let dts = vec![dt; steps];
        Self { times, dts }
    }

    /// Create from a set of mandatory time points, ensuring at least
    /// `min_steps` total intervals. Every mandatory time lands exactly on a
    /// grid node.
    pub fn from_times(mandatory: &[Time], min_steps: Size) -> Self {
        let mut all_times: Vec<Time> = vec![0.0];
        all_times.extend_from_slice(mandatory);
        all_times.sort_by(|a, b| a.total_cmp(b));
        all_times.dedup_by(|a, b| (*a - *b).abs() < TIME_TOLERANCE);

        let end = *all_times.last().unwrap_or(&0.0);
        assert!(end > 0.0, "mandatory times must reach past zero");
        if min_steps > all_times.len() - 1 {
            let dt = end / min_steps as Real;
            for i in 1..=min_steps {
                let t = i as Real * dt;
                if all_times.iter().all(|&x| (x - t).abs() > TIME_TOLERANCE) {
                    all_times.push(t);
                }
            }
            all_times.sort_by(|a, b| a.total_cmp(b));
        }

        let dts: Vec<Time> = all_times.windows(2).map(|w| w[1] - w[0]).collect();
        Self {
            times: all_times,
            dts,
        }
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> Size {
        self.times.len()
    }

    /// Number of steps (= time points − 1).
    pub fn steps(&self) -> Size {
        self.times.len() - 1
    }

    /// Time at index `i`.
    pub fn time(&self, i: Size) -> Time {
        self.times[i]
    }

    /// Time step between index `i` and `i+1`.
    pub fn dt(&self, i: Size) -> Time {
        self.dts[i]
    }

    /// Final time.
    pub fn end(&self) -> Time {
        *self.times.last().unwrap_or(&0.0)
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Index of the grid node at `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` does not lie on the grid; lattice users must build the
    /// grid from their mandatory times.
    pub fn index_of(&self, t: Time) -> Size {
        let i = self.closest_index(t);
        assert!(
            (self.times[i] - t).abs() < 1e-9,
            "time {t} is not on the time grid (closest node {})",
            self.times[i]
        );
        i
    }

    /// The grid time closest to `t`.
    pub fn closest_time(&self, t: Time) -> Time {
        self.times[self.closest_index(t)]
    }

    fn closest_index(&self, t: Time) -> Size {
        let mut best = 0;
        let mut best_dist = Real::INFINITY;
        for (i, &ti) in self.times.iter().enumerate() {
            let d = (ti - t).abs();
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_grid() {
        let g = TimeGrid::uniform(1.0, 4);
        assert_eq!(g.size(), 5);
        assert_eq!(g.steps(), 4);
        assert!((g.time(0) - 0.0).abs() < 1e-15);
        assert!((g.time(4) - 1.0).abs() < 1e-15);
        assert!((g.dt(0) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn mandatory_times_land_on_nodes() {
        let g = TimeGrid::from_times(&[0.5, 1.0], 4);
        assert!(g.steps() >= 4);
        assert!(g.times().contains(&0.0));
        assert!(g.times().iter().any(|&t| (t - 0.5).abs() < 1e-12));
        assert!((g.end() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn index_and_closest_time() {
        let g = TimeGrid::uniform(1.0, 4);
        assert_eq!(g.index_of(0.5), 2);
        assert!((g.closest_time(0.6) - 0.5).abs() < 1e-15);
        assert!((g.closest_time(0.63) - 0.75).abs() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "not on the time grid")]
    fn off_grid_time_is_rejected() {
        let g = TimeGrid::uniform(1.0, 4);
        g.index_of(0.3);
    }
}
