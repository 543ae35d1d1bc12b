//! The discretized-asset contract consumed by the lattices.

use qf_core::{Real, Size, Time};

/// An asset priced by backward induction on a lattice.
///
/// The asset owns a value array indexed by lattice node and a current time;
/// the lattice moves both backward and invokes the adjustment hooks (e.g.
/// an early-exercise clamp) between steps. The hooks receive the underlying
/// levels of the current time slice.
pub trait DiscretizedAsset {
    /// Current time of the value array.
    fn time(&self) -> Time;

    /// Move the asset to time `t` (the values are not touched).
    fn set_time(&mut self, t: Time);

    /// The node values at the current time.
    fn values(&self) -> &[Real];

    /// Replace the node values.
    fn set_values(&mut self, values: Vec<Real>);

    /// Initialize the terminal values for a slice of `size` nodes with the
    /// given underlying levels.
    fn reset(&mut self, size: Size, grid: &[Real]);

    /// Times the lattice must land on exactly (exercise dates, resets).
    fn mandatory_times(&self) -> Vec<Time>;

    /// Hook applied before the rest of the adjustments.
    fn pre_adjust_values(&mut self, _grid: &[Real]) {}

    /// Hook applied after the rest of the adjustments.
    fn post_adjust_values(&mut self, _grid: &[Real]) {}

    /// Full adjustment pass for the current time slice.
    fn adjust_values(&mut self, grid: &[Real]) {
        self.pre_adjust_values(grid);
        self.post_adjust_values(grid);
    }
}
