//! Error types for quantfd.
//!
//! A single `thiserror`-derived enum covers the failure classes of the
//! pricing core: configuration errors (bad inputs), numerical errors
//! (singular systems, out-of-range probabilities), and generic runtime
//! failures. Invariant violations that can only arise from caller bugs
//! (e.g. rolling back forward in time) are *not* represented here — they
//! panic at the call site instead.

use thiserror::Error;

/// The top-level error type used throughout quantfd.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated (bad configuration or market data).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// A tridiagonal solve hit a (near-)zero pivot.
    #[error("singular tridiagonal system: pivot {pivot:e} at row {row}")]
    SingularSystem {
        /// Row at which elimination broke down.
        row: usize,
        /// The offending pivot value.
        pivot: f64,
    },

    /// Two operators of different sizes were composed.
    #[error("incompatible operator sizes: {left} vs {right}")]
    IncompatibleSize {
        /// Size of the left operand.
        left: usize,
        /// Size of the right operand.
        right: usize,
    },

    /// A branch probability fell outside [0, 1].
    #[error("invalid branch probability {value} ({context})")]
    InvalidProbability {
        /// The computed probability.
        value: f64,
        /// Where it was computed (tree variant, layer, node, ...).
        context: String,
    },
}

/// Shorthand `Result` type used throughout quantfd.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use qf_core::ensure;
/// fn positive(x: f64) -> qf_core::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use qf_core::fail;
/// fn always_err() -> qf_core::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
