//!
//! Error types of the HMM engine
//!
//! * construction errors: `InvalidParameter`, `DimensionMismatch`, `SingularMatrix`
//! * input validation errors: `InvalidObservation`, `SequenceTooShort`
//! * numerical degeneracy detected while running EM: `NumericalDegeneracy`
//!
//! Convergence (log-likelihood failing to improve) is not an error.
//!
use thiserror::Error;

///
/// Unified error type of the crate
///
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HmmError {
    /// bad arguments of constructors (zero states, malformed probabilities, ...)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// vector/matrix shapes disagree
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// matrix is not invertible or not positive-definite
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// observation at `t` has a wrong length or contains a non-finite value
    #[error("observation at t={t} is invalid (expected dimension {expected}, got {actual})")]
    InvalidObservation {
        t: usize,
        expected: usize,
        actual: usize,
    },

    /// observation sequence is shorter than the operation needs
    #[error("observation sequence of length {len} is too short (at least {min} required)")]
    SequenceTooShort { len: usize, min: usize },

    /// EM iteration hit a zero denominator or an invalid re-estimated parameter.
    /// The model keeps the parameters it had before `iteration`.
    #[error("numerical degeneracy at iteration {iteration}: {reason}")]
    NumericalDegeneracy { iteration: usize, reason: Degeneracy },
}

///
/// Reason of `HmmError::NumericalDegeneracy`
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Degeneracy {
    /// unscaled forward sum at `t` is zero (or not finite)
    #[error("observation at t={t} is unreachable under the current model")]
    ZeroLikelihood { t: usize },

    /// no feasible transition mass between `t` and `t+1`
    #[error("zero transition mass between t={t} and t+1")]
    ZeroTransitionMass { t: usize },

    /// re-estimated initial or transition probabilities are not a distribution
    #[error("re-estimated state probabilities are invalid")]
    InvalidProbabilities,

    /// re-estimated covariance of `state` is not positive-definite
    #[error("re-estimated covariance of state {state} is not positive-definite")]
    InvalidCovariance { state: usize },

    /// re-estimated parameter of `state` is NaN or infinite
    #[error("re-estimated parameter of state {state} is not finite")]
    NonFiniteParameter { state: usize },
}

impl HmmError {
    ///
    /// Wrap a degeneracy found in a pass. `iteration` is 0 outside of `fit`.
    ///
    pub fn degenerate(iteration: usize, reason: Degeneracy) -> HmmError {
        HmmError::NumericalDegeneracy { iteration, reason }
    }
    ///
    /// Rewrite the iteration number of a `NumericalDegeneracy`.
    /// Other errors are returned as is.
    ///
    pub fn at_iteration(self, iteration: usize) -> HmmError {
        match self {
            HmmError::NumericalDegeneracy { reason, .. } => {
                HmmError::NumericalDegeneracy { iteration, reason }
            }
            e => e,
        }
    }
    pub fn is_degeneracy(&self) -> bool {
        matches!(self, HmmError::NumericalDegeneracy { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HmmError>;
