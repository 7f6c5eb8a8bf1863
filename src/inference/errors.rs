//! Unified error handling for inference routines.
//!
//! This module defines `InferenceError`, the error type used when turning a
//! fitted objective into an information matrix, a covariance matrix or
//! per-observation scores. Finite-difference failures raised by the
//! optimization layer are folded in through `From<OptError>`. An alias
//! `InferenceResult<T>` standardizes the return type across inference code.
use crate::optimization::errors::OptError;

/// Unified error type for inference routines.
///
/// Covers finite-difference failures, shape mismatches between the
/// information matrix and the score matrix, and non-finite results. A
/// Hessian that is merely not positive definite is **not** an error; it is
/// reported through [`HessianCovariance`](crate::inference::HessianCovariance).
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Finite differences ----
    /// The objective failed at the optimum or at a perturbed point.
    Derivative { text: String },

    // ---- Shapes ----
    /// Information matrix must be square.
    NotSquare { rows: usize, cols: usize },

    /// Score columns must match the information matrix dimension.
    ScoreDimMismatch { expected: usize, found: usize },

    /// At least one observation is needed to build a score covariance.
    EmptyScores,

    // ---- Numerical ----
    /// A covariance entry is NaN/±inf.
    NonFiniteCovariance { row: usize, col: usize, value: f64 },

    // ---- Fallback ----
    UnknownError,
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::Derivative { text: err.to_string() }
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Finite differences ----
            InferenceError::Derivative { text } => {
                write!(f, "Inference Error: finite differences failed ({text})")
            }

            // ---- Shapes ----
            InferenceError::NotSquare { rows, cols } => {
                write!(f, "Inference Error: information matrix is {rows}x{cols}, expected square")
            }
            InferenceError::ScoreDimMismatch { expected, found } => write!(
                f,
                "Inference Error: score matrix has {found} columns, expected {expected}"
            ),
            InferenceError::EmptyScores => {
                write!(f, "Inference Error: score matrix has no observations")
            }

            // ---- Numerical ----
            InferenceError::NonFiniteCovariance { row, col, value } => write!(
                f,
                "Inference Error: covariance entry ({row}, {col}) is not finite ({value})"
            ),

            // ---- Fallback ----
            InferenceError::UnknownError => write!(f, "Inference Error: Unknown error occurred"),
        }
    }
}
