//! Unified error surface for the optimization layer.
//!
//! Every failure the optimizer can observe (bad configuration, invalid
//! derivatives, infeasible points, QP breakdowns, Argmin backend errors,
//! model-side domain errors) is normalized into [`OptError`] so callers
//! never handle raw Argmin errors.
use argmin::core::{ArgminError, Error};

use crate::{
    optimization::loglik_optimizer::types::Theta,
    volatility::errors::{GarchError, ParamError},
};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- SqpOptions ----
    /// Parameter-change tolerance needs to be positive and finite.
    InvalidTolParam { tol: f64, reason: &'static str },

    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Armijo sufficient-decrease constant must lie in (0, 0.5).
    InvalidArmijo { value: f64, reason: &'static str },

    /// Backtracking factor must lie in (0, 1).
    InvalidBacktrack { value: f64, reason: &'static str },

    /// Minimum line-search step must lie in (0, 1).
    InvalidMinStep { value: f64, reason: &'static str },

    /// QP iteration cap must be positive.
    InvalidQpMaxIter { max_iter: usize, reason: &'static str },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost { value: f64 },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Constraints / QP ----
    /// Constraint rows do not match the parameter dimension.
    ConstraintDimMismatch { expected: usize, found: usize },

    /// A point handed to the solver violates a constraint.
    InfeasiblePoint { constraint: String, violation: f64 },

    /// No starting point was supplied to the multi-start driver.
    NoStartingPoints,

    /// KKT system of the QP subproblem could not be solved.
    QpSingular { working_set: usize },

    /// Active-set QP exceeded its iteration cap.
    QpMaxIter { max_iter: usize },

    // ---- Multi-start ----
    /// No restart converged; carries the best non-converged candidate.
    NoConvergence { best_theta: Theta, best_value: f64, status: String, restarts: usize },

    /// Every restart failed before producing a candidate.
    AllRestartsFailed { restarts: usize, first_error: String },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch { expected: usize, found: (usize, usize) },

    /// Hessian values need to be finite.
    InvalidHessian { row: usize, col: usize, value: f64 },

    // ---- Param Errors ----
    /// Persistence α + γ/2 + β at or above the admissible bound.
    StationarityViolated { persistence: f64 },

    /// Shock loading α + γ is negative.
    LeverageViolated { alpha_plus_gamma: f64 },

    /// Theta length mismatch for the parameter vector.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Omega must be finite and > 0.
    InvalidOmega { value: f64 },

    /// Alpha must be finite and non-negative.
    InvalidAlpha { value: f64 },

    /// Beta must be finite and non-negative.
    InvalidBeta { value: f64 },

    /// Degrees of freedom must be finite and > 2.
    InvalidNu { value: f64 },

    /// A coefficient is non-finite.
    InvalidThetaInput { index: usize, value: f64 },

    // ---- Model ----
    /// Model-level failure raised while evaluating the objective.
    ModelError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- SqpOptions ----
            OptError::InvalidTolParam { tol, reason } => {
                write!(f, "Invalid parameter change tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidArmijo { value, reason } => {
                write!(f, "Invalid Armijo constant {value}: {reason}")
            }
            OptError::InvalidBacktrack { value, reason } => {
                write!(f, "Invalid backtracking factor {value}: {reason}")
            }
            OptError::InvalidMinStep { value, reason } => {
                write!(f, "Invalid minimum step {value}: {reason}")
            }
            OptError::InvalidQpMaxIter { max_iter, reason } => {
                write!(f, "Invalid QP iteration cap {max_iter}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Constraints / QP ----
            OptError::ConstraintDimMismatch { expected, found } => {
                write!(f, "Constraint dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InfeasiblePoint { constraint, violation } => {
                write!(f, "Point violates constraint '{constraint}' by {violation}")
            }
            OptError::NoStartingPoints => {
                write!(f, "No starting points supplied")
            }
            OptError::QpSingular { working_set } => {
                write!(f, "QP subproblem KKT system is singular (working set size {working_set})")
            }
            OptError::QpMaxIter { max_iter } => {
                write!(f, "QP subproblem did not terminate within {max_iter} iterations")
            }

            // ---- Multi-start ----
            OptError::NoConvergence { best_value, status, restarts, .. } => {
                write!(
                    f,
                    "No restart converged out of {restarts}; best log-likelihood {best_value} ({status})"
                )
            }
            OptError::AllRestartsFailed { restarts, first_error } => {
                write!(f, "All {restarts} restarts failed; first error: {first_error}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Finite Diffs ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Param Errors ----
            OptError::StationarityViolated { persistence } => {
                write!(f, "Model not stationary: alpha + gamma/2 + beta = {persistence}")
            }
            OptError::LeverageViolated { alpha_plus_gamma } => {
                write!(f, "alpha + gamma must be non-negative; got {alpha_plus_gamma}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidOmega { value } => {
                write!(f, "Invalid omega parameter: {value}, must be finite and > 0")
            }
            OptError::InvalidAlpha { value } => {
                write!(f, "Invalid alpha: {value}, must be non-negative")
            }
            OptError::InvalidBeta { value } => {
                write!(f, "Invalid beta: {value}, must be non-negative")
            }
            OptError::InvalidNu { value } => {
                write!(f, "Invalid degrees of freedom: {value}, must be finite and > 2")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Model ----
            OptError::ModelError { text } => {
                write!(f, "Model error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<GarchError> for OptError {
    fn from(err: GarchError) -> Self {
        OptError::ModelError { text: err.to_string() }
    }
}

impl From<ParamError> for OptError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::StationarityViolated { persistence } => {
                OptError::StationarityViolated { persistence }
            }
            ParamError::LeverageViolated { alpha_plus_gamma } => {
                OptError::LeverageViolated { alpha_plus_gamma }
            }
            ParamError::ThetaLengthMismatch { expected, actual } => {
                OptError::ThetaLengthMismatch { expected, actual }
            }
            ParamError::InvalidOmega { value } => OptError::InvalidOmega { value },
            ParamError::InvalidAlpha { value } => OptError::InvalidAlpha { value },
            ParamError::InvalidBeta { value } => OptError::InvalidBeta { value },
            ParamError::InvalidNu { value } => OptError::InvalidNu { value },
            ParamError::NonFiniteCoefficient { index, value } => {
                OptError::InvalidThetaInput { index, value }
            }
        }
    }
}
