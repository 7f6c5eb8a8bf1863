//! Errors for GJR-GARCH-X volatility models (data validation, options checks,
//! start construction, optimizer failures, forecasting and export), plus the
//! non-fatal warnings attached to a fitted model.
//!
//! This module defines a model error type, [`GarchError`], a parameter error
//! type, [`ParamError`], the coarse classification [`ErrorKind`], and the
//! warning type [`FitWarning`].
//!
//! ## Conventions
//! - **Indices are 0-based**; exogenous entries are addressed as
//!   `(row, col)` with `row` the time index.
//! - Parameter values reported inside errors are in the caller's units.
//! - Optimizer/backend errors are normalized to
//!   [`GarchError::ConvergenceFailure`] (nothing converged, best candidate
//!   attached), [`GarchError::InfeasibleStart`] or
//!   [`GarchError::OptimizationFailed`].
use crate::optimization::errors::OptError;
use ndarray::Array1;

/// Crate-wide result alias for model operations that may produce [`GarchError`].
pub type GarchResult<T> = Result<T, GarchError>;

/// Result alias for parameter-construction/validation paths that may produce
/// [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Coarse classification of [`GarchError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misaligned, non-finite or too-short inputs, or invalid options.
    /// Raised before optimization starts.
    InvalidInput,
    /// No feasible starting point could be constructed.
    InfeasibleStart,
    /// No restart converged within the iteration cap.
    ConvergenceFailure,
    /// Tabular export failed.
    Export,
}

/// Unified error type for GJR-GARCH-X modeling.
#[derive(Debug, Clone, PartialEq)]
pub enum GarchError {
    // ---- Input/data validation ----
    /// Return series is empty.
    EmptySeries,

    /// A return is NaN/±inf.
    NonFiniteReturn { index: usize, value: f64 },

    /// Exogenous matrix rows must match the number of returns.
    ExogRowMismatch { returns: usize, rows: usize },

    /// Number of exogenous column names must match the number of columns.
    ExogNameMismatch { columns: usize, names: usize },

    /// An exogenous entry is NaN/±inf.
    NonFiniteExog { row: usize, col: usize, value: f64 },

    /// Exogenous column names must be unique.
    DuplicateExogName { name: String },

    /// A requested exogenous column does not exist.
    UnknownExogColumn { name: String },

    /// Not enough observations after the burn-in for the parameter count.
    InsufficientObservations { n_eff: usize, required: usize },

    /// Burn-in leaves no observations for the likelihood.
    BurnInOutOfRange { burn_in: usize, len: usize },

    // ---- Options validation ----
    /// Restart count must be at least one.
    InvalidRestarts { restarts: usize },

    /// Parameter bounds are inconsistent.
    InvalidBounds { reason: &'static str },

    /// User-supplied initial parameters have the wrong length.
    InvalidInitialLength { expected: usize, actual: usize },

    /// Optimizer options were rejected.
    InvalidOptimizerOptions { text: String },

    /// Parameter vector failed validation.
    InvalidParams(ParamError),

    // ---- Start construction ----
    /// No feasible starting point could be constructed.
    InfeasibleStart { reason: String },

    // ---- Estimation / optimizer ----
    /// No restart converged. `best_params` is the best non-converged
    /// candidate in the caller's units (layout `[ω, α, γ, β, δ.., ν]`),
    /// `best_loglik` its log-likelihood.
    ConvergenceFailure { best_params: Array1<f64>, best_loglik: f64, status: String, restarts: usize },

    /// Optimizer failed for another reason.
    OptimizationFailed { status: String },

    // ---- Forecasting ----
    /// Future exogenous matrix has the wrong shape.
    FutureExogShape { expected_rows: usize, expected_cols: usize, rows: usize, cols: usize },

    /// A future exogenous entry is NaN/±inf.
    NonFiniteFutureExog { row: usize, col: usize, value: f64 },

    // ---- Simulation ----
    /// Simulation length must be positive.
    InvalidSimulationLength { n: usize },

    // ---- Export ----
    /// CSV writer failure.
    Csv { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl GarchError {
    /// Classify the error into the coarse [`ErrorKind`] buckets.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GarchError::InfeasibleStart { .. } => ErrorKind::InfeasibleStart,
            GarchError::ConvergenceFailure { .. } | GarchError::OptimizationFailed { .. } => {
                ErrorKind::ConvergenceFailure
            }
            GarchError::Csv { .. } => ErrorKind::Export,
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl std::error::Error for GarchError {}

impl std::fmt::Display for GarchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            GarchError::EmptySeries => {
                write!(f, "Return series is empty.")
            }
            GarchError::NonFiniteReturn { index, value } => {
                write!(f, "Return at index {index} is non-finite: {value}")
            }
            GarchError::ExogRowMismatch { returns, rows } => {
                write!(f, "Exogenous matrix has {rows} rows but the return series has {returns}")
            }
            GarchError::ExogNameMismatch { columns, names } => {
                write!(f, "Exogenous matrix has {columns} columns but {names} names were given")
            }
            GarchError::NonFiniteExog { row, col, value } => {
                write!(f, "Exogenous value at ({row}, {col}) is non-finite: {value}")
            }
            GarchError::DuplicateExogName { name } => {
                write!(f, "Exogenous column name '{name}' appears more than once")
            }
            GarchError::UnknownExogColumn { name } => {
                write!(f, "Unknown exogenous column '{name}'")
            }
            GarchError::InsufficientObservations { n_eff, required } => {
                write!(
                    f,
                    "Insufficient observations: {n_eff} in the likelihood window, at least {required} required"
                )
            }
            GarchError::BurnInOutOfRange { burn_in, len } => {
                write!(f, "Burn-in ({burn_in}) must be smaller than the series length ({len})")
            }
            // ---- Options validation ----
            GarchError::InvalidRestarts { restarts } => {
                write!(f, "Restart count must be at least 1; got {restarts}")
            }
            GarchError::InvalidBounds { reason } => {
                write!(f, "Invalid parameter bounds: {reason}")
            }
            GarchError::InvalidInitialLength { expected, actual } => {
                write!(f, "Initial parameter vector length mismatch: expected {expected}, got {actual}")
            }
            GarchError::InvalidOptimizerOptions { text } => {
                write!(f, "Invalid optimizer options: {text}")
            }
            GarchError::InvalidParams(err) => {
                write!(f, "Invalid parameters: {err}")
            }
            // ---- Start construction ----
            GarchError::InfeasibleStart { reason } => {
                write!(f, "No feasible starting point: {reason}")
            }
            // ---- Estimation / optimizer ----
            GarchError::ConvergenceFailure { best_loglik, status, restarts, .. } => {
                write!(
                    f,
                    "No restart converged ({restarts} tried); best candidate log-likelihood {best_loglik} ({status})"
                )
            }
            GarchError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
            // ---- Forecasting ----
            GarchError::FutureExogShape { expected_rows, expected_cols, rows, cols } => {
                write!(
                    f,
                    "Future exogenous matrix must be {expected_rows}x{expected_cols}; got {rows}x{cols}"
                )
            }
            GarchError::NonFiniteFutureExog { row, col, value } => {
                write!(f, "Future exogenous value at ({row}, {col}) is non-finite: {value}")
            }
            // ---- Simulation ----
            GarchError::InvalidSimulationLength { n } => {
                write!(f, "Simulation length must be positive; got {n}")
            }
            // ---- Export ----
            GarchError::Csv { text } => {
                write!(f, "CSV export failed: {text}")
            }
            GarchError::UnknownError => {
                write!(f, "An unknown error occurred.")
            }
        }
    }
}

impl From<ParamError> for GarchError {
    fn from(err: ParamError) -> Self {
        GarchError::InvalidParams(err)
    }
}

impl From<csv::Error> for GarchError {
    fn from(err: csv::Error) -> Self {
        GarchError::Csv { text: err.to_string() }
    }
}

/// Optimizer errors seen at the model boundary. Parameter vectors carried by
/// `NoConvergence` are passed through unchanged; the fitting pipeline maps
/// them to the caller's units.
impl From<OptError> for GarchError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::NoConvergence { best_theta, best_value, status, restarts } => {
                GarchError::ConvergenceFailure {
                    best_params: best_theta,
                    best_loglik: best_value,
                    status,
                    restarts,
                }
            }
            OptError::InfeasiblePoint { constraint, violation } => GarchError::InfeasibleStart {
                reason: format!("constraint '{constraint}' violated by {violation}"),
            },
            OptError::NoStartingPoints => {
                GarchError::InfeasibleStart { reason: "no starting points".to_string() }
            }
            OptError::InvalidTolParam { .. }
            | OptError::InvalidTolCost { .. }
            | OptError::InvalidMaxIter { .. }
            | OptError::NoTolerancesProvided
            | OptError::InvalidArmijo { .. }
            | OptError::InvalidBacktrack { .. }
            | OptError::InvalidMinStep { .. }
            | OptError::InvalidQpMaxIter { .. } => {
                GarchError::InvalidOptimizerOptions { text: err.to_string() }
            }
            other => GarchError::OptimizationFailed { status: other.to_string() },
        }
    }
}

/// Errors specific to parameter construction and validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Persistence α + γ/2 + β at or above the admissible bound.
    StationarityViolated { persistence: f64 },

    /// α + γ must be non-negative.
    LeverageViolated { alpha_plus_gamma: f64 },

    /// Theta length mismatch for the parameter layout.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Omega must be finite and > 0.
    InvalidOmega { value: f64 },

    /// Alpha must be finite and non-negative.
    InvalidAlpha { value: f64 },

    /// Beta must be finite and non-negative.
    InvalidBeta { value: f64 },

    /// Degrees of freedom must be finite and > 2.
    InvalidNu { value: f64 },

    /// γ or a δ coefficient is non-finite.
    NonFiniteCoefficient { index: usize, value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::StationarityViolated { persistence } => {
                write!(
                    f,
                    "Model not stationary: alpha + gamma/2 + beta is {persistence} (>= 1 is not allowed)"
                )
            }
            ParamError::LeverageViolated { alpha_plus_gamma } => {
                write!(f, "alpha + gamma must be non-negative, got {alpha_plus_gamma}")
            }
            ParamError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, got {actual}")
            }
            ParamError::InvalidOmega { value } => {
                write!(f, "Omega must be finite and > 0, got {value}")
            }
            ParamError::InvalidAlpha { value } => {
                write!(f, "Alpha must be non-negative and finite, got {value}")
            }
            ParamError::InvalidBeta { value } => {
                write!(f, "Beta must be non-negative and finite, got {value}")
            }
            ParamError::InvalidNu { value } => {
                write!(f, "Degrees of freedom must be finite and > 2, got {value}")
            }
            ParamError::NonFiniteCoefficient { index, value } => {
                write!(f, "Coefficient at theta index {index} must be finite, got {value}")
            }
        }
    }
}

/// Non-fatal conditions detected while fitting. Attached to the fitted model
/// alongside the point estimates.
#[derive(Debug, Clone, PartialEq)]
pub enum FitWarning {
    /// Hessian of the negative log-likelihood is not positive definite at
    /// the optimum. Standard errors of the `affected` parameters are
    /// reported as unavailable.
    IllConditionedInference { min_eigenvalue: f64, affected: Vec<String> },

    /// Inference could not be computed at all (e.g. the objective failed at
    /// a perturbed point).
    InferenceUnavailable { reason: String },

    /// The variance floor was needed in more than the tolerated fraction of
    /// periods, a sign of misspecification.
    VarianceFloorTriggered { count: usize, fraction: f64 },

    /// The estimate sits on the boundary of the admissible region. The
    /// `parameters` entering the active `constraints` have no valid
    /// asymptotic distribution there; their standard errors are reported as
    /// unavailable.
    ParameterAtBound { constraints: Vec<String>, parameters: Vec<String> },
}

impl std::fmt::Display for FitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitWarning::IllConditionedInference { min_eigenvalue, affected } => {
                write!(
                    f,
                    "Hessian not positive definite (min eigenvalue {min_eigenvalue:e}); standard errors unavailable for: {}",
                    affected.join(", ")
                )
            }
            FitWarning::InferenceUnavailable { reason } => {
                write!(f, "Standard errors unavailable: {reason}")
            }
            FitWarning::VarianceFloorTriggered { count, fraction } => {
                write!(
                    f,
                    "Variance floor hit in {count} periods ({:.2}% of the sample)",
                    100.0 * fraction
                )
            }
            FitWarning::ParameterAtBound { constraints, parameters } => {
                write!(
                    f,
                    "Estimate on the boundary ({}); standard errors unavailable for: {}",
                    constraints.join(", "),
                    parameters.join(", ")
                )
            }
        }
    }
}
