//! volatility — GJR-GARCH(1,1)-X conditional variance estimation.
//!
//! Purpose
//! -------
//! Provide a self-contained toolkit for asymmetric conditional volatility
//! with exogenous variance regressors: validated data containers, the
//! floored variance recursion, the Student-t quasi-likelihood, simulation,
//! forecasting, and a complete QML fit with inference and export.
//!
//! Key behaviors
//! -------------
//! - Hold returns plus an optional `T × K` exogenous matrix in
//!   [`GarchData`], with de-meaning, scaling and burn-in handled by the fit.
//! - Run the recursion
//!   `σ²_t = ω + (α + γ·1[ε_{t-1}<0])·ε²_{t-1} + β·σ²_{t-1} + δ·x_t`
//!   under a positive floor, with the sample variance as the pre-sample
//!   state.
//! - Fit `θ = [ω, α, γ, β, δ₁..δ_K, ν]` by multi-start SQP under linear
//!   feasibility constraints via [`GjrGarchX`].
//! - Report results as a [`ModelResult`] with classical and sandwich
//!   standard errors, AIC/BIC, diagnostics and [`FitWarning`]s.
//!
//! Invariants & assumptions
//! ------------------------
//! - Admissible parameters satisfy `ω > 0`, `α, β ≥ 0`, `α + γ ≥ 0`,
//!   `α + γ/2 + β < 1` and `ν > 2`; exogenous coefficients are free.
//! - Returns and exogenous data must be finite; the exogenous matrix must
//!   have exactly one row per return.
//! - Errors are surfaced as [`GarchError`] / [`ParamError`]; panics are
//!   reserved for programming errors.
//!
//! Conventions
//! -----------
//! - Time indices are 0-based; row `t` of the exogenous matrix enters
//!   `σ²_t` in the same period, the residual enters with one lag.
//! - Log-likelihoods are summed over the effective sample `t ≥ burn_in`.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: build [`GarchData`] and [`FitOptions`], create a
//!   [`GjrGarchX`], `fit`, then query the [`ModelResult`] or call its
//!   `forecast` / `write_variance_csv`.
//! - [`simulate`] generates synthetic paths for tests and Monte Carlo work.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`core`] cover data validation, the recursion and its
//!   closed forms, likelihood pieces, parameter mapping and forecasting.
//! - Unit tests in [`models`] cover the optimizer conformance and the fit.
//! - Integration tests in `tests/` exercise full pipelines through this
//!   public surface.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    ExogMatrix, FitOptions, FutureExog, GarchData, GjrParams, ParamBounds, SimulatedPath,
    VarianceForecast, conditional_variance, simulate,
};

pub use self::errors::{ErrorKind, FitWarning, GarchError, GarchResult, ParamError, ParamResult};

pub use self::models::{FitDiagnostics, GjrGarchX, ModelResult};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::volatility::prelude::*;
//
// to import the main volatility surface in a single line.

pub mod prelude {
    pub use super::{
        ErrorKind, ExogMatrix, FitDiagnostics, FitOptions, FitWarning, FutureExog, GarchData,
        GarchError, GarchResult, GjrGarchX, GjrParams, ModelResult, ParamBounds, ParamError,
        VarianceForecast, conditional_variance, simulate,
    };
}
