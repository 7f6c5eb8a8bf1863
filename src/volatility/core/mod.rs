//! core — shared GJR-GARCH-X data, parameters, recursion and likelihood.
//!
//! Purpose
//! -------
//! Collect the building blocks of the GJR-GARCH(1,1)-X volatility model with
//! Student-t innovations: data containers, the parameter vector and its
//! feasible region, the conditional-variance recursion, the
//! quasi-log-likelihood and its gradient, forecasting, simulation, tabular
//! export and validation helpers. The model layer and the optimizer build on
//! top of these primitives.
//!
//! Key behaviors
//! -------------
//! - Validate raw inputs once ([`GarchData`], [`ExogMatrix`]) and derive the
//!   rescaled estimation payload ([`EstimationData`]).
//! - Map between the flat optimizer vector and named coefficients
//!   ([`GjrParams`]) and describe the feasible region and starting points
//!   ([`ParamSpace`], [`ParamBounds`]).
//! - Evaluate the variance recursion ([`variance_path`],
//!   [`conditional_variance`]) and the Student-t likelihood
//!   ([`loglik_value`], [`loglik_contributions`], [`loglik_gradient`],
//!   [`loglik_scores`]).
//! - Extend fitted paths out of sample ([`forecast_variance`],
//!   [`FutureExog`]) and simulate synthetic paths ([`simulate`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Every variance produced here is strictly positive (floored).
//! - Accepted parameter points satisfy `α + γ ≥ 0`, `ν > 2` and
//!   `α + γ/2 + β < 1`; the optimizer enforces the stationarity proxy with a
//!   margin through linear constraints.
//! - Functions are pure: no shared mutable state, no I/O except the explicit
//!   CSV writers, no logging.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; `θ = [ω, α, γ, β, δ₁..δ_K, ν]`.
//! - Estimation runs on residuals scaled to unit sample variance; results
//!   are mapped back to the caller's units by the model layer.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover each primitive; the full pipeline is
//!   exercised by the model tests and `tests/integration_gjr_pipeline.rs`.

pub mod data;
pub mod export;
pub mod forecasts;
pub mod likelihood;
pub mod options;
pub mod params;
pub mod recursion;
pub mod simulate;
pub mod space;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{EstimationData, ExogMatrix, GarchData};
pub use self::export::{EstimateRow, VarianceRow, write_estimates_csv, write_variance_csv};
pub use self::forecasts::{FutureExog, VarianceForecast, forecast_variance};
pub use self::likelihood::{
    gaussian_loglik, loglik_contributions, loglik_gradient, loglik_scores, loglik_value,
    student_t_loglik,
};
pub use self::options::{FitOptions, ParamBounds};
pub use self::params::{GjrParams, param_names, theta_dim};
pub use self::recursion::{VariancePath, conditional_variance, variance_path};
pub use self::simulate::{SimulatedPath, simulate};
pub use self::space::ParamSpace;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::volatility::core::prelude::*;
//
// to import the main core surface in a single line.

pub mod prelude {
    pub use super::data::{ExogMatrix, GarchData};
    pub use super::forecasts::{FutureExog, VarianceForecast};
    pub use super::options::{FitOptions, ParamBounds};
    pub use super::params::GjrParams;
    pub use super::recursion::conditional_variance;
    pub use super::simulate::simulate;
}
