//! inference — standard errors and covariance matrices for fitted models.
//!
//! Purpose
//! -------
//! Provide post-estimation uncertainty quantification on top of a fitted
//! quasi-maximum-likelihood model: a central-difference observed
//! information matrix, its inverse (with an explicit positive-definiteness
//! diagnosis), and the robust sandwich covariance built from
//! per-observation scores.
//!
//! Key behaviors
//! -------------
//! - Define a unified error and result type, [`InferenceError`] and
//!   [`InferenceResult`].
//! - Compute classical covariance and standard errors with
//!   [`calc_covariance`] / [`covariance_from_information`], reporting a
//!   non-positive-definite Hessian through [`HessianCovariance`] instead of
//!   NaN standard errors.
//! - Compute robust covariance from a model-supplied score matrix with
//!   [`sandwich_covariance`].
//!
//! Invariants & assumptions
//! ------------------------
//! - All matrices are `p × p` in the parameter ordering of the model's
//!   optimizer vector; scores are `n × p`.
//! - Hessians and scores use the **summed** log-likelihood scale.
//! - Functions are pure: no logging, no global state, no `unsafe`.
//!
//! Conventions
//! -----------
//! - Derivatives are taken in the space the optimizer works in. Mapping the
//!   resulting covariance to reported units (delta method) is the model's
//!   job.
//!
//! Downstream usage
//! ----------------
//! - After a fit, the volatility model calls [`calc_covariance`] on the
//!   negative log-likelihood at `θ̂`; when the result is positive definite
//!   it adds the sandwich from the analytic per-observation scores of the
//!   log-likelihood.
//!
//! Testing notes
//! -------------
//! - Submodules carry unit tests on closed-form matrices; the model layer
//!   tests inference end to end.

pub mod errors;
pub mod hessian;
pub mod sandwich;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hessian::{
    HessianCovariance, calc_covariance, covariance_from_information, observed_information,
};
pub use self::sandwich::{sandwich_covariance, score_outer_product, std_errors_from};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::inference::prelude::*;
//
// to import the main inference surface in a single line.

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hessian::{HessianCovariance, calc_covariance};
    pub use super::sandwich::sandwich_covariance;
}
