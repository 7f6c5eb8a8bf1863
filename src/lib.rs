//! rust_volatility — GJR-GARCH-X volatility estimation by Student-t QML.
//!
//! Purpose
//! -------
//! Serve as the crate root. The crate estimates a GJR-GARCH(1,1) model with
//! exogenous variance regressors and Student-t innovations, reports
//! classical and robust standard errors, and forecasts and exports the
//! conditional variance.
//!
//! Key behaviors
//! -------------
//! - [`volatility`] holds the model: data containers, the variance
//!   recursion, the likelihood, simulation, forecasting, the fit pipeline
//!   and its result type.
//! - [`optimization`] provides the generic constrained log-likelihood
//!   maximizer (SQP with multi-start), finite differences and numerical
//!   constants.
//! - [`inference`] turns a fitted log-likelihood into covariance matrices
//!   and standard errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is `f64` on `ndarray` containers.
//! - No global state: every fit is a pure function of its data and options,
//!   so identical inputs give identical results.
//! - The crate emits `tracing` events but never installs a subscriber.
//!
//! Conventions
//! -----------
//! - Errors are rich enums per layer ([`volatility::GarchError`],
//!   [`optimization::errors::OptError`], [`inference::InferenceError`]) and
//!   convert upward with `From`.
//!
//! Downstream usage
//! ----------------
//! - Most callers only need `use rust_volatility::prelude::*;`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code in each module; end-to-end pipelines
//!   are covered by the integration tests under `tests/`.

pub mod inference;
pub mod optimization;
pub mod volatility;

pub mod prelude {
    pub use crate::volatility::prelude::*;
}
