//! models — the GJR-GARCH(1,1)-X model and its fitted result.
//!
//! Purpose
//! -------
//! Collect the user-facing estimation API. This layer sits on top of
//! `volatility::core`, wiring the variance recursion and Student-t
//! likelihood to the generic log-likelihood optimizer and the inference
//! helpers in `crate::inference`.
//!
//! Key behaviors
//! -------------
//! - [`GjrGarchX`] implements [`LogLikelihood`] and exposes `fit`, which
//!   runs a multi-start constrained QML estimation and returns a
//!   [`ModelResult`].
//! - [`ModelResult`] carries estimates, classical and robust standard
//!   errors, the fitted variance path, information criteria, diagnostics
//!   ([`FitDiagnostics`]) and non-fatal warnings, and produces forecasts,
//!   summaries and CSV exports.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every quantity stored in a [`ModelResult`] is in the caller's units;
//!   the rescaled estimation space never leaks out of `fit`.
//! - A [`ModelResult`] is immutable once built; forecasting does not refit.
//!
//! Downstream usage
//! ----------------
//! - Build [`FitOptions`](crate::volatility::core::FitOptions), construct
//!   `GjrGarchX::new(options)?`, then call `fit(&data)`.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`gjr_garch_x`] cover likelihood conformance (`check`,
//!   `value`, `grad` vs. finite differences), parameter recovery on a
//!   simulated path, scale equivariance, and error paths.
//! - Unit tests in [`result`] cover the estimate table and summary output.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood

pub mod gjr_garch_x;
pub mod result;

pub use self::gjr_garch_x::GjrGarchX;
pub use self::result::{FitDiagnostics, ModelResult};

pub mod prelude {
    pub use super::{FitDiagnostics, GjrGarchX, ModelResult};
}
