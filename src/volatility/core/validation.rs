//! Validation helpers for GJR-GARCH-X inputs and parameters.
//!
//! Purpose
//! -------
//! Centralize the checks that guard the volatility stack: return series,
//! exogenous matrices, sample-size requirements, future exogenous paths, and
//! the coordinate-wise domain of the parameter vector
//! `θ = [ω, α, γ, β, δ₁..δ_K, ν]`.
//!
//! Key behaviors
//! -------------
//! - Data validators return [`GarchError`] variants of the invalid-input kind
//!   and point at the first offending element.
//! - Parameter validators return [`ParamError`] and are shared by
//!   [`GjrParams`](crate::volatility::core::params::GjrParams) constructors
//!   and the model's `check` hook.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ω > 0`, `α ≥ 0`, `β ≥ 0`, `α + γ ≥ 0`, `α + γ/2 + β < 1`, `ν > 2`, all
//!   finite; `γ` and `δ` are otherwise unconstrained.
//! - The likelihood window must contain at least `dim(θ) + MIN_EXTRA_OBS`
//!   observations.
//!
//! Conventions
//! -----------
//! - Indices in errors are 0-based positions in the input arrays.
//! - The stationarity check here is strict (`< 1`); the optimizer enforces
//!   the tighter `≤ 1 − margin` through its constraint set.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each validator's happy path and first-violation
//!   reporting.
use crate::volatility::errors::{GarchError, GarchResult, ParamError, ParamResult};
use ndarray::{ArrayView1, ArrayView2};
use std::collections::HashSet;

/// Observations required in the likelihood window on top of `dim(θ)`.
pub const MIN_EXTRA_OBS: usize = 10;

/// Validate a return series: non-empty and finite.
///
/// Errors
/// ------
/// - `GarchError::EmptySeries` for an empty series.
/// - `GarchError::NonFiniteReturn` at the first NaN/±∞ entry.
pub fn validate_returns(returns: ArrayView1<f64>) -> GarchResult<()> {
    if returns.is_empty() {
        return Err(GarchError::EmptySeries);
    }
    if let Some((index, &value)) = returns.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(GarchError::NonFiniteReturn { index, value });
    }
    Ok(())
}

/// Validate an exogenous matrix against its column names.
///
/// Parameters
/// ----------
/// - `values`: `ArrayView2<f64>`
///   `T × K` matrix, one row per period.
/// - `names`: `&[String]`
///   Column names; must have length `K` and be unique.
///
/// Errors
/// ------
/// - `GarchError::ExogNameMismatch` if `names.len() != K`.
/// - `GarchError::DuplicateExogName` for the first repeated name.
/// - `GarchError::NonFiniteExog` at the first NaN/±∞ entry (row-major scan).
pub fn validate_exog(values: ArrayView2<f64>, names: &[String]) -> GarchResult<()> {
    if names.len() != values.ncols() {
        return Err(GarchError::ExogNameMismatch { columns: values.ncols(), names: names.len() });
    }
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(GarchError::DuplicateExogName { name: name.clone() });
        }
    }
    for ((row, col), &value) in values.indexed_iter() {
        if !value.is_finite() {
            return Err(GarchError::NonFiniteExog { row, col, value });
        }
    }
    Ok(())
}

/// Validate the burn-in and the size of the likelihood window.
///
/// Returns the effective number of observations `n_eff = len − burn_in`.
///
/// Errors
/// ------
/// - `GarchError::BurnInOutOfRange` if `burn_in >= len`.
/// - `GarchError::InsufficientObservations` if
///   `n_eff < dim + MIN_EXTRA_OBS`.
pub fn validate_sample_size(len: usize, burn_in: usize, dim: usize) -> GarchResult<usize> {
    if burn_in >= len {
        return Err(GarchError::BurnInOutOfRange { burn_in, len });
    }
    let n_eff = len - burn_in;
    let required = dim + MIN_EXTRA_OBS;
    if n_eff < required {
        return Err(GarchError::InsufficientObservations { n_eff, required });
    }
    Ok(n_eff)
}

/// Validate a caller-supplied future exogenous path of shape `h × K`.
pub fn validate_future_exog(values: ArrayView2<f64>, horizon: usize, k: usize) -> GarchResult<()> {
    if values.nrows() != horizon || values.ncols() != k {
        return Err(GarchError::FutureExogShape {
            expected_rows: horizon,
            expected_cols: k,
            rows: values.nrows(),
            cols: values.ncols(),
        });
    }
    for ((row, col), &value) in values.indexed_iter() {
        if !value.is_finite() {
            return Err(GarchError::NonFiniteFutureExog { row, col, value });
        }
    }
    Ok(())
}

/// Validate the intercept: finite and strictly positive.
pub fn validate_omega(omega: f64) -> ParamResult<()> {
    if omega <= 0.0 || !omega.is_finite() {
        return Err(ParamError::InvalidOmega { value: omega });
    }
    Ok(())
}

/// Validate the ARCH coefficient: finite and non-negative.
pub fn validate_alpha(alpha: f64) -> ParamResult<()> {
    if alpha < 0.0 || !alpha.is_finite() {
        return Err(ParamError::InvalidAlpha { value: alpha });
    }
    Ok(())
}

/// Validate the GARCH coefficient: finite and non-negative.
pub fn validate_beta(beta: f64) -> ParamResult<()> {
    if beta < 0.0 || !beta.is_finite() {
        return Err(ParamError::InvalidBeta { value: beta });
    }
    Ok(())
}

/// Validate the Student-t degrees of freedom: finite and `> 2`.
pub fn validate_nu(nu: f64) -> ParamResult<()> {
    if nu <= 2.0 || !nu.is_finite() {
        return Err(ParamError::InvalidNu { value: nu });
    }
    Ok(())
}

/// Validate the leverage term: `γ` finite and `α + γ ≥ 0`.
///
/// `gamma_index` is the θ position of γ, used in the error payload.
pub fn validate_leverage(alpha: f64, gamma: f64, gamma_index: usize) -> ParamResult<()> {
    if !gamma.is_finite() {
        return Err(ParamError::NonFiniteCoefficient { index: gamma_index, value: gamma });
    }
    let alpha_plus_gamma = alpha + gamma;
    if alpha_plus_gamma < 0.0 {
        return Err(ParamError::LeverageViolated { alpha_plus_gamma });
    }
    Ok(())
}

/// Validate the stationarity proxy `α + γ/2 + β < 1`.
pub fn validate_stationarity(alpha: f64, gamma: f64, beta: f64) -> ParamResult<()> {
    let persistence = alpha + 0.5 * gamma + beta;
    if !(persistence < 1.0) {
        return Err(ParamError::StationarityViolated { persistence });
    }
    Ok(())
}

/// Validate exogenous coefficients: finite. `offset` is the θ position of δ₁.
pub fn validate_delta(delta: ArrayView1<f64>, offset: usize) -> ParamResult<()> {
    if let Some((i, &value)) = delta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ParamError::NonFiniteCoefficient { index: offset + i, value });
    }
    Ok(())
}

/// Validate a full parameter vector `[ω, α, γ, β, δ₁..δ_K, ν]`.
///
/// Errors
/// ------
/// - `ParamError::ThetaLengthMismatch` if `theta.len() != 5 + k`.
/// - Otherwise the first failing coordinate check, in the order ω, α, β, ν,
///   γ/leverage, δ, stationarity.
pub fn validate_theta(theta: ArrayView1<f64>, k: usize) -> ParamResult<()> {
    let expected = 5 + k;
    if theta.len() != expected {
        return Err(ParamError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    let (omega, alpha, gamma, beta, nu) = (theta[0], theta[1], theta[2], theta[3], theta[4 + k]);
    validate_omega(omega)?;
    validate_alpha(alpha)?;
    validate_beta(beta)?;
    validate_nu(nu)?;
    validate_leverage(alpha, gamma, 2)?;
    validate_delta(theta.slice(ndarray::s![4..4 + k]), 4)?;
    validate_stationarity(alpha, gamma, beta)
}
