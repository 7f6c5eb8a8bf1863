//! GJR-GARCH-X conditional-variance recursion.
//!
//! Purpose
//! -------
//! Compute the conditional-variance path
//!
//! ```text
//! σ²_t = ω + α·ε²_{t−1} + γ·ε²_{t−1}·1[ε_{t−1} < 0] + β·σ²_{t−1} + Σⱼ δⱼ·x_{j,t}
//! ```
//!
//! deterministically from parameters, residuals and regressors, with a
//! positive floor as a numerical safety net.
//!
//! Key behaviors
//! -------------
//! - [`gjr_step`] evaluates one unfloored step; the likelihood gradient and
//!   the forecaster reuse it so all paths share one formula.
//! - [`variance_path`] runs the recursion on a flat `θ` (optimizer layout)
//!   and counts floor hits; [`conditional_variance`] is the checked entry
//!   point taking [`GjrParams`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `σ²₀ = sigma2_init` (the residual sample variance); it is a fixed seed,
//!   not a parameter.
//! - Any `σ²_t ≤ floor` (or NaN) is replaced by `floor` and counted in
//!   [`VariancePath::floor_hits`]; with `floor > 0` every value in the path
//!   is strictly positive.
//! - Pure functions: no state, no I/O, no logging.
//!
//! Conventions
//! -----------
//! - Row `t` of the exogenous matrix enters `σ²_t` (same period), residual
//!   `ε_{t−1}` enters with one lag.
use crate::{
    optimization::loglik_optimizer::Theta,
    volatility::{
        core::params::{GjrParams, IDX_ALPHA, IDX_BETA, IDX_DELTA, IDX_GAMMA, IDX_OMEGA, theta_dim},
        errors::{GarchError, GarchResult, ParamError},
    },
};
use ndarray::{Array1, ArrayView1, ArrayView2, s};

/// Conditional-variance path plus the number of floored periods.
#[derive(Debug, Clone, PartialEq)]
pub struct VariancePath {
    pub sigma2: Array1<f64>,
    /// Periods `t ≥ 1` whose raw value was at or below the floor.
    pub floor_hits: usize,
}

impl VariancePath {
    /// Share of recursion steps that hit the floor.
    pub fn floor_fraction(&self) -> f64 {
        let steps = self.sigma2.len().saturating_sub(1);
        if steps == 0 { 0.0 } else { self.floor_hits as f64 / steps as f64 }
    }
}

/// One unfloored GJR-GARCH-X step.
///
/// `exog_term` is the precomputed `Σⱼ δⱼ·x_{j,t}`.
#[inline]
pub fn gjr_step(
    omega: f64, alpha: f64, gamma: f64, beta: f64, eps_prev: f64, sigma2_prev: f64,
    exog_term: f64,
) -> f64 {
    let e2 = eps_prev * eps_prev;
    let shock = if eps_prev < 0.0 { alpha + gamma } else { alpha };
    omega + shock * e2 + beta * sigma2_prev + exog_term
}

/// Apply the floor; returns the value and whether the floor was hit.
#[inline]
pub(crate) fn apply_floor(value: f64, floor: f64) -> (f64, bool) {
    if value > floor { (value, false) } else { (floor, true) }
}

/// Run the recursion for a flat parameter vector `θ = [ω, α, γ, β, δ.., ν]`.
///
/// Parameters
/// ----------
/// - `theta`: `ArrayView1<f64>`
///   Length `5 + K`; the trailing `ν` is ignored.
/// - `resid`: `ArrayView1<f64>`
///   Residuals `ε_t`, length `T`.
/// - `exog`: `ArrayView2<f64>`
///   `T × K` regressors.
/// - `sigma2_init`: `f64`
///   Seed `σ²₀`.
/// - `floor`: `f64`
///   Positive lower bound applied to every step.
///
/// Panics
/// ------
/// Panics on shape mismatches; callers inside the crate guarantee shapes.
/// Use [`conditional_variance`] for a checked entry point.
pub fn variance_path(
    theta: ArrayView1<f64>, resid: ArrayView1<f64>, exog: ArrayView2<f64>, sigma2_init: f64,
    floor: f64,
) -> VariancePath {
    let n = resid.len();
    let k = exog.ncols();
    let (omega, alpha, gamma, beta) =
        (theta[IDX_OMEGA], theta[IDX_ALPHA], theta[IDX_GAMMA], theta[IDX_BETA]);
    let delta = theta.slice(s![IDX_DELTA..IDX_DELTA + k]);

    let mut sigma2 = Array1::zeros(n);
    let mut floor_hits = 0;
    if n == 0 {
        return VariancePath { sigma2, floor_hits };
    }
    sigma2[0] = sigma2_init.max(floor);
    for t in 1..n {
        let exog_term = if k > 0 { exog.row(t).dot(&delta) } else { 0.0 };
        let raw = gjr_step(omega, alpha, gamma, beta, resid[t - 1], sigma2[t - 1], exog_term);
        let (value, hit) = apply_floor(raw, floor);
        floor_hits += hit as usize;
        sigma2[t] = value;
    }
    VariancePath { sigma2, floor_hits }
}

/// Checked recursion for validated parameters.
///
/// Errors
/// ------
/// - `GarchError::ExogRowMismatch` if `exog.nrows() != resid.len()`.
/// - `GarchError::InvalidParams(ThetaLengthMismatch)` if the number of δ
///   coefficients differs from `exog.ncols()`.
/// - `GarchError::InvalidBounds` if `floor` or `sigma2_init` is not
///   strictly positive.
pub fn conditional_variance(
    params: &GjrParams, resid: ArrayView1<f64>, exog: ArrayView2<f64>, sigma2_init: f64,
    floor: f64,
) -> GarchResult<VariancePath> {
    if exog.nrows() != resid.len() {
        return Err(GarchError::ExogRowMismatch { returns: resid.len(), rows: exog.nrows() });
    }
    if params.n_exog() != exog.ncols() {
        return Err(GarchError::InvalidParams(ParamError::ThetaLengthMismatch {
            expected: theta_dim(exog.ncols()),
            actual: theta_dim(params.n_exog()),
        }));
    }
    if !(floor > 0.0) || !(sigma2_init > 0.0) {
        return Err(GarchError::InvalidBounds {
            reason: "variance floor and initial variance must be strictly positive",
        });
    }
    let theta: Theta = params.to_theta();
    Ok(variance_path(theta.view(), resid, exog, sigma2_init, floor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The K = 0 recursion against a hand-computed GJR-GARCH(1,1) path.
    // - The leverage term in isolation.
    // - Exogenous contributions and the variance floor.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the K = 0 recursion reproduces the closed-form GJR-GARCH(1,1)
    // values.
    //
    // Given
    // -----
    // - ω = 0.1, α = 0.1, γ = 0.2, β = 0.7, σ²₀ = 1, ε = [1, −2, 0.5].
    //
    // Expect
    // ------
    // - σ²₁ = 0.1 + 0.1·1 + 0.7·1 = 0.9
    // - σ²₂ = 0.1 + 0.3·4 + 0.7·0.9 = 1.93
    fn variance_path_matches_closed_form_without_exog() {
        // Arrange
        let params = GjrParams::new(0.1, 0.1, 0.2, 0.7, Array1::zeros(0), 8.0).unwrap();
        let resid = array![1.0, -2.0, 0.5];
        let exog = Array2::zeros((3, 0));

        // Act
        let path = conditional_variance(&params, resid.view(), exog.view(), 1.0, 1e-8).unwrap();

        // Assert
        assert_relative_eq!(path.sigma2[0], 1.0);
        assert_relative_eq!(path.sigma2[1], 0.9, epsilon = 1e-14);
        assert_relative_eq!(path.sigma2[2], 1.93, epsilon = 1e-14);
        assert_eq!(path.floor_hits, 0);
    }

    #[test]
    // Purpose
    // -------
    // Isolate the leverage term: shocks of equal magnitude and opposite sign.
    //
    // Given
    // -----
    // - `gjr_step` with ε = ±1.5, once with γ = 0.15 and once with γ = 0.
    //
    // Expect
    // ------
    // - Different next-period variance when γ ≠ 0 (difference γ·ε²).
    // - Identical variance when γ = 0.
    fn leverage_term_separates_signed_shocks() {
        // Arrange
        let (omega, alpha, beta, s2) = (0.05, 0.08, 0.85, 1.2);

        // Act
        let up = gjr_step(omega, alpha, 0.15, beta, 1.5, s2, 0.0);
        let down = gjr_step(omega, alpha, 0.15, beta, -1.5, s2, 0.0);
        let up0 = gjr_step(omega, alpha, 0.0, beta, 1.5, s2, 0.0);
        let down0 = gjr_step(omega, alpha, 0.0, beta, -1.5, s2, 0.0);

        // Assert
        assert_relative_eq!(down - up, 0.15 * 2.25, epsilon = 1e-14);
        assert_eq!(up0, down0);
    }

    #[test]
    // Purpose
    // -------
    // Check that exogenous terms enter contemporaneously and that a large
    // negative contribution is floored and counted.
    //
    // Given
    // -----
    // - K = 1, δ = −10, x = [0, 0, 1, 0]; ε = 0 everywhere.
    //
    // Expect
    // ------
    // - σ²₂ floored (raw value negative), one floor hit.
    // - All values strictly positive.
    fn exog_term_and_floor() {
        // Arrange
        let params = GjrParams::new(0.1, 0.05, 0.0, 0.9, array![-10.0], 6.0).unwrap();
        let resid = Array1::zeros(4);
        let exog = array![[0.0], [0.0], [1.0], [0.0]];

        // Act
        let path = conditional_variance(&params, resid.view(), exog.view(), 1.0, 1e-6).unwrap();

        // Assert
        assert_relative_eq!(path.sigma2[1], 0.1 + 0.9, epsilon = 1e-14);
        assert_eq!(path.sigma2[2], 1e-6);
        assert_eq!(path.floor_hits, 1);
        assert_relative_eq!(path.floor_fraction(), 1.0 / 3.0);
        assert!(path.sigma2.iter().all(|&v| v > 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Ensure shape mismatches are reported instead of panicking.
    //
    // Given
    // -----
    // - Parameters with K = 1 against a T × 0 matrix.
    //
    // Expect
    // ------
    // - `InvalidParams(ThetaLengthMismatch)`.
    fn conditional_variance_rejects_mismatched_k() {
        // Arrange
        let params = GjrParams::new(0.1, 0.05, 0.0, 0.9, array![1.0], 6.0).unwrap();
        let resid = Array1::zeros(3);

        // Act
        let result =
            conditional_variance(&params, resid.view(), Array2::zeros((3, 0)).view(), 1.0, 1e-8);

        // Assert
        assert!(matches!(
            result,
            Err(GarchError::InvalidParams(ParamError::ThetaLengthMismatch { .. }))
        ));
    }
}
