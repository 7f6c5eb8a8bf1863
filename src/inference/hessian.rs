//! inference::hessian — Hessian-based covariance and standard errors.
//!
//! Purpose
//! -------
//! Turn a central-difference Hessian of the negative log-likelihood into a
//! parameter covariance matrix and standard errors, and detect the case
//! where the Hessian is not positive definite (optimum on or near a
//! boundary, weak identification). This module handles the conversion
//! between `ndarray` and `nalgebra` types.
//!
//! Key behaviors
//! -------------
//! - [`observed_information`] evaluates `J(θ̂) = ∇²(−ℓ)(θ̂)` with the fixed
//!   relative step policy of the finite-difference module.
//! - [`covariance_from_information`] tries a Cholesky factorization of `J`.
//!   On success the covariance is `J⁻¹` and every standard error is
//!   reported.
//! - Otherwise a symmetric eigendecomposition identifies the directions
//!   with eigenvalues at or below the cutoff; parameters that load on them
//!   are marked as affected and get **no** standard error, the others are
//!   read off the Moore–Penrose pseudoinverse built from the remaining
//!   directions.
//!
//! Invariants & assumptions
//! ------------------------
//! - `J` is square and exactly symmetric (the finite-difference routine
//!   mirrors off-diagonal entries); this module does **not** re-symmetrize
//!   its input.
//! - The eigenvalue cutoff is relative: `EIGEN_EPS · max(1, max|λ|)`, so the
//!   decision does not depend on the sample size.
//! - Reported standard errors are never NaN: unavailable ones are `None`.
//!
//! Conventions
//! -----------
//! - Hessians are on the **summed** log-likelihood scale, so `J⁻¹` is the
//!   covariance of `θ̂` directly (no division by `n`).
//! - Errors are reported via [`InferenceResult<T>`].
//!
//! Downstream usage
//! ----------------
//! - The volatility model calls [`calc_covariance`] after a fit, then feeds
//!   `covariance` (when positive definite) as the bread of the sandwich
//!   estimator in [`crate::inference::sandwich`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover copying into `DMatrix`, exact inverses of diagonal
//!   and correlated information matrices, and the singular/indefinite
//!   branches (affected parameters, pseudoinverse SEs for the rest).
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Theta, finite_diff::central_hessian, types::Hessian},
        numerical_stability::EIGEN_EPS,
    },
};
use nalgebra::DMatrix;
use ndarray::Array2;

/// Squared eigenvector loading above which a parameter counts as affected
/// by a non-positive direction of the information matrix.
pub const AFFECTED_LOADING: f64 = 1e-2;

/// Covariance derived from an observed information matrix.
///
/// Fields
/// ------
/// - `covariance`: `J⁻¹` when positive definite, otherwise the
///   pseudoinverse over the well-determined directions.
/// - `std_errors`: `√diag`, `None` for affected parameters.
/// - `positive_definite`: Cholesky succeeded and every eigenvalue exceeds
///   the cutoff.
/// - `min_eigenvalue`: smallest eigenvalue of `J`.
/// - `condition_number`: `max λ / min λ` when `min λ > 0`.
/// - `affected`: indices of parameters without a standard error.
#[derive(Debug, Clone, PartialEq)]
pub struct HessianCovariance {
    pub covariance: Array2<f64>,
    pub std_errors: Vec<Option<f64>>,
    pub positive_definite: bool,
    pub min_eigenvalue: f64,
    pub condition_number: Option<f64>,
    pub affected: Vec<usize>,
}

/// Observed information `J(θ̂)` of a negative log-likelihood.
///
/// Errors
/// ------
/// - `InferenceError::Derivative` when the objective fails at `θ̂` or at a
///   perturbed point, or when an entry is not finite.
pub fn observed_information<F>(neg_loglik: &F, theta_hat: &Theta) -> InferenceResult<Hessian>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    Ok(central_hessian(neg_loglik, theta_hat)?)
}

/// calc_covariance — covariance and standard errors from observed information.
///
/// Parameters
/// ----------
/// - `neg_loglik`: `&F`
///   Negative log-likelihood `θ ↦ −ℓ(θ)`, twice differentiable near
///   `theta_hat` and defined at points one finite-difference step away.
/// - `theta_hat`: `&Theta`
///   Point estimate.
///
/// Returns
/// -------
/// `InferenceResult<HessianCovariance>`
///
/// Errors
/// ------
/// - Propagates [`observed_information`] and
///   [`covariance_from_information`] failures.
pub fn calc_covariance<F>(neg_loglik: &F, theta_hat: &Theta) -> InferenceResult<HessianCovariance>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let info = observed_information(neg_loglik, theta_hat)?;
    covariance_from_information(&info)
}

/// Invert (or pseudo-invert) a symmetric information matrix.
///
/// Errors
/// ------
/// - `InferenceError::NotSquare` for a non-square input.
/// - `InferenceError::NonFiniteCovariance` if the inverse overflows.
pub fn covariance_from_information(info: &Array2<f64>) -> InferenceResult<HessianCovariance> {
    let (rows, cols) = info.dim();
    if rows != cols {
        return Err(InferenceError::NotSquare { rows, cols });
    }
    let n = rows;
    let mut info_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(info, &mut info_nalg);

    let eigen = info_nalg.clone().symmetric_eigen();
    let eigenvals = &eigen.eigenvalues;
    let max_abs = eigenvals.iter().fold(0.0_f64, |m, l| m.max(l.abs()));
    let min_eigenvalue = eigenvals.iter().copied().fold(f64::INFINITY, f64::min);
    let cutoff = EIGEN_EPS * max_abs.max(1.0);
    let condition_number = if min_eigenvalue > 0.0 {
        let max_eig = eigenvals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(max_eig / min_eigenvalue)
    } else {
        None
    };

    if min_eigenvalue > cutoff {
        if let Some(chol) = info_nalg.clone().cholesky() {
            let inv = chol.inverse();
            let covariance =
                Array2::from_shape_fn((n, n), |(i, j)| 0.5 * (inv[(i, j)] + inv[(j, i)]));
            check_finite(&covariance)?;
            let std_errors = (0..n).map(|i| Some(covariance[[i, i]].sqrt())).collect();
            return Ok(HessianCovariance {
                covariance,
                std_errors,
                positive_definite: true,
                min_eigenvalue,
                condition_number,
                affected: Vec::new(),
            });
        }
    }

    let q = &eigen.eigenvectors;
    let mut affected: Vec<usize> = (0..n)
        .filter(|&i| {
            let loading: f64 = eigenvals
                .iter()
                .enumerate()
                .filter(|(_, lambda)| **lambda <= cutoff)
                .map(|(k, _)| q[(i, k)] * q[(i, k)])
                .sum();
            loading > AFFECTED_LOADING
        })
        .collect();
    if affected.is_empty() && n > 0 {
        // Cholesky rejected a matrix whose eigenvalues all clear the cutoff;
        // blame the weakest direction's dominant parameter.
        let weakest = argmin(eigenvals.iter().copied());
        affected.push(argmax((0..n).map(|i| q[(i, weakest)].abs())));
    }

    let covariance = pseudo_inverse(&info_nalg, cutoff);
    check_finite(&covariance)?;
    let std_errors = (0..n)
        .map(|i| {
            let var = covariance[[i, i]];
            if affected.contains(&i) || !(var > 0.0) { None } else { Some(var.sqrt()) }
        })
        .collect();
    Ok(HessianCovariance {
        covariance,
        std_errors,
        positive_definite: false,
        min_eigenvalue,
        condition_number,
        affected,
    })
}

// ---- Helper methods ----

/// fill_dmatrix — copy an `ndarray` matrix into a `nalgebra::DMatrix`.
///
/// Copies column by column, matching the column-major storage of `DMatrix`.
/// No symmetrization is performed.
///
/// Panics
/// ------
/// - May panic if the two matrices have inconsistent shapes; callers size
///   `out` from `src`.
fn fill_dmatrix(src: &Array2<f64>, out: &mut DMatrix<f64>) {
    let n = src.ncols();
    for j in 0..n {
        for i in j..n {
            if j == i {
                out[(i, i)] = src[[i, i]];
            } else {
                out[(i, j)] = src[[i, j]];
                out[(j, i)] = src[[j, i]];
            }
        }
    }
}

/// Moore–Penrose pseudoinverse `Σ_{λ_k > cutoff} q_k q_kᵀ / λ_k`.
fn pseudo_inverse(info: &DMatrix<f64>, cutoff: f64) -> Array2<f64> {
    let n = info.nrows();
    let eigen = info.clone().symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut out = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda > cutoff {
            for i in 0..n {
                let coeff = q[(i, k)] / lambda;
                for j in 0..n {
                    out[[i, j]] += coeff * q[(j, k)];
                }
            }
        }
    }
    out
}

fn check_finite(cov: &Array2<f64>) -> InferenceResult<()> {
    match cov.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => {
            Err(InferenceError::NonFiniteCovariance { row, col, value })
        }
        None => Ok(()),
    }
}

fn argmin<I: Iterator<Item = f64>>(values: I) -> usize {
    values
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, v)| if v < best.1 { (i, v) } else { best })
        .0
}

fn argmax<I: Iterator<Item = f64>>(values: I) -> usize {
    values
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
        .0
}
