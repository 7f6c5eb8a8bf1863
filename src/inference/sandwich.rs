//! inference::sandwich — QML (sandwich) covariance from per-observation scores.
//!
//! Purpose
//! -------
//! Provide the robust covariance `H⁻¹ S H⁻¹` of a quasi-maximum-likelihood
//! estimator, where `H⁻¹` is the classical covariance from
//! [`crate::inference::hessian`] and `S` is the outer product of the
//! per-observation scores. It stays valid when the assumed innovation
//! density is wrong but the variance equation is right.
//!
//! Key behaviors
//! -------------
//! - Take the `n × p` matrix of per-observation scores from the model,
//!   which differentiates its contributions analytically.
//! - [`score_outer_product`] builds `S = Σ_t s_t s_tᵀ` (IID, no lags).
//! - [`sandwich_covariance`] combines bread and meat and symmetrizes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scores are on the summed scale, matching the Hessian convention, so no
//!   `1/n` factors appear.
//! - The bread must come from a positive-definite information matrix;
//!   callers skip robust errors otherwise.
//!
//! Testing notes
//! -------------
//! - Unit tests check the OPG against a direct sum, the sandwich against a
//!   hand-computed case, and shape errors.
use crate::inference::errors::{InferenceError, InferenceResult};
use ndarray::Array2;

/// Outer product of scores `S = Σ_t s_t s_tᵀ`.
///
/// Errors
/// ------
/// - `InferenceError::EmptyScores` when `scores` has no rows.
pub fn score_outer_product(scores: &Array2<f64>) -> InferenceResult<Array2<f64>> {
    if scores.nrows() == 0 {
        return Err(InferenceError::EmptyScores);
    }
    Ok(scores.t().dot(scores))
}

/// sandwich_covariance — robust covariance `B S B`.
///
/// Parameters
/// ----------
/// - `bread`: `&Array2<f64>`
///   Classical covariance `H⁻¹` (`p × p`, symmetric).
/// - `scores`: `&Array2<f64>`
///   Per-observation scores (`n × p`).
///
/// Returns
/// -------
/// `InferenceResult<Array2<f64>>`
///   Symmetric `p × p` covariance.
///
/// Errors
/// ------
/// - `InferenceError::NotSquare` for a non-square bread.
/// - `InferenceError::ScoreDimMismatch` when score columns differ from `p`.
/// - `InferenceError::EmptyScores` for an empty score matrix.
/// - `InferenceError::NonFiniteCovariance` on overflow.
pub fn sandwich_covariance(
    bread: &Array2<f64>, scores: &Array2<f64>,
) -> InferenceResult<Array2<f64>> {
    let (rows, cols) = bread.dim();
    if rows != cols {
        return Err(InferenceError::NotSquare { rows, cols });
    }
    if scores.ncols() != rows {
        return Err(InferenceError::ScoreDimMismatch { expected: rows, found: scores.ncols() });
    }
    let meat = score_outer_product(scores)?;
    let raw = bread.dot(&meat).dot(bread);
    let cov = Array2::from_shape_fn((rows, rows), |(i, j)| 0.5 * (raw[[i, j]] + raw[[j, i]]));
    if let Some(((row, col), &value)) = cov.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(InferenceError::NonFiniteCovariance { row, col, value });
    }
    Ok(cov)
}

/// Square roots of the diagonal; `None` where the variance is not positive.
pub fn std_errors_from(cov: &Array2<f64>) -> Vec<Option<f64>> {
    cov.diag().iter().map(|&v| if v > 0.0 { Some(v.sqrt()) } else { None }).collect()
}
