//! Numerical stability utilities.
//!
//! Shared tolerances for the constrained GJR-GARCH-X solve and the
//! delta-method helper that maps covariances estimated on rescaled data back
//! to the caller's units.
//!
//! # Provided items
//! - [`STATIONARITY_MARGIN`]: slack in `α + γ/2 + β ≤ 1 − margin`.
//! - [`OMEGA_MIN`], [`NU_MIN`], [`NU_MAX`]: default box bounds.
//! - [`VARIANCE_FLOOR_REL`]: variance floor relative to the sample variance.
//! - [`FLOOR_WARN_FRACTION`]: fraction of floored periods that triggers a
//!   warning.
//! - [`EIGEN_EPS`]: eigenvalue cutoff for pseudo-inverses.
//! - [`GENERAL_TOL`]: generic feasibility slack.
//! - [`delta_method_diag`]: `D C D` for diagonal Jacobians.
//! - [`half_life`]: variance shock half-life from persistence.
use ndarray::{Array1, Array2};

/// Safety margin for strict stationarity.
///
/// The stationarity proxy requires `α + γ/2 + β < 1`. The solver enforces
/// `α + γ/2 + β ≤ 1 − STATIONARITY_MARGIN`, so every accepted iterate lies
/// strictly inside the mean-reverting region.
pub const STATIONARITY_MARGIN: f64 = 1e-6;

/// Lower bound on ω in rescaled (unit-variance) units.
pub const OMEGA_MIN: f64 = 1e-8;

/// Lower bound on the Student-t degrees of freedom.
///
/// Keeps `ln(π(ν − 2))` and `ε² / ((ν − 2)σ²)` away from their singularity
/// at `ν = 2`.
pub const NU_MIN: f64 = 2.05;

/// Upper bound on the Student-t degrees of freedom. Beyond this the density
/// is numerically Gaussian.
pub const NU_MAX: f64 = 500.0;

/// Variance floor relative to the residual sample variance.
pub const VARIANCE_FLOOR_REL: f64 = 1e-8;

/// Fraction of floored periods above which the floor is reported as a
/// misspecification warning.
pub const FLOOR_WARN_FRACTION: f64 = 0.01;

/// Eigenvalues at or below this value are treated as zero in pseudo-inverses.
pub const EIGEN_EPS: f64 = 1e-10;

/// Generic slack used when testing feasibility of constraint rows.
pub const GENERAL_TOL: f64 = 1e-10;

/// Constraint slack at or below which an estimate is reported as sitting on
/// the boundary of the admissible region.
pub const BOUND_ACTIVE_TOL: f64 = 1e-6;

/// Delta method for a diagonal Jacobian.
///
/// For a reparameterization `φ = D θ` with `D = diag(scale)`, the covariance
/// transforms as `Cov(φ) = D Cov(θ) D`, i.e. entry `(i, j)` is multiplied by
/// `scale[i] · scale[j]`.
///
/// # Panics
/// Panics if `cov` is not `n × n` with `n = scale.len()`; shapes are fixed by
/// the parameter layout and a mismatch is a programming error.
pub fn delta_method_diag(cov: &Array2<f64>, scale: &Array1<f64>) -> Array2<f64> {
    let n = scale.len();
    Array2::from_shape_fn((n, n), |(i, j)| cov[[i, j]] * scale[i] * scale[j])
}

/// Half-life (in periods) of a variance shock for persistence `p`.
///
/// Returns `None` when `p` is outside `(0, 1)`, where the half-life is
/// either zero or undefined.
pub fn half_life(persistence: f64) -> Option<f64> {
    if persistence > 0.0 && persistence < 1.0 {
        Some(0.5_f64.ln() / persistence.ln())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify that `delta_method_diag` scales entries by the outer product of
    // the scale vector.
    //
    // Given
    // -----
    // - An identity-plus-offdiagonal covariance and scale `[2, 1]`.
    //
    // Expect
    // ------
    // - `(0,0)` multiplied by 4, off-diagonals by 2, `(1,1)` unchanged.
    fn delta_method_diag_scales_by_outer_product() {
        // Arrange
        let cov = array![[1.0, 0.5], [0.5, 1.0]];
        let scale = array![2.0, 1.0];

        // Act
        let out = delta_method_diag(&cov, &scale);

        // Assert
        assert_relative_eq!(out[[0, 0]], 4.0);
        assert_relative_eq!(out[[0, 1]], 1.0);
        assert_relative_eq!(out[[1, 0]], 1.0);
        assert_relative_eq!(out[[1, 1]], 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Check the half-life formula and its domain.
    //
    // Given
    // -----
    // - Persistence 0.5, 1.0 and 0.0.
    //
    // Expect
    // ------
    // - One period for 0.5; `None` on the boundaries.
    fn half_life_matches_closed_form() {
        // Arrange / Act / Assert
        assert_relative_eq!(half_life(0.5).unwrap(), 1.0, epsilon = 1e-12);
        assert!(half_life(1.0).is_none());
        assert!(half_life(0.0).is_none());
    }
}
