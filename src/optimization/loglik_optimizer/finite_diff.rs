//! loglik_optimizer::finite_diff — finite-difference derivative helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference gradients, Hessians and Jacobians around a
//! parameter vector with a fixed, documented step policy, so that the
//! optimizer and the inference layer can request derivatives without
//! depending directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - Compute forward-difference gradients with error capture and post-hoc
//!   validation via [`run_fd_diff`] (fallback path of the argmin adapter).
//! - Compute central-difference Hessians of a scalar objective with the
//!   relative step policy of [`fd_steps`] via [`central_hessian`]:
//!   three-point formula on the diagonal, four-point formula off the
//!   diagonal.
//! - Compute central-difference Jacobians of vector-valued maps via
//!   [`central_jacobian`], the reference that analytic per-observation
//!   scores are checked against.
//!
//! Invariants & assumptions
//! ------------------------
//! - Step sizes are `hᵢ = FD_REL_STEP · max(|θᵢ|, FD_MIN_SCALE)`; they
//!   depend only on `θ`, so repeated calls are bit-for-bit reproducible.
//! - Objective failures at perturbed points are surfaced as errors; no
//!   value is silently replaced.
//! - Hessians returned here are exactly symmetric (each off-diagonal pair
//!   is computed once and mirrored) and satisfy [`validate_hessian`].
//!
//! Conventions
//! -----------
//! - Finite differences are taken in whatever space the caller's `θ` lives
//!   in; for the volatility model this is the rescaled estimation space.
//! - Domain errors are surfaced as [`OptError`](crate::optimization::errors::OptError)
//!   via `OptResult<T>`; Argmin’s [`Error`] is confined to the thin boundary
//!   where `finitediff` closures are invoked.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the forward-difference error capture paths, the step
//!   policy, Hessians of quadratics and a non-separable function, and
//!   Jacobians of linear maps.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use ndarray::{Array1, Array2};
use std::cell::RefCell;

/// Relative step of the central-difference policy.
pub const FD_REL_STEP: f64 = 1e-4;

/// Floor on `|θᵢ|` used to scale steps for parameters near zero.
pub const FD_MIN_SCALE: f64 = 1e-2;

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
/// - `func`: `&G`
///   Objective closure. It routes evaluation errors into `closure_err` and
///   returns `NaN` in that case.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot, cleared on entry and inspected after the FD call.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   The validated forward-difference gradient.
///
/// Errors
/// ------
/// - Any error captured in `closure_err` (mapped via `From<Error> for OptError`).
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// Step sizes `hᵢ = FD_REL_STEP · max(|θᵢ|, FD_MIN_SCALE)`.
pub fn fd_steps(theta: &Theta) -> Array1<f64> {
    theta.mapv(|t| FD_REL_STEP * t.abs().max(FD_MIN_SCALE))
}

/// central_hessian — central-difference Hessian of a scalar objective.
///
/// Purpose
/// -------
/// Approximate `∂²f/∂θᵢ∂θⱼ` at `theta` with the step policy of
/// [`fd_steps`]:
///
/// ```text
/// Hᵢᵢ = [f(θ + hᵢeᵢ) − 2f(θ) + f(θ − hᵢeᵢ)] / hᵢ²
/// Hᵢⱼ = [f(++) − f(+−) − f(−+) + f(−−)] / (4 hᵢ hⱼ)
/// ```
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Fallible scalar objective.
/// - `theta`: `&Theta`
///   Expansion point.
///
/// Returns
/// -------
/// `OptResult<Hessian>`
///   A symmetric, finite `n × n` matrix.
///
/// Errors
/// ------
/// - Any error returned by `f` at `theta` or at a perturbed point.
/// - `OptError::InvalidHessian` when an entry is not finite.
///
/// Notes
/// -----
/// - Costs `1 + 2n + 4·n(n−1)/2` objective evaluations.
pub fn central_hessian<F>(f: &F, theta: &Theta) -> OptResult<Hessian>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let n = theta.len();
    let h = fd_steps(theta);
    let f0 = f(theta)?;
    let mut hess = Array2::<f64>::zeros((n, n));
    let mut point = theta.clone();

    for i in 0..n {
        point[i] = theta[i] + h[i];
        let f_plus = f(&point)?;
        point[i] = theta[i] - h[i];
        let f_minus = f(&point)?;
        point[i] = theta[i];
        hess[[i, i]] = (f_plus - 2.0 * f0 + f_minus) / (h[i] * h[i]);
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let mut eval = |si: f64, sj: f64| -> OptResult<f64> {
                point[i] = theta[i] + si * h[i];
                point[j] = theta[j] + sj * h[j];
                let v = f(&point);
                point[i] = theta[i];
                point[j] = theta[j];
                v
            };
            let f_pp = eval(1.0, 1.0)?;
            let f_pm = eval(1.0, -1.0)?;
            let f_mp = eval(-1.0, 1.0)?;
            let f_mm = eval(-1.0, -1.0)?;
            let value = (f_pp - f_pm - f_mp + f_mm) / (4.0 * h[i] * h[j]);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }

    validate_hessian(&hess, n)?;
    Ok(hess)
}

/// central_jacobian — central-difference Jacobian of a vector-valued map.
///
/// Returns the `m × n` matrix `J[t, i] = ∂fₜ/∂θᵢ`, where `m` is the length
/// of `f(θ)`, using the step policy of [`fd_steps`]. Rows are typically
/// per-observation log-likelihood contributions, making `J` the matrix of
/// per-observation scores.
///
/// # Errors
/// - Any error returned by `f`.
/// - `OptError::GradientDimMismatch` if `f` returns vectors of different
///   lengths at the two perturbed points.
/// - `OptError::InvalidGradient` if an entry is not finite.
pub fn central_jacobian<F>(f: &F, theta: &Theta) -> OptResult<Array2<f64>>
where
    F: Fn(&Theta) -> OptResult<Array1<f64>>,
{
    let n = theta.len();
    let h = fd_steps(theta);
    let mut point = theta.clone();
    let mut columns: Vec<Array1<f64>> = Vec::with_capacity(n);

    for i in 0..n {
        point[i] = theta[i] + h[i];
        let plus = f(&point)?;
        point[i] = theta[i] - h[i];
        let minus = f(&point)?;
        point[i] = theta[i];
        if plus.len() != minus.len() {
            return Err(crate::optimization::errors::OptError::GradientDimMismatch {
                expected: plus.len(),
                found: minus.len(),
            });
        }
        let column = (&plus - &minus) / (2.0 * h[i]);
        validate_grad(&column, plus.len())?;
        columns.push(column);
    }

    let m = columns.first().map_or(0, |c| c.len());
    Ok(Array2::from_shape_fn((m, n), |(t, i)| columns[i][t]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use argmin::core::ArgminError;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradient computation with and without closure errors.
    // - The relative step policy.
    // - Central Hessians of quadratic and non-separable objectives.
    // - Central Jacobians of linear maps and error propagation.
    //
    // They intentionally DO NOT cover:
    // - End-to-end optimizer behavior (handled in higher-level tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `run_fd_diff` returns a valid gradient for a simple quadratic
    // objective with no internal error path.
    //
    // Given
    // -----
    // - `f(θ) = θᵀθ` at `θ = (0, 1)`.
    //
    // Expect
    // ------
    // - A finite gradient close to `(0, 2)`.
    fn run_fd_diff_quadratic_returns_valid_gradient() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64, 1.0]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x.dot(x);

        // Act
        let grad = run_fd_diff(&theta, &f, &closure_err).unwrap();

        // Assert
        assert_eq!(grad.len(), theta.len());
        assert_relative_eq!(grad[1], 2.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that `run_fd_diff` propagates an error captured in `closure_err`.
    //
    // Given
    // -----
    // - An objective closure that writes an `ArgminError` into `closure_err`
    //   and returns `NaN`.
    //
    // Expect
    // ------
    // - `Err(OptError::NotImplemented { .. })`.
    fn run_fd_diff_closure_error_is_propagated() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::NotImplemented { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Confirm that `run_fd_diff` rejects non-finite gradients.
    //
    // Given
    // -----
    // - An objective that always returns `NaN`.
    //
    // Expect
    // ------
    // - `Err(OptError::InvalidGradient { .. })`.
    fn run_fd_diff_non_finite_gradient_yields_invalidgradient_error() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64, 1.0]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        // Act
        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::InvalidGradient { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Check the relative step policy, including the floor near zero.
    //
    // Given
    // -----
    // - `θ = (0, −3, 0.5)`.
    //
    // Expect
    // ------
    // - Steps `(1e-6, 3e-4, 5e-5)`.
    fn fd_steps_follow_relative_policy() {
        // Arrange
        let theta = array![0.0, -3.0, 0.5];

        // Act
        let h = fd_steps(&theta);

        // Assert
        assert_relative_eq!(h[0], 1e-6, max_relative = 1e-12);
        assert_relative_eq!(h[1], 3e-4, max_relative = 1e-12);
        assert_relative_eq!(h[2], 5e-5, max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the central Hessian on a non-separable quadratic.
    //
    // Given
    // -----
    // - `f(θ) = 2θ₁² + 3θ₁θ₂ + θ₂²` at `θ = (0.3, −1.2)`.
    //
    // Expect
    // ------
    // - `H = [[4, 3], [3, 2]]`, exactly symmetric.
    fn central_hessian_matches_quadratic_form() {
        // Arrange
        let theta = array![0.3, -1.2];
        let f = |t: &Theta| -> OptResult<f64> {
            Ok(2.0 * t[0] * t[0] + 3.0 * t[0] * t[1] + t[1] * t[1])
        };

        // Act
        let hess = central_hessian(&f, &theta).unwrap();

        // Assert
        assert_relative_eq!(hess[[0, 0]], 4.0, epsilon = 1e-4);
        assert_relative_eq!(hess[[1, 1]], 2.0, epsilon = 1e-4);
        assert_relative_eq!(hess[[0, 1]], 3.0, epsilon = 1e-4);
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure objective failures at perturbed points are propagated.
    //
    // Given
    // -----
    // - An objective that fails whenever `θ₁ < 1`, evaluated at `θ₁ = 1`.
    //
    // Expect
    // ------
    // - The objective's error is returned unchanged.
    fn central_hessian_propagates_objective_errors() {
        // Arrange
        let theta = array![1.0];
        let f = |t: &Theta| -> OptResult<f64> {
            if t[0] < 1.0 { Err(OptError::InvalidNu { value: t[0] }) } else { Ok(t[0]) }
        };

        // Act
        let err = central_hessian(&f, &theta).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::InvalidNu { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify the central Jacobian of a linear map.
    //
    // Given
    // -----
    // - `f(θ) = (θ₁ + 2θ₂, 3θ₁, −θ₂)` at `θ = (1, 2)`.
    //
    // Expect
    // ------
    // - `J = [[1, 2], [3, 0], [0, −1]]` (shape 3 × 2).
    fn central_jacobian_of_linear_map() {
        // Arrange
        let theta = array![1.0, 2.0];
        let f = |t: &Theta| -> OptResult<Array1<f64>> {
            Ok(array![t[0] + 2.0 * t[1], 3.0 * t[0], -t[1]])
        };

        // Act
        let jac = central_jacobian(&f, &theta).unwrap();

        // Assert
        assert_eq!(jac.shape(), &[3, 2]);
        assert_relative_eq!(jac[[0, 0]], 1.0, epsilon = 1e-8);
        assert_relative_eq!(jac[[0, 1]], 2.0, epsilon = 1e-8);
        assert_relative_eq!(jac[[1, 0]], 3.0, epsilon = 1e-8);
        assert_relative_eq!(jac[[1, 1]], 0.0, epsilon = 1e-8);
        assert_relative_eq!(jac[[2, 1]], -1.0, epsilon = 1e-8);
    }
}
