//! Public API surface for constrained log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`SqpOptions`] and [`Tolerances`]: configuration for the SQP solver.
//! - [`OptimOutcome`]: normalized result returned by the high-level
//!   `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. If an analytic gradient is provided, it should be the gradient
//! of the log-likelihood (`∇ℓ(θ)`); the adapter flips the sign as needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{
            validate_theta_hat, validate_value, verify_open_unit, verify_tol_cost,
            verify_tol_param,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
/// If you provide an analytic gradient, return the gradient of the
/// log-likelihood `∇ℓ(θ)` (the adapter flips the sign to match the cost).
///
/// - `type Data`: per-model data carried into `value`/`grad`/`check`. It is
///   shared read-only across parallel restarts, hence `Sync`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once per starting point.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇ℓ(θ)`.
///   If not implemented, finite differences are used automatically.
pub trait LogLikelihood {
    type Data: Sync + 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// SQP-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — convergence tolerances and iteration cap.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints the initial log-likelihood.
/// - `qp_max_iter: usize` — cap on active-set iterations per QP subproblem.
/// - `armijo: f64` — sufficient-decrease constant of the backtracking line
///   search, in `(0, 0.5)`.
/// - `backtrack: f64` — step contraction factor, in `(0, 1)`.
/// - `min_step: f64` — smallest step length tried before the line search is
///   declared failed, in `(0, 1)`.
///
/// Default:
/// - `tols`: `tol_cost = 1e-10`, `tol_param = 1e-6`, `max_iter = 500`
/// - `verbose`: `false`
/// - `qp_max_iter`: `100`
/// - `armijo`: `1e-4`, `backtrack`: `0.5`, `min_step`: `1e-10`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqpOptions {
    pub tols: Tolerances,
    pub verbose: bool,
    pub qp_max_iter: usize,
    pub armijo: f64,
    pub backtrack: f64,
    pub min_step: f64,
}

impl SqpOptions {
    /// Create a validated set of SQP options.
    ///
    /// # Errors
    /// - [`OptError::InvalidQpMaxIter`] if `qp_max_iter == 0`.
    /// - [`OptError::InvalidArmijo`] unless `0 < armijo < 0.5`.
    /// - [`OptError::InvalidBacktrack`] unless `0 < backtrack < 1`.
    /// - [`OptError::InvalidMinStep`] unless `0 < min_step < 1`.
    pub fn new(
        tols: Tolerances, verbose: bool, qp_max_iter: usize, armijo: f64, backtrack: f64,
        min_step: f64,
    ) -> OptResult<Self> {
        if qp_max_iter == 0 {
            return Err(OptError::InvalidQpMaxIter {
                max_iter: qp_max_iter,
                reason: "QP iteration cap must be greater than zero.",
            });
        }
        if !armijo.is_finite() || armijo <= 0.0 || armijo >= 0.5 {
            return Err(OptError::InvalidArmijo {
                value: armijo,
                reason: "Armijo constant must lie strictly between 0 and 0.5.",
            });
        }
        verify_open_unit(backtrack)
            .map_err(|reason| OptError::InvalidBacktrack { value: backtrack, reason })?;
        verify_open_unit(min_step)
            .map_err(|reason| OptError::InvalidMinStep { value: min_step, reason })?;
        Ok(Self { tols, verbose, qp_max_iter, armijo, backtrack, min_step })
    }
}

impl Default for SqpOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::default(),
            verbose: false,
            qp_max_iter: 100,
            armijo: 1e-4,
            backtrack: 0.5,
            min_step: 1e-10,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_cost`: relative cost change `|Δc| ≤ tol_cost·(1 + |c|)`.
/// - `tol_param`: relative step size `‖p‖∞ ≤ tol_param·(1 + ‖θ‖∞)`.
/// - `max_iter`: hard cap on the number of SQP iterations.
///
/// When both tolerances are given, both must hold on the same iteration.
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub tol_cost: Option<f64>,
    pub tol_param: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_cost`, `tol_param`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolCost`] / [`OptError::InvalidTolParam`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_cost: Option<f64>, tol_param: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_cost.is_none() && tol_param.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_param(tol_param)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_cost, tol_param, max_iter })
    }

    /// Cost-change test used by the SQP solver. A missing tolerance never
    /// blocks convergence.
    pub fn cost_converged(&self, prev: f64, next: f64) -> bool {
        match self.tol_cost {
            Some(tol) => (next - prev).abs() <= tol * (1.0 + prev.abs()),
            None => true,
        }
    }

    /// Step-size test used by the SQP solver.
    pub fn param_converged(&self, step_inf: f64, theta_inf: f64) -> bool {
        match self.tol_param {
            Some(tol) => step_inf <= tol * (1.0 + theta_inf),
            None => true,
        }
    }

    /// `true` when at least one convergence tolerance is configured.
    pub fn has_convergence_test(&self) -> bool {
        self.tol_cost.is_some() || self.tol_param.is_some()
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_cost: Some(1e-10), tol_param: Some(1e-6), max_iter: Some(500) }
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `converged`: `true` only if the solver reported
///   `TerminationReason::SolverConverged`. Hitting the iteration cap is
///   **not** convergence.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`
///   (keys such as `cost_count`, `gradient_count`).
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        let status = termination.to_string();
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation rules of `Tolerances::new` and `SqpOptions::new`.
    // - The relative convergence tests used by the SQP solver.
    // - Mapping of Argmin termination statuses into `OptimOutcome::converged`.
    //
    // They intentionally DO NOT cover:
    // - Solver iterations (see `sqp` tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure that `Tolerances::new` rejects an all-`None` configuration.
    //
    // Given
    // -----
    // - `tol_cost = None`, `tol_param = None`, `max_iter = None`.
    //
    // Expect
    // ------
    // - `Err(OptError::NoTolerancesProvided)`.
    fn tolerances_new_all_none_is_rejected() {
        // Arrange / Act
        let result = Tolerances::new(None, None, None);

        // Assert
        assert_eq!(result, Err(OptError::NoTolerancesProvided));
    }

    #[test]
    // Purpose
    // -------
    // Verify that non-positive and non-finite tolerances are rejected with the
    // matching error variant.
    //
    // Given
    // -----
    // - A negative `tol_param` and a NaN `tol_cost`.
    //
    // Expect
    // ------
    // - `InvalidTolParam` and `InvalidTolCost` respectively.
    fn tolerances_new_invalid_values_are_rejected() {
        // Arrange / Act
        let bad_param = Tolerances::new(None, Some(-1.0), Some(10));
        let bad_cost = Tolerances::new(Some(f64::NAN), None, Some(10));
        let bad_iter = Tolerances::new(Some(1e-6), None, Some(0));

        // Assert
        assert!(matches!(bad_param, Err(OptError::InvalidTolParam { .. })));
        assert!(matches!(bad_cost, Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(bad_iter, Err(OptError::InvalidMaxIter { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Check the relative convergence predicates, including the rule that a
    // missing tolerance never blocks convergence.
    //
    // Given
    // -----
    // - `tol_cost = 1e-8`, `tol_param = None`.
    //
    // Expect
    // ------
    // - Tiny relative cost changes pass; large ones fail.
    // - `param_converged` always passes.
    fn tolerances_convergence_predicates_are_relative() {
        // Arrange
        let tols = Tolerances::new(Some(1e-8), None, Some(10)).unwrap();

        // Act / Assert
        assert!(tols.cost_converged(1000.0, 1000.0 + 1e-6));
        assert!(!tols.cost_converged(1000.0, 1001.0));
        assert!(tols.param_converged(1e3, 0.0));
        assert!(tols.has_convergence_test());
    }

    #[test]
    // Purpose
    // -------
    // Ensure `SqpOptions::new` enforces the open-interval rules on the line
    // search constants.
    //
    // Given
    // -----
    // - Out-of-range `armijo`, `backtrack`, `min_step`, and `qp_max_iter`.
    //
    // Expect
    // ------
    // - Each is rejected with its dedicated variant.
    fn sqp_options_new_rejects_out_of_range_constants() {
        // Arrange
        let tols = Tolerances::default();

        // Act / Assert
        assert!(matches!(
            SqpOptions::new(tols, false, 100, 0.7, 0.5, 1e-10),
            Err(OptError::InvalidArmijo { .. })
        ));
        assert!(matches!(
            SqpOptions::new(tols, false, 100, 1e-4, 1.0, 1e-10),
            Err(OptError::InvalidBacktrack { .. })
        ));
        assert!(matches!(
            SqpOptions::new(tols, false, 100, 1e-4, 0.5, 0.0),
            Err(OptError::InvalidMinStep { .. })
        ));
        assert!(matches!(
            SqpOptions::new(tols, false, 0, 1e-4, 0.5, 1e-10),
            Err(OptError::InvalidQpMaxIter { .. })
        ));
        assert!(SqpOptions::new(tols, true, 50, 1e-4, 0.5, 1e-10).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Verify that only `SolverConverged` counts as convergence, while hitting
    // the iteration cap does not.
    //
    // Given
    // -----
    // - Two outcomes built from `SolverConverged` and `MaxItersReached`.
    //
    // Expect
    // ------
    // - `converged == true` for the first and `false` for the second.
    fn optim_outcome_new_only_solver_converged_counts() {
        // Arrange
        let theta = array![0.1, 0.2];

        // Act
        let ok = OptimOutcome::new(
            Some(theta.clone()),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            3,
            FnEvalMap::new(),
            Some(array![0.0, 0.0]),
        )
        .unwrap();
        let capped = OptimOutcome::new(
            Some(theta),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            3,
            FnEvalMap::new(),
            None,
        )
        .unwrap();

        // Assert
        assert!(ok.converged);
        assert_eq!(ok.grad_norm, Some(0.0));
        assert!(!capped.converged);
        assert!(capped.grad_norm.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Ensure that non-finite values are rejected when building an outcome.
    //
    // Given
    // -----
    // - A missing `theta_hat` and a NaN log-likelihood.
    //
    // Expect
    // ------
    // - `MissingThetaHat` and `NonFiniteCost`.
    fn optim_outcome_new_rejects_invalid_inputs() {
        // Arrange
        let status = TerminationStatus::Terminated(TerminationReason::SolverConverged);

        // Act
        let missing =
            OptimOutcome::new(None, 0.0, status.clone(), 1, FnEvalMap::new(), None);
        let nan = OptimOutcome::new(Some(array![1.0]), f64::NAN, status, 1, FnEvalMap::new(), None);

        // Assert
        assert_eq!(missing, Err(OptError::MissingThetaHat));
        assert!(matches!(nan, Err(OptError::NonFiniteCost { .. })));
    }
}
