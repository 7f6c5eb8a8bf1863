//! loglik_optimizer::sqp — feasible-iterate SQP solver for argmin.
//!
//! Purpose
//! -------
//! Minimize a smooth cost `c(θ)` subject to linear inequalities `Aθ ≥ b`
//! with a sequential quadratic programming method, packaged as an Argmin
//! [`Solver`] so it runs under the same `Executor`, observers and state
//! bookkeeping as the stock Argmin solvers.
//!
//! Key behaviors
//! -------------
//! - Each iteration solves the QP subproblem `min ½pᵀBp + ∇cᵀp` subject to
//!   the linearized (here: exact) constraints with [`solve_qp`].
//! - `B` is a damped BFGS approximation of the cost Hessian (Powell's
//!   modification keeps it positive definite). It starts as the identity
//!   and is rescaled by `yᵀy / sᵀy` before the first update.
//! - A backtracking Armijo line search along the QP direction accepts the
//!   first trial with sufficient decrease. Trials whose cost cannot be
//!   evaluated are rejected like any other.
//! - When the line search fails, `B` is reset to the identity once; a
//!   second failure in a row ends the run with `SolverExit`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The initial parameter is feasible; `init` rejects infeasible starts.
//! - Linear constraints define a convex set, so every trial point
//!   `θ + t·p` with `t ∈ (0, 1]` is feasible whenever `θ` and `θ + p` are.
//!
//! Conventions
//! -----------
//! - Termination with `SolverConverged` happens when either
//!   - the QP step is negligible (a KKT point of the subproblem), or
//!   - the configured [`Tolerances`](super::Tolerances) on cost change and
//!     step size hold on the same iteration.
//! - The iteration cap is enforced by the Argmin executor and reported as
//!   `MaxItersReached`, which callers must not treat as convergence.
//!
//! Testing notes
//! -------------
//! - Unit tests run the solver through an Argmin `Executor` on quadratic
//!   costs with an interior and a boundary optimum, and check that
//!   infeasible starts are rejected.
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        constraints::LinearConstraints,
        qp::solve_qp,
        traits::SqpOptions,
        types::{Cost, Grad, Hessian, SqpState, Theta},
    },
    numerical_stability::GENERAL_TOL,
};
use argmin::core::{
    ArgminError, CostFunction, Error, Gradient, KV, Problem, Solver, State, TerminationReason,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Relative QP step below which the current iterate is a KKT point.
const KKT_STEP_TOL: f64 = 1e-10;

/// Sequential quadratic programming solver over linear inequality
/// constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqpSolver {
    constraints: LinearConstraints,
    opts: SqpOptions,
    b_mat: Option<Hessian>,
    fresh_model: bool,
}

impl SqpSolver {
    pub fn new(constraints: LinearConstraints, opts: SqpOptions) -> Self {
        Self { constraints, opts, b_mat: None, fresh_model: true }
    }

    /// Backtracking Armijo search along `p` from `x`.
    ///
    /// Returns the accepted point and its cost, or `None` when the step
    /// shrinks below `min_step` without sufficient decrease.
    fn line_search<O>(
        &self, problem: &mut Problem<O>, x: &Theta, cost: Cost, p: &Theta, slope: f64,
    ) -> Option<(Theta, Cost)>
    where
        O: CostFunction<Param = Theta, Output = Cost>,
    {
        let mut t = 1.0_f64;
        while t >= self.opts.min_step {
            let mut trial = x.clone();
            trial.scaled_add(t, p);
            if self.constraints.is_feasible(&trial, GENERAL_TOL) {
                if let Ok(trial_cost) = problem.cost(&trial) {
                    if trial_cost.is_finite() && trial_cost <= cost + self.opts.armijo * t * slope
                    {
                        return Some((trial, trial_cost));
                    }
                }
            }
            t *= self.opts.backtrack;
        }
        None
    }
}

impl<O> Solver<O, SqpState> for SqpSolver
where
    O: CostFunction<Param = Theta, Output = Cost> + Gradient<Param = Theta, Gradient = Grad>,
{
    const NAME: &'static str = "SQP (damped BFGS, active-set QP)";

    fn init(
        &mut self, problem: &mut Problem<O>, state: SqpState,
    ) -> Result<(SqpState, Option<KV>), Error> {
        let theta = state.get_param().cloned().ok_or_else(|| ArgminError::NotInitialized {
            text: "SQP solver requires an initial parameter vector".to_string(),
        })?;
        if theta.len() != self.constraints.dim() {
            return Err(OptError::ConstraintDimMismatch {
                expected: self.constraints.dim(),
                found: theta.len(),
            }
            .into());
        }
        self.constraints.check_feasible(&theta, GENERAL_TOL)?;
        let cost = problem.cost(&theta)?;
        if !cost.is_finite() {
            return Err(OptError::NonFiniteCost { value: cost }.into());
        }
        let grad = problem.gradient(&theta)?;
        self.b_mat = Some(Array2::eye(theta.len()));
        self.fresh_model = true;
        Ok((state.cost(cost).gradient(grad), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: SqpState,
    ) -> Result<(SqpState, Option<KV>), Error> {
        let x = state.get_param().cloned().ok_or_else(|| ArgminError::NotInitialized {
            text: "SQP state carries no parameter vector".to_string(),
        })?;
        let g = state.get_gradient().cloned().ok_or_else(|| ArgminError::NotInitialized {
            text: "SQP state carries no gradient".to_string(),
        })?;
        let cost = state.get_cost();
        let n = x.len();
        let b_mat = self.b_mat.take().unwrap_or_else(|| Array2::eye(n));

        let qp = match solve_qp(&b_mat, &g, &self.constraints, &x, self.opts.qp_max_iter) {
            Ok(qp) => qp,
            Err(err) => {
                if self.fresh_model {
                    return Err(err.into());
                }
                self.b_mat = Some(Array2::eye(n));
                self.fresh_model = true;
                return Ok((state, None));
            }
        };
        let p = qp.step;
        let p_inf = inf_norm(&p);
        let x_inf = inf_norm(&x);
        if p_inf <= KKT_STEP_TOL * (1.0 + x_inf) {
            self.b_mat = Some(b_mat);
            return Ok((state.terminate_with(TerminationReason::SolverConverged), None));
        }

        let slope = g.dot(&p);
        let accepted =
            if slope < 0.0 { self.line_search(problem, &x, cost, &p, slope) } else { None };

        match accepted {
            Some((x_new, cost_new)) => {
                let g_new = problem.gradient(&x_new)?;
                let s = &x_new - &x;
                let y = &g_new - &g;
                let mut b_mat = b_mat;
                if self.fresh_model {
                    let sy = s.dot(&y);
                    let yy = y.dot(&y);
                    if sy > 0.0 && yy.is_finite() {
                        b_mat = Array2::eye(n) * (yy / sy);
                    }
                }
                damped_bfgs_update(&mut b_mat, &s, &y);
                self.b_mat = Some(b_mat);
                self.fresh_model = false;

                let tols = &self.opts.tols;
                let converged = tols.has_convergence_test()
                    && tols.cost_converged(cost, cost_new)
                    && tols.param_converged(p_inf, x_inf);
                let mut next = state.param(x_new).cost(cost_new).gradient(g_new);
                if converged {
                    next = next.terminate_with(TerminationReason::SolverConverged);
                }
                Ok((next, None))
            }
            None if self.fresh_model => {
                self.b_mat = Some(b_mat);
                Ok((
                    state.terminate_with(TerminationReason::SolverExit(
                        "line search failed along a steepest-descent model".to_string(),
                    )),
                    None,
                ))
            }
            None => {
                self.b_mat = Some(Array2::eye(n));
                self.fresh_model = true;
                Ok((state, None))
            }
        }
    }
}

// ---- Helper methods ----

fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

/// Powell-damped BFGS update of `b_mat` with step `s` and gradient change
/// `y`. Keeps `b_mat` symmetric positive definite; degenerate steps leave it
/// unchanged.
fn damped_bfgs_update(b_mat: &mut Hessian, s: &Array1<f64>, y: &Array1<f64>) {
    let bs = b_mat.dot(s);
    let sbs = s.dot(&bs);
    if !(sbs > 0.0) || !sbs.is_finite() {
        return;
    }
    let sy = s.dot(y);
    let damping = if sy >= 0.2 * sbs { 1.0 } else { 0.8 * sbs / (sbs - sy) };
    let r = y * damping + &bs * (1.0 - damping);
    let sr = s.dot(&r);
    if !(sr > 0.0) || !sr.is_finite() {
        return;
    }
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            b_mat[[i, j]] += r[i] * r[j] / sr - bs[i] * bs[j] / sbs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::Tolerances;
    use approx::assert_relative_eq;
    use argmin::core::{Executor, TerminationStatus};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence of the SQP solver on convex quadratics with interior and
    //   boundary minimizers.
    // - Rejection of infeasible starting points in `init`.
    // - Positive definiteness of the damped BFGS update.
    //
    // They intentionally DO NOT cover:
    // - Log-likelihood adapters or multi-start selection (see `api` tests).
    // -------------------------------------------------------------------------

    /// c(θ) = (θ₁ − 2)² + 2(θ₂ + 1)².
    struct Bowl;

    impl CostFunction for Bowl {
        type Param = Theta;
        type Output = f64;
        fn cost(&self, p: &Theta) -> Result<f64, Error> {
            Ok((p[0] - 2.0).powi(2) + 2.0 * (p[1] + 1.0).powi(2))
        }
    }

    impl Gradient for Bowl {
        type Param = Theta;
        type Gradient = Grad;
        fn gradient(&self, p: &Theta) -> Result<Grad, Error> {
            Ok(array![2.0 * (p[0] - 2.0), 4.0 * (p[1] + 1.0)])
        }
    }

    fn run(constraints: LinearConstraints, theta0: Theta) -> Result<SqpState, Error> {
        let solver = SqpSolver::new(constraints, SqpOptions::default());
        let res = Executor::new(Bowl, solver)
            .configure(|state| state.param(theta0).max_iters(200))
            .run()?;
        Ok(res.state().clone())
    }

    #[test]
    // Purpose
    // -------
    // Verify convergence to an interior minimizer when constraints are
    // inactive.
    //
    // Given
    // -----
    // - The bowl cost with minimizer (2, −1) and a box `θ ∈ [−10, 10]²`.
    //
    // Expect
    // ------
    // - `SolverConverged` and `θ̂ ≈ (2, −1)`.
    fn sqp_interior_minimum_converges() {
        // Arrange
        let mut c = LinearConstraints::new(2);
        for i in 0..2 {
            c.lower_bound(format!("lb{i}"), i, -10.0).unwrap();
            c.upper_bound(format!("ub{i}"), i, 10.0).unwrap();
        }

        // Act
        let state = run(c, array![0.0, 0.0]).unwrap();

        // Assert
        assert_eq!(
            *state.get_termination_status(),
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        let best = state.get_best_param().unwrap();
        assert_relative_eq!(best[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(best[1], -1.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Check that the solver stops on an active linear constraint.
    //
    // Given
    // -----
    // - The bowl cost with `θ₁ + θ₂ ≤ 0` (the unconstrained minimizer has
    //   `θ₁ + θ₂ = 1`).
    //
    // Expect
    // ------
    // - The solution `(4/3, −4/3)` of the KKT conditions.
    // - Every iterate remains feasible.
    fn sqp_boundary_minimum_respects_constraint() {
        // Arrange
        let mut c = LinearConstraints::new(2);
        c.push("t1 + t2 <= 0", array![-1.0, -1.0], 0.0).unwrap();

        // Act
        let state = run(c.clone(), array![0.0, -0.5]).unwrap();

        // Assert
        let best = state.get_best_param().unwrap();
        assert_relative_eq!(best[0], 4.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(best[1], -4.0 / 3.0, epsilon = 1e-5);
        assert!(c.is_feasible(best, 1e-9));
    }

    #[test]
    // Purpose
    // -------
    // Ensure that an infeasible starting point is rejected before iterating.
    //
    // Given
    // -----
    // - Constraint `θ₁ ≥ 1` and start `(0, 0)`.
    //
    // Expect
    // ------
    // - The run fails with `OptError::InfeasiblePoint`.
    fn sqp_infeasible_start_is_rejected() {
        // Arrange
        let mut c = LinearConstraints::new(2);
        c.lower_bound("t1 >= 1", 0, 1.0).unwrap();

        // Act
        let err = run(c, array![0.0, 0.0]).unwrap_err();

        // Assert
        let opt_err: OptError = err.into();
        assert!(matches!(opt_err, OptError::InfeasiblePoint { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify that the damped update keeps the model positive definite even
    // when the curvature pair has `sᵀy < 0`.
    //
    // Given
    // -----
    // - `B = I`, `s = (1, 0)`, `y = (−1, 0)`.
    //
    // Expect
    // ------
    // - The updated matrix has a strictly positive `(0, 0)` entry and stays
    //   symmetric.
    fn damped_bfgs_update_keeps_positive_definite() {
        // Arrange
        let mut b = Array2::<f64>::eye(2);
        let s = array![1.0, 0.0];
        let y = array![-1.0, 0.0];

        // Act
        damped_bfgs_update(&mut b, &s, &y);

        // Assert
        assert!(b[[0, 0]] > 0.0);
        assert_relative_eq!(b[[0, 1]], b[[1, 0]]);
        assert!(b[[1, 1]] > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Check the solver name exposed to argmin's executor and observers.
    //
    // Given
    // -----
    // - The `Solver` implementation over the bowl problem.
    //
    // Expect
    // ------
    // - The associated `NAME` constant describes the method.
    fn solver_name_is_associated_constant() {
        // Arrange / Act
        let name = <SqpSolver as Solver<Bowl, SqpState>>::NAME;

        // Assert
        assert_eq!(name, "SQP (damped BFGS, active-set QP)");
    }
}
