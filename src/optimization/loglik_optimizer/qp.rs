//! loglik_optimizer::qp — primal active-set solver for SQP subproblems.
//!
//! Purpose
//! -------
//! Solve the convex quadratic subproblem of one SQP iteration,
//!
//! ```text
//! minimize   ½ pᵀ B p + gᵀ p
//! subject to aᵢᵀ (x + p) ≥ bᵢ   for every constraint row i,
//! ```
//!
//! where `B` is a positive-definite quasi-Newton approximation of the cost
//! Hessian, `g` the cost gradient and `x` the current (feasible) iterate.
//!
//! Key behaviors
//! -------------
//! - Start from the feasible step `p = 0` with an empty working set.
//! - Solve the equality-constrained subproblem on the working set through
//!   its KKT system (dense LU from `nalgebra`).
//! - Take the longest feasible fraction of the equality-constrained step
//!   (ratio test) and add the blocking row to the working set.
//! - When the step vanishes, drop the row with the most negative multiplier
//!   or stop if all multipliers are non-negative.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x` is feasible, so `p = 0` is a feasible start.
//! - `B` is symmetric positive definite; the subproblem is strictly convex
//!   and has a unique minimizer.
//! - Rows only enter the working set through the ratio test, which keeps the
//!   working-set rows linearly independent.
//!
//! Conventions
//! -----------
//! - Multipliers follow the Lagrangian `½pᵀBp + gᵀp − λᵀ(A_W p − r_W)`, so
//!   optimality of an inequality requires `λ ≥ 0`.
//!
//! Testing notes
//! -------------
//! - Unit tests solve small problems with known solutions: inactive
//!   constraints, a single binding bound, and a two-step path through the
//!   working set.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        constraints::LinearConstraints,
        types::{Grad, Hessian, Theta},
    },
};
use nalgebra::{DMatrix, DVector};
use ndarray::Array1;

const QP_STEP_TOL: f64 = 1e-12;
const QP_MULTIPLIER_TOL: f64 = 1e-12;

/// Solution of one QP subproblem.
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    /// Search direction `p`.
    pub step: Theta,
    /// Constraint rows active at `x + p`.
    pub working_set: Vec<usize>,
    /// Multipliers aligned with `working_set`.
    pub multipliers: Vec<f64>,
    pub iterations: usize,
}

impl QpSolution {
    /// Smallest multiplier on the working set, `None` when it is empty.
    pub fn min_multiplier(&self) -> Option<f64> {
        self.multipliers.iter().copied().reduce(f64::min)
    }
}

/// solve_qp — primal active-set method for the SQP subproblem.
///
/// Parameters
/// ----------
/// - `b_mat`: `&Hessian`
///   Symmetric positive-definite `n × n` model Hessian.
/// - `grad`: `&Grad`
///   Cost gradient at `x`.
/// - `constraints`: `&LinearConstraints`
///   Constraint rows `aᵢᵀθ ≥ bᵢ`.
/// - `x`: `&Theta`
///   Current feasible iterate.
/// - `max_iter`: `usize`
///   Cap on working-set changes.
///
/// Returns
/// -------
/// `OptResult<QpSolution>`
///   The step, final working set and its multipliers.
///
/// Errors
/// ------
/// - `OptError::QpSingular`
///   The KKT matrix could not be factorized or produced non-finite values.
/// - `OptError::QpMaxIter`
///   The working set did not settle within `max_iter` iterations.
pub fn solve_qp(
    b_mat: &Hessian, grad: &Grad, constraints: &LinearConstraints, x: &Theta, max_iter: usize,
) -> OptResult<QpSolution> {
    let n = x.len();
    // rᵢ = bᵢ − aᵢᵀx ≤ 0 at a feasible x.
    let r: Array1<f64> = -constraints.slacks(x);
    let mut p = Array1::<f64>::zeros(n);
    let mut working: Vec<usize> = Vec::new();

    for iteration in 0..max_iter {
        let (s, lambda) = solve_eqp(b_mat, grad, constraints, &working, &p)?;
        let s_inf = s.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

        if s_inf <= QP_STEP_TOL * (1.0 + p.iter().fold(0.0_f64, |m, v| m.max(v.abs()))) {
            let most_negative = lambda
                .iter()
                .enumerate()
                .filter(|(_, l)| **l < -QP_MULTIPLIER_TOL)
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(k, _)| k);
            match most_negative {
                Some(k) => {
                    working.remove(k);
                }
                None => {
                    return Ok(QpSolution {
                        step: p,
                        working_set: working,
                        multipliers: lambda,
                        iterations: iteration + 1,
                    });
                }
            }
            continue;
        }

        let mut step_len = 1.0_f64;
        let mut blocking: Option<usize> = None;
        for i in 0..constraints.len() {
            if working.contains(&i) {
                continue;
            }
            let a_i = constraints.row(i);
            let a_s = a_i.dot(&s);
            if a_s < -QP_STEP_TOL {
                let ratio = ((r[i] - a_i.dot(&p)) / a_s).max(0.0);
                if ratio < step_len {
                    step_len = ratio;
                    blocking = Some(i);
                }
            }
        }
        p.scaled_add(step_len, &s);
        if let Some(i) = blocking {
            working.push(i);
        }
    }
    Err(OptError::QpMaxIter { max_iter })
}

// ---- Helper methods ----

/// Solve the equality-constrained subproblem on the working set for the
/// increment `s` and multipliers `λ`:
///
/// ```text
/// [ B   −A_Wᵀ ] [ s ]   [ −(B p + g) ]
/// [ A_W   0   ] [ λ ] = [     0      ]
/// ```
fn solve_eqp(
    b_mat: &Hessian, grad: &Grad, constraints: &LinearConstraints, working: &[usize], p: &Theta,
) -> OptResult<(Theta, Vec<f64>)> {
    let n = p.len();
    let m = working.len();
    let mut kkt = DMatrix::<f64>::zeros(n + m, n + m);
    for i in 0..n {
        for j in 0..n {
            kkt[(i, j)] = b_mat[[i, j]];
        }
    }
    for (k, &row_idx) in working.iter().enumerate() {
        let a = constraints.row(row_idx);
        for j in 0..n {
            kkt[(j, n + k)] = -a[j];
            kkt[(n + k, j)] = a[j];
        }
    }
    let bp_g = b_mat.dot(p) + grad;
    let mut rhs = DVector::<f64>::zeros(n + m);
    for i in 0..n {
        rhs[i] = -bp_g[i];
    }

    let sol = kkt.lu().solve(&rhs).ok_or(OptError::QpSingular { working_set: m })?;
    if sol.iter().any(|v| !v.is_finite()) {
        return Err(OptError::QpSingular { working_set: m });
    }
    let s = Array1::from_iter(sol.iter().take(n).copied());
    let lambda = sol.iter().skip(n).copied().collect();
    Ok((s, lambda))
}
