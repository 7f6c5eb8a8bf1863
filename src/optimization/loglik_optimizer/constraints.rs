//! loglik_optimizer::constraints — linear inequality constraint sets.
//!
//! Purpose
//! -------
//! Represent the feasible region of a constrained log-likelihood problem as
//! a set of named linear inequalities `aᵢᵀθ ≥ bᵢ`. Box bounds are a special
//! case (`θᵢ ≥ l` or `−θᵢ ≥ −u`).
//!
//! Key behaviors
//! -------------
//! - Build constraint sets row by row ([`LinearConstraints::push`]) or via
//!   the bound helpers.
//! - Evaluate slacks `Aθ − b`, the most violated row, and the active set at
//!   a point.
//! - Report infeasible points as [`OptError::InfeasiblePoint`] naming the
//!   offending row.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every row has length `dim`, checked on insertion.
//! - The feasible set is a convex polyhedron; the SQP solver relies on this
//!   to keep line-search iterates feasible.
//!
//! Testing notes
//! -------------
//! - Unit tests cover bound helpers, slack evaluation, active-set detection
//!   and infeasibility reporting.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::Theta,
};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Named set of linear inequality constraints `aᵢᵀθ ≥ bᵢ`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraints {
    dim: usize,
    rows: Vec<Array1<f64>>,
    rhs: Vec<f64>,
    names: Vec<String>,
}

impl LinearConstraints {
    /// Empty constraint set over `dim` parameters.
    pub fn new(dim: usize) -> Self {
        Self { dim, rows: Vec::new(), rhs: Vec::new(), names: Vec::new() }
    }

    /// Append the row `rowᵀθ ≥ rhs`.
    ///
    /// # Errors
    /// - [`OptError::ConstraintDimMismatch`] if `row.len() != dim`.
    /// - [`OptError::InvalidParameter`] if the row or right-hand side is not
    ///   finite.
    pub fn push(&mut self, name: impl Into<String>, row: Array1<f64>, rhs: f64) -> OptResult<()> {
        if row.len() != self.dim {
            return Err(OptError::ConstraintDimMismatch { expected: self.dim, found: row.len() });
        }
        let name = name.into();
        if !rhs.is_finite() || row.iter().any(|v| !v.is_finite()) {
            return Err(OptError::InvalidParameter {
                text: format!("constraint '{name}' has non-finite coefficients"),
            });
        }
        self.rows.push(row);
        self.rhs.push(rhs);
        self.names.push(name);
        Ok(())
    }

    /// Append `θ[index] ≥ value`.
    pub fn lower_bound(
        &mut self, name: impl Into<String>, index: usize, value: f64,
    ) -> OptResult<()> {
        let row = self.unit_row(index, 1.0)?;
        self.push(name, row, value)
    }

    /// Append `θ[index] ≤ value`, stored as `−θ[index] ≥ −value`.
    pub fn upper_bound(
        &mut self, name: impl Into<String>, index: usize, value: f64,
    ) -> OptResult<()> {
        let row = self.unit_row(index, -1.0)?;
        self.push(name, row, -value)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of constraint rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.rows[i].view()
    }

    pub fn rhs(&self, i: usize) -> f64 {
        self.rhs[i]
    }

    pub fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    /// Slack of row `i` at `theta`: `aᵢᵀθ − bᵢ` (non-negative when satisfied).
    pub fn slack_at(&self, i: usize, theta: &Theta) -> f64 {
        self.rows[i].dot(theta) - self.rhs[i]
    }

    /// All slacks `Aθ − b`.
    pub fn slacks(&self, theta: &Theta) -> Array1<f64> {
        Array1::from_iter((0..self.len()).map(|i| self.slack_at(i, theta)))
    }

    /// Most violated row and its (negative) slack, if any row has slack
    /// below `-tol`.
    pub fn max_violation(&self, theta: &Theta, tol: f64) -> Option<(usize, f64)> {
        (0..self.len())
            .map(|i| (i, self.slack_at(i, theta)))
            .filter(|(_, s)| *s < -tol)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// `true` when every row holds up to `tol`.
    pub fn is_feasible(&self, theta: &Theta, tol: f64) -> bool {
        self.max_violation(theta, tol).is_none()
    }

    /// Check feasibility of `theta`.
    ///
    /// # Errors
    /// - [`OptError::ConstraintDimMismatch`] if `theta.len() != dim`.
    /// - [`OptError::InfeasiblePoint`] naming the most violated row.
    pub fn check_feasible(&self, theta: &Theta, tol: f64) -> OptResult<()> {
        if theta.len() != self.dim {
            return Err(OptError::ConstraintDimMismatch { expected: self.dim, found: theta.len() });
        }
        match self.max_violation(theta, tol) {
            Some((i, slack)) => Err(OptError::InfeasiblePoint {
                constraint: self.names[i].clone(),
                violation: -slack,
            }),
            None => Ok(()),
        }
    }

    /// Indices of rows whose slack is at most `tol` in absolute value.
    pub fn active_set(&self, theta: &Theta, tol: f64) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.slack_at(i, theta).abs() <= tol).collect()
    }

    // ---- Helper methods ----

    fn unit_row(&self, index: usize, sign: f64) -> OptResult<Array1<f64>> {
        if index >= self.dim {
            return Err(OptError::ConstraintDimMismatch { expected: self.dim, found: index + 1 });
        }
        let mut row = Array1::zeros(self.dim);
        row[index] = sign;
        Ok(row)
    }
}
