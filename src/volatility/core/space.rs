//! Parameter space manager: names, linear constraints and starting points.
//!
//! Purpose
//! -------
//! Translate between the optimizer's flat `θ` and the model's named
//! coefficients, describe the feasible region as linear inequalities
//! `Aθ ≥ b`, and generate feasible starting points for multi-start
//! optimization.
//!
//! Key behaviors
//! -------------
//! - [`ParamSpace::constraints`] builds
//!   - box bounds: `ω ≥ omega_min`, `α ≥ 0`, `β ≥ 0`,
//!     `nu_min ≤ ν ≤ nu_max` (δ unconstrained);
//!   - inequalities: `α + γ ≥ 0` and
//!     `α + γ/2 + β ≤ 1 − stationarity_margin`.
//! - [`ParamSpace::starting_points`] produces a deterministic grid of
//!   small positive ARCH/GARCH coefficients with variance-targeted
//!   `ω = σ̂²·(1 − α − γ/2 − β)`, `δ = 0` and moderate `ν`, optionally led by
//!   a user-supplied start.
//! - [`ParamSpace::project`] removes round-off violations of active bounds
//!   from an optimizer solution before it is validated.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every grid start satisfies the constraint set; starts that would not
//!   are shrunk toward zero persistence or clamped into the ν box first.
//! - A user start is used as given; if infeasible the fit fails with
//!   `GarchError::InfeasibleStart` instead of being silently moved.
//!
//! Conventions
//! -----------
//! - All values live in the rescaled estimation space (unit sample variance).
use crate::{
    optimization::{
        loglik_optimizer::{LinearConstraints, Theta},
        numerical_stability::GENERAL_TOL,
    },
    volatility::{
        core::{
            options::ParamBounds,
            params::{
                IDX_ALPHA, IDX_BETA, IDX_GAMMA, IDX_OMEGA, nu_index, param_names, theta_dim,
            },
        },
        errors::{GarchError, GarchResult},
    },
};
use ndarray::Array1;

/// Base grid of `(α, γ, β, ν)` starting values.
const START_GRID: [(f64, f64, f64, f64); 6] = [
    (0.05, 0.05, 0.85, 8.0),
    (0.08, 0.10, 0.78, 6.0),
    (0.03, 0.02, 0.92, 12.0),
    (0.10, 0.00, 0.80, 5.0),
    (0.02, 0.08, 0.88, 20.0),
    (0.15, 0.05, 0.65, 4.0),
];

/// Share of the admissible persistence a grid start may use.
const START_PERSISTENCE_CAP: f64 = 0.99;

/// Parameter space of a GJR-GARCH-X model with `K` regressors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpace {
    k: usize,
    bounds: ParamBounds,
    names: Vec<String>,
}

impl ParamSpace {
    pub fn new(exog_names: &[String], bounds: ParamBounds) -> Self {
        ParamSpace { k: exog_names.len(), bounds, names: param_names(exog_names) }
    }

    pub fn dim(&self) -> usize {
        theta_dim(self.k)
    }

    pub fn n_exog(&self) -> usize {
        self.k
    }

    /// Parameter names in `θ` order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn bounds(&self) -> &ParamBounds {
        &self.bounds
    }

    /// Linear constraint set `Aθ ≥ b` of the feasible region.
    ///
    /// Errors
    /// ------
    /// - Propagates constraint-construction errors (non-finite bounds),
    ///   mapped to `GarchError`.
    pub fn constraints(&self) -> GarchResult<LinearConstraints> {
        let dim = self.dim();
        let nu = nu_index(self.k);
        let b = &self.bounds;
        let mut c = LinearConstraints::new(dim);
        c.lower_bound("omega >= omega_min", IDX_OMEGA, b.omega_min)?;
        c.lower_bound("alpha >= 0", IDX_ALPHA, 0.0)?;
        c.lower_bound("beta >= 0", IDX_BETA, 0.0)?;
        c.lower_bound("nu >= nu_min", nu, b.nu_min)?;
        c.upper_bound("nu <= nu_max", nu, b.nu_max)?;

        let mut leverage = Array1::zeros(dim);
        leverage[IDX_ALPHA] = 1.0;
        leverage[IDX_GAMMA] = 1.0;
        c.push("alpha + gamma >= 0", leverage, 0.0)?;

        let mut stationarity = Array1::zeros(dim);
        stationarity[IDX_ALPHA] = -1.0;
        stationarity[IDX_GAMMA] = -0.5;
        stationarity[IDX_BETA] = -1.0;
        c.push(
            "alpha + gamma/2 + beta <= 1 - margin",
            stationarity,
            -(1.0 - b.stationarity_margin),
        )?;
        Ok(c)
    }

    /// Deterministic feasible starting points.
    ///
    /// Parameters
    /// ----------
    /// - `restarts`: `usize`
    ///   Number of starts to return (`≥ 1`).
    /// - `sigma2`: `f64`
    ///   Sample variance used for variance targeting of ω.
    /// - `user`: `Option<&Theta>`
    ///   User start in estimation space; occupies the first slot.
    ///
    /// Returns
    /// -------
    /// `GarchResult<Vec<Theta>>` with exactly `restarts` entries.
    ///
    /// Errors
    /// ------
    /// - `GarchError::InvalidInitialLength` if `user` has the wrong length.
    /// - `GarchError::InfeasibleStart` if `user` violates a constraint, if
    ///   `sigma2` is not strictly positive, or if no grid start is feasible.
    pub fn starting_points(
        &self, restarts: usize, sigma2: f64, user: Option<&Theta>,
    ) -> GarchResult<Vec<Theta>> {
        if !(sigma2 > 0.0) || !sigma2.is_finite() {
            return Err(GarchError::InfeasibleStart {
                reason: format!("sample variance {sigma2} cannot anchor omega"),
            });
        }
        let constraints = self.constraints()?;
        let mut starts = Vec::with_capacity(restarts);

        if let Some(theta) = user {
            if theta.len() != self.dim() {
                return Err(GarchError::InvalidInitialLength {
                    expected: self.dim(),
                    actual: theta.len(),
                });
            }
            if let Some((i, violation)) = constraints.max_violation(theta, GENERAL_TOL) {
                return Err(GarchError::InfeasibleStart {
                    reason: format!(
                        "initial values violate '{}' by {violation:e}",
                        constraints.name(i)
                    ),
                });
            }
            starts.push(theta.clone());
        }

        let mut i = 0;
        let max_tries = restarts.saturating_mul(2) + START_GRID.len();
        while starts.len() < restarts && i < max_tries {
            let candidate = self.grid_start(i, sigma2);
            if constraints.is_feasible(&candidate, GENERAL_TOL) {
                starts.push(candidate);
            }
            i += 1;
        }
        if starts.len() < restarts {
            return Err(GarchError::InfeasibleStart {
                reason: format!(
                    "constructed {} of {restarts} feasible starting points",
                    starts.len()
                ),
            });
        }
        Ok(starts)
    }

    /// Clamp `θ` onto the bounds it violates by round-off.
    pub fn project(&self, theta: &Theta) -> Theta {
        let b = &self.bounds;
        let nu = nu_index(self.k);
        let mut out = theta.clone();
        out[IDX_OMEGA] = out[IDX_OMEGA].max(b.omega_min);
        out[IDX_ALPHA] = out[IDX_ALPHA].max(0.0);
        out[IDX_BETA] = out[IDX_BETA].max(0.0);
        out[IDX_GAMMA] = out[IDX_GAMMA].max(-out[IDX_ALPHA]);
        out[nu] = out[nu].clamp(b.nu_min, b.nu_max);
        let cap = 1.0 - b.stationarity_margin;
        let p = out[IDX_ALPHA] + 0.5 * out[IDX_GAMMA] + out[IDX_BETA];
        if p > cap {
            out[IDX_BETA] = (out[IDX_BETA] - (p - cap)).max(0.0);
        }
        out
    }

    /// Grid start `i`: cycles through [`START_GRID`], shrinking β on each
    /// pass so repeated cycles yield distinct points. δ starts at zero.
    fn grid_start(&self, i: usize, sigma2: f64) -> Theta {
        let b = &self.bounds;
        let (mut alpha, mut gamma, base_beta, nu) = START_GRID[i % START_GRID.len()];
        let pass = (i / START_GRID.len()) as f64;
        let mut beta = base_beta * (1.0 - 0.05 * pass).max(0.0);

        let cap = START_PERSISTENCE_CAP * (1.0 - b.stationarity_margin);
        let p = alpha + 0.5 * gamma + beta;
        if p > cap {
            let f = cap / p;
            alpha *= f;
            gamma *= f;
            beta *= f;
        }
        let persistence = alpha + 0.5 * gamma + beta;

        let mut theta = Array1::zeros(self.dim());
        theta[IDX_OMEGA] = (sigma2 * (1.0 - persistence)).max(2.0 * b.omega_min);
        theta[IDX_ALPHA] = alpha;
        theta[IDX_GAMMA] = gamma;
        theta[IDX_BETA] = beta;
        theta[nu_index(self.k)] = nu.clamp(b.nu_min, b.nu_max);
        theta
    }
}
