//! loglik_optimizer — argmin-powered constrained log-likelihood optimizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)` over a polyhedral feasible set `Aθ ≥ b`.
//! Callers implement a single trait, [`LogLikelihood`], describe their
//! feasible region with [`LinearConstraints`], and invoke [`maximize`] or
//! [`maximize_multistart`].
//!
//! Key behaviors
//! -------------
//! - Convert user-supplied log-likelihoods `ℓ(θ)` into Argmin-compatible
//!   cost functions `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`].
//! - Solve the constrained problem with a feasible-iterate SQP method
//!   ([`sqp::SqpSolver`]) whose subproblems are solved by a primal
//!   active-set QP ([`qp::solve_qp`]).
//! - Run independent restarts, optionally in parallel, and select the best
//!   converged run ([`maximize_multistart`]); report the best non-converged
//!   candidate when nothing converges.
//! - Provide finite-difference helpers in [`finite_diff`] for gradients when
//!   analytic derivatives are missing and for Hessians/Jacobians used by the
//!   inference layer.
//! - Centralize optimizer configuration ([`Tolerances`], [`SqpOptions`]) and
//!   validation logic ([`validation`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** a log-likelihood `ℓ(θ)` by minimizing
//!   a cost `c(θ) = -ℓ(θ)`; user code implements `ℓ(θ)` and `∇ℓ(θ)`
//!   (when available), **never** the cost directly.
//! - Every accepted iterate is feasible; starting points must be feasible.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] must treat invalid
//!   inputs as recoverable [`OptError`](crate::optimization::errors::OptError)
//!   values, not panics.
//! - Only `SolverConverged` counts as convergence; reaching the iteration
//!   cap does not.
//!
//! Conventions
//! -----------
//! - Cost is always `c(θ) = -ℓ(θ)` internally; all user-facing APIs and
//!   diagnostics (including [`OptimOutcome::value`]) are expressed in terms
//!   of the log-likelihood `ℓ`.
//! - No process-wide state: every run receives its options explicitly, so
//!   concurrent fits do not interfere.
//!
//! Downstream usage
//! ----------------
//! - Model crates implement [`LogLikelihood`] for their types, build a
//!   constraint set and a list of feasible starts, then call
//!   [`maximize_multistart`].
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions in [`adapter`], QP
//!   solutions in [`qp`], SQP convergence in [`sqp`], multi-start selection
//!   in [`api`], finite differences, validation and configuration.

pub mod adapter;
pub mod api;
pub mod constraints;
pub mod finite_diff;
pub mod qp;
pub mod run;
pub mod sqp;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{MultiStartOutcome, RestartSummary, maximize, maximize_multistart};
pub use self::constraints::LinearConstraints;
pub use self::traits::{LogLikelihood, OptimOutcome, SqpOptions, Tolerances};
pub use self::types::{Cost, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::{maximize, maximize_multistart};
    pub use super::constraints::LinearConstraints;
    pub use super::traits::{LogLikelihood, OptimOutcome, SqpOptions, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
