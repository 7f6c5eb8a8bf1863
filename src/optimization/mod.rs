//! optimization — constrained MLE stack, numerical constants, and unified
//! error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for model fitting: an Argmin-backed
//! constrained log-likelihood optimizer, shared numerical tolerances, and a
//! single error/result surface. Callers implement a log-likelihood, describe
//! linear constraints, choose tolerances, and obtain fitted parameters and
//! diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   subject to `Aθ ≥ b` (`loglik_optimizer`), including multi-start
//!   selection and stopping criteria.
//! - Supply shared numerical constants and the delta-method helper
//!   (`numerical_stability`).
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers work directly in model space; feasibility is maintained by
//!   the solver rather than by reparameterization.
//! - Log-likelihood implementations treat domain violations as recoverable
//!   errors surfaced through the optimization layer.
//!
//! Conventions
//! -----------
//! - All solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; user-facing
//!   outcomes are expressed in terms of `ℓ`.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - The only logging is `tracing::debug!` per restart in the multi-start
//!   driver; no subscriber is installed here.
//!
//! Downstream usage
//! ----------------
//! - Model crates implement `LogLikelihood` for their types and call
//!   `maximize_multistart` with feasible starts, a data payload, a
//!   constraint set and `SqpOptions`.
//! - Front-ends import the curated surface via `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules cover QP/SQP behavior on small convex
//!   problems, multi-start selection, tolerance handling, finite
//!   differences, and error conversions.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_volatility::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
