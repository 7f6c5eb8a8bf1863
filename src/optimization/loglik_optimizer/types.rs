//! loglik_optimizer::types — shared numeric aliases and solver state wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types used by the constrained log-likelihood
//! optimizer so that the adapter, the SQP solver, the QP subproblem and the
//! multi-start driver agree on a single representation.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, gradients, Hessians
//!   and scalar costs (`Theta`, `Grad`, `Hessian`, `Cost`).
//! - Provide the map type used for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Pin the Argmin iteration state used by the SQP solver
//!   (`SqpState`).
//!
//! Invariants & assumptions
//! ------------------------
//! - All vectors and matrices are `ndarray` containers over `f64`.
//! - `Cost` is the minimized quantity `c(θ) = -ℓ(θ)`.
//!
//! Testing notes
//! -------------
//! - Aliases only; exercised indirectly by the solver tests.
use argmin::core::IterState;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` in optimizer space.
pub type Theta = Array1<f64>;

/// Gradient vector, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense `n × n` matrix of second-order information.
pub type Hessian = Array2<f64>;

/// Scalar objective minimized by the solver, `c(θ) = -ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by Argmin
/// (e.g. `"cost_count"`, `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Argmin iteration state carried by the SQP solver: parameters, gradient
/// and cost; no Jacobian, Hessian or residuals are tracked by Argmin itself.
pub type SqpState = IterState<Theta, Grad, (), (), (), f64>;
