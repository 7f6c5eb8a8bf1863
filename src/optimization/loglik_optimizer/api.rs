//! High-level entry points for maximizing a user-provided `LogLikelihood`
//! subject to linear inequality constraints.
//!
//! [`maximize`] runs one SQP solve from a single starting point;
//! [`maximize_multistart`] runs independent solves from several starting
//! points (optionally in parallel with `rayon`) and selects the best
//! converged one.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        constraints::LinearConstraints,
        run::run_sqp,
        traits::{LogLikelihood, SqpOptions},
    },
};
use rayon::prelude::*;
use tracing::debug;

/// Maximize a log-likelihood `ℓ(θ)` subject to `Aθ ≥ b` with SQP.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Wraps `(f, data)` in an `ArgMinAdapter` that exposes a *minimization*
///   problem `c(θ) = -ℓ(θ)` to `argmin`.
/// - Calls `run_sqp`, which configures the executor (initial params,
///   max iters, optional observers) and returns an `OptimOutcome`.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates runtime errors from `run_sqp` (e.g. infeasible start, QP
///   breakdown).
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_volatility::optimization::errors::OptResult;
/// use rust_volatility::optimization::loglik_optimizer::{
///     maximize, LinearConstraints, LogLikelihood, SqpOptions, Theta,
/// };
///
/// struct MyLL;
/// impl LogLikelihood for MyLL {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let mut constraints = LinearConstraints::new(2);
/// constraints.lower_bound("x >= 0.5", 0, 0.5)?;
/// let out = maximize(&MyLL, array![1.0, 1.0], &(), &constraints, &SqpOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_volatility::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, constraints: &LinearConstraints, opts: &SqpOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    run_sqp(theta0, constraints, opts, problem)
}

/// Outcome of a single restart inside [`maximize_multistart`].
#[derive(Debug, Clone, PartialEq)]
pub struct RestartSummary {
    /// Position of the starting point in the input list.
    pub index: usize,
    pub start: Theta,
    /// Best log-likelihood reached, `None` if the run failed.
    pub value: Option<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Termination status, or the error message of a failed run.
    pub status: String,
}

/// Result of a multi-start optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStartOutcome {
    /// Best converged run.
    pub best: OptimOutcome,
    /// Index of `best` in the list of starting points.
    pub best_index: usize,
    /// One summary per starting point, in input order.
    pub restarts: Vec<RestartSummary>,
}

/// Maximize `ℓ(θ)` from several starting points and keep the best
/// converged solve.
///
/// # Behavior
/// - Every start runs [`maximize`] independently on shared read-only data.
///   With `parallel = true` the runs execute on the `rayon` thread pool;
///   results keep input order, so the selection is identical to the
///   sequential path.
/// - Among converged runs, the one with the highest log-likelihood wins;
///   ties go to the earliest start.
///
/// # Errors
/// - [`OptError::NoStartingPoints`] if `starts` is empty.
/// - [`OptError::NoConvergence`] if no run converged; carries the best
///   non-converged candidate (parameters, log-likelihood, status).
/// - [`OptError::AllRestartsFailed`] if every run returned an error.
pub fn maximize_multistart<F>(
    f: &F, starts: &[Theta], data: &F::Data, constraints: &LinearConstraints, opts: &SqpOptions,
    parallel: bool,
) -> OptResult<MultiStartOutcome>
where
    F: LogLikelihood + Sync,
{
    if starts.is_empty() {
        return Err(OptError::NoStartingPoints);
    }
    let solve = |theta0: &Theta| maximize(f, theta0.clone(), data, constraints, opts);
    let results: Vec<OptResult<OptimOutcome>> = if parallel {
        starts.par_iter().map(solve).collect()
    } else {
        starts.iter().map(solve).collect()
    };

    let restarts: Vec<RestartSummary> = starts
        .iter()
        .zip(results.iter())
        .enumerate()
        .map(|(index, (start, res))| summarize(index, start, res))
        .collect();
    for r in &restarts {
        debug!(
            restart = r.index,
            value = ?r.value,
            iterations = r.iterations,
            converged = r.converged,
            status = %r.status,
            "restart finished"
        );
    }

    let best_converged = select_best(&results, true);
    if let Some(best_index) = best_converged {
        if let Some(Ok(best)) = results.into_iter().nth(best_index) {
            return Ok(MultiStartOutcome { best, best_index, restarts });
        }
        return Err(OptError::UnknownError);
    }

    match select_best(&results, false) {
        Some(idx) => match &results[idx] {
            Ok(candidate) => Err(OptError::NoConvergence {
                best_theta: candidate.theta_hat.clone(),
                best_value: candidate.value,
                status: candidate.status.clone(),
                restarts: starts.len(),
            }),
            Err(_) => Err(OptError::UnknownError),
        },
        None => {
            let first_error = results
                .iter()
                .find_map(|r| r.as_ref().err().map(|e| e.to_string()))
                .unwrap_or_default();
            Err(OptError::AllRestartsFailed { restarts: starts.len(), first_error })
        }
    }
}

// ---- Helper methods ----

fn summarize(index: usize, start: &Theta, res: &OptResult<OptimOutcome>) -> RestartSummary {
    match res {
        Ok(out) => RestartSummary {
            index,
            start: start.clone(),
            value: Some(out.value),
            iterations: out.iterations,
            converged: out.converged,
            status: out.status.clone(),
        },
        Err(err) => RestartSummary {
            index,
            start: start.clone(),
            value: None,
            iterations: 0,
            converged: false,
            status: err.to_string(),
        },
    }
}

/// Index of the successful run with the highest log-likelihood, restricted
/// to converged runs when `converged_only` is set. Strict comparison keeps
/// the earliest index on ties.
fn select_best(results: &[OptResult<OptimOutcome>], converged_only: bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, res) in results.iter().enumerate() {
        if let Ok(out) = res {
            if converged_only && !out.converged {
                continue;
            }
            match best {
                Some((_, v)) if out.value <= v => {}
                _ => best = Some((idx, out.value)),
            }
        }
    }
    best.map(|(idx, _)| idx)
}
