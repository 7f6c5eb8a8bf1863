//! GJR-GARCH(1,1)-X model: Student-t log-likelihood, gradient and QML fit.
//!
//! This module wires the GJR-GARCH-X specification to the `LogLikelihood`
//! trait and orchestrates a complete fit: data preparation, feasible
//! starting points, a multi-start SQP solve under linear constraints,
//! Hessian-based inference, and the mapping of every reported quantity back
//! to the caller's units.
//!
//! Key ideas:
//! - Parameters live directly in model space,
//!   `θ = [ω, α, γ, β, δ₁..δ_K, ν]`; feasibility is a set of linear
//!   constraints handled by the solver, not a reparameterization.
//! - Estimation runs on residuals scaled to unit sample variance, so ω and
//!   the curvature in ω are of order one whatever the units of the returns.
//!   ω and δ scale with `s²`; the other coefficients are unit-free.
//! - The model holds no scratch buffers: each evaluation allocates its own
//!   variance path, so one model instance can serve parallel restarts.
use crate::{
    inference::{
        hessian::{HessianCovariance, calc_covariance},
        sandwich::{sandwich_covariance, std_errors_from},
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            Grad, LinearConstraints, LogLikelihood, RestartSummary, Theta, maximize_multistart,
        },
        numerical_stability::{BOUND_ACTIVE_TOL, FLOOR_WARN_FRACTION, delta_method_diag},
    },
    volatility::{
        core::{
            data::{EstimationData, GarchData},
            likelihood::{loglik_gradient, loglik_scores, loglik_value},
            options::FitOptions,
            params::{GjrParams, IDX_DELTA, IDX_OMEGA, nu_index, theta_dim},
            recursion::variance_path,
            space::ParamSpace,
            validation::{validate_sample_size, validate_theta},
        },
        errors::{FitWarning, GarchError, GarchResult},
        models::result::{FitDiagnostics, ModelResult},
    },
};
use ndarray::{Array1, Array2, s};
use tracing::{info, warn};

/// GJR-GARCH(1,1)-X model with Student-t innovations.
///
/// Holds the validated [`FitOptions`]. The number of exogenous regressors
/// is read from the [`EstimationData`] passed to each evaluation.
///
/// # Notes
/// - `Sync`: restarts share one instance across `rayon` workers.
/// - Implements [`LogLikelihood`] in the rescaled estimation space.
#[derive(Debug, Clone, PartialEq)]
pub struct GjrGarchX {
    options: FitOptions,
}

/// Classical and robust inference mapped to the caller's units.
struct Inference {
    std_errors: Vec<Option<f64>>,
    robust_std_errors: Vec<Option<f64>>,
    covariance: Option<Array2<f64>>,
    robust_covariance: Option<Array2<f64>>,
    min_eigenvalue: Option<f64>,
    condition_number: Option<f64>,
}

impl GjrGarchX {
    /// Construct a model from validated options.
    ///
    /// # Errors
    /// - Any error of [`FitOptions::validate`].
    pub fn new(options: FitOptions) -> GarchResult<Self> {
        options.validate()?;
        Ok(GjrGarchX { options })
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fit the model by Student-t QML.
    ///
    /// ## Steps
    /// 1. Check the effective sample size, then select exogenous columns,
    ///    demean and rescale the returns ([`EstimationData::prepare`]).
    /// 2. Build the constraint set and `restarts` feasible starts (a user
    ///    start, mapped to estimation units, goes first).
    /// 3. Run the multi-start SQP solve and keep the best converged run.
    /// 4. Clamp round-off violations from `θ̂`, validate it, and recompute
    ///    the variance path.
    /// 5. Invert the central-difference Hessian of `−ℓ` for classical
    ///    standard errors; add sandwich errors from the analytic scores when
    ///    enabled and the Hessian is positive definite. Parameters entering
    ///    a constraint that is active at `θ̂` lose their standard errors.
    /// 6. Map parameters, covariances, log-likelihood and the variance path
    ///    back to the caller's units and attach warnings.
    ///
    /// ## Errors
    /// - `InvalidInput` kinds: column selection, burn-in and sample-size
    ///   failures, user start of the wrong length.
    /// - `GarchError::InfeasibleStart`: constant series, infeasible user
    ///   start.
    /// - `GarchError::ConvergenceFailure`: no restart converged; the best
    ///   candidate is reported in the caller's units.
    /// - `GarchError::OptimizationFailed`: every restart errored.
    ///
    /// ## Notes
    /// - A non-positive-definite Hessian, an estimate on the boundary and
    ///   heavy use of the variance floor are warnings on the result, not
    ///   errors.
    pub fn fit(&self, data: &GarchData) -> GarchResult<ModelResult> {
        let opts = &self.options;
        let k = opts.exog_columns.as_ref().map_or(data.exog().ncols(), |cols| cols.len());
        let dim = theta_dim(k);
        let n_eff = validate_sample_size(data.len(), opts.burn_in, dim)?;
        let est = EstimationData::prepare(data, opts.exog_columns.as_deref(), opts.burn_in)?;

        let scale2 = est.scale * est.scale;
        let loglik_shift = n_eff as f64 * est.scale.ln();
        let space = ParamSpace::new(&est.exog_names, opts.bounds);
        let constraints = space.constraints()?;
        let user = match &opts.initial {
            Some(init) if init.len() != dim => {
                return Err(GarchError::InvalidInitialLength { expected: dim, actual: init.len() });
            }
            Some(init) => Some(rescale_theta(init, k, 1.0 / scale2)),
            None => None,
        };
        let starts = space.starting_points(opts.restarts, est.sigma2_init, user.as_ref())?;

        let outcome =
            maximize_multistart(self, &starts, &est, &constraints, &opts.sqp, opts.parallel)
                .map_err(|err| to_caller_error(err, k, scale2, loglik_shift))?;
        let best = &outcome.best;

        let theta_hat = space.project(&best.theta_hat);
        let params_est = GjrParams::from_theta(theta_hat.view(), k)?;
        let loglik_est = loglik_value(theta_hat.view(), &est);
        let path = variance_path(
            theta_hat.view(),
            est.resid.view(),
            est.exog.view(),
            est.sigma2_init,
            est.floor,
        );
        info!(
            restart = outcome.best_index,
            loglik = loglik_est - loglik_shift,
            iterations = best.iterations,
            persistence = params_est.persistence(),
            "selected GJR-GARCH-X fit"
        );

        let mut warnings = Vec::new();
        let mut inference = self.inference(&theta_hat, &est, space.names(), &mut warnings);

        let (active, pinned) = active_bounds(&constraints, &theta_hat);
        if !active.is_empty() {
            for &j in &pinned {
                inference.std_errors[j] = None;
                inference.robust_std_errors[j] = None;
            }
            let constraint_names: Vec<String> =
                active.iter().map(|&i| constraints.name(i).to_string()).collect();
            let parameters: Vec<String> =
                pinned.iter().filter_map(|&j| space.names().get(j).cloned()).collect();
            warn!(
                constraints = ?constraint_names,
                parameters = ?parameters,
                "estimate on the boundary of the admissible region"
            );
            warnings.push(FitWarning::ParameterAtBound {
                constraints: constraint_names,
                parameters,
            });
        }

        let floor_fraction = path.floor_fraction();
        if path.floor_hits > 0 && floor_fraction > FLOOR_WARN_FRACTION {
            warn!(
                count = path.floor_hits,
                fraction = floor_fraction,
                "variance floor triggered; the model may be misspecified"
            );
            warnings.push(FitWarning::VarianceFloorTriggered {
                count: path.floor_hits,
                fraction: floor_fraction,
            });
        }

        let params = params_est.rescaled(scale2);
        let restarts = outcome
            .restarts
            .iter()
            .map(|r| RestartSummary {
                start: rescale_theta(&r.start, k, scale2),
                value: r.value.map(|v| v - loglik_shift),
                ..r.clone()
            })
            .collect();
        let diagnostics = FitDiagnostics {
            restarts,
            best_restart: outcome.best_index,
            iterations: best.iterations,
            status: best.status.clone(),
            grad_norm: best.grad_norm,
            persistence: params.persistence(),
            unconditional_variance: params.unconditional_variance(),
            half_life: params.half_life(),
            floor_hits: path.floor_hits,
            floor_fraction,
            min_eigenvalue: inference.min_eigenvalue,
            condition_number: inference.condition_number,
        };

        Ok(ModelResult {
            params,
            names: space.names().to_vec(),
            std_errors: inference.std_errors,
            robust_std_errors: inference.robust_std_errors,
            covariance: inference.covariance,
            robust_covariance: inference.robust_covariance,
            loglik: loglik_est - loglik_shift,
            n_eff,
            burn_in: est.burn_in,
            mean: est.mean,
            returns: data.returns().to_owned(),
            residuals: &est.resid * est.scale,
            variance: &path.sigma2 * scale2,
            exog: est.exog.clone(),
            floor: est.floor * scale2,
            diagnostics,
            warnings,
        })
    }

    /// Classical and robust inference at `θ̂`, in the caller's units.
    ///
    /// Failures never abort the fit: they become
    /// [`FitWarning::InferenceUnavailable`] (or
    /// [`FitWarning::IllConditionedInference`] for a Hessian that is not
    /// positive definite) and the affected standard errors are `None`.
    fn inference(
        &self, theta_hat: &Theta, est: &EstimationData, names: &[String],
        warnings: &mut Vec<FitWarning>,
    ) -> Inference {
        let dim = theta_hat.len();
        let k = est.n_exog();
        let scale2 = est.scale * est.scale;
        let mut units = Array1::<f64>::ones(dim);
        units[IDX_OMEGA] = scale2;
        units.slice_mut(s![IDX_DELTA..IDX_DELTA + k]).fill(scale2);
        let to_caller = |se: Vec<Option<f64>>| -> Vec<Option<f64>> {
            se.into_iter().zip(units.iter()).map(|(s, u)| s.map(|v| v * u)).collect()
        };

        let mut out = Inference {
            std_errors: vec![None; dim],
            robust_std_errors: vec![None; dim],
            covariance: None,
            robust_covariance: None,
            min_eigenvalue: None,
            condition_number: None,
        };

        let neg_loglik = |theta: &Theta| -> OptResult<f64> { Ok(-self.value(theta, est)?) };
        let classical: HessianCovariance = match calc_covariance(&neg_loglik, theta_hat) {
            Ok(c) => c,
            Err(err) => {
                warn!(error = %err, "standard errors unavailable");
                warnings.push(FitWarning::InferenceUnavailable { reason: err.to_string() });
                return out;
            }
        };
        out.min_eigenvalue = Some(classical.min_eigenvalue);
        out.condition_number = classical.condition_number;
        out.std_errors = to_caller(classical.std_errors.clone());
        out.covariance = Some(delta_method_diag(&classical.covariance, &units));

        if !classical.positive_definite {
            let affected: Vec<String> =
                classical.affected.iter().filter_map(|&i| names.get(i).cloned()).collect();
            warn!(
                min_eigenvalue = classical.min_eigenvalue,
                affected = ?affected,
                "Hessian not positive definite at the optimum"
            );
            warnings.push(FitWarning::IllConditionedInference {
                min_eigenvalue: classical.min_eigenvalue,
                affected,
            });
            return out;
        }

        if self.options.robust_se {
            let scores = loglik_scores(theta_hat.view(), est);
            match sandwich_covariance(&classical.covariance, &scores) {
                Ok(cov) => {
                    out.robust_std_errors = to_caller(std_errors_from(&cov));
                    out.robust_covariance = Some(delta_method_diag(&cov, &units));
                }
                Err(err) => {
                    warn!(error = %err, "robust standard errors unavailable");
                    warnings.push(FitWarning::InferenceUnavailable {
                        reason: format!("robust standard errors: {err}"),
                    });
                }
            }
        }
        out
    }

    /// Minimal domain check for objective evaluations: length, finiteness
    /// and `ν > 2`. Other coordinates may be marginally infeasible (finite
    /// differences step across active bounds); the variance floor keeps the
    /// likelihood finite there.
    fn evaluable(&self, theta: &Theta, data: &EstimationData) -> OptResult<()> {
        let k = data.n_exog();
        let dim = theta_dim(k);
        if theta.len() != dim {
            return Err(OptError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        let nu = theta[nu_index(k)];
        if nu <= 2.0 {
            return Err(OptError::InvalidNu { value: nu });
        }
        Ok(())
    }
}

impl LogLikelihood for GjrGarchX {
    type Data = EstimationData;

    /// Student-t log-likelihood `ℓ(θ)` over the window `t ≥ burn_in`.
    ///
    /// # Errors
    /// - `OptError::ThetaLengthMismatch`, `OptError::InvalidThetaInput` or
    ///   `OptError::InvalidNu` when `θ` is outside the evaluable domain.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        self.evaluable(theta, data)?;
        Ok(loglik_value(theta.view(), data))
    }

    /// Full parameter validation (`ω > 0`, `α, β ≥ 0`, `α + γ ≥ 0`,
    /// `ν > 2`, `α + γ/2 + β < 1`, finite δ).
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        validate_theta(theta.view(), data.n_exog())?;
        Ok(())
    }

    /// Analytic gradient from the variance sensitivity recursion.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        self.evaluable(theta, data)?;
        Ok(loglik_gradient(theta.view(), data).1)
    }
}

// ---- Helper methods ----

/// Multiply the ω and δ entries of `θ` by `factor`.
fn rescale_theta(theta: &Theta, k: usize, factor: f64) -> Theta {
    let mut out = theta.clone();
    out[IDX_OMEGA] *= factor;
    for j in IDX_DELTA..IDX_DELTA + k {
        out[j] *= factor;
    }
    out
}

/// Constraint rows active at `θ̂` and the parameters with a nonzero
/// coefficient in any of them, both in ascending order.
fn active_bounds(constraints: &LinearConstraints, theta_hat: &Theta) -> (Vec<usize>, Vec<usize>) {
    let active = constraints.active_set(theta_hat, BOUND_ACTIVE_TOL);
    let pinned = (0..constraints.dim())
        .filter(|&j| active.iter().any(|&i| constraints.row(i)[j] != 0.0))
        .collect();
    (active, pinned)
}

/// Map an optimizer failure to a model error with the diagnostic candidate
/// expressed in the caller's units.
fn to_caller_error(err: OptError, k: usize, scale2: f64, loglik_shift: f64) -> GarchError {
    match GarchError::from(err) {
        GarchError::ConvergenceFailure { best_params, best_loglik, status, restarts } => {
            GarchError::ConvergenceFailure {
                best_params: rescale_theta(&best_params, k, scale2),
                best_loglik: best_loglik - loglik_shift,
                status,
                restarts,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        optimization::{
            loglik_optimizer::{SqpOptions, Tolerances, finite_diff::central_jacobian},
            numerical_stability::{NU_MAX, NU_MIN},
        },
        volatility::{
            core::{data::ExogMatrix, options::ParamBounds, simulate::simulate},
            errors::ErrorKind,
        },
    };
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use rand_distr::StudentT;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `LogLikelihood` conformance (`value`, `check`, `grad` vs. finite
    //   differences, evaluable domain).
    // - `fit` on simulated data: convergence, caller units, inference,
    //   diagnostics and tables.
    // - Error paths of `fit` (sample size, user start, iteration cap).
    // - Estimates on the boundary of the admissible region.
    //
    // Statistical recovery on long samples lives in the integration tests.
    // -------------------------------------------------------------------------

    fn true_params() -> GjrParams {
        GjrParams::new(0.05, 0.05, 0.08, 0.85, Array1::zeros(0), 8.0).unwrap()
    }

    fn sim_data(n: usize, seed: u64, scale: f64) -> GarchData {
        let sim = simulate(&true_params(), n, None, 0.0, seed).unwrap();
        GarchData::new(sim.returns * scale, None).unwrap()
    }

    fn sequential_options() -> FitOptions {
        FitOptions { parallel: false, restarts: 2, ..FitOptions::default() }
    }

    /// I.i.d. draws from a raw Student-t with `df` degrees of freedom.
    fn iid_student_t(n: usize, df: f64, seed: u64) -> GarchData {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = StudentT::new(df).unwrap();
        let returns: Array1<f64> = (0..n).map(|_| rng.sample(&dist)).collect();
        GarchData::new(returns, None).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify `value`, `grad` and `check` against the core functions.
    //
    // Given
    // -----
    // - 300 simulated periods with one exogenous regressor, a feasible θ.
    //
    // Expect
    // ------
    // - `value` equals `loglik_value`; `grad` matches a central-difference
    //   gradient of `value`; `check` accepts θ.
    fn loglikelihood_conformance() {
        // Arrange
        let sim = simulate(&true_params(), 300, None, 0.0, 3).unwrap();
        let x = Array2::from_shape_fn((300, 1), |(t, _)| ((t % 7) as f64) * 0.1);
        let data =
            GarchData::new(sim.returns, Some(ExogMatrix::unnamed(x).unwrap())).unwrap();
        let est = EstimationData::prepare(&data, None, 0).unwrap();
        let model = GjrGarchX::new(FitOptions::default()).unwrap();
        let theta = array![0.06, 0.04, 0.1, 0.8, 0.02, 7.0];

        // Act
        let v = model.value(&theta, &est).unwrap();
        let g = model.grad(&theta, &est).unwrap();
        let fd = central_jacobian(
            &|t: &Theta| -> OptResult<Array1<f64>> { Ok(array![model.value(t, &est)?]) },
            &theta,
        )
        .unwrap();

        // Assert
        assert_relative_eq!(v, loglik_value(theta.view(), &est), epsilon = 1e-12);
        for i in 0..theta.len() {
            assert_relative_eq!(g[i], fd[[0, i]], epsilon = 1e-4, max_relative = 1e-4);
        }
        assert!(model.check(&theta, &est).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Ensure the evaluable domain and the strict check differ as intended.
    //
    // Given
    // -----
    // - θ with ω slightly negative (finite-difference neighbourhood), θ
    //   with ν = 2, and θ of the wrong length.
    //
    // Expect
    // ------
    // - `value` is finite at negative ω but `check` rejects it.
    // - `InvalidNu` and `ThetaLengthMismatch` from `value`.
    fn evaluable_domain_vs_check() {
        // Arrange
        let data = sim_data(200, 4, 1.0);
        let est = EstimationData::prepare(&data, None, 0).unwrap();
        let model = GjrGarchX::new(FitOptions::default()).unwrap();
        let neg_omega = array![-1e-7, 0.05, 0.05, 0.85, 8.0];
        let nu_two = array![0.05, 0.05, 0.05, 0.85, 2.0];
        let short = array![0.05, 0.05, 0.05, 0.85];

        // Act / Assert
        assert!(model.value(&neg_omega, &est).unwrap().is_finite());
        assert!(model.check(&neg_omega, &est).is_err());
        assert_eq!(model.value(&nu_two, &est), Err(OptError::InvalidNu { value: 2.0 }));
        assert_eq!(
            model.value(&short, &est),
            Err(OptError::ThetaLengthMismatch { expected: 5, actual: 4 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Fit simulated data and check the result's internal consistency.
    //
    // Given
    // -----
    // - 1500 periods from ω = 0.05, α = 0.05, γ = 0.08, β = 0.85, ν = 8,
    //   sequential restarts.
    //
    // Expect
    // ------
    // - Strictly positive variances, one per period; stationary estimate.
    // - Log-likelihood equals the core likelihood of the reported path.
    // - Classical standard errors available and positive.
    // - Diagnostics carry one summary per restart.
    fn fit_simulated_series() {
        // Arrange
        let data = sim_data(1500, 11, 1.0);
        let model = GjrGarchX::new(sequential_options()).unwrap();

        // Act
        let res = model.fit(&data).unwrap();

        // Assert
        assert_eq!(res.variance().len(), 1500);
        assert!(res.variance().iter().all(|&v| v > 0.0));
        assert!(res.diagnostics().persistence < 1.0);
        let direct = crate::volatility::core::likelihood::student_t_loglik(
            res.residuals().view(),
            res.variance().view(),
            res.params().nu,
            0,
        );
        assert_relative_eq!(res.loglik(), direct, epsilon = 1e-6, max_relative = 1e-9);
        assert!(res.std_errors().iter().all(|s| s.map_or(false, |v| v > 0.0)));
        assert_eq!(res.diagnostics().restarts.len(), 2);
        assert_eq!(res.names().len(), 5);
    }

    #[test]
    // Purpose
    // -------
    // Verify that estimates are reported in the caller's units.
    //
    // Given
    // -----
    // - The same series fitted as is and multiplied by 100.
    //
    // Expect
    // ------
    // - ω and the variance path scale by 10⁴; α, γ, β, ν are unchanged.
    // - Log-likelihoods differ by n·ln(100).
    fn fit_is_scale_equivariant() {
        // Arrange
        let base = sim_data(800, 21, 1.0);
        let scaled = sim_data(800, 21, 100.0);
        let model = GjrGarchX::new(sequential_options()).unwrap();

        // Act
        let a = model.fit(&base).unwrap();
        let b = model.fit(&scaled).unwrap();

        // Assert
        assert_relative_eq!(b.params().omega, a.params().omega * 1e4, max_relative = 1e-5);
        assert_relative_eq!(b.params().beta, a.params().beta, epsilon = 1e-6);
        assert_relative_eq!(b.params().nu, a.params().nu, epsilon = 1e-4);
        assert_relative_eq!(b.variance()[500], a.variance()[500] * 1e4, max_relative = 1e-5);
        assert_relative_eq!(
            a.loglik() - b.loglik(),
            800.0 * 100.0_f64.ln(),
            max_relative = 1e-7
        );
    }

    #[test]
    // Purpose
    // -------
    // Exercise the input error paths of `fit`.
    //
    // Given
    // -----
    // - A 12-period series (too short for 5 parameters + 10).
    // - A user start of the wrong length, and one violating stationarity.
    // - A constant series.
    //
    // Expect
    // ------
    // - `InsufficientObservations`, `InvalidInitialLength`,
    //   `InfeasibleStart` (twice) with the matching kinds.
    fn fit_input_errors() {
        // Arrange
        let short = sim_data(12, 1, 1.0);
        let data = sim_data(300, 2, 1.0);
        let constant = GarchData::new(Array1::from_elem(300, 0.01), None).unwrap();
        let wrong_len = GjrGarchX::new(FitOptions {
            initial: Some(array![0.1, 0.05, 0.05]),
            ..sequential_options()
        })
        .unwrap();
        let explosive = GjrGarchX::new(FitOptions {
            initial: Some(array![0.1, 0.3, 0.2, 0.7, 8.0]),
            ..sequential_options()
        })
        .unwrap();
        let model = GjrGarchX::new(sequential_options()).unwrap();

        // Act
        let e_short = model.fit(&short).unwrap_err();
        let e_len = wrong_len.fit(&data).unwrap_err();
        let e_infeasible = explosive.fit(&data).unwrap_err();
        let e_const = model.fit(&constant).unwrap_err();

        // Assert
        assert!(matches!(e_short, GarchError::InsufficientObservations { n_eff: 12, .. }));
        assert_eq!(e_short.kind(), ErrorKind::InvalidInput);
        assert_eq!(e_len, GarchError::InvalidInitialLength { expected: 5, actual: 3 });
        assert_eq!(e_infeasible.kind(), ErrorKind::InfeasibleStart);
        assert_eq!(e_const.kind(), ErrorKind::InfeasibleStart);
    }

    #[test]
    // Purpose
    // -------
    // Ensure the sample-size check runs before the data are inspected.
    //
    // Given
    // -----
    // - A 6-period constant series, which is both too short and constant.
    //
    // Expect
    // ------
    // - `InsufficientObservations` with kind `InvalidInput`, not
    //   `InfeasibleStart`.
    fn short_constant_series_is_invalid_input() {
        // Arrange
        let data = GarchData::new(Array1::from_elem(6, 0.5), None).unwrap();
        let model = GjrGarchX::new(sequential_options()).unwrap();

        // Act
        let err = model.fit(&data).unwrap_err();

        // Assert
        assert_eq!(err, GarchError::InsufficientObservations { n_eff: 6, required: 15 });
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    // Purpose
    // -------
    // Verify that an estimate pinned on a bound gets no standard error.
    //
    // Given
    // -----
    // - 2000 i.i.d. draws from a t(1.5) (infinite variance), so the
    //   likelihood drives ν onto its lower bound.
    //
    // Expect
    // ------
    // - ν̂ equals `NU_MIN` and the `nu >= nu_min` row is reported in a
    //   `ParameterAtBound` warning naming `nu`.
    // - Classical and robust standard errors of ν are `None`, and so are
    //   its t-statistic and p-value.
    fn bound_pinned_nu_has_no_standard_error() {
        // Arrange
        let data = iid_student_t(2000, 1.5, 17);
        let model = GjrGarchX::new(sequential_options()).unwrap();

        // Act
        let res = model.fit(&data).unwrap();

        // Assert
        assert_relative_eq!(res.params().nu, NU_MIN, epsilon = 1e-6);
        let (constraints, parameters) = res
            .warnings()
            .iter()
            .find_map(|w| match w {
                FitWarning::ParameterAtBound { constraints, parameters } => {
                    Some((constraints.clone(), parameters.clone()))
                }
                _ => None,
            })
            .expect("boundary warning");
        assert!(constraints.iter().any(|c| c == "nu >= nu_min"));
        assert!(parameters.iter().any(|p| p == "nu"));
        let nu = res.names().iter().position(|n| n == "nu").unwrap();
        assert_eq!(res.std_errors()[nu], None);
        assert_eq!(res.robust_std_errors()[nu], None);
        let row = &res.estimates()[nu];
        assert_eq!((row.t_stat, row.p_value), (None, None));
        for name in &parameters {
            let i = res.names().iter().position(|n| n == name).unwrap();
            assert_eq!(res.std_errors()[i], None);
        }
    }

    #[test]
    // Purpose
    // -------
    // Check the boundary test on hand-built points.
    //
    // Given
    // -----
    // - The K = 0 constraint set, an interior θ, and θ with α = 0 and
    //   ν = ν_max.
    //
    // Expect
    // ------
    // - No active rows inside; at the boundary the α, α + γ and ν rows are
    //   active and α, γ, ν are pinned.
    fn active_bounds_on_boundary_points() {
        // Arrange
        let space = ParamSpace::new(&[], ParamBounds::default());
        let constraints = space.constraints().unwrap();
        let interior = array![0.05, 0.05, 0.08, 0.85, 8.0];
        let edge = array![0.05, 0.0, 0.0, 0.85, NU_MAX];

        // Act
        let (inside_rows, inside_pinned) = active_bounds(&constraints, &interior);
        let (edge_rows, edge_pinned) = active_bounds(&constraints, &edge);

        // Assert
        assert!(inside_rows.is_empty() && inside_pinned.is_empty());
        let names: Vec<&str> = edge_rows.iter().map(|&i| constraints.name(i)).collect();
        assert!(names.contains(&"alpha >= 0"));
        assert!(names.contains(&"alpha + gamma >= 0"));
        assert!(names.contains(&"nu <= nu_max"));
        assert_eq!(edge_pinned, vec![1, 2, 4]);
    }

    #[test]
    // Purpose
    // -------
    // Verify that an iteration cap too small to converge surfaces as a
    // convergence failure with a diagnostic candidate.
    //
    // Given
    // -----
    // - `max_iter = 1` with tight tolerances, data scaled by 10.
    //
    // Expect
    // ------
    // - `ConvergenceFailure` whose candidate has 5 finite entries and
    //   ω in the caller's units (above the rescaled lower bound times 100).
    fn fit_reports_convergence_failure() {
        // Arrange
        let data = sim_data(600, 5, 10.0);
        let sqp = SqpOptions {
            tols: Tolerances::new(Some(1e-14), Some(1e-12), Some(1)).unwrap(),
            ..SqpOptions::default()
        };
        let model = GjrGarchX::new(FitOptions { sqp, ..sequential_options() }).unwrap();

        // Act
        let err = model.fit(&data).unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::ConvergenceFailure);
        match err {
            GarchError::ConvergenceFailure { best_params, best_loglik, restarts, .. } => {
                assert_eq!(best_params.len(), 5);
                assert!(best_params.iter().all(|v| v.is_finite()));
                assert!(best_params[IDX_OMEGA] > 1e-8 * 100.0);
                assert!(best_loglik.is_finite());
                assert_eq!(restarts, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
