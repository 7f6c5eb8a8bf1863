//! Immutable result of a GJR-GARCH-X fit.
//!
//! Purpose
//! -------
//! Hold everything a collaborator needs after estimation: named point
//! estimates with classical and robust standard errors, the covariance
//! matrix, log-likelihood and information criteria, the fitted variance
//! path, fit diagnostics and non-fatal warnings. Forecasts and tables are
//! derived on demand without mutating the result.
//!
//! Key behaviors
//! -------------
//! - [`ModelResult::estimates`] reports estimate, standard error,
//!   t-statistic, two-sided normal p-value and robust standard error per
//!   parameter; unavailable standard errors stay `None`.
//! - [`ModelResult::aic`] / [`ModelResult::bic`] use `k = 5 + K` free
//!   parameters and the effective sample size (burn-in excluded).
//! - [`ModelResult::forecast`] extends the variance path from the last
//!   fitted period (see `core::forecasts` for the convention).
//! - [`ModelResult::variance_table`] yields one row per input period.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every reported quantity is in the caller's units: parameters, standard
//!   errors, covariance, log-likelihood, variances and residuals.
//! - Only produced by a converged fit; fields are private and never change
//!   after construction.
use crate::{
    optimization::loglik_optimizer::RestartSummary,
    volatility::{
        core::{
            export::{EstimateRow, VarianceRow, write_estimates_csv, write_variance_csv},
            forecasts::{FutureExog, VarianceForecast, forecast_variance},
            params::GjrParams,
        },
        errors::{FitWarning, GarchResult},
    },
};
use ndarray::{Array1, Array2};
use statrs::function::erf::erfc;
use std::{fmt, io::Write};

/// Optimizer and model diagnostics of a fit.
///
/// Fields
/// ------
/// - `restarts`: one summary per starting point; starts and values in the
///   caller's units.
/// - `best_restart`: index of the selected run.
/// - `iterations` / `status` / `grad_norm`: solver report of that run.
/// - `persistence`: `α + γ/2 + β`.
/// - `unconditional_variance`: `ω / (1 − persistence)`, only when `K = 0`.
/// - `half_life`: variance shock half-life in periods.
/// - `floor_hits` / `floor_fraction`: variance-floor usage of the fitted
///   path.
/// - `min_eigenvalue` / `condition_number`: of the observed information,
///   `None` when inference failed outright.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    pub restarts: Vec<RestartSummary>,
    pub best_restart: usize,
    pub iterations: usize,
    pub status: String,
    pub grad_norm: Option<f64>,
    pub persistence: f64,
    pub unconditional_variance: Option<f64>,
    pub half_life: Option<f64>,
    pub floor_hits: usize,
    pub floor_fraction: f64,
    pub min_eigenvalue: Option<f64>,
    pub condition_number: Option<f64>,
}

/// Fitted GJR-GARCH-X model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResult {
    pub(crate) params: GjrParams,
    pub(crate) names: Vec<String>,
    pub(crate) std_errors: Vec<Option<f64>>,
    pub(crate) robust_std_errors: Vec<Option<f64>>,
    pub(crate) covariance: Option<Array2<f64>>,
    pub(crate) robust_covariance: Option<Array2<f64>>,
    pub(crate) loglik: f64,
    pub(crate) n_eff: usize,
    pub(crate) burn_in: usize,
    pub(crate) mean: f64,
    pub(crate) returns: Array1<f64>,
    pub(crate) residuals: Array1<f64>,
    pub(crate) variance: Array1<f64>,
    pub(crate) exog: Array2<f64>,
    pub(crate) floor: f64,
    pub(crate) diagnostics: FitDiagnostics,
    pub(crate) warnings: Vec<FitWarning>,
}

impl ModelResult {
    pub fn params(&self) -> &GjrParams {
        &self.params
    }

    /// Parameter names in optimizer order,
    /// `["omega", "alpha", "gamma", "beta", "delta[..]".., "nu"]`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Classical standard errors; `None` where the Hessian could not
    /// support one.
    pub fn std_errors(&self) -> &[Option<f64>] {
        &self.std_errors
    }

    /// QML sandwich standard errors; all `None` when disabled or when the
    /// Hessian is not positive definite.
    pub fn robust_std_errors(&self) -> &[Option<f64>] {
        &self.robust_std_errors
    }

    /// Classical covariance of the estimates (pseudoinverse when the Hessian
    /// is not positive definite).
    pub fn covariance(&self) -> Option<&Array2<f64>> {
        self.covariance.as_ref()
    }

    pub fn robust_covariance(&self) -> Option<&Array2<f64>> {
        self.robust_covariance.as_ref()
    }

    pub fn loglik(&self) -> f64 {
        self.loglik
    }

    pub fn n_params(&self) -> usize {
        self.names.len()
    }

    pub fn n_obs(&self) -> usize {
        self.returns.len()
    }

    /// Observations entering the likelihood.
    pub fn n_eff(&self) -> usize {
        self.n_eff
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    /// Akaike information criterion `2k − 2ℓ`.
    pub fn aic(&self) -> f64 {
        2.0 * self.n_params() as f64 - 2.0 * self.loglik
    }

    /// Bayesian information criterion `k·ln(n_eff) − 2ℓ`.
    pub fn bic(&self) -> f64 {
        self.n_params() as f64 * (self.n_eff as f64).ln() - 2.0 * self.loglik
    }

    /// Sample mean removed from the returns.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Fitted conditional variances `σ²_t`, one per input period.
    pub fn variance(&self) -> &Array1<f64> {
        &self.variance
    }

    pub fn volatility(&self) -> Array1<f64> {
        self.variance.mapv(f64::sqrt)
    }

    /// Residuals `ε_t = r_t − r̄`.
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    /// `ε_t / σ_t`.
    pub fn standardized_residuals(&self) -> Array1<f64> {
        &self.residuals / &self.volatility()
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }

    pub fn warnings(&self) -> &[FitWarning] {
        &self.warnings
    }

    /// `true` if the fit carries a variance-floor warning.
    pub fn floor_triggered(&self) -> bool {
        self.warnings.iter().any(|w| matches!(w, FitWarning::VarianceFloorTriggered { .. }))
    }

    /// Parameter summary rows.
    ///
    /// The t-statistic is `estimate / std_error` and the p-value is the
    /// two-sided normal tail `erfc(|t| / √2)`; both are `None` when the
    /// standard error is unavailable.
    pub fn estimates(&self) -> Vec<EstimateRow> {
        let theta = self.params.to_theta();
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let estimate = theta[i];
                let std_error = self.std_errors.get(i).copied().flatten();
                let t_stat = std_error.filter(|se| *se > 0.0).map(|se| estimate / se);
                let p_value = t_stat.map(|t| erfc(t.abs() / std::f64::consts::SQRT_2));
                EstimateRow {
                    name: name.clone(),
                    estimate,
                    std_error,
                    t_stat,
                    p_value,
                    robust_std_error: self.robust_std_errors.get(i).copied().flatten(),
                }
            })
            .collect()
    }

    /// forecast — `h`-step variance forecast from the end of the sample.
    ///
    /// Parameters
    /// ----------
    /// - `horizon`: `usize`
    ///   Steps ahead; `0` returns `[σ²_T]`.
    /// - `future`: `&FutureExog`
    ///   Future regressor policy; a provided matrix must be `h × K`.
    ///
    /// Returns
    /// -------
    /// `GarchResult<VarianceForecast>` with `horizon + 1` values, entry 0
    /// being the last fitted variance.
    ///
    /// Errors
    /// ------
    /// - `GarchError::FutureExogShape` / `GarchError::NonFiniteFutureExog`
    ///   for an invalid provided matrix.
    pub fn forecast(&self, horizon: usize, future: &FutureExog) -> GarchResult<VarianceForecast> {
        let last = self.returns.len() - 1;
        forecast_variance(
            &self.params,
            self.residuals[last],
            self.variance[last],
            self.exog.row(last),
            future,
            horizon,
            self.floor,
        )
    }

    /// One row per input period, burn-in included.
    pub fn variance_table(&self) -> Vec<VarianceRow> {
        (0..self.returns.len())
            .map(|t| {
                let volatility = self.variance[t].sqrt();
                VarianceRow {
                    period: t,
                    ret: self.returns[t],
                    residual: self.residuals[t],
                    variance: self.variance[t],
                    volatility,
                    std_residual: self.residuals[t] / volatility,
                    in_likelihood: t >= self.burn_in,
                }
            })
            .collect()
    }

    /// Write [`ModelResult::variance_table`] as CSV.
    pub fn write_variance_csv<W: Write>(&self, writer: W) -> GarchResult<()> {
        write_variance_csv(&self.variance_table(), writer)
    }

    /// Write [`ModelResult::estimates`] as CSV.
    pub fn write_estimates_csv<W: Write>(&self, writer: W) -> GarchResult<()> {
        write_estimates_csv(&self.estimates(), writer)
    }

    /// Human-readable summary table.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.4e}"));
        writeln!(f, "GJR-GARCH(1,1)-X with Student-t innovations (QML)")?;
        writeln!(
            f,
            "n_obs = {}, n_eff = {}, loglik = {:.4}, AIC = {:.4}, BIC = {:.4}",
            self.n_obs(),
            self.n_eff,
            self.loglik,
            self.aic(),
            self.bic()
        )?;
        writeln!(
            f,
            "{:<16} {:>12} {:>12} {:>9} {:>9} {:>12}",
            "parameter", "estimate", "std.err", "t", "p", "robust s.e."
        )?;
        for row in self.estimates() {
            writeln!(
                f,
                "{:<16} {:>12.4e} {:>12} {:>9} {:>9} {:>12}",
                row.name,
                row.estimate,
                opt(row.std_error),
                row.t_stat.map_or_else(|| "n/a".to_string(), |t| format!("{t:.3}")),
                row.p_value.map_or_else(|| "n/a".to_string(), |p| format!("{p:.4}")),
                opt(row.robust_std_error),
            )?;
        }
        writeln!(f, "persistence = {:.6}", self.diagnostics.persistence)?;
        for w in &self.warnings {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}
