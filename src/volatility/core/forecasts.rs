//! Out-of-sample conditional-variance forecasts for GJR-GARCH-X models.
//!
//! Purpose
//! -------
//! Extend a fitted variance path `h` steps beyond the last observed period
//! `T`, given a policy for the future exogenous regressors.
//!
//! Key behaviors
//! -------------
//! - Step 1 uses the realized last residual:
//!   `σ²_{T+1} = ω + (α + γ·1[ε_T < 0])·ε²_T + β·σ²_T + δ·x_{T+1}`.
//! - Steps `i ≥ 2` replace future shocks by their conditional expectation,
//!   `E[ε²] = σ²` and `E[ε²·1(ε<0)] = σ²/2` (symmetric innovations):
//!   `σ²_{T+i} = ω + (α + γ/2 + β)·σ²_{T+i−1} + δ·x_{T+i}`.
//! - Future regressors follow a [`FutureExog`] policy: caller-provided
//!   rows, the last observed row held constant, or zeros.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters, residual and variances are in the caller's units.
//! - Forecast values are floored at the same positive floor as the fitted
//!   path, so every value is strictly positive.
//! - Forecasting never mutates the fitted model; each call returns a new
//!   [`VarianceForecast`].
//!
//! Conventions
//! -----------
//! - `variance[0]` is the last fitted value `σ²_T`; `variance[i]` is the
//!   `i`-step-ahead forecast. `h = 0` therefore returns `[σ²_T]`.
//! - Row `i − 1` of a provided matrix is the regressor vector of step `i`.
use crate::volatility::{
    core::{
        params::GjrParams,
        recursion::{apply_floor, gjr_step},
        validation::validate_future_exog,
    },
    errors::GarchResult,
};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Policy for exogenous regressors beyond the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FutureExog {
    /// Realized or assumed regressors, shape `h × K`.
    Provided(Array2<f64>),
    /// Repeat the last in-sample row.
    HoldLast,
    /// All regressors zero.
    Zero,
}

/// Variance forecast over horizons `0..=h`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceForecast {
    /// `variance[0] = σ²_T`, `variance[i] = σ̂²_{T+i}`.
    pub variance: Array1<f64>,
}

impl VarianceForecast {
    pub fn horizon(&self) -> usize {
        self.variance.len().saturating_sub(1)
    }

    /// Conditional standard deviations `σ̂_{T+i}`.
    pub fn volatility(&self) -> Array1<f64> {
        self.variance.mapv(f64::sqrt)
    }

    /// The `h`-step forecast (the last entry).
    pub fn last(&self) -> f64 {
        self.variance[self.variance.len() - 1]
    }
}

/// forecast_variance — `h`-step conditional variance forecast.
///
/// Parameters
/// ----------
/// - `params`: `&GjrParams`
///   Fitted parameters in the caller's units.
/// - `last_resid`: `f64`
///   Realized residual `ε_T`.
/// - `last_sigma2`: `f64`
///   Last fitted variance `σ²_T`.
/// - `last_exog`: `ArrayView1<f64>`
///   Last in-sample regressor row (length `K`), used by
///   [`FutureExog::HoldLast`].
/// - `future`: `&FutureExog`
/// - `horizon`: `usize`
/// - `floor`: `f64`
///   Positive variance floor.
///
/// Errors
/// ------
/// - `GarchError::FutureExogShape` / `GarchError::NonFiniteFutureExog` for
///   an invalid provided matrix (its shape must be exactly `h × K`).
pub fn forecast_variance(
    params: &GjrParams, last_resid: f64, last_sigma2: f64, last_exog: ArrayView1<f64>,
    future: &FutureExog, horizon: usize, floor: f64,
) -> GarchResult<VarianceForecast> {
    let k = params.n_exog();
    if let FutureExog::Provided(x) = future {
        validate_future_exog(x.view(), horizon, k)?;
    }
    let exog_term = |step: usize| -> f64 {
        if k == 0 {
            return 0.0;
        }
        match future {
            FutureExog::Provided(x) => x.row(step - 1).dot(&params.delta),
            FutureExog::HoldLast => last_exog.dot(&params.delta),
            FutureExog::Zero => 0.0,
        }
    };

    let mut variance = Array1::zeros(horizon + 1);
    variance[0] = last_sigma2;
    let persistence = params.persistence();
    for step in 1..=horizon {
        let raw = if step == 1 {
            gjr_step(
                params.omega,
                params.alpha,
                params.gamma,
                params.beta,
                last_resid,
                last_sigma2,
                exog_term(step),
            )
        } else {
            params.omega + persistence * variance[step - 1] + exog_term(step)
        };
        variance[step] = apply_floor(raw, floor).0;
    }
    Ok(VarianceForecast { variance })
}
