//! Return-series and exogenous-regressor containers for GJR-GARCH-X models.
//!
//! Purpose
//! -------
//! Provide validated containers for a univariate return series and its
//! aligned exogenous matrix, plus the estimation payload the optimizer sees
//! (demeaned, rescaled residuals and the selected regressors). This module
//! centralizes input validation so the recursion and likelihood can assume
//! clean, aligned data.
//!
//! Key behaviors
//! -------------
//! - [`ExogMatrix`] stores a `T × K` matrix with unique column names and
//!   supports selecting a subset of columns by name.
//! - [`GarchData`] enforces non-empty, finite returns and index-for-index
//!   alignment with the exogenous rows.
//! - [`EstimationData`] demeans the returns, divides residuals by their
//!   sample standard deviation `s`, and records `s`, the mean, the burn-in,
//!   the recursion seed `σ²₀` and the variance floor.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returns and exogenous entries are finite.
//! - `exog.nrows() == returns.len()`; `K = 0` is represented by a `T × 0`
//!   matrix rather than an `Option`.
//! - Rescaling is an internal numeric stabilizer: it never changes the raw
//!   values exposed by [`GarchData`], and every quantity reported to callers
//!   is mapped back to the original units.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; row `t` of the exogenous matrix enters the
//!   variance equation of period `t` (contemporaneous alignment).
//! - Residuals are `ε_t = r_t − r̄` with `r̄` the full-sample mean; the mean
//!   is not an estimated parameter.
//! - The sample variance is the population variance (divisor `T`) of the
//!   residuals over the full sample, burn-in included.
//! - Exogenous regressors are not rescaled; their coefficients absorb the
//!   variance scale `s²`.
//!
//! Downstream usage
//! ----------------
//! - Construct [`GarchData`] at the boundary where raw data enters the crate.
//! - The model builds an [`EstimationData`] once per fit and shares it
//!   read-only across all restarts.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction failures (empty, non-finite, misaligned),
//!   column selection by name and the rescaling identities.
use crate::{
    optimization::numerical_stability::VARIANCE_FLOOR_REL,
    volatility::{
        core::validation::{validate_exog, validate_returns},
        errors::{GarchError, GarchResult},
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Returns whose standard deviation is at most this fraction of `|mean|`
/// are treated as constant.
const CONSTANT_REL_TOL: f64 = 1e-10;

/// `ExogMatrix` — named `T × K` matrix of exogenous variance regressors.
///
/// Fields
/// ------
/// - `values`: `Array2<f64>`
///   One row per period, one column per regressor; all entries finite.
/// - `names`: `Vec<String>`
///   Unique column names, `names.len() == values.ncols()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogMatrix {
    values: Array2<f64>,
    names: Vec<String>,
}

impl ExogMatrix {
    /// Construct a validated exogenous matrix.
    ///
    /// Errors
    /// ------
    /// - `GarchError::ExogNameMismatch`, `GarchError::DuplicateExogName`,
    ///   `GarchError::NonFiniteExog` from
    ///   [`validate_exog`](crate::volatility::core::validation::validate_exog).
    pub fn new(values: Array2<f64>, names: Vec<String>) -> GarchResult<Self> {
        validate_exog(values.view(), &names)?;
        Ok(ExogMatrix { values, names })
    }

    /// Construct a matrix with generated names `x1, .., xK`.
    pub fn unnamed(values: Array2<f64>) -> GarchResult<Self> {
        let names = (1..=values.ncols()).map(|j| format!("x{j}")).collect();
        Self::new(values, names)
    }

    /// A `rows × 0` matrix (no regressors).
    pub fn empty(rows: usize) -> Self {
        ExogMatrix { values: Array2::zeros((rows, 0)), names: Vec::new() }
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Keep only the named columns, in the requested order.
    ///
    /// Errors
    /// ------
    /// - `GarchError::UnknownExogColumn` for a name not present.
    /// - `GarchError::DuplicateExogName` if a name is requested twice.
    pub fn select(&self, columns: &[String]) -> GarchResult<ExogMatrix> {
        let mut idx = Vec::with_capacity(columns.len());
        for name in columns {
            let j = self
                .names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| GarchError::UnknownExogColumn { name: name.clone() })?;
            idx.push(j);
        }
        let values = self.values.select(Axis(1), &idx);
        ExogMatrix::new(values, columns.to_vec())
    }
}

/// `GarchData` — validated return series with aligned exogenous regressors.
///
/// Invariants
/// ----------
/// - `returns.len() > 0` and all returns are finite.
/// - `exog.nrows() == returns.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchData {
    returns: Array1<f64>,
    exog: ExogMatrix,
}

impl GarchData {
    /// Construct validated model data.
    ///
    /// Parameters
    /// ----------
    /// - `returns`: `Array1<f64>`
    ///   Return series, non-empty and finite.
    /// - `exog`: `Option<ExogMatrix>`
    ///   Aligned regressors; `None` means `K = 0`.
    ///
    /// Errors
    /// ------
    /// - `GarchError::EmptySeries`, `GarchError::NonFiniteReturn`.
    /// - `GarchError::ExogRowMismatch` when the row count differs from the
    ///   series length.
    pub fn new(returns: Array1<f64>, exog: Option<ExogMatrix>) -> GarchResult<Self> {
        validate_returns(returns.view())?;
        let exog = exog.unwrap_or_else(|| ExogMatrix::empty(returns.len()));
        if exog.nrows() != returns.len() {
            return Err(GarchError::ExogRowMismatch { returns: returns.len(), rows: exog.nrows() });
        }
        Ok(GarchData { returns, exog })
    }

    pub fn returns(&self) -> ArrayView1<'_, f64> {
        self.returns.view()
    }

    pub fn exog(&self) -> &ExogMatrix {
        &self.exog
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// `EstimationData` — read-only payload for likelihood evaluation.
///
/// Fields
/// ------
/// - `resid`: residuals `(r_t − r̄)/s`, unit sample variance.
/// - `exog`: selected regressors, `T × K`, original units.
/// - `exog_names`: names of the selected columns.
/// - `burn_in`: periods excluded from the likelihood sum.
/// - `sigma2_init`: `σ²₀`, the sample variance of `resid`.
/// - `floor`: variance floor, `VARIANCE_FLOOR_REL · sigma2_init`.
/// - `mean`: `r̄` in original units.
/// - `scale`: `s`, the residual sample standard deviation in original units.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationData {
    pub resid: Array1<f64>,
    pub exog: Array2<f64>,
    pub exog_names: Vec<String>,
    pub burn_in: usize,
    pub sigma2_init: f64,
    pub floor: f64,
    pub mean: f64,
    pub scale: f64,
}

impl EstimationData {
    /// Build the estimation payload from validated data.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&GarchData`
    /// - `columns`: `Option<&[String]>`
    ///   Exogenous columns to keep; `None` keeps all.
    /// - `burn_in`: `usize`
    ///   Periods excluded from the likelihood sum. Range checks live in the
    ///   model, which knows the parameter count.
    ///
    /// Errors
    /// ------
    /// - `GarchError::UnknownExogColumn` / `GarchError::DuplicateExogName`
    ///   from column selection.
    /// - `GarchError::InfeasibleStart` if the residuals have zero (or
    ///   non-finite) variance, up to rounding of the mean: no ω is
    ///   consistent with such data.
    pub fn prepare(
        data: &GarchData, columns: Option<&[String]>, burn_in: usize,
    ) -> GarchResult<Self> {
        let exog = match columns {
            Some(cols) => data.exog().select(cols)?,
            None => data.exog().clone(),
        };
        let returns = data.returns();
        let n = returns.len() as f64;
        let mean = returns.sum() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let scale = variance.sqrt();
        // Dispersion at the level of the mean's rounding error is no dispersion.
        if !(scale > CONSTANT_REL_TOL * mean.abs()) || !scale.is_finite() {
            return Err(GarchError::InfeasibleStart {
                reason: format!("residual sample variance is {variance}; the series is constant"),
            });
        }
        let resid = returns.mapv(|r| (r - mean) / scale);
        let sigma2_init = resid.iter().map(|e| e * e).sum::<f64>() / n;
        Ok(EstimationData {
            resid,
            exog_names: exog.names().to_vec(),
            exog: exog.values().to_owned(),
            burn_in,
            sigma2_init,
            floor: VARIANCE_FLOOR_REL * sigma2_init,
            mean,
            scale,
        })
    }

    pub fn n_obs(&self) -> usize {
        self.resid.len()
    }

    /// Observations entering the likelihood sum.
    pub fn n_eff(&self) -> usize {
        self.resid.len().saturating_sub(self.burn_in)
    }

    pub fn n_exog(&self) -> usize {
        self.exog.ncols()
    }
}
