//! Fitting configuration for GJR-GARCH-X models.
//!
//! Purpose
//! -------
//! Bundle every knob of a fit into explicit, passable structs: optimizer
//! options, restart policy, exogenous-column selection, burn-in, optional
//! user starting values, parameter bounds and the robust-SE switch. There is
//! no process-wide optimizer state; two fits with different options can run
//! concurrently.
//!
//! Key behaviors
//! -------------
//! - [`ParamBounds`] holds the box bounds and the stationarity margin that
//!   [`ParamSpace`](crate::volatility::core::space::ParamSpace) turns into
//!   linear constraints.
//! - [`FitOptions`] is the top-level configuration consumed by
//!   [`GjrGarchX::fit`](crate::volatility::models::GjrGarchX::fit).
//! - Both derive `serde` traits so callers can persist configurations in
//!   any serde format.
//!
//! Invariants & assumptions
//! ------------------------
//! - `omega_min > 0`, `2 < nu_min < nu_max < ∞`, `0 < stationarity_margin < 1`.
//! - `restarts ≥ 1`.
//! - `initial`, when present, is finite and expressed in the caller's units
//!   with layout `[ω, α, γ, β, δ₁..δ_K, ν]`; its length is checked at fit
//!   time once `K` is known.
//!
//! Conventions
//! -----------
//! - Bounds on ω apply in the rescaled (unit-variance) estimation space.
//! - Fields are public for ergonomic struct-update syntax; `fit` re-runs the
//!   same validation as the constructors.
use crate::{
    optimization::{
        loglik_optimizer::SqpOptions,
        numerical_stability::{NU_MAX, NU_MIN, OMEGA_MIN, STATIONARITY_MARGIN},
    },
    volatility::errors::{GarchError, GarchResult, ParamError},
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Box bounds and stationarity margin of the parameter space.
///
/// Default
/// -------
/// - `omega_min = 1e-8`, `nu_min = 2.05`, `nu_max = 500`,
///   `stationarity_margin = 1e-6`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub omega_min: f64,
    pub nu_min: f64,
    pub nu_max: f64,
    pub stationarity_margin: f64,
}

impl ParamBounds {
    /// Create validated bounds.
    ///
    /// Errors
    /// ------
    /// - `GarchError::InvalidBounds` when any rule in the module docs fails.
    pub fn new(
        omega_min: f64, nu_min: f64, nu_max: f64, stationarity_margin: f64,
    ) -> GarchResult<Self> {
        let bounds = ParamBounds { omega_min, nu_min, nu_max, stationarity_margin };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> GarchResult<()> {
        if !(self.omega_min > 0.0) || !self.omega_min.is_finite() {
            return Err(GarchError::InvalidBounds { reason: "omega_min must be finite and > 0" });
        }
        if !(self.nu_min > 2.0) || !self.nu_max.is_finite() || !(self.nu_min < self.nu_max) {
            return Err(GarchError::InvalidBounds {
                reason: "nu bounds must satisfy 2 < nu_min < nu_max < inf",
            });
        }
        if !(self.stationarity_margin > 0.0 && self.stationarity_margin < 1.0) {
            return Err(GarchError::InvalidBounds {
                reason: "stationarity_margin must lie strictly between 0 and 1",
            });
        }
        Ok(())
    }
}

impl Default for ParamBounds {
    fn default() -> Self {
        ParamBounds {
            omega_min: OMEGA_MIN,
            nu_min: NU_MIN,
            nu_max: NU_MAX,
            stationarity_margin: STATIONARITY_MARGIN,
        }
    }
}

/// FitOptions — configuration of a GJR-GARCH-X fit.
///
/// Fields
/// ------
/// - `sqp`: [`SqpOptions`]
///   Tolerances, iteration cap and line-search constants of each SQP run.
/// - `restarts`: `usize`
///   Number of starting points (deterministic grid, plus `initial` when
///   given, which takes the first slot).
/// - `parallel`: `bool`
///   Run restarts on the `rayon` pool. Results are identical to the
///   sequential path.
/// - `exog_columns`: `Option<Vec<String>>`
///   Names of the exogenous columns to include; `None` keeps all.
/// - `burn_in`: `usize`
///   Leading periods excluded from the likelihood sum.
/// - `initial`: `Option<Array1<f64>>`
///   User starting values in the caller's units.
/// - `bounds`: [`ParamBounds`]
/// - `robust_se`: `bool`
///   Also compute QML sandwich standard errors.
///
/// Default
/// -------
/// `SqpOptions::default()`, 4 restarts, parallel, all columns, no burn-in,
/// no user start, default bounds, robust SEs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub sqp: SqpOptions,
    pub restarts: usize,
    pub parallel: bool,
    pub exog_columns: Option<Vec<String>>,
    pub burn_in: usize,
    pub initial: Option<Array1<f64>>,
    pub bounds: ParamBounds,
    pub robust_se: bool,
}

impl FitOptions {
    /// Create validated fit options.
    ///
    /// Errors
    /// ------
    /// - `GarchError::InvalidRestarts` if `restarts == 0`.
    /// - `GarchError::InvalidBounds` from [`ParamBounds::validate`].
    /// - `GarchError::InvalidParams` if `initial` has a non-finite entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sqp: SqpOptions, restarts: usize, parallel: bool, exog_columns: Option<Vec<String>>,
        burn_in: usize, initial: Option<Array1<f64>>, bounds: ParamBounds, robust_se: bool,
    ) -> GarchResult<Self> {
        let opts = FitOptions {
            sqp,
            restarts,
            parallel,
            exog_columns,
            burn_in,
            initial,
            bounds,
            robust_se,
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> GarchResult<()> {
        if self.restarts == 0 {
            return Err(GarchError::InvalidRestarts { restarts: self.restarts });
        }
        self.bounds.validate()?;
        if let Some(init) = &self.initial {
            if let Some((index, &value)) = init.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(ParamError::NonFiniteCoefficient { index, value }.into());
            }
        }
        Ok(())
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            sqp: SqpOptions::default(),
            restarts: 4,
            parallel: true,
            exog_columns: None,
            burn_in: 0,
            initial: None,
            bounds: ParamBounds::default(),
            robust_se: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover validation of `ParamBounds` and `FitOptions` and the
    // documented defaults.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the bound rules.
    //
    // Given
    // -----
    // - ν bounds reversed, a zero ω bound, a margin of 1.
    //
    // Expect
    // ------
    // - `InvalidBounds` each time; defaults pass.
    fn param_bounds_new_rejects_inconsistent_bounds() {
        // Arrange / Act / Assert
        assert!(matches!(
            ParamBounds::new(1e-8, 10.0, 5.0, 1e-6),
            Err(GarchError::InvalidBounds { .. })
        ));
        assert!(matches!(
            ParamBounds::new(0.0, 2.05, 500.0, 1e-6),
            Err(GarchError::InvalidBounds { .. })
        ));
        assert!(matches!(
            ParamBounds::new(1e-8, 2.05, 500.0, 1.0),
            Err(GarchError::InvalidBounds { .. })
        ));
        assert!(ParamBounds::default().validate().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Check `FitOptions::new` validation.
    //
    // Given
    // -----
    // - Zero restarts, and a non-finite initial vector.
    //
    // Expect
    // ------
    // - `InvalidRestarts` and `InvalidParams`.
    fn fit_options_new_validates() {
        // Arrange
        let sqp = SqpOptions::default();
        let bounds = ParamBounds::default();

        // Act
        let zero = FitOptions::new(sqp.clone(), 0, false, None, 0, None, bounds, true);
        let nan = FitOptions::new(
            sqp.clone(),
            2,
            false,
            None,
            0,
            Some(array![0.1, f64::NAN, 0.0, 0.8, 8.0]),
            bounds,
            true,
        );
        let ok = FitOptions::new(sqp, 2, true, Some(vec!["vix".into()]), 10, None, bounds, false);

        // Assert
        assert_eq!(zero, Err(GarchError::InvalidRestarts { restarts: 0 }));
        assert!(matches!(nan, Err(GarchError::InvalidParams(_))));
        assert_eq!(ok.unwrap().burn_in, 10);
    }
}
