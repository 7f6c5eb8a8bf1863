//! GJR-GARCH-X parameter container and the flat optimizer layout.
//!
//! This module provides the **model-space** parameter container
//! [`GjrParams`] and the mapping to and from the optimizer vector
//! `θ = [ω, α, γ, β, δ₁..δ_K, ν]` (length `5 + K`).
//!
//! ## Layout
//! - `θ[IDX_OMEGA] = ω`, `θ[IDX_ALPHA] = α`, `θ[IDX_GAMMA] = γ`,
//!   `θ[IDX_BETA] = β`
//! - `θ[IDX_DELTA .. IDX_DELTA + K] = δ`
//! - `θ[nu_index(K)] = ν`
//!
//! The optimizer works directly in this space; feasibility is maintained by
//! linear constraints (see [`ParamSpace`](crate::volatility::core::space::ParamSpace)),
//! not by a reparameterization.
//!
//! ## Invariants validated by constructors
//! - `ω > 0`, `α ≥ 0`, `β ≥ 0`, `ν > 2`, all finite
//! - `γ`, `δ` finite; `α + γ ≥ 0`
//! - `α + γ/2 + β < 1`
use crate::{
    optimization::{loglik_optimizer::Theta, numerical_stability::half_life},
    volatility::{
        core::validation::validate_theta,
        errors::ParamResult,
    },
};
use ndarray::{Array1, ArrayView1, s};
use serde::{Deserialize, Serialize};

pub const IDX_OMEGA: usize = 0;
pub const IDX_ALPHA: usize = 1;
pub const IDX_GAMMA: usize = 2;
pub const IDX_BETA: usize = 3;
pub const IDX_DELTA: usize = 4;

/// Length of `θ` for `k` exogenous regressors.
pub fn theta_dim(k: usize) -> usize {
    5 + k
}

/// Position of `ν` in `θ` for `k` exogenous regressors.
pub fn nu_index(k: usize) -> usize {
    IDX_DELTA + k
}

/// Display names of the parameters in `θ` order, with `delta[<name>]` for
/// each exogenous column.
pub fn param_names(exog_names: &[String]) -> Vec<String> {
    let mut names: Vec<String> =
        ["omega", "alpha", "gamma", "beta"].iter().map(|s| s.to_string()).collect();
    names.extend(exog_names.iter().map(|n| format!("delta[{n}]")));
    names.push("nu".to_string());
    names
}

/// Validated **model-space** parameters of a GJR-GARCH(1,1)-X model with
/// Student-t innovations.
///
/// Fields
/// ------
/// - `omega`: variance intercept, `> 0`.
/// - `alpha`: ARCH coefficient on `ε²_{t−1}`, `≥ 0`.
/// - `gamma`: leverage coefficient on `ε²_{t−1}·1[ε_{t−1} < 0]`; any sign
///   with `α + γ ≥ 0`.
/// - `beta`: GARCH coefficient on `σ²_{t−1}`, `≥ 0`.
/// - `delta`: exogenous coefficients (length `K`), unconstrained.
/// - `nu`: Student-t degrees of freedom, `> 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GjrParams {
    pub omega: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub beta: f64,
    pub delta: Array1<f64>,
    pub nu: f64,
}

impl GjrParams {
    /// Create validated parameters.
    ///
    /// Errors
    /// ------
    /// - The first failing check of
    ///   [`validate_theta`](crate::volatility::core::validation::validate_theta).
    pub fn new(
        omega: f64, alpha: f64, gamma: f64, beta: f64, delta: Array1<f64>, nu: f64,
    ) -> ParamResult<Self> {
        let params = GjrParams { omega, alpha, gamma, beta, delta, nu };
        validate_theta(params.to_theta().view(), params.n_exog())?;
        Ok(params)
    }

    /// Build validated parameters from `θ = [ω, α, γ, β, δ.., ν]` with `k`
    /// exogenous coefficients.
    pub fn from_theta(theta: ArrayView1<f64>, k: usize) -> ParamResult<Self> {
        validate_theta(theta, k)?;
        Ok(GjrParams {
            omega: theta[IDX_OMEGA],
            alpha: theta[IDX_ALPHA],
            gamma: theta[IDX_GAMMA],
            beta: theta[IDX_BETA],
            delta: theta.slice(s![IDX_DELTA..IDX_DELTA + k]).to_owned(),
            nu: theta[nu_index(k)],
        })
    }

    /// Flatten into the optimizer layout.
    pub fn to_theta(&self) -> Theta {
        let k = self.n_exog();
        let mut theta = Array1::zeros(theta_dim(k));
        theta[IDX_OMEGA] = self.omega;
        theta[IDX_ALPHA] = self.alpha;
        theta[IDX_GAMMA] = self.gamma;
        theta[IDX_BETA] = self.beta;
        theta.slice_mut(s![IDX_DELTA..IDX_DELTA + k]).assign(&self.delta);
        theta[nu_index(k)] = self.nu;
        theta
    }

    pub fn n_exog(&self) -> usize {
        self.delta.len()
    }

    /// Stationarity proxy `α + γ/2 + β`.
    pub fn persistence(&self) -> f64 {
        self.alpha + 0.5 * self.gamma + self.beta
    }

    /// Long-run variance `ω / (1 − α − γ/2 − β)`.
    ///
    /// Only defined without exogenous terms (their long-run contribution
    /// depends on the regressors' own dynamics); `None` when `K > 0`.
    pub fn unconditional_variance(&self) -> Option<f64> {
        if self.n_exog() > 0 {
            return None;
        }
        let p = self.persistence();
        if p < 1.0 { Some(self.omega / (1.0 - p)) } else { None }
    }

    /// Half-life of a variance shock in periods, `ln(0.5) / ln(persistence)`.
    pub fn half_life(&self) -> Option<f64> {
        half_life(self.persistence())
    }

    /// Map parameters between variance units: `ω` and `δ` are multiplied by
    /// `factor`, the dimensionless coefficients are unchanged.
    pub(crate) fn rescaled(&self, factor: f64) -> Self {
        GjrParams {
            omega: self.omega * factor,
            alpha: self.alpha,
            gamma: self.gamma,
            beta: self.beta,
            delta: &self.delta * factor,
            nu: self.nu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::errors::ParamError;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the θ layout, validation on construction and the
    // derived quantities (persistence, long-run variance, rescaling).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `to_theta` and `from_theta` use the documented layout.
    //
    // Given
    // -----
    // - K = 2 parameters with distinct values.
    //
    // Expect
    // ------
    // - θ = [ω, α, γ, β, δ₁, δ₂, ν] and `from_theta` recovers the struct.
    fn theta_layout_matches_documentation() {
        // Arrange
        let p = GjrParams::new(0.1, 0.05, 0.08, 0.85, array![0.3, -0.2], 7.0).unwrap();

        // Act
        let theta = p.to_theta();
        let back = GjrParams::from_theta(theta.view(), 2).unwrap();

        // Assert
        assert_eq!(theta, array![0.1, 0.05, 0.08, 0.85, 0.3, -0.2, 7.0]);
        assert_eq!(nu_index(2), 6);
        assert_eq!(back, p);
    }

    #[test]
    // Purpose
    // -------
    // Check the derived quantities for a K = 0 model.
    //
    // Given
    // -----
    // - ω = 0.01, α = 0.05, γ = 0.05, β = 0.85 (persistence 0.925).
    //
    // Expect
    // ------
    // - Long-run variance 0.01 / 0.075 and a finite positive half-life.
    // - `unconditional_variance` is `None` once an exogenous term exists.
    fn derived_quantities_for_plain_gjr() {
        // Arrange
        let p = GjrParams::new(0.01, 0.05, 0.05, 0.85, Array1::zeros(0), 8.0).unwrap();
        let px = GjrParams::new(0.01, 0.05, 0.05, 0.85, array![0.1], 8.0).unwrap();

        // Act / Assert
        assert_relative_eq!(p.persistence(), 0.925, epsilon = 1e-12);
        assert_relative_eq!(p.unconditional_variance().unwrap(), 0.01 / 0.075, epsilon = 1e-12);
        assert!(p.half_life().unwrap() > 0.0);
        assert!(px.unconditional_variance().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Ensure construction rejects invalid parameter combinations.
    //
    // Given
    // -----
    // - An explosive persistence and a non-finite δ.
    //
    // Expect
    // ------
    // - `StationarityViolated` and `NonFiniteCoefficient`.
    fn new_rejects_invalid_parameters() {
        // Arrange / Act
        let explosive = GjrParams::new(0.1, 0.2, 0.0, 0.9, Array1::zeros(0), 8.0);
        let bad_delta = GjrParams::new(0.1, 0.05, 0.0, 0.9, array![f64::NAN], 8.0);

        // Assert
        assert!(matches!(explosive, Err(ParamError::StationarityViolated { .. })));
        assert!(matches!(bad_delta, Err(ParamError::NonFiniteCoefficient { index: 4, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Verify that rescaling touches only ω and δ.
    //
    // Given
    // -----
    // - A K = 1 parameter set and factor 4.
    //
    // Expect
    // ------
    // - ω and δ quadrupled, α, γ, β, ν unchanged.
    fn rescaled_scales_variance_unit_coefficients() {
        // Arrange
        let p = GjrParams::new(0.1, 0.05, 0.08, 0.85, array![0.3], 7.0).unwrap();

        // Act
        let r = p.rescaled(4.0);

        // Assert
        assert_relative_eq!(r.omega, 0.4);
        assert_relative_eq!(r.delta[0], 1.2);
        assert_eq!((r.alpha, r.gamma, r.beta, r.nu), (p.alpha, p.gamma, p.beta, p.nu));
    }
}
