//! Student-t quasi-log-likelihood of the GJR-GARCH-X model.
//!
//! Purpose
//! -------
//! Turn a variance path and residuals into the Student-t log-likelihood
//!
//! ```text
//! ℓ_t = ln Γ((ν+1)/2) − ln Γ(ν/2) − ½ ln(π(ν−2)) − ½ ln σ²_t
//!       − ((ν+1)/2) · ln(1 + ε²_t / ((ν−2)σ²_t))
//! ```
//!
//! (standardized innovations with unit variance), its per-observation
//! contributions, its analytic gradient and per-observation scores.
//!
//! Key behaviors
//! -------------
//! - [`loglik_value`] / [`loglik_contributions`] evaluate `Σ ℓ_t` and the
//!   vector of `ℓ_t` over the likelihood window `t ≥ burn_in`.
//! - [`loglik_gradient`] runs the variance recursion together with the
//!   sensitivity recursion
//!   `∂σ²_t/∂θ = [1, ε²_{t−1}, ε²_{t−1}·1[ε_{t−1}<0], σ²_{t−1}, x_t, 0] + β·∂σ²_{t−1}/∂θ`
//!   (zero at `t = 0` and at floored periods) and accumulates
//!   `∂ℓ_t/∂σ²_t · ∂σ²_t/∂θ` plus the direct `∂ℓ_t/∂ν` term.
//! - [`loglik_scores`] keeps those terms per period, giving the score
//!   matrix for sandwich standard errors.
//! - [`gaussian_loglik`] is the `ν → ∞` limit used as a reference.
//!
//! Invariants & assumptions
//! ------------------------
//! - Callers guarantee `ν > 2`, a finite `θ` of length `5 + K` and shapes
//!   matching the [`EstimationData`]; the model's `LogLikelihood::value`
//!   checks these before calling in.
//! - Other coordinates may sit marginally outside the feasible set (finite
//!   differences step across active bounds); the variance floor keeps every
//!   evaluation finite.
//!
//! Conventions
//! -----------
//! - `ln(1 + z)` is computed with `ln_1p` for accuracy at small `z`.
//! - Everything here runs in the rescaled estimation space of
//!   [`EstimationData`].
use crate::{
    optimization::loglik_optimizer::Grad,
    volatility::core::{
        data::EstimationData,
        params::{IDX_ALPHA, IDX_BETA, IDX_DELTA, IDX_GAMMA, IDX_OMEGA, nu_index, theta_dim},
        recursion::{apply_floor, gjr_step, variance_path},
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use statrs::function::gamma::{digamma, ln_gamma};
use std::f64::consts::PI;

/// ν-dependent constant `ln Γ((ν+1)/2) − ln Γ(ν/2) − ½ ln(π(ν−2))`.
pub fn student_t_log_const(nu: f64) -> f64 {
    ln_gamma(0.5 * (nu + 1.0)) - ln_gamma(0.5 * nu) - 0.5 * (PI * (nu - 2.0)).ln()
}

/// Single-period Student-t log density of `ε` given `σ²`, with the
/// precomputed constant from [`student_t_log_const`].
#[inline]
pub fn student_t_logpdf(eps: f64, sigma2: f64, nu: f64, log_const: f64) -> f64 {
    let z = eps * eps / ((nu - 2.0) * sigma2);
    log_const - 0.5 * sigma2.ln() - 0.5 * (nu + 1.0) * z.ln_1p()
}

/// `Σ_{t ≥ start} ℓ_t` for a given variance path.
pub fn student_t_loglik(
    resid: ArrayView1<f64>, sigma2: ArrayView1<f64>, nu: f64, start: usize,
) -> f64 {
    let c = student_t_log_const(nu);
    resid
        .slice(s![start..])
        .iter()
        .zip(sigma2.slice(s![start..]).iter())
        .map(|(&e, &s2)| student_t_logpdf(e, s2, nu, c))
        .sum()
}

/// Gaussian log-likelihood `Σ_{t ≥ start} −½[ln(2π) + ln σ²_t + ε²_t/σ²_t]`.
pub fn gaussian_loglik(resid: ArrayView1<f64>, sigma2: ArrayView1<f64>, start: usize) -> f64 {
    let ln_2pi = (2.0 * PI).ln();
    resid
        .slice(s![start..])
        .iter()
        .zip(sigma2.slice(s![start..]).iter())
        .map(|(&e, &s2)| -0.5 * (ln_2pi + s2.ln() + e * e / s2))
        .sum()
}

/// Per-observation contributions `ℓ_t` for `t ≥ burn_in` (length `n_eff`).
pub fn loglik_contributions(theta: ArrayView1<f64>, data: &EstimationData) -> Array1<f64> {
    let k = data.n_exog();
    let nu = theta[nu_index(k)];
    let path =
        variance_path(theta, data.resid.view(), data.exog.view(), data.sigma2_init, data.floor);
    let c = student_t_log_const(nu);
    let start = data.burn_in;
    data.resid
        .slice(s![start..])
        .iter()
        .zip(path.sigma2.slice(s![start..]).iter())
        .map(|(&e, &s2)| student_t_logpdf(e, s2, nu, c))
        .collect()
}

/// Total log-likelihood over the window `t ≥ burn_in`.
pub fn loglik_value(theta: ArrayView1<f64>, data: &EstimationData) -> f64 {
    let k = data.n_exog();
    let path =
        variance_path(theta, data.resid.view(), data.exog.view(), data.sigma2_init, data.floor);
    student_t_loglik(data.resid.view(), path.sigma2.view(), theta[nu_index(k)], data.burn_in)
}

/// Analytic gradient `∇ℓ(θ)` over the window `t ≥ burn_in`.
///
/// Returns
/// -------
/// `(ℓ(θ), ∇ℓ(θ))`, computed in one pass over the sample.
///
/// Notes
/// -----
/// - `O(T·(5+K))` time, `O(5+K)` extra memory; the sensitivity vector is
///   updated in place.
/// - At floored periods `σ²_t` does not depend on `θ`, so its sensitivity
///   restarts from zero.
pub fn loglik_gradient(theta: ArrayView1<f64>, data: &EstimationData) -> (f64, Grad) {
    let nu_idx = nu_index(data.n_exog());
    let mut grad: Grad = Array1::zeros(theta.len());
    let mut value = 0.0;
    sensitivity_pass(theta, data, |_, l_t, dl_dsigma2, dsig, dl_dnu| {
        value += l_t;
        grad.scaled_add(dl_dsigma2, dsig);
        grad[nu_idx] += dl_dnu;
    });
    (value, grad)
}

/// Per-observation scores `s_t = ∂ℓ_t/∂θ` for `t ≥ burn_in`.
///
/// Returns
/// -------
/// `n_eff × (5 + K)` matrix whose column sums equal [`loglik_gradient`].
/// Rows follow the same sensitivity recursion, so floored periods reset
/// the dependence on past parameters.
pub fn loglik_scores(theta: ArrayView1<f64>, data: &EstimationData) -> Array2<f64> {
    let nu_idx = nu_index(data.n_exog());
    let mut scores = Array2::zeros((data.n_eff(), theta.len()));
    sensitivity_pass(theta, data, |row, _, dl_dsigma2, dsig, dl_dnu| {
        let mut s_t = scores.row_mut(row);
        s_t.scaled_add(dl_dsigma2, dsig);
        s_t[nu_idx] += dl_dnu;
    });
    scores
}

// ---- Helper methods ----

/// Run the variance and sensitivity recursions and hand every period of
/// the likelihood window to `visit` as
/// `(row, ℓ_t, ∂ℓ_t/∂σ²_t, ∂σ²_t/∂θ, ∂ℓ_t/∂ν)`, with `row = t − burn_in`.
fn sensitivity_pass<V>(theta: ArrayView1<f64>, data: &EstimationData, mut visit: V)
where
    V: FnMut(usize, f64, f64, &Array1<f64>, f64),
{
    let k = data.n_exog();
    let dim = theta_dim(k);
    let (omega, alpha, gamma, beta, nu) =
        (theta[IDX_OMEGA], theta[IDX_ALPHA], theta[IDX_GAMMA], theta[IDX_BETA], theta[nu_index(k)]);
    let delta = theta.slice(s![IDX_DELTA..IDX_DELTA + k]);
    let resid = data.resid.view();
    let exog = data.exog.view();

    let c = student_t_log_const(nu);
    let dnu_const = 0.5 * digamma(0.5 * (nu + 1.0)) - 0.5 * digamma(0.5 * nu) - 0.5 / (nu - 2.0);

    let mut dsig: Array1<f64> = Array1::zeros(dim);
    let mut sigma2 = data.sigma2_init.max(data.floor);

    for t in 0..resid.len() {
        if t > 0 {
            let e_prev = resid[t - 1];
            let x_t = exog.row(t);
            let exog_term = if k > 0 { x_t.dot(&delta) } else { 0.0 };
            let raw = gjr_step(omega, alpha, gamma, beta, e_prev, sigma2, exog_term);
            let (next, hit) = apply_floor(raw, data.floor);
            if hit {
                dsig.fill(0.0);
            } else {
                let e2 = e_prev * e_prev;
                dsig.mapv_inplace(|d| beta * d);
                dsig[IDX_OMEGA] += 1.0;
                dsig[IDX_ALPHA] += e2;
                if e_prev < 0.0 {
                    dsig[IDX_GAMMA] += e2;
                }
                dsig[IDX_BETA] += sigma2;
                dsig.slice_mut(s![IDX_DELTA..IDX_DELTA + k]).zip_mut_with(&x_t, |d, &x| *d += x);
            }
            sigma2 = next;
        }
        if t < data.burn_in {
            continue;
        }
        let e = resid[t];
        let z = e * e / ((nu - 2.0) * sigma2);
        let ln1pz = z.ln_1p();
        let l_t = c - 0.5 * sigma2.ln() - 0.5 * (nu + 1.0) * ln1pz;

        let w = z / (1.0 + z);
        let dl_dsigma2 = 0.5 / sigma2 * ((nu + 1.0) * w - 1.0);
        let dl_dnu = dnu_const - 0.5 * ln1pz + 0.5 * (nu + 1.0) * w / (nu - 2.0);
        visit(t - data.burn_in, l_t, dl_dsigma2, &dsig, dl_dnu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::finite_diff::central_jacobian;
    use crate::volatility::core::data::GarchData;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The Student-t density against a direct Γ-based evaluation, and its
    //   ν → ∞ Gaussian limit.
    // - Consistency of value, contributions and the analytic gradient
    //   against central differences (with and without regressors, with a
    //   burn-in).
    // -------------------------------------------------------------------------

    fn sample_data(with_exog: bool, burn_in: usize) -> EstimationData {
        let r = array![
            0.3, -1.2, 0.8, 0.1, -0.4, 2.1, -0.9, 0.05, -1.7, 0.6, 0.2, -0.3, 1.1, -0.5, 0.7,
            -2.2, 0.4, 0.9, -0.1, 0.3
        ];
        let exog = if with_exog {
            let x = Array2::from_shape_fn((r.len(), 2), |(t, j)| {
                ((t as f64) * 0.37 + j as f64).sin().abs() + 0.1 * j as f64
            });
            Some(crate::volatility::core::data::ExogMatrix::unnamed(x).unwrap())
        } else {
            None
        };
        let data = GarchData::new(r, exog).unwrap();
        EstimationData::prepare(&data, None, burn_in).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify the Student-t log density against an independent evaluation
    // through Γ.
    //
    // Given
    // -----
    // - ε = 0.7, σ² = 1.3, ν = 5.
    //
    // Expect
    // ------
    // - `student_t_logpdf` equals the textbook formula.
    fn student_t_logpdf_matches_formula() {
        // Arrange
        let (e, s2, nu): (f64, f64, f64) = (0.7, 1.3, 5.0);
        let expected = statrs::function::gamma::gamma(3.0).ln()
            - statrs::function::gamma::gamma(2.5).ln()
            - 0.5 * (PI * 3.0).ln()
            - 0.5 * s2.ln()
            - 3.0 * (1.0 + e * e / (3.0 * s2)).ln();

        // Act
        let got = student_t_logpdf(e, s2, nu, student_t_log_const(nu));

        // Assert
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check that the Student-t likelihood converges to the Gaussian one as
    // ν grows.
    //
    // Given
    // -----
    // - A fixed variance path and ν ∈ {50, 1e6}.
    //
    // Expect
    // ------
    // - The gap shrinks with ν and is below 1e-3 at ν = 1e6.
    fn student_t_approaches_gaussian_for_large_nu() {
        // Arrange
        let data = sample_data(false, 0);
        let theta = array![0.05, 0.05, 0.05, 0.85, 8.0];
        let path = variance_path(
            theta.view(),
            data.resid.view(),
            data.exog.view(),
            data.sigma2_init,
            data.floor,
        );
        let gauss = gaussian_loglik(data.resid.view(), path.sigma2.view(), 0);

        // Act
        let t50 = student_t_loglik(data.resid.view(), path.sigma2.view(), 50.0, 0);
        let t_big = student_t_loglik(data.resid.view(), path.sigma2.view(), 1e6, 0);

        // Assert
        assert!((t_big - gauss).abs() < (t50 - gauss).abs());
        assert!((t_big - gauss).abs() < 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Ensure value, contributions and gradient agree with each other and
    // with central differences.
    //
    // Given
    // -----
    // - K = 2 regressors, burn-in 3, an interior θ.
    //
    // Expect
    // ------
    // - `Σ contributions == loglik_value == loglik_gradient().0`.
    // - Analytic gradient within 1e-5 (relative) of central differences.
    fn analytic_gradient_matches_central_differences() {
        // Arrange
        let data = sample_data(true, 3);
        let theta = array![0.08, 0.06, 0.09, 0.8, 0.02, 0.05, 6.5];
        let f = |th: &Array1<f64>| -> crate::optimization::errors::OptResult<Array1<f64>> {
            Ok(array![loglik_value(th.view(), &data)])
        };

        // Act
        let value = loglik_value(theta.view(), &data);
        let contribs = loglik_contributions(theta.view(), &data);
        let (value_g, grad) = loglik_gradient(theta.view(), &data);
        let jac = central_jacobian(&f, &theta).unwrap();

        // Assert
        assert_eq!(contribs.len(), data.n_eff());
        assert_relative_eq!(contribs.sum(), value, epsilon = 1e-10);
        assert_relative_eq!(value_g, value, epsilon = 1e-10);
        for i in 0..theta.len() {
            assert_relative_eq!(grad[i], jac[[0, i]], epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the plain K = 0 gradient against central differences.
    //
    // Given
    // -----
    // - No regressors, no burn-in, ν near its lower bound (2.5).
    //
    // Expect
    // ------
    // - Agreement within 1e-5 (relative).
    fn analytic_gradient_without_exog() {
        // Arrange
        let data = sample_data(false, 0);
        let theta = array![0.1, 0.1, -0.05, 0.75, 2.5];
        let f = |th: &Array1<f64>| -> crate::optimization::errors::OptResult<Array1<f64>> {
            Ok(array![loglik_value(th.view(), &data)])
        };

        // Act
        let (_, grad) = loglik_gradient(theta.view(), &data);
        let jac = central_jacobian(&f, &theta).unwrap();

        // Assert
        for i in 0..theta.len() {
            assert_relative_eq!(grad[i], jac[[0, i]], epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the analytic per-observation scores used by the sandwich.
    //
    // Given
    // -----
    // - K = 2 regressors, burn-in 3, an interior θ.
    //
    // Expect
    // ------
    // - One row per likelihood period, one column per parameter.
    // - Rows match the central-difference Jacobian of `loglik_contributions`.
    // - Column sums equal `loglik_gradient`.
    fn scores_match_contribution_jacobian() {
        // Arrange
        let data = sample_data(true, 3);
        let theta = array![0.08, 0.06, 0.09, 0.8, 0.02, 0.05, 6.5];
        let f = |th: &Array1<f64>| -> crate::optimization::errors::OptResult<Array1<f64>> {
            Ok(loglik_contributions(th.view(), &data))
        };

        // Act
        let scores = loglik_scores(theta.view(), &data);
        let jac = central_jacobian(&f, &theta).unwrap();
        let (_, grad) = loglik_gradient(theta.view(), &data);

        // Assert
        assert_eq!(scores.dim(), (data.n_eff(), theta.len()));
        for ((t, i), v) in scores.indexed_iter() {
            assert_relative_eq!(*v, jac[[t, i]], epsilon = 1e-5, max_relative = 1e-5);
        }
        for (i, col) in scores.columns().into_iter().enumerate() {
            assert_relative_eq!(col.sum(), grad[i], epsilon = 1e-10, max_relative = 1e-12);
        }
    }
}
