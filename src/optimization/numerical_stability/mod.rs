//! numerical_stability — shared tolerances and covariance rescaling.
//!
//! Purpose
//! -------
//! Centralize the small numerical constants used by the constraint set,
//! the variance recursion and the inference layer, together with the
//! delta-method helper that maps covariances between the rescaled
//! estimation space and the caller's units.
//!
//! Key behaviors
//! -------------
//! - Define default bounds (`OMEGA_MIN`, `NU_MIN`, `NU_MAX`) and the
//!   stationarity slack (`STATIONARITY_MARGIN`).
//! - Define the variance floor policy (`VARIANCE_FLOOR_REL`,
//!   `FLOOR_WARN_FRACTION`) and the boundary test (`BOUND_ACTIVE_TOL`).
//! - Provide `delta_method_diag` and `half_life`.
//!
//! Conventions
//! -----------
//! - Pure numerical helpers: no logging, no I/O, no global state.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BOUND_ACTIVE_TOL, EIGEN_EPS, FLOOR_WARN_FRACTION, GENERAL_TOL, NU_MAX, NU_MIN, OMEGA_MIN,
    STATIONARITY_MARGIN, VARIANCE_FLOOR_REL, delta_method_diag, half_life,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, NU_MAX, NU_MIN, OMEGA_MIN, STATIONARITY_MARGIN, delta_method_diag,
    };
}
