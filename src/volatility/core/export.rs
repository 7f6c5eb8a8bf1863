//! Tabular export of fitted variance paths and parameter tables.
//!
//! Rows are plain `serde` structs so collaborators can persist them in any
//! serde format; CSV writers are provided via the `csv` crate. One
//! [`VarianceRow`] is produced per input period, burn-in included.
use crate::volatility::errors::GarchResult;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One period of the fitted variance path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    pub period: usize,
    #[serde(rename = "return")]
    pub ret: f64,
    pub residual: f64,
    pub variance: f64,
    pub volatility: f64,
    pub std_residual: f64,
    /// `false` for burn-in periods excluded from the likelihood.
    pub in_likelihood: bool,
}

/// One row of the parameter summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: Option<f64>,
    pub t_stat: Option<f64>,
    pub p_value: Option<f64>,
    pub robust_std_error: Option<f64>,
}

/// Write variance rows as CSV (with header) to `writer`.
///
/// Errors
/// ------
/// - `GarchError::Csv` on serialization or I/O failure.
pub fn write_variance_csv<W: Write>(rows: &[VarianceRow], writer: W) -> GarchResult<()> {
    write_rows(rows, writer)
}

/// Write parameter rows as CSV (with header) to `writer`. Unavailable
/// standard errors are written as empty fields.
pub fn write_estimates_csv<W: Write>(rows: &[EstimateRow], writer: W) -> GarchResult<()> {
    write_rows(rows, writer)
}

fn write_rows<W: Write, R: Serialize>(rows: &[R], writer: W) -> GarchResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
