//! Typed failures of the pack sizing computation

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalcError {
    /// A token of the speed text could not be read as a finite number
    #[error("speed token {index} is not a number: {token:?}")]
    Parse { index: usize, token: String },
    #[error("speed cycle contains no samples")]
    EmptyCycle,
    /// A parameter that is used as a divisor (or must be strictly positive) is
    /// zero, negative or undefined
    #[error("degenerate parameter: {0}")]
    DegenerateParameter(String),
    /// The pack cannot source `power_kw` at this voltage and resistance; the
    /// current equation has no real root
    #[error(
        "pack cannot deliver {power_kw:.3} kW at sample {index} \
        ({voltage} V, {resistance_ohm:.5} ohm internal resistance)"
    )]
    InfeasibleElectricalState {
        index: usize,
        power_kw: f64,
        voltage: f64,
        resistance_ohm: f64,
    },
    #[error("parameter validation failed: {0}")]
    Validation(String),
}

pub type CalcResult<T> = Result<T, CalcError>;

impl From<validator::ValidationErrors> for CalcError {
    fn from(errs: validator::ValidationErrors) -> Self {
        Self::Validation(errs.to_string())
    }
}
