//! Fluid property errors.

use hn_core::HnError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// NaN or infinite input/output.
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// Table definition is unusable (too short, not monotone).
    #[error("Invalid property table: {what}")]
    InvalidTable { what: &'static str },
}

impl From<FluidError> for HnError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonFinite { what, value } => HnError::NonFinite { what, value },
            FluidError::InvalidTable { what } => HnError::InvalidArg { what },
        }
    }
}
