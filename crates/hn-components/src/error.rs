//! Error types for asset operations.

use crate::setpoint::SetpointKey;
use hn_core::HnError;
use hn_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur while building or evaluating assets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Equation term '{term}' is not finite ({value})")]
    NonFiniteTerm { term: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Asset '{asset}' has no unknowns assigned")]
    NotRegistered { asset: String },

    #[error("Asset '{asset}' connection point {cp} is not connected")]
    NotConnected { asset: String, cp: usize },

    #[error("Asset '{asset}' connection point {cp} is already connected")]
    AlreadyConnected { asset: String, cp: usize },

    #[error("Asset '{asset}' has no connection point {cp} (it has {count})")]
    ConnectionPoint {
        asset: String,
        cp: usize,
        count: usize,
    },

    #[error("Asset '{asset}' is missing setpoints: {}", join_keys(.keys))]
    MissingSetpoints {
        asset: String,
        keys: Vec<SetpointKey>,
    },

    #[error("Asset '{asset}' setpoint '{key}' has the wrong type")]
    SetpointType { asset: String, key: SetpointKey },

    #[error("Asset '{asset}' expected {expected} solution values, got {got}")]
    SolutionLength {
        asset: String,
        expected: usize,
        got: usize,
    },

    #[error("Fluid property error: {0}")]
    Fluid(#[from] FluidError),

    #[error(transparent)]
    Core(#[from] HnError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

fn join_keys(keys: &[SetpointKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
