//! Error types for the network controller.

use hn_components::ComponentError;
use hn_graph::NetworkError;
use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while building the zone tree or computing setpoints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    #[error("Network is looped via heat pumps/exchangers ({what})")]
    Looped { what: String },

    #[error("Zone {zone} cannot be reached from the root network")]
    Unreachable { zone: usize },

    #[error("Zone {zone} is {depth} stages from the root; more than two stages are not supported")]
    TooManyStages { zone: usize, depth: usize },

    #[error("Zone {zone} has neither a heat-transfer asset on its secondary side nor a producer to hold pressure")]
    NoPressureAsset { zone: usize },

    #[error("Asset '{asset}' has no controller metadata")]
    MissingMetadata { asset: String },

    #[error("Invalid demand profile: {what}")]
    InvalidProfile { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Asset error: {0}")]
    Component(#[from] ComponentError),
}
