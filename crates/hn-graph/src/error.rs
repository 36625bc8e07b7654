//! Network-level error types.

use hn_components::ComponentError;
use hn_core::HnError;
use hn_fluids::FluidError;
use hn_solver::SolverError;
use thiserror::Error;

/// Topology, assembly and solve errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Asset '{name}' already exists")]
    DuplicateAsset { name: String },

    #[error("Unknown asset '{name}'")]
    UnknownAsset { name: String },

    #[error("Unknown node {id}")]
    UnknownNode { id: String },

    #[error("Asset '{asset}' connection point {cp} cannot be connected to itself")]
    SelfConnection { asset: String, cp: usize },

    #[error("Network is not fully connected: {what}")]
    NotConnected { what: String },

    #[error("Asset error: {0}")]
    Component(#[from] ComponentError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Fluid property error: {0}")]
    Fluid(#[from] FluidError),

    #[error(transparent)]
    Core(#[from] HnError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
