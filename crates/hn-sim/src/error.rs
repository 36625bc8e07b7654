//! Error types for simulation runs and scenario import.

use thiserror::Error;

/// Errors raised while importing a scenario or stepping a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid scenario: {what}")]
    Scenario { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Network error: {0}")]
    Network(#[from] hn_graph::NetworkError),

    #[error("Controller error: {0}")]
    Control(#[from] hn_controls::ControlError),

    #[error("Solver error: {0}")]
    Solver(#[from] hn_solver::SolverError),
}

pub type SimResult<T> = Result<T, SimError>;
