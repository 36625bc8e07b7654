//! Error types for solver operations.

use std::path::PathBuf;

use hn_core::HnError;
use thiserror::Error;

/// Errors that can occur while assembling or solving the network system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("No unknowns registered")]
    NoUnknowns,

    #[error("Cannot add {requested} unknowns, at least one is required")]
    InvalidUnknownCount { requested: usize },

    #[error("Too {} equations: {equations} equations for {unknowns} unknowns", many_or_few(.equations, .unknowns))]
    EquationCount { equations: usize, unknowns: usize },

    #[error("Equation {row} is malformed: {source}")]
    InvalidEquation { row: usize, source: HnError },

    #[error("Singular matrix{}", dump_note(.dump))]
    SingularMatrix { dump: Option<PathBuf> },

    #[error("No convergence after {iterations} iterations")]
    ConvergenceFailed { iterations: usize },

    #[error("Diagnostic dump failed: {what}")]
    Dump { what: String },

    #[error(transparent)]
    Core(#[from] HnError),
}

pub type SolverResult<T> = Result<T, SolverError>;

fn many_or_few(equations: &usize, unknowns: &usize) -> &'static str {
    if equations > unknowns { "many" } else { "few" }
}

fn dump_note(dump: &Option<PathBuf>) -> String {
    match dump {
        Some(path) => format!(" (system written to {})", path.display()),
        None => String::new(),
    }
}
