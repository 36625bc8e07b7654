//! Linear engine and fixed-point driver for the network equations.
//!
//! The `Matrix` owns the global unknown vector. Each iteration the caller
//! hands it one linearised equation per unknown; the system is assembled in
//! sparse triplet form, factorised with a sparse LU, and compared with the
//! previous iterate.
//! The driver repeats assemble → solve → write back until the iterates
//! stop moving.

pub mod config;
pub mod driver;
pub mod dump;
pub mod error;
pub mod matrix;

pub use config::SolverConfig;
pub use driver::{EquationSystem, SolveReport, solve_system};
pub use error::{SolverError, SolverResult};
pub use matrix::Matrix;
