//! Fixed-point (Picard) driver.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::matrix::Matrix;
use hn_core::{Equation, Real};
use serde::Serialize;
use tracing::{debug, trace};

/// A system that can linearise itself around its cached previous iterate.
pub trait EquationSystem {
    type Error: From<SolverError>;

    fn matrix_mut(&mut self) -> &mut Matrix;

    /// One equation per unknown, in a deterministic order.
    fn assemble(&self) -> Result<Vec<Equation>, Self::Error>;

    /// Store the new iterate in the entities' previous-solution caches.
    fn apply_solution(&mut self, solution: &[Real]) -> Result<(), Self::Error>;
}

/// Outcome of a converged solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveReport {
    pub iterations: usize,
    /// Largest change in the final iteration
    pub max_change: Real,
}

/// Iterate until two successive solutions agree or the cap is hit.
pub fn solve_system<S: EquationSystem>(
    system: &mut S,
    config: &SolverConfig,
) -> Result<SolveReport, S::Error> {
    {
        let matrix = system.matrix_mut();
        matrix.set_tolerances(config.tolerances);
        matrix.set_dump_path(config.resolved_dump_path());
        matrix.reset_solution();
    }

    for iteration in 1..=config.max_iterations {
        let equations = system.assemble()?;
        trace!(iteration, rows = equations.len(), "assembled");

        let solution = system.matrix_mut().solve(&equations)?.to_vec();
        system.apply_solution(&solution)?;

        let matrix = system.matrix_mut();
        let max_change = matrix.max_change();
        debug!(iteration, max_change, "picard iteration");
        if matrix.is_converged()? {
            return Ok(SolveReport {
                iterations: iteration,
                max_change,
            });
        }
    }

    Err(SolverError::ConvergenceFailed {
        iterations: config.max_iterations,
    }
    .into())
}
