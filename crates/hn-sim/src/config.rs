//! Run settings.

use hn_core::Real;
use hn_solver::SolverConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Fixed-step run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Time of the first step (seconds)
    pub start_time_s: Real,
    /// Step length (seconds)
    pub time_step_s: Real,
    /// Number of steps
    pub steps: usize,
    pub solver: SolverConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_time_s: 0.0,
            time_step_s: 3600.0,
            steps: 24,
            solver: SolverConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.time_step_s.is_finite() && self.time_step_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "time_step_s must be positive",
            });
        }
        if !self.start_time_s.is_finite() {
            return Err(SimError::InvalidArg {
                what: "start_time_s must be finite",
            });
        }
        if self.solver.max_iterations == 0 {
            return Err(SimError::InvalidArg {
                what: "solver.max_iterations must be positive",
            });
        }
        Ok(())
    }

    pub fn end_time_s(&self) -> Real {
        self.start_time_s + self.time_step_s * self.steps as Real
    }
}
