//! Solver settings.

use std::path::PathBuf;

use hn_core::Tolerances;
use serde::{Deserialize, Serialize};

/// Settings for the fixed-point driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap per solve
    pub max_iterations: usize,
    /// Convergence band between successive iterates
    pub tolerances: Tolerances,
    /// Where a singular system is written; the temp dir when unset
    pub dump_path: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerances: Tolerances::default(),
            dump_path: None,
        }
    }
}

impl SolverConfig {
    pub fn resolved_dump_path(&self) -> PathBuf {
        self.dump_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("hn_singular_matrix.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: SolverConfig = serde_yaml::from_str("max_iterations: 40\n").unwrap();
        assert_eq!(cfg.max_iterations, 40);
        assert_eq!(cfg.tolerances, Tolerances::default());
        assert!(cfg.resolved_dump_path().ends_with("hn_singular_matrix.csv"));
    }
}
