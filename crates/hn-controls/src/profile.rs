//! Piecewise-linear demand profiles.

use hn_core::Real;
use interp::{InterpMode, interp};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Heat demand [W] over time [s], held constant outside the sampled range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    times: Vec<Real>,
    values: Vec<Real>,
}

impl DemandProfile {
    pub fn new(times: Vec<Real>, values: Vec<Real>) -> ControlResult<Self> {
        let profile = Self { times, values };
        profile.validate()?;
        Ok(profile)
    }

    /// The same demand at every instant.
    pub fn constant(value: Real) -> Self {
        Self {
            times: vec![0.0],
            values: vec![value],
        }
    }

    pub fn validate(&self) -> ControlResult<()> {
        if self.times.is_empty() {
            return Err(ControlError::InvalidProfile { what: "no samples" });
        }
        if self.times.len() != self.values.len() {
            return Err(ControlError::InvalidProfile {
                what: "times and values differ in length",
            });
        }
        if self.times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ControlError::InvalidProfile {
                what: "times must be strictly increasing",
            });
        }
        if self.values.iter().chain(&self.times).any(|v| !v.is_finite()) {
            return Err(ControlError::InvalidProfile {
                what: "non-finite sample",
            });
        }
        Ok(())
    }

    pub fn value_at(&self, time: Real) -> Real {
        interp(&self.times, &self.values, time, &InterpMode::FirstLast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interpolates_and_holds_ends() {
        let p = DemandProfile::new(vec![0.0, 3600.0, 7200.0], vec![1.0e5, 3.0e5, 2.0e5]).unwrap();
        assert_relative_eq!(p.value_at(1800.0), 2.0e5, max_relative = 1e-12);
        assert_relative_eq!(p.value_at(5400.0), 2.5e5, max_relative = 1e-12);
        assert_relative_eq!(p.value_at(-10.0), 1.0e5);
        assert_relative_eq!(p.value_at(1.0e6), 2.0e5);
    }

    #[test]
    fn rejects_unsorted_times() {
        assert!(DemandProfile::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(DemandProfile::new(vec![], vec![]).is_err());
    }

    #[test]
    fn single_sample_holds_everywhere() {
        let p = DemandProfile::new(vec![600.0], vec![4.0e4]).unwrap();
        assert_eq!(p.value_at(0.0), 4.0e4);
        assert_eq!(p.value_at(1.0e5), 4.0e4);
    }

    #[test]
    fn constant_profile() {
        assert_eq!(DemandProfile::constant(5.0).value_at(123.0), 5.0);
    }

    #[test]
    fn deserializes_from_yaml() {
        let p: DemandProfile = serde_yaml::from_str("times: [0, 10]\nvalues: [1, 3]\n").unwrap();
        assert_relative_eq!(p.value_at(5.0), 2.0, max_relative = 1e-12);
    }
}
