//! Shared constants and helpers for asset equations.

use crate::error::{ComponentError, ComponentResult};
use hn_core::Real;

/// Below this |mass flow| a node treats an attached flow as zero (kg/s).
pub const NODE_ZERO_FLOW: Real = 1e-8;

/// Buffer mass flows below this are treated as standstill (kg/s).
pub const BUFFER_ZERO_FLOW: Real = 1e-4;

/// Lower bound on the frozen |mass flow| in the pressure-loss row (kg/s).
pub const MIN_FRICTION_FLOW: Real = 1e-5;

/// Smallest internal-energy difference used to size flows (J/kg).
pub const MIN_ENERGY_DIFFERENCE: Real = 1.0;

/// Direction of flow at a connection point for the current iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRegime {
    /// Leaving the asset.
    Positive,
    /// Entering the asset.
    Negative,
    Zero,
}

impl FlowRegime {
    /// Classify `mass_flow`; `|mass_flow| <= zero_limit` is `Zero`.
    pub fn classify(mass_flow: Real, zero_limit: Real) -> Self {
        if mass_flow > zero_limit {
            FlowRegime::Positive
        } else if mass_flow < -zero_limit {
            FlowRegime::Negative
        } else {
            FlowRegime::Zero
        }
    }
}

/// A coefficient or right-hand side about to enter an equation row.
pub fn finite_term(value: Real, term: &'static str) -> ComponentResult<Real> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComponentError::NonFiniteTerm { term, value })
    }
}

/// Mass flow carrying `power` between two internal energies.
///
/// The sign follows `power`; the energy difference is taken by magnitude.
pub fn mass_flow_for_power(power: Real, u_a: Real, u_b: Real) -> ComponentResult<Real> {
    let du = (u_a - u_b).abs();
    if du < MIN_ENERGY_DIFFERENCE {
        return Err(ComponentError::NonPhysical {
            what: "supply and return temperatures coincide",
        });
    }
    finite_term(power / du, "mass flow from power")
}
