//! Single-port boundary holding pressure (or flow) and temperature.

use crate::error::ComponentResult;
use crate::ports::Ports;
use hn_core::units::{MassRate, Pressure, Temperature};
use hn_core::{Equation, Property, Real};
use hn_fluids::FluidProperties;

/// What the boundary fixes besides its temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryMode {
    /// Fixed pressure [Pa]; flow follows from the network.
    Pressure(Real),
    /// Fixed mass flow [kg/s], positive into the network.
    MassFlow(Real),
}

/// Expansion vessel or test boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureBoundary {
    pub mode: BoundaryMode,
    /// Temperature of water leaving the boundary [K]
    pub temperature: Real,
}

impl PressureBoundary {
    pub const CONNECTION_POINTS: usize = 1;

    pub fn with_pressure(pressure: Pressure, temperature: Temperature) -> Self {
        Self {
            mode: BoundaryMode::Pressure(pressure.value),
            temperature: temperature.value,
        }
    }

    pub fn with_mass_flow(mass_flow: MassRate, temperature: Temperature) -> Self {
        Self {
            mode: BoundaryMode::MassFlow(mass_flow.value),
            temperature: temperature.value,
        }
    }

    pub fn equations(
        &self,
        ports: &Ports<'_>,
        fluid: &dyn FluidProperties,
    ) -> ComponentResult<Vec<Equation>> {
        let mode_row = match self.mode {
            BoundaryMode::Pressure(p) => ports.prescribe(0, Property::Pressure, p)?,
            BoundaryMode::MassFlow(m) => ports.prescribe(0, Property::MassFlowRate, m)?,
        };
        let u_out = fluid.internal_energy(self.temperature)?;
        Ok(vec![
            ports.press_to_node(0)?,
            mode_row,
            ports.thermal(0, u_out, 0.0)?,
        ])
    }
}
