//! Producer or consumer connected between return (cp0) and supply (cp1).

use crate::common::mass_flow_for_power;
use crate::error::ComponentResult;
use crate::ports::Ports;
use crate::setpoint::{SetpointKey, SetpointRecord};
use hn_core::units::{Pressure, Temperature};
use hn_core::{Equation, Property, Real};
use hn_fluids::FluidProperties;

/// Controller-facing role; the equations are the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatRole {
    Producer,
    Consumer,
}

/// Heat source or sink.
///
/// `heat_demand` is the heat flow into the network: positive for a producer
/// pushing water out of the supply side, negative for a consumer drawing
/// from it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatBoundary {
    pub role: HeatRole,
    /// Return-side temperature [K]
    pub temperature_in: Real,
    /// Supply-side temperature [K]
    pub temperature_out: Real,
    /// Signed heat flow [W]
    pub heat_demand: Real,
    /// Hold pressures instead of a flow.
    pub set_pressure: bool,
    /// Return pressure in pressure mode [Pa]
    pub return_pressure: Real,
    /// Supply pressure in pressure mode [Pa]
    pub supply_pressure: Real,
}

impl HeatBoundary {
    pub const CONNECTION_POINTS: usize = 2;
    pub const RETURN: usize = 0;
    pub const SUPPLY: usize = 1;

    pub fn new(role: HeatRole, temperature_in: Temperature, temperature_out: Temperature) -> Self {
        Self {
            role,
            temperature_in: temperature_in.value,
            temperature_out: temperature_out.value,
            heat_demand: 0.0,
            set_pressure: false,
            return_pressure: 1.0e5,
            supply_pressure: 2.0e5,
        }
    }

    pub fn producer(temperature_in: Temperature, temperature_out: Temperature) -> Self {
        Self::new(HeatRole::Producer, temperature_in, temperature_out)
    }

    pub fn consumer(temperature_in: Temperature, temperature_out: Temperature) -> Self {
        Self::new(HeatRole::Consumer, temperature_in, temperature_out)
    }

    /// Pressures held when the controller selects this asset as pressure holder.
    pub fn with_pressures(mut self, return_pressure: Pressure, supply_pressure: Pressure) -> Self {
        self.return_pressure = return_pressure.value;
        self.supply_pressure = supply_pressure.value;
        self
    }

    pub fn apply_setpoints(&mut self, asset: &str, record: &SetpointRecord) -> ComponentResult<()> {
        let set_pressure = record.require_with_mode(
            asset,
            &[SetpointKey::TemperatureIn, SetpointKey::TemperatureOut],
        )?;
        if !set_pressure {
            self.heat_demand = record.real(asset, SetpointKey::HeatDemand)?;
        }
        self.set_pressure = set_pressure;
        self.temperature_in = record.real(asset, SetpointKey::TemperatureIn)?;
        self.temperature_out = record.real(asset, SetpointKey::TemperatureOut)?;
        Ok(())
    }

    pub fn equations(
        &self,
        ports: &Ports<'_>,
        fluid: &dyn FluidProperties,
    ) -> ComponentResult<Vec<Equation>> {
        let u_in = fluid.internal_energy(self.temperature_in)?;
        let u_out = fluid.internal_energy(self.temperature_out)?;

        let mut eqs = Vec::with_capacity(6);
        eqs.push(ports.press_to_node(Self::RETURN)?);
        eqs.push(ports.press_to_node(Self::SUPPLY)?);
        eqs.push(ports.thermal(Self::RETURN, u_in, 0.0)?);
        eqs.push(ports.thermal(Self::SUPPLY, u_out, 0.0)?);

        if self.set_pressure {
            eqs.push(ports.prescribe(Self::RETURN, Property::Pressure, self.return_pressure)?);
            eqs.push(ports.prescribe(Self::SUPPLY, Property::Pressure, self.supply_pressure)?);
        } else {
            let mass_flow = if self.heat_demand == 0.0 {
                0.0
            } else {
                mass_flow_for_power(self.heat_demand, u_out, u_in)?
            };
            eqs.push(ports.continuity(&[Self::RETURN, Self::SUPPLY])?);
            eqs.push(ports.prescribe(Self::SUPPLY, Property::MassFlowRate, mass_flow)?);
        }
        Ok(eqs)
    }
}
