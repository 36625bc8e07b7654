//! Stratified hot-water storage: cold layer at cp0, hot layer at cp1.

use crate::common::{BUFFER_ZERO_FLOW, finite_term, mass_flow_for_power};
use crate::error::{ComponentError, ComponentResult};
use crate::ports::Ports;
use crate::setpoint::{SetpointKey, SetpointRecord};
use hn_core::units::{Power, Temperature};
use hn_core::{Equation, Property, Real};
use hn_fluids::FluidProperties;
use tracing::trace;

/// Buffer tank.
///
/// `heat_demand > 0` discharges (hot water leaves through cp1), `< 0`
/// charges. `fill_level` is the hot fraction of the tank volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    /// Tank volume [m³]
    pub volume: Real,
    /// Charge/discharge power limit [W]
    pub max_power: Real,
    /// Cold-layer temperature [K]
    pub temperature_in: Real,
    /// Hot-layer temperature [K]
    pub temperature_out: Real,
    /// Signed heat flow into the network [W]
    pub heat_demand: Real,
    fill_level: Real,
}

impl Buffer {
    pub const CONNECTION_POINTS: usize = 2;
    pub const COLD: usize = 0;
    pub const HOT: usize = 1;

    pub fn new(
        volume: Real,
        max_power: Power,
        temperature_in: Temperature,
        temperature_out: Temperature,
    ) -> Self {
        Self {
            volume,
            max_power: max_power.value,
            temperature_in: temperature_in.value,
            temperature_out: temperature_out.value,
            heat_demand: 0.0,
            fill_level: 0.5,
        }
    }

    pub fn with_fill_level(mut self, fill_level: Real) -> Self {
        self.fill_level = fill_level.clamp(0.0, 1.0);
        self
    }

    pub fn fill_level(&self) -> Real {
        self.fill_level
    }

    /// Heat stored above the cold-layer temperature [J].
    pub fn stored_energy(&self, fluid: &dyn FluidProperties) -> ComponentResult<Real> {
        Ok(self.fill_level * self.full_capacity(fluid)?)
    }

    fn full_capacity(&self, fluid: &dyn FluidProperties) -> ComponentResult<Real> {
        let rho = fluid.density(self.temperature_out)?;
        let du = fluid.internal_energy(self.temperature_out)? - fluid.internal_energy(self.temperature_in)?;
        Ok(self.volume * rho * du.max(0.0))
    }

    /// Largest charging power sustainable over `dt` seconds [W].
    pub fn chargeable_power(&self, dt: Real, fluid: &dyn FluidProperties) -> ComponentResult<Real> {
        let room = (1.0 - self.fill_level) * self.full_capacity(fluid)?;
        Ok(self.max_power.min(room / positive_dt(dt)?))
    }

    /// Largest discharging power sustainable over `dt` seconds [W].
    pub fn dischargeable_power(&self, dt: Real, fluid: &dyn FluidProperties) -> ComponentResult<Real> {
        let stored = self.stored_energy(fluid)?;
        Ok(self.max_power.min(stored / positive_dt(dt)?))
    }

    /// Move the hot/cold interface after a converged step with hot-side
    /// flow `hot_flow` (positive leaving the tank).
    pub fn advance(&mut self, dt: Real, hot_flow: Real, fluid: &dyn FluidProperties) -> ComponentResult<()> {
        let rho = fluid.density(self.temperature_out)?;
        let delta = finite_term(hot_flow * dt / (rho * self.volume), "buffer fill change")?;
        self.fill_level = (self.fill_level - delta).clamp(0.0, 1.0);
        trace!(hot_flow, fill_level = self.fill_level, "buffer advanced");
        Ok(())
    }

    pub fn apply_setpoints(&mut self, asset: &str, record: &SetpointRecord) -> ComponentResult<()> {
        record.require(
            asset,
            &[
                SetpointKey::HeatDemand,
                SetpointKey::TemperatureIn,
                SetpointKey::TemperatureOut,
            ],
        )?;
        self.heat_demand = record.real(asset, SetpointKey::HeatDemand)?;
        self.temperature_in = record.real(asset, SetpointKey::TemperatureIn)?;
        self.temperature_out = record.real(asset, SetpointKey::TemperatureOut)?;
        Ok(())
    }

    /// Rows: press-to-node ×2, thermal ×2, continuity, hot-side flow.
    ///
    /// Continuity is written on a volume basis, `ṅ0/ρ0 + ṅ1/ρ1 = 0`, with
    /// previous-iterate densities: the tank volume is fixed, so the port mass
    /// flows differ by the density ratio of the two layers.
    pub fn equations(
        &self,
        ports: &Ports<'_>,
        fluid: &dyn FluidProperties,
    ) -> ComponentResult<Vec<Equation>> {
        let u_cold = fluid.internal_energy(self.temperature_in)?;
        let u_hot = fluid.internal_energy(self.temperature_out)?;

        let t_cold_prev = fluid.temperature(ports.previous(Self::COLD, Property::InternalEnergy)?)?;
        let t_hot_prev = fluid.temperature(ports.previous(Self::HOT, Property::InternalEnergy)?)?;
        let rho_cold = fluid.density(t_cold_prev)?;
        let rho_hot = fluid.density(t_hot_prev)?;

        let hot_flow = if self.heat_demand == 0.0 {
            0.0
        } else {
            mass_flow_for_power(self.heat_demand, u_hot, u_cold)?
        };

        Ok(vec![
            ports.press_to_node(Self::COLD)?,
            ports.press_to_node(Self::HOT)?,
            ports.thermal(Self::COLD, u_cold, BUFFER_ZERO_FLOW)?,
            ports.thermal(Self::HOT, u_hot, BUFFER_ZERO_FLOW)?,
            // equal volume in and out
            Equation::new(
                vec![
                    ports.own(Self::COLD, Property::MassFlowRate)?,
                    ports.own(Self::HOT, Property::MassFlowRate)?,
                ],
                vec![1.0 / rho_cold, 1.0 / rho_hot],
                0.0,
            ),
            ports.prescribe(Self::HOT, Property::MassFlowRate, hot_flow)?,
        ])
    }
}

fn positive_dt(dt: Real) -> ComponentResult<Real> {
    if dt > 0.0 && dt.is_finite() {
        Ok(dt)
    } else {
        Err(ComponentError::InvalidArg {
            what: "timestep must be positive",
        })
    }
}
