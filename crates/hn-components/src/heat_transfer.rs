//! Heat exchanger or heat pump between a primary (cp0, cp1) and a
//! secondary (cp2, cp3) network.

use crate::common::MIN_ENERGY_DIFFERENCE;
use crate::common::{finite_term, mass_flow_for_power};
use crate::error::{ComponentError, ComponentResult};
use crate::ports::Ports;
use crate::setpoint::{SetpointKey, SetpointRecord};
use hn_core::units::{MassRate, Pressure, Temperature};
use hn_core::{Equation, Property, Real};
use hn_fluids::FluidProperties;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatTransferKind {
    Exchanger { efficiency: Real },
    HeatPump { cop: Real },
}

/// Which connection point plays which role this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortOrder {
    pub prim_in: usize,
    pub prim_out: usize,
    pub sec_in: usize,
    pub sec_out: usize,
}

impl PortOrder {
    pub const DEFAULT: PortOrder = PortOrder {
        prim_in: 0,
        prim_out: 1,
        sec_in: 2,
        sec_out: 3,
    };

    /// Derive the ordering from the previous flows at cp0 and cp3.
    pub fn from_flows(primary: Real, secondary: Real) -> Self {
        if primary == 0.0 || secondary == 0.0 {
            return Self::DEFAULT;
        }
        let (prim_in, prim_out) = if primary < 0.0 { (0, 1) } else { (1, 0) };
        let (sec_in, sec_out) = if secondary > 0.0 { (2, 3) } else { (3, 2) };
        Self {
            prim_in,
            prim_out,
            sec_in,
            sec_out,
        }
    }
}

/// Heat exchanger or heat pump.
///
/// `heat_demand` is the secondary duty [W]; the primary side draws
/// `htc · heat_demand`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatTransfer {
    pub kind: HeatTransferKind,
    pub temperature_in_primary: Real,
    pub temperature_out_primary: Real,
    pub temperature_in_secondary: Real,
    pub temperature_out_secondary: Real,
    /// Secondary duty [W]
    pub heat_demand: Real,
    /// Hold the secondary pressure instead of the secondary flow.
    pub set_pressure: bool,
    /// Secondary outflow pressure in pressure mode [Pa]
    pub pressure_setpoint: Real,
    /// Primary draw when neither side has flowed yet [kg/s]
    pub default_primary_mass_flow: Real,
}

impl HeatTransfer {
    pub const CONNECTION_POINTS: usize = 4;

    pub fn new(
        kind: HeatTransferKind,
        primary: (Temperature, Temperature),
        secondary: (Temperature, Temperature),
    ) -> Self {
        Self {
            kind,
            temperature_in_primary: primary.0.value,
            temperature_out_primary: primary.1.value,
            temperature_in_secondary: secondary.0.value,
            temperature_out_secondary: secondary.1.value,
            heat_demand: 0.0,
            set_pressure: false,
            pressure_setpoint: 2.0e5,
            default_primary_mass_flow: 1.0,
        }
    }

    pub fn with_pressure_setpoint(mut self, pressure: Pressure) -> Self {
        self.pressure_setpoint = pressure.value;
        self
    }

    pub fn with_default_primary_mass_flow(mut self, mass_flow: MassRate) -> Self {
        self.default_primary_mass_flow = mass_flow.value;
        self
    }

    /// Primary heat per unit of secondary heat.
    pub fn htc(&self) -> Real {
        match self.kind {
            HeatTransferKind::Exchanger { efficiency } => 1.0 / efficiency,
            HeatTransferKind::HeatPump { cop } => 1.0 - 1.0 / cop,
        }
    }

    pub fn apply_setpoints(&mut self, asset: &str, record: &SetpointRecord) -> ComponentResult<()> {
        let set_pressure = record.require_with_mode(
            asset,
            &[
                SetpointKey::TemperatureInPrimary,
                SetpointKey::TemperatureOutPrimary,
                SetpointKey::TemperatureInSecondary,
                SetpointKey::TemperatureOutSecondary,
            ],
        )?;
        if !set_pressure {
            self.heat_demand = record.real(asset, SetpointKey::HeatDemand)?;
        }
        self.set_pressure = set_pressure;
        self.temperature_in_primary = record.real(asset, SetpointKey::TemperatureInPrimary)?;
        self.temperature_out_primary = record.real(asset, SetpointKey::TemperatureOutPrimary)?;
        self.temperature_in_secondary = record.real(asset, SetpointKey::TemperatureInSecondary)?;
        self.temperature_out_secondary = record.real(asset, SetpointKey::TemperatureOutSecondary)?;
        Ok(())
    }

    pub fn equations(
        &self,
        ports: &Ports<'_>,
        fluid: &dyn FluidProperties,
    ) -> ComponentResult<Vec<Equation>> {
        let htc = finite_term(self.htc(), "heat transfer coefficient")?;
        let prim_flow = ports.previous(0, Property::MassFlowRate)?;
        let sec_flow = ports.previous(3, Property::MassFlowRate)?;
        let order = PortOrder::from_flows(prim_flow, sec_flow);

        let u_prim_in_cfg = fluid.internal_energy(self.temperature_in_primary)?;
        let u_prim_out_cfg = fluid.internal_energy(self.temperature_out_primary)?;
        let u_sec_in_cfg = fluid.internal_energy(self.temperature_in_secondary)?;
        let u_sec_out_cfg = fluid.internal_energy(self.temperature_out_secondary)?;

        let mut eqs = Vec::with_capacity(12);
        eqs.push(ports.internal_energy_to_node(order.prim_in)?);
        eqs.push(ports.internal_energy_to_node(order.sec_in)?);
        eqs.push(ports.prescribe(order.prim_out, Property::InternalEnergy, u_prim_out_cfg)?);
        eqs.push(ports.prescribe(order.sec_out, Property::InternalEnergy, u_sec_out_cfg)?);

        if self.set_pressure {
            eqs.push(ports.prescribe(order.sec_in, Property::Pressure, 0.5 * self.pressure_setpoint)?);
            eqs.push(ports.prescribe(order.sec_out, Property::Pressure, self.pressure_setpoint)?);
        } else {
            let m = if self.heat_demand == 0.0 {
                0.0
            } else {
                mass_flow_for_power(self.heat_demand, u_sec_out_cfg, u_sec_in_cfg)?
            };
            eqs.push(ports.prescribe(order.sec_out, Property::MassFlowRate, m)?);
            eqs.push(ports.prescribe(order.sec_in, Property::MassFlowRate, -m)?);
        }

        for cp in 0..Self::CONNECTION_POINTS {
            eqs.push(ports.press_to_node(cp)?);
        }
        eqs.push(ports.continuity(&[0, 1])?);

        let prim_in_index = ports.own(order.prim_in, Property::MassFlowRate)?;
        let primary_draw = if prim_flow == 0.0 && sec_flow == 0.0 {
            self.default_primary_mass_flow
        } else {
            let mut secondary_heat = 0.0;
            for cp in [2, 3] {
                secondary_heat += ports.previous(cp, Property::MassFlowRate)?
                    * ports.previous(cp, Property::InternalEnergy)?;
            }
            let mut du = ports.previous(order.prim_in, Property::InternalEnergy)?
                - ports.previous(order.prim_out, Property::InternalEnergy)?;
            if du.abs() < MIN_ENERGY_DIFFERENCE {
                du = u_prim_in_cfg - u_prim_out_cfg;
            }
            if du.abs() < MIN_ENERGY_DIFFERENCE {
                return Err(ComponentError::NonPhysical {
                    what: "primary inflow and outflow temperatures coincide",
                });
            }
            finite_term((htc * secondary_heat / du).abs(), "primary mass flow")?
        };
        eqs.push(Equation::prescribe(prim_in_index, -primary_draw));
        Ok(eqs)
    }
}
