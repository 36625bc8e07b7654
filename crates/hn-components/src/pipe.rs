//! Buried pipe with Darcy-Weisbach friction and exponential heat loss.

use std::f64::consts::PI;

use crate::common::{FlowRegime, MIN_FRICTION_FLOW, finite_term};
use crate::error::{ComponentError, ComponentResult};
use crate::ports::Ports;
use hn_core::units::{Length, Temperature, constants::ZERO_CELSIUS_K};
use hn_core::{Equation, Property, Real};
use hn_fluids::{FluidProperties, PropertyPack};

/// Pipe between cp0 and cp1; positive `ṅ1` means flow from cp0 to cp1.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Length [m]
    pub length: Real,
    /// Inner diameter [m]
    pub diameter: Real,
    /// Absolute wall roughness [m]
    pub roughness: Real,
    /// Sum of minor loss coefficients (bends, fittings)
    pub zeta: Real,
    /// Ground temperature [K]
    pub ambient_temperature: Real,
    /// Wall heat transfer coefficient [W/(m²·K)], 0 disables heat loss
    pub wall_htc: Real,
    /// Put the fluid-side film coefficient in series with the wall.
    pub fluid_side_resistance: bool,
}

impl Pipe {
    pub const CONNECTION_POINTS: usize = 2;

    pub fn new(length: Length, diameter: Length) -> Self {
        Self {
            length: length.value,
            diameter: diameter.value,
            roughness: 1e-5,
            zeta: 0.0,
            ambient_temperature: ZERO_CELSIUS_K + 10.0,
            wall_htc: 0.0,
            fluid_side_resistance: false,
        }
    }

    pub fn with_roughness(mut self, roughness: Length) -> Self {
        self.roughness = roughness.value;
        self
    }

    pub fn with_zeta(mut self, zeta: Real) -> Self {
        self.zeta = zeta;
        self
    }

    pub fn with_heat_loss(mut self, ambient: Temperature, wall_htc: Real) -> Self {
        self.ambient_temperature = ambient.value;
        self.wall_htc = wall_htc;
        self
    }

    pub fn with_fluid_side_resistance(mut self, enabled: bool) -> Self {
        self.fluid_side_resistance = enabled;
        self
    }

    pub fn area(&self) -> Real {
        PI * self.diameter * self.diameter / 4.0
    }

    pub fn reynolds(&self, mass_flow: Real, viscosity: Real) -> Real {
        4.0 * mass_flow.abs() / (PI * self.diameter * viscosity)
    }

    /// Darcy friction factor.
    pub fn friction_factor(&self, reynolds: Real) -> Real {
        if reynolds < 100.0 {
            0.64
        } else if reynolds < 2000.0 {
            64.0 / reynolds
        } else if reynolds < 4000.0 {
            let laminar = 64.0 / 2000.0;
            let turbulent = self.turbulent_friction(4000.0);
            laminar + (turbulent - laminar) * (reynolds - 2000.0) / 2000.0
        } else {
            self.turbulent_friction(reynolds)
        }
    }

    // Tkachenko & Mileikovsky explicit approximation of Colebrook-White
    fn turbulent_friction(&self, reynolds: Real) -> Real {
        let rel = self.roughness / self.diameter;
        let arg = 0.234 * rel.powf(1.1007) - 60.525 / reynolds.powf(1.1105)
            + 56.291 / reynolds.powf(1.0712);
        1.613 * arg.ln().powi(-2)
    }

    /// `k` in `ΔP = k·ṅ·|ṅ|`.
    pub fn resistance(&self, mass_flow: Real, props: &PropertyPack) -> ComponentResult<Real> {
        let re = self.reynolds(mass_flow, props.viscosity);
        let lambda = self.friction_factor(re);
        let area = self.area();
        let k = (lambda * self.length / self.diameter + self.zeta)
            / (2.0 * props.density * area * area);
        finite_term(k, "pipe resistance")
    }

    /// Effective heat transfer coefficient between fluid and ground.
    pub fn heat_transfer_coefficient(&self, mass_flow: Real, props: &PropertyPack) -> Real {
        if !self.fluid_side_resistance || self.wall_htc <= 0.0 {
            return self.wall_htc;
        }
        let re = self.reynolds(mass_flow, props.viscosity);
        let pr = props.prandtl();
        let nu = if re < 2300.0 {
            let gz = re * pr * self.diameter / self.length;
            3.66 + 0.0668 * gz / (1.0 + 0.04 * gz.powf(2.0 / 3.0))
        } else {
            0.023 * re.powf(0.8) * pr.powf(0.33)
        };
        let h = nu * props.thermal_conductivity / self.diameter;
        1.0 / (1.0 / self.wall_htc + 1.0 / h)
    }

    /// Heat lost to the ground per kg of water [J/kg], positive when the
    /// water is warmer than the ground.
    pub fn specific_heat_loss(
        &self,
        mass_flow: Real,
        temperature_in: Real,
        props: &PropertyPack,
    ) -> ComponentResult<Real> {
        let alpha = self.heat_transfer_coefficient(mass_flow, props);
        if alpha <= 0.0 || mass_flow == 0.0 {
            return Ok(0.0);
        }
        let ntu = alpha * PI * self.diameter * self.length / (mass_flow.abs() * props.heat_capacity);
        let q = props.heat_capacity * (temperature_in - self.ambient_temperature) * (1.0 - (-ntu).exp());
        finite_term(q, "pipe heat loss")
    }

    pub fn equations(
        &self,
        ports: &Ports<'_>,
        fluid: &dyn FluidProperties,
    ) -> ComponentResult<Vec<Equation>> {
        if self.diameter <= 0.0 || self.length <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "pipe geometry",
            });
        }
        let flow = ports.previous(1, Property::MassFlowRate)?;
        let regime = FlowRegime::classify(flow, 0.0);
        let (cp_in, cp_out) = match regime {
            FlowRegime::Negative => (1, 0),
            FlowRegime::Positive | FlowRegime::Zero => (0, 1),
        };

        let t_in = fluid.temperature(ports.previous(cp_in, Property::InternalEnergy)?)?;
        let props = fluid.pack(t_in)?;

        let mut eqs = Vec::with_capacity(6);
        eqs.push(ports.press_to_node(0)?);
        eqs.push(ports.press_to_node(1)?);

        match regime {
            FlowRegime::Zero => {
                eqs.push(ports.internal_energy_to_node(0)?);
                eqs.push(ports.internal_energy_to_node(1)?);
            }
            FlowRegime::Positive | FlowRegime::Negative => {
                let q = self.specific_heat_loss(flow, t_in, &props)?;
                eqs.push(ports.internal_energy_to_node(cp_in)?);
                eqs.push(Equation::new(
                    vec![
                        ports.own(cp_out, Property::InternalEnergy)?,
                        ports.own(cp_in, Property::InternalEnergy)?,
                    ],
                    vec![1.0, -1.0],
                    -q,
                ));
            }
        }

        eqs.push(ports.continuity(&[0, 1])?);

        // P0 - P1 = k·ṅ1·|ṅ1|, linearised around the clamped previous flow
        let frozen = if flow.abs() < MIN_FRICTION_FLOW {
            if flow < 0.0 { -MIN_FRICTION_FLOW } else { MIN_FRICTION_FLOW }
        } else {
            flow
        };
        let k = self.resistance(frozen, &props)?;
        eqs.push(Equation::new(
            vec![
                ports.own(0, Property::Pressure)?,
                ports.own(1, Property::Pressure)?,
                ports.own(1, Property::MassFlowRate)?,
            ],
            vec![1.0, -1.0, -2.0 * k * frozen.abs()],
            -k * frozen * frozen.abs(),
        ));
        Ok(eqs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NodeLink;
    use approx::assert_relative_eq;
    use hn_core::units::{degc, m};
    use hn_core::{NodeId, UnknownBlock};
    use hn_fluids::WaterTable;

    fn links() -> [Option<NodeLink>; 2] {
        [
            Some(NodeLink {
                node: NodeId::from_index(0),
                block: UnknownBlock::new(0, 3),
            }),
            Some(NodeLink {
                node: NodeId::from_index(1),
                block: UnknownBlock::new(3, 3),
            }),
        ]
    }

    fn pipe() -> Pipe {
        Pipe::new(m(100.0), m(0.1)).with_roughness(m(1e-4))
    }

    #[test]
    fn friction_factor_regimes() {
        let p = pipe();
        assert_eq!(p.friction_factor(50.0), 0.64);
        assert_relative_eq!(p.friction_factor(1000.0), 0.064);
        assert_relative_eq!(p.friction_factor(2000.0), 0.032);

        let turb = p.friction_factor(4000.0);
        let mid = p.friction_factor(3000.0);
        assert_relative_eq!(mid, 0.5 * (0.032 + turb), max_relative = 1e-12);

        // fully rough-ish turbulent flow lands in the Moody chart range
        let f = p.friction_factor(1e6);
        assert!(f > 0.015 && f < 0.025, "λ = {f}");
    }

    #[test]
    fn pressure_loss_row_clamps_zero_flow() {
        let water = WaterTable::new();
        let links = links();
        let u20 = water.internal_energy(293.15).unwrap();
        let prev = [0.0, 1e5, u20, 0.0, 1e5, u20];
        let ports = Ports::new("pipe", UnknownBlock::new(6, 6), &links, &prev);
        let p = pipe();
        let eqs = p.equations(&ports, &water).unwrap();
        assert_eq!(eqs.len(), 6);

        let props = water.pack(293.15).unwrap();
        let k = p.resistance(MIN_FRICTION_FLOW, &props).unwrap();
        let row = &eqs[5];
        assert_eq!(row.indices, vec![7, 10, 9]);
        assert_relative_eq!(
            row.coefficients[2],
            -2.0 * k * MIN_FRICTION_FLOW,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            row.rhs,
            -k * MIN_FRICTION_FLOW * MIN_FRICTION_FLOW,
            max_relative = 1e-9
        );
        assert!(row.coefficients[2] < 0.0);

        // zero regime: both ends import
        assert_eq!(eqs[2], Equation::difference(8, 2));
        assert_eq!(eqs[3], Equation::difference(11, 5));
    }

    #[test]
    fn reverse_flow_swaps_inlet() {
        let water = WaterTable::new();
        let links = links();
        let u = water.internal_energy(353.15).unwrap();
        let prev = [3.0, 1e5, u, -3.0, 1.1e5, u];
        let ports = Ports::new("pipe", UnknownBlock::new(6, 6), &links, &prev);
        let eqs = pipe().equations(&ports, &water).unwrap();
        // cp1 imports, cp0 is the outflow side
        assert_eq!(eqs[2], Equation::difference(11, 5));
        assert_eq!(eqs[3].indices, vec![8, 11]);
    }

    #[test]
    fn heat_loss_approaches_full_cooling_for_slow_flow() {
        let water = WaterTable::new();
        let props = water.pack(353.15).unwrap();
        let p = pipe().with_heat_loss(degc(10.0), 5.0);
        let q_slow = p.specific_heat_loss(1e-6, 353.15, &props).unwrap();
        assert_relative_eq!(q_slow, props.heat_capacity * 70.0, max_relative = 1e-9);

        let q = 5.0 * p.specific_heat_loss(5.0, 353.15, &props).unwrap();
        let ntu = 5.0 * PI * 0.1 * 100.0 / (5.0 * props.heat_capacity);
        let expected = 5.0 * props.heat_capacity * 70.0 * (1.0 - (-ntu).exp());
        assert_relative_eq!(q, expected, max_relative = 1e-12);
    }

    #[test]
    fn film_resistance_lowers_effective_coefficient() {
        let water = WaterTable::new();
        let props = water.pack(353.15).unwrap();
        let p = pipe().with_heat_loss(degc(10.0), 5.0);
        let wall_only = p.heat_transfer_coefficient(2.0, &props);
        let series = p
            .clone()
            .with_fluid_side_resistance(true)
            .heat_transfer_coefficient(2.0, &props);
        assert_eq!(wall_only, 5.0);
        assert!(series < 5.0 && series > 4.9);
    }

    #[test]
    fn adiabatic_pipe_has_no_loss() {
        let water = WaterTable::new();
        let props = water.pack(353.15).unwrap();
        assert_eq!(pipe().specific_heat_loss(2.0, 353.15, &props).unwrap(), 0.0);
    }
}
