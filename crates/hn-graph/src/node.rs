//! Hydraulic junction.

use hn_components::common::NODE_ZERO_FLOW;
use hn_core::{AssetId, Equation, NodeId, Property, Real, UNKNOWNS_PER_POINT, UnknownBlock};
use hn_fluids::FluidProperties;

use crate::error::{NetworkError, NetworkResult};

/// An asset connection point as seen from its node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachedFlow {
    pub mass_flow_index: usize,
    pub internal_energy_index: usize,
    /// Previous-iterate mass flow, positive into the node
    pub previous_mass_flow: Real,
}

/// Junction owning one (mass flow, pressure, internal energy) triple.
///
/// The node's own mass flow is bookkeeping only and is held at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    name: String,
    height: Real,
    temperature: Real,
    block: UnknownBlock,
    attachments: Vec<(AssetId, usize)>,
    previous: [Real; UNKNOWNS_PER_POINT],
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, block: UnknownBlock, temperature: Real) -> Self {
        Self {
            id,
            name: name.into(),
            height: 0.0,
            temperature,
            block,
            attachments: Vec::new(),
            previous: [0.0; UNKNOWNS_PER_POINT],
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geodetic height [m].
    pub fn height(&self) -> Real {
        self.height
    }

    /// Temperature used when no flow passes through [K].
    pub fn temperature(&self) -> Real {
        self.temperature
    }

    pub fn set_height(&mut self, height: Real) {
        self.height = height;
    }

    pub fn set_temperature(&mut self, temperature: Real) {
        self.temperature = temperature;
    }

    pub fn block(&self) -> UnknownBlock {
        self.block
    }

    pub fn attachments(&self) -> &[(AssetId, usize)] {
        &self.attachments
    }

    pub fn is_connected(&self) -> bool {
        !self.attachments.is_empty()
    }

    pub(crate) fn attach(&mut self, asset: AssetId, cp: usize) {
        if !self.attachments.contains(&(asset, cp)) {
            self.attachments.push((asset, cp));
        }
    }

    pub(crate) fn detach(&mut self, asset: AssetId, cp: usize) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|&a| a != (asset, cp));
        before != self.attachments.len()
    }

    pub fn previous_solution(&self) -> &[Real] {
        &self.previous
    }

    pub fn set_previous_solution(&mut self, values: &[Real]) -> NetworkResult<()> {
        if values.len() != UNKNOWNS_PER_POINT {
            return Err(NetworkError::Core(hn_core::HnError::IndexOob {
                what: "node solution",
                index: values.len(),
                len: UNKNOWNS_PER_POINT,
            }));
        }
        self.previous.copy_from_slice(values);
        Ok(())
    }

    pub fn value(&self, property: Property) -> Real {
        self.previous[property.offset()]
    }

    /// Continuity, upwind energy balance and zero discharge, in that order.
    pub fn equations(
        &self,
        attached: &[AttachedFlow],
        fluid: &dyn FluidProperties,
    ) -> NetworkResult<Vec<Equation>> {
        let m_node = self.block.index(0, Property::MassFlowRate)?;
        let u_node = self.block.index(0, Property::InternalEnergy)?;

        let mut continuity = Equation::default().with_term(m_node, 1.0);
        for flow in attached {
            continuity.push_term(flow.mass_flow_index, 1.0);
        }

        let has_inflow = attached
            .iter()
            .any(|f| f.previous_mass_flow > NODE_ZERO_FLOW);
        let has_outflow = attached
            .iter()
            .any(|f| f.previous_mass_flow < -NODE_ZERO_FLOW);
        let energy = if has_inflow && has_outflow {
            let mut eq = Equation::default().with_term(u_node, self.value(Property::MassFlowRate));
            for flow in attached {
                eq.push_term(flow.internal_energy_index, flow.previous_mass_flow);
            }
            eq
        } else {
            Equation::prescribe(u_node, fluid.internal_energy(self.temperature)?)
        };

        Ok(vec![continuity, energy, Equation::prescribe(m_node, 0.0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_fluids::WaterTable;

    fn node() -> Node {
        Node::new(NodeId::from_index(0), "n", UnknownBlock::new(0, 3), 293.15)
    }

    fn flow(i: usize, m: Real) -> AttachedFlow {
        AttachedFlow {
            mass_flow_index: 3 * i,
            internal_energy_index: 3 * i + 2,
            previous_mass_flow: m,
        }
    }

    #[test]
    fn mixing_node_writes_upwind_balance() {
        let water = WaterTable::new();
        let eqs = node()
            .equations(&[flow(1, 2.0), flow(2, 1.0), flow(3, -3.0)], &water)
            .unwrap();
        assert_eq!(eqs.len(), 3);
        assert_eq!(eqs[0].indices, vec![0, 3, 6, 9]);
        assert_eq!(eqs[1].indices, vec![2, 5, 8, 11]);
        assert_eq!(eqs[1].coefficients, vec![0.0, 2.0, 1.0, -3.0]);
        assert_eq!(eqs[2], Equation::prescribe(0, 0.0));
    }

    #[test]
    fn one_sided_flow_prescribes_node_temperature() {
        let water = WaterTable::new();
        let u = water.internal_energy(293.15).unwrap();
        let eqs = node()
            .equations(&[flow(1, 2.0), flow(2, 5e-9)], &water)
            .unwrap();
        assert_eq!(eqs[1], Equation::prescribe(2, u));

        let quiet = node().equations(&[flow(1, 0.0), flow(2, 0.0)], &water).unwrap();
        assert_eq!(quiet[1], Equation::prescribe(2, u));
    }

    #[test]
    fn attach_is_idempotent() {
        let mut n = node();
        n.attach(AssetId::from_index(1), 0);
        n.attach(AssetId::from_index(1), 0);
        assert_eq!(n.attachments().len(), 1);
        assert!(n.detach(AssetId::from_index(1), 0));
        assert!(!n.is_connected());
    }
}
