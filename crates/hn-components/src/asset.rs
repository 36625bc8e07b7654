//! The asset container: identity, unknown block, node links and kind.

use crate::buffer::Buffer;
use crate::error::{ComponentError, ComponentResult};
use crate::heat_boundary::{HeatBoundary, HeatRole};
use crate::heat_transfer::HeatTransfer;
use crate::pipe::Pipe;
use crate::ports::Ports;
use crate::pressure_boundary::PressureBoundary;
use crate::setpoint::SetpointRecord;
use hn_core::{Equation, NodeId, Property, Real, UNKNOWNS_PER_POINT, UnknownBlock};
use hn_fluids::FluidProperties;

/// Non-owning reference from a connection point to its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLink {
    pub node: NodeId,
    pub block: UnknownBlock,
}

/// Closed set of asset models.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetKind {
    PressureBoundary(PressureBoundary),
    HeatBoundary(HeatBoundary),
    Pipe(Pipe),
    Buffer(Buffer),
    HeatTransfer(HeatTransfer),
}

impl AssetKind {
    pub fn connection_points(&self) -> usize {
        match self {
            AssetKind::PressureBoundary(_) => PressureBoundary::CONNECTION_POINTS,
            AssetKind::HeatBoundary(_) => HeatBoundary::CONNECTION_POINTS,
            AssetKind::Pipe(_) => Pipe::CONNECTION_POINTS,
            AssetKind::Buffer(_) => Buffer::CONNECTION_POINTS,
            AssetKind::HeatTransfer(_) => HeatTransfer::CONNECTION_POINTS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::PressureBoundary(_) => "pressure_boundary",
            AssetKind::HeatBoundary(hb) => match hb.role {
                HeatRole::Producer => "producer",
                HeatRole::Consumer => "consumer",
            },
            AssetKind::Pipe(_) => "pipe",
            AssetKind::Buffer(_) => "buffer",
            AssetKind::HeatTransfer(_) => "heat_transfer",
        }
    }
}

/// A network element owning three unknowns per connection point.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    name: String,
    kind: AssetKind,
    block: Option<UnknownBlock>,
    links: Vec<Option<NodeLink>>,
    previous: Vec<Real>,
}

impl Asset {
    pub fn new(name: impl Into<String>, kind: AssetKind) -> Self {
        let cps = kind.connection_points();
        Self {
            name: name.into(),
            kind,
            block: None,
            links: vec![None; cps],
            previous: vec![0.0; cps * UNKNOWNS_PER_POINT],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AssetKind {
        &self.kind
    }

    pub fn connection_count(&self) -> usize {
        self.links.len()
    }

    pub fn unknown_count(&self) -> usize {
        self.connection_count() * UNKNOWNS_PER_POINT
    }

    /// Called once by the network at registration.
    pub fn assign_block(&mut self, block: UnknownBlock) -> ComponentResult<()> {
        if self.block.is_some() {
            return Err(ComponentError::InvalidArg {
                what: "asset already has unknowns assigned",
            });
        }
        if block.count() != self.unknown_count() {
            return Err(ComponentError::InvalidArg {
                what: "unknown block size does not match connection points",
            });
        }
        self.block = Some(block);
        Ok(())
    }

    pub fn block(&self) -> ComponentResult<UnknownBlock> {
        self.block.ok_or_else(|| ComponentError::NotRegistered {
            asset: self.name.clone(),
        })
    }

    fn check_cp(&self, cp: usize) -> ComponentResult<()> {
        if cp < self.links.len() {
            Ok(())
        } else {
            Err(ComponentError::ConnectionPoint {
                asset: self.name.clone(),
                cp,
                count: self.links.len(),
            })
        }
    }

    pub fn connection(&self, cp: usize) -> ComponentResult<Option<NodeLink>> {
        self.check_cp(cp)?;
        Ok(self.links[cp])
    }

    pub fn connections(&self) -> &[Option<NodeLink>] {
        &self.links
    }

    pub fn is_connected(&self, cp: usize) -> ComponentResult<bool> {
        Ok(self.connection(cp)?.is_some())
    }

    pub fn is_all_connected(&self) -> bool {
        self.open_port().is_none()
    }

    /// First connection point without a node.
    pub fn open_port(&self) -> Option<usize> {
        self.links.iter().position(Option::is_none)
    }

    pub fn connect(&mut self, cp: usize, link: NodeLink) -> ComponentResult<()> {
        self.check_cp(cp)?;
        if self.links[cp].is_some() {
            return Err(ComponentError::AlreadyConnected {
                asset: self.name.clone(),
                cp,
            });
        }
        self.links[cp] = Some(link);
        Ok(())
    }

    pub fn disconnect(&mut self, cp: usize) -> ComponentResult<Option<NodeLink>> {
        self.check_cp(cp)?;
        Ok(self.links[cp].take())
    }

    /// Cached solution from the last solve.
    pub fn previous_solution(&self) -> &[Real] {
        &self.previous
    }

    pub fn set_previous_solution(&mut self, values: &[Real]) -> ComponentResult<()> {
        if values.len() != self.previous.len() {
            return Err(ComponentError::SolutionLength {
                asset: self.name.clone(),
                expected: self.previous.len(),
                got: values.len(),
            });
        }
        self.previous.copy_from_slice(values);
        Ok(())
    }

    /// Value of `property` at `cp` from the last solve.
    pub fn value(&self, cp: usize, property: Property) -> ComponentResult<Real> {
        self.check_cp(cp)?;
        Ok(self.previous[cp * UNKNOWNS_PER_POINT + property.offset()])
    }

    /// Store controller setpoints; pipes and pressure boundaries take none.
    pub fn apply_setpoints(&mut self, record: &SetpointRecord) -> ComponentResult<()> {
        let name = self.name.as_str();
        match &mut self.kind {
            AssetKind::HeatBoundary(hb) => hb.apply_setpoints(name, record),
            AssetKind::Buffer(b) => b.apply_setpoints(name, record),
            AssetKind::HeatTransfer(ht) => ht.apply_setpoints(name, record),
            AssetKind::PressureBoundary(_) | AssetKind::Pipe(_) => Ok(()),
        }
    }

    /// Linearised equations for the current iterate, one per unknown.
    pub fn equations(&self, fluid: &dyn FluidProperties) -> ComponentResult<Vec<Equation>> {
        let block = self.block()?;
        if let Some(cp) = self.open_port() {
            return Err(ComponentError::NotConnected {
                asset: self.name.clone(),
                cp,
            });
        }
        let ports = Ports::new(&self.name, block, &self.links, &self.previous);
        let eqs = match &self.kind {
            AssetKind::PressureBoundary(pb) => pb.equations(&ports, fluid)?,
            AssetKind::HeatBoundary(hb) => hb.equations(&ports, fluid)?,
            AssetKind::Pipe(p) => p.equations(&ports, fluid)?,
            AssetKind::Buffer(b) => b.equations(&ports, fluid)?,
            AssetKind::HeatTransfer(ht) => ht.equations(&ports, fluid)?,
        };
        debug_assert_eq!(eqs.len(), self.unknown_count());
        Ok(eqs)
    }

    /// Post-step bookkeeping (storage fill level).
    pub fn advance(&mut self, dt: Real, fluid: &dyn FluidProperties) -> ComponentResult<()> {
        if let AssetKind::Buffer(b) = &mut self.kind {
            let hot_flow = self.previous[Buffer::HOT * UNKNOWNS_PER_POINT];
            b.advance(dt, hot_flow, fluid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{degc, k, m, pa};
    use hn_fluids::WaterTable;

    fn link(i: u32) -> NodeLink {
        NodeLink {
            node: NodeId::from_index(i),
            block: UnknownBlock::new(3 * i as usize, 3),
        }
    }

    #[test]
    fn connection_points_per_kind() {
        let vessel = Asset::new(
            "v",
            AssetKind::PressureBoundary(PressureBoundary::with_pressure(pa(1e5), k(293.15))),
        );
        assert_eq!(vessel.connection_count(), 1);
        let pipe = Asset::new("p", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1))));
        assert_eq!(pipe.unknown_count(), 6);
    }

    #[test]
    fn connect_rejects_double_connection_and_bad_cp() {
        let mut pipe = Asset::new("p", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1))));
        pipe.connect(0, link(0)).unwrap();
        assert!(matches!(
            pipe.connect(0, link(1)),
            Err(ComponentError::AlreadyConnected { cp: 0, .. })
        ));
        assert!(matches!(
            pipe.connect(2, link(1)),
            Err(ComponentError::ConnectionPoint { cp: 2, count: 2, .. })
        ));
        assert!(!pipe.is_all_connected());
        assert_eq!(pipe.disconnect(0).unwrap(), Some(link(0)));
        assert!(!pipe.is_connected(0).unwrap());
    }

    #[test]
    fn equations_require_registration_and_connections() {
        let water = WaterTable::new();
        let mut pipe = Asset::new("p", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1))));
        assert!(matches!(
            pipe.equations(&water),
            Err(ComponentError::NotRegistered { .. })
        ));
        pipe.assign_block(UnknownBlock::new(6, 6)).unwrap();
        pipe.connect(0, link(0)).unwrap();
        assert!(matches!(
            pipe.equations(&water),
            Err(ComponentError::NotConnected { cp: 1, .. })
        ));
        pipe.connect(1, link(1)).unwrap();
        assert_eq!(pipe.equations(&water).unwrap().len(), 6);
    }

    #[test]
    fn setpoints_route_to_kind() {
        let mut c = Asset::new(
            "c",
            AssetKind::HeatBoundary(HeatBoundary::consumer(degc(40.0), degc(80.0))),
        );
        let rec = SetpointRecord::new()
            .with_flag(crate::SetpointKey::SetPressure, false)
            .with_real(crate::SetpointKey::HeatDemand, -2.0e5)
            .with_real(crate::SetpointKey::TemperatureIn, 318.15)
            .with_real(crate::SetpointKey::TemperatureOut, 358.15);
        c.apply_setpoints(&rec).unwrap();
        match c.kind() {
            AssetKind::HeatBoundary(hb) => {
                assert_eq!(hb.heat_demand, -2.0e5);
                assert_eq!(hb.temperature_out, 358.15);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn previous_solution_length_is_checked() {
        let mut pipe = Asset::new("p", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1))));
        assert!(pipe.set_previous_solution(&[0.0; 5]).is_err());
        pipe.set_previous_solution(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(pipe.value(1, Property::Pressure).unwrap(), 5.0);
    }
}
