//! Index lookup and equation helpers shared by every asset kind.

use crate::asset::NodeLink;
use crate::common::FlowRegime;
use crate::error::{ComponentError, ComponentResult};
use hn_core::{Equation, Property, Real, UnknownBlock};

/// Read-only view of an asset's unknowns, its node links and the previous
/// iterate, valid for one assembly pass.
#[derive(Debug, Clone, Copy)]
pub struct Ports<'a> {
    asset: &'a str,
    block: UnknownBlock,
    links: &'a [Option<NodeLink>],
    previous: &'a [Real],
}

impl<'a> Ports<'a> {
    pub fn new(
        asset: &'a str,
        block: UnknownBlock,
        links: &'a [Option<NodeLink>],
        previous: &'a [Real],
    ) -> Self {
        Self {
            asset,
            block,
            links,
            previous,
        }
    }

    pub fn asset(&self) -> &str {
        self.asset
    }

    /// Global index of the asset's own unknown.
    pub fn own(&self, cp: usize, property: Property) -> ComponentResult<usize> {
        Ok(self.block.index(cp, property)?)
    }

    /// Global index of the unknown of the node attached at `cp`.
    pub fn node(&self, cp: usize, property: Property) -> ComponentResult<usize> {
        let link = self
            .links
            .get(cp)
            .copied()
            .flatten()
            .ok_or_else(|| ComponentError::NotConnected {
                asset: self.asset.to_string(),
                cp,
            })?;
        Ok(link.block.index(0, property)?)
    }

    /// Previous-iterate value of the asset's own unknown.
    pub fn previous(&self, cp: usize, property: Property) -> ComponentResult<Real> {
        let i = self.block.local_index(cp, property)?;
        Ok(self.previous.get(i).copied().unwrap_or(0.0))
    }

    pub fn regime(&self, cp: usize, zero_limit: Real) -> ComponentResult<FlowRegime> {
        Ok(FlowRegime::classify(
            self.previous(cp, Property::MassFlowRate)?,
            zero_limit,
        ))
    }

    /// `P_asset(cp) - P_node = 0`.
    pub fn press_to_node(&self, cp: usize) -> ComponentResult<Equation> {
        Ok(Equation::difference(
            self.own(cp, Property::Pressure)?,
            self.node(cp, Property::Pressure)?,
        ))
    }

    /// `u_asset(cp) - u_node = 0`.
    pub fn internal_energy_to_node(&self, cp: usize) -> ComponentResult<Equation> {
        Ok(Equation::difference(
            self.own(cp, Property::InternalEnergy)?,
            self.node(cp, Property::InternalEnergy)?,
        ))
    }

    pub fn prescribe(&self, cp: usize, property: Property, value: Real) -> ComponentResult<Equation> {
        Ok(Equation::prescribe(self.own(cp, property)?, value))
    }

    /// Outflow carries `outflow_u`; inflow or standstill imports from the node.
    pub fn thermal(&self, cp: usize, outflow_u: Real, zero_limit: Real) -> ComponentResult<Equation> {
        match self.regime(cp, zero_limit)? {
            FlowRegime::Positive => self.prescribe(cp, Property::InternalEnergy, outflow_u),
            FlowRegime::Negative | FlowRegime::Zero => self.internal_energy_to_node(cp),
        }
    }

    /// `Σ ṅ(cp) = 0` over the given connection points.
    pub fn continuity(&self, cps: &[usize]) -> ComponentResult<Equation> {
        let mut eq = Equation::default();
        for &cp in cps {
            eq.push_term(self.own(cp, Property::MassFlowRate)?, 1.0);
        }
        Ok(eq)
    }
}
