//! The network: owner of assets, nodes, the fluid table and the unknowns.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use hn_components::{Asset, AssetKind, NodeLink, SetpointRecord};
use hn_core::units::constants::ZERO_CELSIUS_K;
use hn_core::{
    AssetId, Equation, HnError, NodeId, Property, Real, UNKNOWNS_PER_POINT, UnknownBlock,
};
use hn_fluids::FluidProperties;
use hn_solver::{EquationSystem, Matrix, SolveReport, SolverConfig, solve_system};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{NetworkError, NetworkResult};
use crate::node::{AttachedFlow, Node};
use crate::results::ResultProperty;

/// Topology plus the global unknown vector.
///
/// Assets are addressed by [`AssetId`] in registration order; nodes by
/// [`NodeId`] in creation order. A node removed by a merge gives its unknown
/// block back to a free list that later nodes reuse.
pub struct Network {
    fluid: Arc<dyn FluidProperties>,
    matrix: Matrix,
    assets: Vec<Asset>,
    asset_names: HashMap<String, AssetId>,
    nodes: BTreeMap<NodeId, Node>,
    next_node: u32,
    free_blocks: Vec<UnknownBlock>,
    default_temperature: Real,
}

impl Network {
    pub fn new(fluid: Arc<dyn FluidProperties>) -> Self {
        Self {
            fluid,
            matrix: Matrix::new(),
            assets: Vec::new(),
            asset_names: HashMap::new(),
            nodes: BTreeMap::new(),
            next_node: 0,
            free_blocks: Vec::new(),
            default_temperature: ZERO_CELSIUS_K + 20.0,
        }
    }

    /// Temperature given to nodes created by [`Network::connect_assets`].
    pub fn with_default_temperature(mut self, temperature: Real) -> Self {
        self.default_temperature = temperature;
        self
    }

    pub fn fluid(&self) -> &dyn FluidProperties {
        self.fluid.as_ref()
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn num_unknowns(&self) -> usize {
        self.matrix.num_unknowns()
    }

    // ---- assets -------------------------------------------------------

    /// Register a pre-built asset and give it its unknowns.
    pub fn add_existing_asset(&mut self, mut asset: Asset) -> NetworkResult<AssetId> {
        if self.asset_names.contains_key(asset.name()) {
            return Err(NetworkError::DuplicateAsset {
                name: asset.name().to_string(),
            });
        }
        let count = asset.unknown_count();
        let start = self.matrix.add_unknowns(count)?;
        asset.assign_block(UnknownBlock::new(start, count))?;

        let id = AssetId::from_index(self.assets.len() as u32);
        trace!(asset = asset.name(), kind = asset.kind().label(), offset = start, "asset registered");
        self.asset_names.insert(asset.name().to_string(), id);
        self.assets.push(asset);
        Ok(id)
    }

    pub fn add_asset(&mut self, name: impl Into<String>, kind: AssetKind) -> NetworkResult<AssetId> {
        self.add_existing_asset(Asset::new(name, kind))
    }

    pub fn asset_id(&self, name: &str) -> NetworkResult<AssetId> {
        self.asset_names
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownAsset {
                name: name.to_string(),
            })
    }

    pub fn asset(&self, id: AssetId) -> NetworkResult<&Asset> {
        self.assets.get(id.slot()).ok_or_else(|| NetworkError::UnknownAsset {
            name: format!("#{id}"),
        })
    }

    fn asset_mut(&mut self, id: AssetId) -> NetworkResult<&mut Asset> {
        self.assets
            .get_mut(id.slot())
            .ok_or_else(|| NetworkError::UnknownAsset {
                name: format!("#{id}"),
            })
    }

    /// Assets with their ids, in registration order.
    pub fn assets(&self) -> impl Iterator<Item = (AssetId, &Asset)> + '_ {
        self.assets
            .iter()
            .enumerate()
            .map(|(i, a)| (AssetId::from_index(i as u32), a))
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    // ---- nodes --------------------------------------------------------

    /// Create an unconnected node, reusing a released block if there is one.
    pub fn add_node(&mut self, name: impl Into<String>, temperature: Real) -> NetworkResult<NodeId> {
        let block = match self.free_blocks.pop() {
            Some(block) => block,
            None => UnknownBlock::new(
                self.matrix.add_unknowns(UNKNOWNS_PER_POINT)?,
                UNKNOWNS_PER_POINT,
            ),
        };
        let id = NodeId::from_index(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new(id, name, block, temperature));
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> NetworkResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| NetworkError::UnknownNode { id: id.to_string() })
    }

    pub fn node_mut(&mut self, id: NodeId) -> NetworkResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| NetworkError::UnknownNode { id: id.to_string() })
    }

    /// Live nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node attached at `(asset, cp)`, if any.
    pub fn node_of(&self, asset: AssetId, cp: usize) -> NetworkResult<Option<NodeId>> {
        Ok(self.asset(asset)?.connection(cp)?.map(|link| link.node))
    }

    // ---- topology -----------------------------------------------------

    fn attach(&mut self, asset: AssetId, cp: usize, node: NodeId) -> NetworkResult<()> {
        let block = self.node(node)?.block();
        self.asset_mut(asset)?.connect(cp, NodeLink { node, block })?;
        self.node_mut(node)?.attach(asset, cp);
        Ok(())
    }

    /// Join two connection points through a common node and return it.
    ///
    /// Two already-connected points on different nodes merge the second
    /// node into the first.
    pub fn connect_assets(
        &mut self,
        a1: AssetId,
        cp1: usize,
        a2: AssetId,
        cp2: usize,
    ) -> NetworkResult<NodeId> {
        if a1 == a2 && cp1 == cp2 {
            return Err(NetworkError::SelfConnection {
                asset: self.asset(a1)?.name().to_string(),
                cp: cp1,
            });
        }
        let n1 = self.node_of(a1, cp1)?;
        let n2 = self.node_of(a2, cp2)?;

        match (n1, n2) {
            (None, None) => {
                let name = format!("node_{}", self.next_node);
                let node = self.add_node(name, self.default_temperature)?;
                self.attach(a1, cp1, node)?;
                self.attach(a2, cp2, node)?;
                Ok(node)
            }
            (Some(node), None) => {
                self.attach(a2, cp2, node)?;
                Ok(node)
            }
            (None, Some(node)) => {
                self.attach(a1, cp1, node)?;
                Ok(node)
            }
            (Some(keep), Some(other)) if keep == other => Ok(keep),
            (Some(keep), Some(other)) => {
                self.merge_nodes(keep, other)?;
                Ok(keep)
            }
        }
    }

    /// Connect by asset names.
    pub fn connect(&mut self, a1: &str, cp1: usize, a2: &str, cp2: usize) -> NetworkResult<NodeId> {
        let (a1, a2) = (self.asset_id(a1)?, self.asset_id(a2)?);
        self.connect_assets(a1, cp1, a2, cp2)
    }

    /// Move every attachment of `other` onto `keep` and delete `other`.
    fn merge_nodes(&mut self, keep: NodeId, other: NodeId) -> NetworkResult<()> {
        self.node(keep)?;
        let worklist = self.node(other)?.attachments().to_vec();
        let moved = worklist.len();
        for (asset, cp) in worklist {
            self.node_mut(other)?.detach(asset, cp);
            self.asset_mut(asset)?.disconnect(cp)?;
            self.attach(asset, cp, keep)?;
        }
        let removed = self
            .nodes
            .remove(&other)
            .ok_or_else(|| NetworkError::UnknownNode { id: other.to_string() })?;
        self.free_blocks.push(removed.block());
        debug!(%keep, removed = %other, moved, "merged nodes");
        Ok(())
    }

    /// Every asset connection point and every node is connected.
    pub fn check_connectivity(&self) -> bool {
        self.assets.iter().all(Asset::is_all_connected) && self.nodes.values().all(Node::is_connected)
    }

    fn connectivity_problem(&self) -> Option<String> {
        for asset in &self.assets {
            if let Some(cp) = asset.open_port() {
                return Some(format!("asset '{}' connection point {cp} is open", asset.name()));
            }
        }
        self.nodes
            .values()
            .find(|n| !n.is_connected())
            .map(|n| format!("node '{}' has no connections", n.name()))
    }

    // ---- per-timestep state -------------------------------------------

    /// Hand controller setpoints to the named assets.
    pub fn apply_setpoints(&mut self, setpoints: &BTreeMap<String, SetpointRecord>) -> NetworkResult<()> {
        for (name, record) in setpoints {
            let id = self.asset_id(name)?;
            self.asset_mut(id)?.apply_setpoints(record)?;
        }
        Ok(())
    }

    /// Advance storage state by `dt` seconds using the converged flows.
    pub fn advance_storage(&mut self, dt: Real) -> NetworkResult<()> {
        let fluid = Arc::clone(&self.fluid);
        for asset in &mut self.assets {
            asset.advance(dt, fluid.as_ref())?;
        }
        Ok(())
    }

    /// Solve the current timestep.
    pub fn solve(&mut self, config: &SolverConfig) -> NetworkResult<SolveReport> {
        if let Some(what) = self.connectivity_problem() {
            return Err(NetworkError::NotConnected { what });
        }
        solve_system(self, config)
    }

    /// Copy each asset's slice of `solution` into its cache.
    pub fn set_result_asset(&mut self, solution: &[Real]) -> NetworkResult<()> {
        for asset in &mut self.assets {
            let block = asset.block()?;
            let slice = solution.get(block.range()).ok_or(NetworkError::Core(HnError::IndexOob {
                what: "asset solution",
                index: block.end(),
                len: solution.len(),
            }))?;
            asset.set_previous_solution(slice)?;
        }
        Ok(())
    }

    /// Copy each node's slice of `solution` into its cache.
    pub fn set_result_node(&mut self, solution: &[Real]) -> NetworkResult<()> {
        for node in self.nodes.values_mut() {
            let block = node.block();
            let slice = solution.get(block.range()).ok_or(NetworkError::Core(HnError::IndexOob {
                what: "node solution",
                index: block.end(),
                len: solution.len(),
            }))?;
            node.set_previous_solution(slice)?;
        }
        Ok(())
    }

    // ---- readback -----------------------------------------------------

    pub fn asset_result(&self, id: AssetId, property: ResultProperty, cp: usize) -> NetworkResult<Real> {
        let asset = self.asset(id)?;
        property.evaluate(|p| Ok(asset.value(cp, p)?), self.fluid())
    }

    pub fn node_result(&self, id: NodeId, property: ResultProperty) -> NetworkResult<Real> {
        let node = self.node(id)?;
        property.evaluate(|p| Ok(node.value(p)), self.fluid())
    }

    /// Readback by asset name and property name, e.g. `("c1", "temperature", 0)`.
    pub fn result_by_name(&self, asset: &str, property: &str, cp: usize) -> NetworkResult<Real> {
        let property: ResultProperty = property.parse()?;
        self.asset_result(self.asset_id(asset)?, property, cp)
    }

    fn attached_flows(&self, node: &Node) -> NetworkResult<Vec<AttachedFlow>> {
        node.attachments()
            .iter()
            .map(|&(id, cp)| {
                let asset = self.asset(id)?;
                let block = asset.block()?;
                Ok(AttachedFlow {
                    mass_flow_index: block.index(cp, Property::MassFlowRate)?,
                    internal_energy_index: block.index(cp, Property::InternalEnergy)?,
                    previous_mass_flow: asset.value(cp, Property::MassFlowRate)?,
                })
            })
            .collect()
    }
}

impl EquationSystem for Network {
    type Error = NetworkError;

    fn matrix_mut(&mut self) -> &mut Matrix {
        &mut self.matrix
    }

    /// Assets in registration order, then nodes in id order, then pins
    /// holding released blocks at zero.
    fn assemble(&self) -> NetworkResult<Vec<Equation>> {
        let fluid = self.fluid();
        let per_asset = self
            .assets
            .par_iter()
            .map(|asset| asset.equations(fluid))
            .collect::<Result<Vec<_>, _>>()?;

        let mut equations = Vec::with_capacity(self.matrix.num_unknowns());
        equations.extend(per_asset.into_iter().flatten());

        for node in self.nodes.values() {
            let attached = self.attached_flows(node)?;
            equations.extend(node.equations(&attached, fluid)?);
        }

        for block in &self.free_blocks {
            equations.extend(block.range().map(|i| Equation::prescribe(i, 0.0)));
        }
        Ok(equations)
    }

    fn apply_solution(&mut self, solution: &[Real]) -> NetworkResult<()> {
        self.set_result_asset(solution)?;
        self.set_result_node(solution)
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("fluid", &self.fluid.name())
            .field("assets", &self.assets.len())
            .field("nodes", &self.nodes.len())
            .field("unknowns", &self.matrix.num_unknowns())
            .finish()
    }
}
