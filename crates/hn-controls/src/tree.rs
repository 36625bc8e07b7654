//! The zone tree: zones as vertices, heat-transfer assets as edges.

use std::collections::VecDeque;

use hn_core::Real;
use petgraph::algo::is_cyclic_undirected;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::entities::ControllerHeatTransferAsset;
use crate::error::{ControlError, ControlResult};

/// Deepest supported zone, counted in heat-transfer hops from the root.
pub const MAX_STAGES: usize = 2;

/// Rooted tree over zones. Zone 0 is the root.
#[derive(Debug, Clone)]
pub struct ZoneTree {
    graph: UnGraph<usize, usize>,
    /// `(parent zone, heat-transfer index)` per zone; `None` at the root.
    parents: Vec<Option<(usize, usize)>>,
}

impl ZoneTree {
    /// Build and validate the tree for `zone_count` zones.
    pub fn build(zone_count: usize, heat_transfers: &[ControllerHeatTransferAsset]) -> ControlResult<Self> {
        let mut graph = UnGraph::<usize, usize>::with_capacity(zone_count, heat_transfers.len());
        let vertices: Vec<NodeIndex> = (0..zone_count).map(|z| graph.add_node(z)).collect();

        for (h, ht) in heat_transfers.iter().enumerate() {
            if ht.primary_zone == ht.secondary_zone {
                return Err(ControlError::Looped {
                    what: format!("both sides of '{}' share zone {}", ht.name, ht.primary_zone),
                });
            }
            let (Some(&a), Some(&b)) = (vertices.get(ht.primary_zone), vertices.get(ht.secondary_zone))
            else {
                return Err(ControlError::InvalidArg {
                    what: "heat-transfer zone out of range",
                });
            };
            graph.add_edge(a, b, h);
        }

        if is_cyclic_undirected(&graph) {
            return Err(ControlError::Looped {
                what: "zone graph contains a cycle".to_string(),
            });
        }

        let mut parents = vec![None; zone_count];
        let mut depths = vec![usize::MAX; zone_count];
        if let Some(&root) = vertices.first() {
            depths[0] = 0;
            let mut queue = VecDeque::from([root]);
            while let Some(v) = queue.pop_front() {
                let zone = graph[v];
                for edge in graph.edges(v) {
                    let w = if edge.source() == v { edge.target() } else { edge.source() };
                    let next = graph[w];
                    if depths[next] != usize::MAX {
                        continue;
                    }
                    depths[next] = depths[zone] + 1;
                    parents[next] = Some((zone, *edge.weight()));
                    queue.push_back(w);
                }
            }
        }

        for (zone, &depth) in depths.iter().enumerate() {
            if depth == usize::MAX {
                return Err(ControlError::Unreachable { zone });
            }
        }
        for (zone, &depth) in depths.iter().enumerate() {
            if depth > MAX_STAGES {
                return Err(ControlError::TooManyStages { zone, depth });
            }
        }

        Ok(Self {
            graph,
            parents,
        })
    }

    pub fn zone_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn parent(&self, zone: usize) -> Option<(usize, usize)> {
        self.parents.get(zone).copied().flatten()
    }

    /// Zones from `zone` up to the root, both ends included.
    pub fn path(&self, zone: usize) -> Vec<usize> {
        let mut path = vec![zone];
        let mut current = zone;
        while let Some((parent, _)) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Scale from `zone`'s powers to root units.
    ///
    /// A step landing on an asset's primary side multiplies by its `htc`,
    /// a step landing on its secondary side divides.
    pub fn factor(&self, zone: usize, heat_transfers: &[ControllerHeatTransferAsset]) -> Real {
        let mut factor = 1.0;
        let mut current = zone;
        while let Some((parent, h)) = self.parent(current) {
            if let Some(ht) = heat_transfers.get(h) {
                if ht.primary_zone == parent {
                    factor *= ht.htc;
                } else {
                    factor /= ht.htc;
                }
            }
            current = parent;
        }
        factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hn_core::AssetId;

    fn edge(i: u32, primary: usize, secondary: usize, htc: Real) -> ControllerHeatTransferAsset {
        ControllerHeatTransferAsset {
            asset: AssetId::from_index(i),
            name: format!("ht{i}"),
            primary_zone: primary,
            secondary_zone: secondary,
            htc,
            temperature_in_primary: 340.0,
            temperature_out_primary: 320.0,
            temperature_in_secondary: 310.0,
            temperature_out_secondary: 335.0,
        }
    }

    #[test]
    fn two_stage_chain_factors() {
        let hts = [edge(0, 0, 1, 0.8), edge(1, 1, 2, 0.5)];
        let tree = ZoneTree::build(3, &hts).unwrap();
        assert_eq!(tree.path(2), vec![2, 1, 0]);
        assert_relative_eq!(tree.factor(0, &hts), 1.0);
        assert_relative_eq!(tree.factor(1, &hts), 0.8);
        assert_relative_eq!(tree.factor(2, &hts), 0.4);
    }

    #[test]
    fn stepping_onto_secondary_side_divides() {
        // Root is the secondary side of ht0.
        let hts = [edge(0, 1, 0, 0.5)];
        let tree = ZoneTree::build(2, &hts).unwrap();
        assert_relative_eq!(tree.factor(1, &hts), 2.0);
    }

    #[test]
    fn parallel_exchangers_are_a_loop() {
        let hts = [edge(0, 0, 1, 1.0), edge(1, 0, 1, 1.0)];
        let err = ZoneTree::build(2, &hts).unwrap_err();
        assert!(err.to_string().contains("looped via heat pumps/exchangers"));
    }

    #[test]
    fn same_zone_on_both_sides_is_a_loop() {
        let hts = [edge(0, 0, 0, 1.0)];
        assert!(matches!(ZoneTree::build(1, &hts), Err(ControlError::Looped { .. })));
    }

    #[test]
    fn three_stages_rejected() {
        let hts = [edge(0, 0, 1, 1.0), edge(1, 1, 2, 1.0), edge(2, 2, 3, 1.0)];
        let err = ZoneTree::build(4, &hts).unwrap_err();
        assert_eq!(err, ControlError::TooManyStages { zone: 3, depth: 3 });
        assert!(err.to_string().contains("more than two stages"));
    }

    #[test]
    fn island_zone_unreachable() {
        let hts = [edge(0, 0, 1, 1.0)];
        assert_eq!(
            ZoneTree::build(3, &hts).unwrap_err(),
            ControlError::Unreachable { zone: 2 }
        );
    }
}
