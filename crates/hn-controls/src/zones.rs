//! Splitting a network into hydraulically separated zones.
//!
//! A zone is everything reachable from a seed through nodes and ordinary
//! assets. Heat exchangers and heat pumps are never crossed: they are
//! recorded on the zone through the side (primary or secondary) that was
//! met.

use std::collections::{HashSet, VecDeque};

use hn_components::{Asset, AssetKind, HeatTransfer};
use hn_core::{NodeId, Real};
use hn_graph::Network;
use tracing::debug;

use crate::error::ControlResult;

/// The two sides of a heat-transfer asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Primary,
    Secondary,
}

impl Side {
    pub fn of_cp(cp: usize) -> Self {
        if cp < 2 { Side::Primary } else { Side::Secondary }
    }

    pub fn cps(self) -> [usize; 2] {
        match self {
            Side::Primary => [0, 1],
            Side::Secondary => [2, 3],
        }
    }

    fn slot(self) -> usize {
        match self {
            Side::Primary => 0,
            Side::Secondary => 1,
        }
    }
}

/// A hydraulically separated sub-network.
///
/// Member lists hold indices into the controller's entity vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerNetwork {
    pub id: usize,
    pub consumers: Vec<usize>,
    pub producers: Vec<usize>,
    pub storages: Vec<usize>,
    /// Heat-transfer assets whose primary side lies in this zone.
    pub primary_side: Vec<usize>,
    /// Heat-transfer assets whose secondary side lies in this zone.
    pub secondary_side: Vec<usize>,
    /// Zones from here to the root, both ends included.
    pub path: Vec<usize>,
    /// Scale from this zone's powers to root units.
    pub factor: Real,
}

impl ControllerNetwork {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            consumers: Vec::new(),
            producers: Vec::new(),
            storages: Vec::new(),
            primary_side: Vec::new(),
            secondary_side: Vec::new(),
            path: vec![id],
            factor: 1.0,
        }
    }

    /// Heat-transfer assets touching this zone, either side.
    pub fn heat_transfers(&self) -> impl Iterator<Item = usize> + '_ {
        self.primary_side.iter().chain(&self.secondary_side).copied()
    }
}

/// Zone of every asset, by asset slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Partition {
    /// Zone of each ordinary asset; `None` for heat-transfer assets.
    pub assets: Vec<Option<usize>>,
    /// `[primary, secondary]` zones of each heat-transfer asset.
    pub sides: Vec<[Option<usize>; 2]>,
    pub zone_count: usize,
}

impl Partition {
    pub fn side_zone(&self, slot: usize, side: Side) -> Option<usize> {
        self.sides.get(slot).and_then(|s| s[side.slot()])
    }
}

enum Seed {
    Side(usize, Side),
    Asset(usize),
}

fn is_heat_transfer(asset: &Asset) -> bool {
    matches!(asset.kind(), AssetKind::HeatTransfer(_))
}

pub(crate) fn heat_transfer_model(asset: &Asset) -> Option<&HeatTransfer> {
    match asset.kind() {
        AssetKind::HeatTransfer(ht) => Some(ht),
        _ => None,
    }
}

fn nodes_at(asset: &Asset, cps: &[usize]) -> Vec<NodeId> {
    cps.iter()
        .filter_map(|&cp| asset.connections().get(cp).copied().flatten())
        .map(|link| link.node)
        .collect()
}

/// Discover zones seeded from each heat-transfer side in registration
/// order, then from any ordinary asset nothing reached.
pub(crate) fn partition(network: &Network) -> ControlResult<Partition> {
    let assets: Vec<&Asset> = network.assets().map(|(_, a)| a).collect();
    let mut part = Partition {
        assets: vec![None; assets.len()],
        sides: vec![[None, None]; assets.len()],
        zone_count: 0,
    };
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();

    let mut seeds: Vec<Seed> = Vec::new();
    for (slot, asset) in assets.iter().enumerate() {
        if is_heat_transfer(asset) {
            seeds.push(Seed::Side(slot, Side::Primary));
            seeds.push(Seed::Side(slot, Side::Secondary));
        }
    }
    seeds.extend(
        assets
            .iter()
            .enumerate()
            .filter(|(_, a)| !is_heat_transfer(a))
            .map(|(slot, _)| Seed::Asset(slot)),
    );

    for seed in seeds {
        let zone = part.zone_count;
        let start = match seed {
            Seed::Side(slot, side) => {
                if part.sides[slot][side.slot()].is_some() {
                    continue;
                }
                part.sides[slot][side.slot()] = Some(zone);
                nodes_at(assets[slot], &side.cps())
            }
            Seed::Asset(slot) => {
                if part.assets[slot].is_some() {
                    continue;
                }
                part.assets[slot] = Some(zone);
                let all: Vec<usize> = (0..assets[slot].connection_count()).collect();
                nodes_at(assets[slot], &all)
            }
        };
        flood(network, &assets, &mut part, &mut seen_nodes, start, zone)?;
        part.zone_count += 1;
    }

    debug!(zones = part.zone_count, "network partitioned");
    Ok(part)
}

fn flood(
    network: &Network,
    assets: &[&Asset],
    part: &mut Partition,
    seen_nodes: &mut HashSet<NodeId>,
    start: Vec<NodeId>,
    zone: usize,
) -> ControlResult<()> {
    let mut queue: VecDeque<NodeId> = start.into();
    while let Some(node_id) = queue.pop_front() {
        if !seen_nodes.insert(node_id) {
            continue;
        }

        for &(asset_id, cp) in network.node(node_id)?.attachments() {
            let slot = asset_id.slot();
            let Some(asset) = assets.get(slot) else {
                continue;
            };
            if is_heat_transfer(asset) {
                let side = Side::of_cp(cp);
                part.sides[slot][side.slot()].get_or_insert(zone);
            } else if part.assets[slot].is_none() {
                part.assets[slot] = Some(zone);
                let all: Vec<usize> = (0..asset.connection_count()).collect();
                queue.extend(nodes_at(asset, &all));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_components::{HeatBoundary, HeatTransferKind, Pipe};
    use hn_core::units::{degc, m};
    use hn_fluids::WaterTable;
    use std::sync::Arc;

    fn hx() -> AssetKind {
        AssetKind::HeatTransfer(HeatTransfer::new(
            HeatTransferKind::Exchanger { efficiency: 1.0 },
            (degc(70.0), degc(40.0)),
            (degc(35.0), degc(65.0)),
        ))
    }

    fn pipe() -> AssetKind {
        AssetKind::Pipe(Pipe::new(m(10.0), m(0.1)))
    }

    #[test]
    fn exchanger_splits_two_zones() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        let prod = net
            .add_asset("prod", AssetKind::HeatBoundary(HeatBoundary::producer(degc(40.0), degc(70.0))))
            .unwrap();
        let hx = net.add_asset("hx", hx()).unwrap();
        let cons = net
            .add_asset("cons", AssetKind::HeatBoundary(HeatBoundary::consumer(degc(65.0), degc(35.0))))
            .unwrap();
        let p = net.add_asset("p", pipe()).unwrap();
        net.connect_assets(prod, 1, hx, 0).unwrap();
        net.connect_assets(hx, 1, prod, 0).unwrap();
        net.connect_assets(hx, 3, p, 0).unwrap();
        net.connect_assets(p, 1, cons, 0).unwrap();
        net.connect_assets(cons, 1, hx, 2).unwrap();

        let part = partition(&net).unwrap();
        assert_eq!(part.zone_count, 2);
        assert_eq!(part.side_zone(hx.slot(), Side::Primary), Some(0));
        assert_eq!(part.side_zone(hx.slot(), Side::Secondary), Some(1));
        assert_eq!(part.assets[prod.slot()], Some(0));
        assert_eq!(part.assets[cons.slot()], Some(1));
        assert_eq!(part.assets[p.slot()], Some(1));
        assert_eq!(part.assets[hx.slot()], None);
    }

    #[test]
    fn without_heat_transfer_everything_is_zone_zero() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        let a = net.add_asset("a", pipe()).unwrap();
        let b = net.add_asset("b", pipe()).unwrap();
        net.connect_assets(a, 1, b, 0).unwrap();
        net.connect_assets(b, 1, a, 0).unwrap();
        let part = partition(&net).unwrap();
        assert_eq!(part.zone_count, 1);
        assert_eq!(part.assets, vec![Some(0), Some(0)]);
    }

    #[test]
    fn detached_asset_forms_its_own_zone() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        let a = net.add_asset("a", pipe()).unwrap();
        let b = net.add_asset("b", pipe()).unwrap();
        net.connect_assets(a, 1, a, 0).unwrap();
        net.connect_assets(b, 1, b, 0).unwrap();
        let part = partition(&net).unwrap();
        assert_eq!(part.zone_count, 2);
        assert_eq!(part.assets, vec![Some(0), Some(1)]);
    }
}
