//! Per-timestep setpoint generation for a whole network.

use std::collections::BTreeMap;

use hn_components::{AssetKind, HeatRole, SetpointRecord};
use hn_core::Real;
use hn_graph::Network;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dispatch::{StorageLimits, allocate};
use crate::entities::{
    ControllerConsumer, ControllerHeatTransferAsset, ControllerProducer, ControllerStorage,
};
use crate::error::{ControlError, ControlResult};
use crate::metadata::ControlMetadata;
use crate::tree::ZoneTree;
use crate::zones::{ControllerNetwork, Side, heat_transfer_model, partition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressureHolder {
    HeatTransfer(usize),
    Producer(usize),
}

/// Totals of one dispatch, in root units [W].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchSummary {
    pub time: Real,
    pub demand: Real,
    pub served: Real,
    pub production: Real,
    /// Net storage power, positive when discharging.
    pub storage: Real,
    pub consumer_scale: Real,
    /// Secondary duty of each heat-transfer asset [W].
    pub heat_transfer_duties: BTreeMap<String, Real>,
}

/// Hierarchical controller over the zones of one network.
#[derive(Debug, Clone)]
pub struct NetworkController {
    zones: Vec<ControllerNetwork>,
    tree: ZoneTree,
    consumers: Vec<ControllerConsumer>,
    producers: Vec<ControllerProducer>,
    storages: Vec<ControllerStorage>,
    heat_transfers: Vec<ControllerHeatTransferAsset>,
    pressure_holders: Vec<PressureHolder>,
}

impl NetworkController {
    /// Partition `network` into zones, validate the zone tree and pick a
    /// pressure-holding asset per zone.
    pub fn new(network: &Network, metadata: &ControlMetadata) -> ControlResult<Self> {
        let part = partition(network)?;
        let mut zones: Vec<ControllerNetwork> = (0..part.zone_count).map(ControllerNetwork::new).collect();
        let mut consumers = Vec::new();
        let mut producers = Vec::new();
        let mut storages = Vec::new();
        let mut heat_transfers = Vec::new();

        for (id, asset) in network.assets() {
            let slot = id.slot();
            let name = asset.name();
            if let Some(ht) = heat_transfer_model(asset) {
                let (Some(primary), Some(secondary)) =
                    (part.side_zone(slot, Side::Primary), part.side_zone(slot, Side::Secondary))
                else {
                    return Err(ControlError::InvalidArg {
                        what: "heat-transfer side outside every zone",
                    });
                };
                zones[primary].primary_side.push(heat_transfers.len());
                zones[secondary].secondary_side.push(heat_transfers.len());
                heat_transfers.push(ControllerHeatTransferAsset::from_model(
                    id,
                    name,
                    (primary, secondary),
                    ht,
                ));
                continue;
            }

            let Some(zone) = part.assets.get(slot).copied().flatten() else {
                return Err(ControlError::InvalidArg {
                    what: "asset outside every zone",
                });
            };
            match asset.kind() {
                AssetKind::HeatBoundary(hb) if hb.role == HeatRole::Producer => {
                    let spec = metadata.producers.get(name).ok_or_else(|| ControlError::MissingMetadata {
                        asset: name.to_string(),
                    })?;
                    zones[zone].producers.push(producers.len());
                    producers.push(ControllerProducer::from_boundary(
                        id,
                        name,
                        zone,
                        hb,
                        spec.power,
                        spec.priority,
                    ));
                }
                AssetKind::HeatBoundary(hb) => {
                    let spec = metadata.consumers.get(name).ok_or_else(|| ControlError::MissingMetadata {
                        asset: name.to_string(),
                    })?;
                    spec.profile.validate()?;
                    zones[zone].consumers.push(consumers.len());
                    consumers.push(ControllerConsumer::from_boundary(
                        id,
                        name,
                        zone,
                        hb,
                        spec.profile.clone(),
                    ));
                }
                AssetKind::Buffer(buffer) => {
                    zones[zone].storages.push(storages.len());
                    storages.push(ControllerStorage {
                        asset: id,
                        name: name.to_string(),
                        zone,
                        temperature_in: buffer.temperature_in,
                        temperature_out: buffer.temperature_out,
                    });
                }
                _ => {}
            }
        }

        let tree = ZoneTree::build(part.zone_count, &heat_transfers)?;
        for zone in &mut zones {
            zone.path = tree.path(zone.id);
            zone.factor = tree.factor(zone.id, &heat_transfers);
        }

        let mut pressure_holders = Vec::with_capacity(zones.len());
        for zone in &zones {
            let holder = match (zone.secondary_side.first(), zone.producers.first()) {
                (Some(&h), _) => PressureHolder::HeatTransfer(h),
                (None, Some(&p)) => PressureHolder::Producer(p),
                (None, None) => return Err(ControlError::NoPressureAsset { zone: zone.id }),
            };
            pressure_holders.push(holder);
        }

        debug!(
            zones = zones.len(),
            consumers = consumers.len(),
            producers = producers.len(),
            storages = storages.len(),
            heat_transfers = heat_transfers.len(),
            "controller built"
        );

        Ok(Self {
            zones,
            tree,
            consumers,
            producers,
            storages,
            heat_transfers,
            pressure_holders,
        })
    }

    pub fn zones(&self) -> &[ControllerNetwork] {
        &self.zones
    }

    pub fn tree(&self) -> &ZoneTree {
        &self.tree
    }

    pub fn consumers(&self) -> &[ControllerConsumer] {
        &self.consumers
    }

    pub fn producers(&self) -> &[ControllerProducer] {
        &self.producers
    }

    pub fn storages(&self) -> &[ControllerStorage] {
        &self.storages
    }

    pub fn heat_transfers(&self) -> &[ControllerHeatTransferAsset] {
        &self.heat_transfers
    }

    /// Name of the asset holding pressure in `zone`.
    pub fn pressure_holder(&self, zone: usize) -> Option<&str> {
        match self.pressure_holders.get(zone)? {
            PressureHolder::HeatTransfer(h) => self.heat_transfers.get(*h).map(|h| h.name.as_str()),
            PressureHolder::Producer(p) => self.producers.get(*p).map(|p| p.name.as_str()),
        }
    }

    /// Re-read heat-transfer coefficients and recompute zone factors.
    pub fn refresh_factors(&mut self, network: &Network) -> ControlResult<()> {
        for ht in &mut self.heat_transfers {
            if let Some(model) = heat_transfer_model(network.asset(ht.asset)?) {
                ht.htc = model.htc();
            }
        }
        for zone in &mut self.zones {
            zone.factor = self.tree.factor(zone.id, &self.heat_transfers);
        }
        Ok(())
    }

    /// Setpoints for every steered asset at `time`, for a step of `dt` seconds.
    pub fn step(
        &mut self,
        network: &Network,
        time: Real,
        dt: Real,
    ) -> ControlResult<(BTreeMap<String, SetpointRecord>, DispatchSummary)> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "timestep must be positive",
            });
        }
        self.refresh_factors(network)?;
        let factor = |zone: usize| self.zones.get(zone).map_or(1.0, |z| z.factor);

        let demand: Vec<Real> = self.consumers.iter().map(|c| c.demand_at(time)).collect();
        let total_demand: Real = self
            .consumers
            .iter()
            .zip(&demand)
            .map(|(c, d)| d * factor(c.zone))
            .sum();
        let capacities: Vec<(u32, Real)> = self
            .producers
            .iter()
            .map(|p| (p.priority, p.power * factor(p.zone)))
            .collect();
        let mut limits = Vec::with_capacity(self.storages.len());
        for storage in &self.storages {
            let asset = network.asset(storage.asset)?;
            let AssetKind::Buffer(buffer) = asset.kind() else {
                return Err(ControlError::InvalidArg {
                    what: "storage asset is not a buffer",
                });
            };
            let f = factor(storage.zone);
            limits.push(StorageLimits {
                chargeable: buffer.chargeable_power(dt, network.fluid())? * f,
                dischargeable: buffer.dischargeable_power(dt, network.fluid())? * f,
            });
        }

        let allocation = allocate(total_demand, &capacities, &limits);
        if allocation.is_curtailed() {
            warn!(
                time,
                factor = allocation.consumer_scale,
                "insufficient capacity, consumer demand curtailed"
            );
        }

        let served: Vec<Real> = demand.iter().map(|d| d * allocation.consumer_scale).collect();
        let output: Vec<Real> = self
            .producers
            .iter()
            .zip(&allocation.producer_factors)
            .map(|(p, f)| p.power * f)
            .collect();
        let storage_power: Vec<Real> = self
            .storages
            .iter()
            .zip(&allocation.storage_power)
            .map(|(s, root)| root / factor(s.zone))
            .collect();

        let mut net = vec![0.0; self.zones.len()];
        for (c, s) in self.consumers.iter().zip(&served) {
            net[c.zone] -= s;
        }
        for (p, o) in self.producers.iter().zip(&output) {
            net[p.zone] += o;
        }
        for (s, q) in self.storages.iter().zip(&storage_power) {
            net[s.zone] += q;
        }
        let duties = self.resolve_duties(&net)?;

        let mut setpoints = BTreeMap::new();
        for (c, s) in self.consumers.iter().zip(&served) {
            setpoints.insert(c.name.clone(), c.setpoints(*s));
        }
        for (i, (p, o)) in self.producers.iter().zip(&output).enumerate() {
            let holds = self.pressure_holders.contains(&PressureHolder::Producer(i));
            setpoints.insert(p.name.clone(), p.setpoints(*o, holds));
        }
        for (s, q) in self.storages.iter().zip(&storage_power) {
            setpoints.insert(s.name.clone(), s.setpoints(*q));
        }
        for (i, (h, d)) in self.heat_transfers.iter().zip(&duties).enumerate() {
            let holds = self.pressure_holders.contains(&PressureHolder::HeatTransfer(i));
            setpoints.insert(h.name.clone(), h.setpoints(*d, holds));
        }

        let summary = DispatchSummary {
            time,
            demand: total_demand,
            served: total_demand * allocation.consumer_scale,
            production: capacities
                .iter()
                .zip(&allocation.producer_factors)
                .map(|((_, c), f)| c * f)
                .sum(),
            storage: allocation.storage_power.iter().sum(),
            consumer_scale: allocation.consumer_scale,
            heat_transfer_duties: self
                .heat_transfers
                .iter()
                .zip(&duties)
                .map(|(h, d)| (h.name.clone(), *d))
                .collect(),
        };
        debug!(time, demand = summary.demand, production = summary.production, "dispatch done");
        Ok((setpoints, summary))
    }

    /// Secondary duty of every heat-transfer asset, peeled from the leaves.
    ///
    /// A zone with exactly one unresolved asset pushes its balance
    /// (own net plus resolved assets) through it: `-net` when the zone is
    /// the asset's secondary side, `net / htc` when it is the primary side.
    /// The root only resolves an asset when no other zone can.
    fn resolve_duties(&self, net: &[Real]) -> ControlResult<Vec<Real>> {
        let mut duties: Vec<Option<Real>> = vec![None; self.heat_transfers.len()];
        while duties.iter().any(Option::is_none) {
            let mut progressed = false;
            for z in 1..self.zones.len() {
                progressed |= self.peel(z, net, &mut duties);
            }
            if !progressed {
                progressed = self.peel(0, net, &mut duties);
            }
            if !progressed {
                return Err(ControlError::Looped {
                    what: "heat-transfer duties cannot be resolved".to_string(),
                });
            }
        }
        Ok(duties.into_iter().map(|d| d.unwrap_or(0.0)).collect())
    }

    fn peel(&self, z: usize, net: &[Real], duties: &mut [Option<Real>]) -> bool {
        let Some(zone) = self.zones.get(z) else {
            return false;
        };
        let mut open = zone.heat_transfers().filter(|&h| duties[h].is_none());
        let (Some(h), None) = (open.next(), open.next()) else {
            return false;
        };
        let balance = net[z]
            + zone
                .heat_transfers()
                .filter_map(|k| duties[k].map(|d| self.heat_transfers[k].contribution(z, d)))
                .sum::<Real>();
        let ht = &self.heat_transfers[h];
        duties[h] = Some(if z == ht.secondary_zone {
            -balance
        } else {
            balance / ht.htc
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DemandProfile;
    use approx::assert_relative_eq;
    use hn_components::{Buffer, HeatBoundary, HeatTransfer, HeatTransferKind, Pipe, SetpointKey, SetpointValue};
    use hn_core::units::{degc, m, w};
    use hn_fluids::WaterTable;
    use std::sync::Arc;

    fn producer() -> AssetKind {
        AssetKind::HeatBoundary(HeatBoundary::producer(degc(40.0), degc(70.0)))
    }

    fn consumer() -> AssetKind {
        AssetKind::HeatBoundary(HeatBoundary::consumer(degc(70.0), degc(40.0)))
    }

    fn heat_pump(cop: Real) -> AssetKind {
        AssetKind::HeatTransfer(HeatTransfer::new(
            HeatTransferKind::HeatPump { cop },
            (degc(30.0), degc(20.0)),
            (degc(40.0), degc(70.0)),
        ))
    }

    fn loop_of(net: &mut Network, a: &str, b: &str) {
        net.connect(a, 1, b, 0).unwrap();
        net.connect(b, 1, a, 0).unwrap();
    }

    fn real(rec: &SetpointRecord, key: SetpointKey) -> Real {
        match rec.get(key) {
            Some(SetpointValue::Real(v)) => v,
            other => panic!("{key}: {other:?}"),
        }
    }

    fn flag(rec: &SetpointRecord, key: SetpointKey) -> bool {
        match rec.get(key) {
            Some(SetpointValue::Flag(v)) => v,
            other => panic!("{key}: {other:?}"),
        }
    }

    #[test]
    fn single_zone_producer_covers_consumer() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        net.add_asset("plant", producer()).unwrap();
        net.add_asset("house", consumer()).unwrap();
        loop_of(&mut net, "plant", "house");
        let meta = ControlMetadata::new()
            .with_producer("plant", 1.0e6, 0)
            .with_consumer("house", DemandProfile::constant(2.0e5));

        let mut ctl = NetworkController::new(&net, &meta).unwrap();
        assert_eq!(ctl.zones().len(), 1);
        assert_eq!(ctl.pressure_holder(0), Some("plant"));

        let (sp, summary) = ctl.step(&net, 0.0, 60.0).unwrap();
        assert_relative_eq!(real(&sp["house"], SetpointKey::HeatDemand), -2.0e5);
        assert!(flag(&sp["plant"], SetpointKey::SetPressure));
        assert!(!flag(&sp["house"], SetpointKey::SetPressure));
        assert_relative_eq!(summary.consumer_scale, 1.0);
    }

    #[test]
    fn heat_pump_zone_scaled_and_resolved() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        net.add_asset("plant", producer()).unwrap();
        net.add_asset("hp", heat_pump(4.0)).unwrap();
        net.add_asset("house", consumer()).unwrap();
        loop_of(&mut net, "plant", "hp");
        net.connect("house", 1, "hp", 2).unwrap();
        net.connect("hp", 3, "house", 0).unwrap();
        let meta = ControlMetadata::new()
            .with_producer("plant", 1.0e6, 0)
            .with_consumer("house", DemandProfile::constant(4.0e5));

        let mut ctl = NetworkController::new(&net, &meta).unwrap();
        assert_eq!(ctl.zones().len(), 2);
        assert_relative_eq!(ctl.zones()[1].factor, 0.75);
        assert_eq!(ctl.pressure_holder(1), Some("hp"));

        let (sp, summary) = ctl.step(&net, 0.0, 60.0).unwrap();
        assert_relative_eq!(summary.demand, 3.0e5);
        assert_relative_eq!(summary.heat_transfer_duties["hp"], 4.0e5);
        assert!(flag(&sp["hp"], SetpointKey::SetPressure));
        assert_relative_eq!(real(&sp["hp"], SetpointKey::HeatDemand), 4.0e5);
    }

    #[test]
    fn curtails_when_capacity_short() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        net.add_asset("plant", producer()).unwrap();
        net.add_asset("house", consumer()).unwrap();
        loop_of(&mut net, "plant", "house");
        let meta = ControlMetadata::new()
            .with_producer("plant", 1.0e5, 0)
            .with_consumer("house", DemandProfile::constant(4.0e5));
        let mut ctl = NetworkController::new(&net, &meta).unwrap();
        let (sp, summary) = ctl.step(&net, 0.0, 60.0).unwrap();
        assert_relative_eq!(summary.consumer_scale, 0.25);
        assert_relative_eq!(real(&sp["house"], SetpointKey::HeatDemand), -1.0e5);
    }

    #[test]
    fn surplus_charges_storage() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        net.add_asset("plant", producer()).unwrap();
        net.add_asset("house", consumer()).unwrap();
        net.add_asset(
            "tank",
            AssetKind::Buffer(Buffer::new(50.0, w(1.0e5), degc(40.0), degc(70.0)).with_fill_level(0.1)),
        )
        .unwrap();
        net.add_asset("pipe", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1)))).unwrap();
        net.connect("plant", 1, "house", 0).unwrap();
        net.connect("house", 1, "plant", 0).unwrap();
        net.connect("tank", 1, "plant", 1).unwrap();
        net.connect("tank", 0, "pipe", 0).unwrap();
        net.connect("pipe", 1, "plant", 0).unwrap();
        let meta = ControlMetadata::new()
            .with_producer("plant", 3.0e5, 0)
            .with_consumer("house", DemandProfile::constant(2.5e5));
        let mut ctl = NetworkController::new(&net, &meta).unwrap();
        let (sp, _) = ctl.step(&net, 0.0, 60.0).unwrap();
        assert_relative_eq!(real(&sp["tank"], SetpointKey::HeatDemand), -5.0e4, max_relative = 1e-9);
    }

    #[test]
    fn missing_producer_metadata_is_reported() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        net.add_asset("plant", producer()).unwrap();
        net.add_asset("house", consumer()).unwrap();
        loop_of(&mut net, "plant", "house");
        let meta = ControlMetadata::new().with_consumer("house", DemandProfile::constant(1.0));
        assert_eq!(
            NetworkController::new(&net, &meta).unwrap_err(),
            ControlError::MissingMetadata {
                asset: "plant".into()
            }
        );
    }

    #[test]
    fn zone_without_pressure_asset_is_rejected() {
        let mut net = Network::new(Arc::new(WaterTable::new()));
        net.add_asset("a", consumer()).unwrap();
        net.add_asset("b", consumer()).unwrap();
        loop_of(&mut net, "a", "b");
        let meta = ControlMetadata::new()
            .with_consumer("a", DemandProfile::constant(1.0))
            .with_consumer("b", DemandProfile::constant(1.0));
        assert_eq!(
            NetworkController::new(&net, &meta).unwrap_err(),
            ControlError::NoPressureAsset { zone: 0 }
        );
    }
}
