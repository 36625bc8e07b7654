//! Per-step results.

use std::collections::BTreeMap;

use hn_components::AssetKind;
use hn_controls::DispatchSummary;
use hn_core::{AssetId, Property, Real};
use hn_graph::{Network, ResultProperty};
use serde::Serialize;

use crate::error::SimResult;

/// Converged state of one asset, per connection point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetState {
    pub kind: &'static str,
    /// Outflow into the network is positive [kg/s]
    pub mass_flow_kg_s: Vec<Real>,
    pub pressure_pa: Vec<Real>,
    pub temperature_k: Vec<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_level: Option<Real>,
}

impl AssetState {
    pub fn capture(network: &Network, id: AssetId) -> SimResult<Self> {
        let asset = network.asset(id)?;
        let n = asset.connection_count();
        let mut state = Self {
            kind: asset.kind().label(),
            mass_flow_kg_s: Vec::with_capacity(n),
            pressure_pa: Vec::with_capacity(n),
            temperature_k: Vec::with_capacity(n),
            fill_level: match asset.kind() {
                AssetKind::Buffer(buffer) => Some(buffer.fill_level()),
                _ => None,
            },
        };
        for cp in 0..n {
            state
                .mass_flow_kg_s
                .push(network.asset_result(id, Property::MassFlowRate.into(), cp)?);
            state
                .pressure_pa
                .push(network.asset_result(id, Property::Pressure.into(), cp)?);
            state
                .temperature_k
                .push(network.asset_result(id, ResultProperty::Temperature, cp)?);
        }
        Ok(state)
    }
}

/// One solved timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub time_s: Real,
    pub iterations: usize,
    pub max_change: Real,
    pub dispatch: DispatchSummary,
    pub assets: BTreeMap<String, AssetState>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub name: String,
    pub steps: Vec<StepRecord>,
}

impl SimulationReport {
    pub fn total_iterations(&self) -> usize {
        self.steps.iter().map(|s| s.iterations).sum()
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.steps.last()
    }
}
