//! The timestep loop.

use std::collections::BTreeMap;

use hn_controls::{ControlMetadata, NetworkController};
use hn_core::Real;
use hn_graph::Network;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::SimResult;
use crate::record::{AssetState, SimulationReport, StepRecord};
use crate::scenario::Scenario;

/// A network, its controller and the clock.
///
/// Each step dispatches at the current time, pushes the setpoints into the
/// assets, solves the network and then moves storage fill levels on by one
/// step length.
#[derive(Debug)]
pub struct Simulation {
    name: String,
    network: Network,
    controller: NetworkController,
    config: SimulationConfig,
    time: Real,
    step: usize,
}

impl Simulation {
    pub fn new(
        name: impl Into<String>,
        network: Network,
        metadata: &ControlMetadata,
        config: SimulationConfig,
    ) -> SimResult<Self> {
        config.validate()?;
        let controller = NetworkController::new(&network, metadata)?;
        Ok(Self {
            name: name.into(),
            network,
            controller,
            time: config.start_time_s,
            config,
            step: 0,
        })
    }

    pub fn from_scenario(scenario: &Scenario) -> SimResult<Self> {
        let network = scenario.build_network()?;
        Self::new(
            scenario.name.clone(),
            network,
            &scenario.control,
            scenario.simulation.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn controller(&self) -> &NetworkController {
        &self.controller
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Time of the next step (seconds)
    pub fn time(&self) -> Real {
        self.time
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.config.steps
    }

    /// Solve one timestep and advance the clock.
    pub fn step(&mut self) -> SimResult<StepRecord> {
        let dt = self.config.time_step_s;
        let (setpoints, dispatch) = self.controller.step(&self.network, self.time, dt)?;
        self.network.apply_setpoints(&setpoints)?;
        let report = self.network.solve(&self.config.solver)?;
        self.network.advance_storage(dt)?;

        let mut assets = BTreeMap::new();
        let ids: Vec<_> = self.network.assets().map(|(id, a)| (id, a.name().to_string())).collect();
        for (id, name) in ids {
            assets.insert(name, AssetState::capture(&self.network, id)?);
        }

        info!(
            step = self.step,
            time_s = self.time,
            iterations = report.iterations,
            demand_w = dispatch.demand,
            served_w = dispatch.served,
            "timestep solved"
        );
        let record = StepRecord {
            step: self.step,
            time_s: self.time,
            iterations: report.iterations,
            max_change: report.max_change,
            dispatch,
            assets,
        };
        self.step += 1;
        self.time += dt;
        Ok(record)
    }

    /// Run the remaining steps.
    pub fn run(&mut self) -> SimResult<SimulationReport> {
        let mut report = SimulationReport {
            name: self.name.clone(),
            steps: Vec::with_capacity(self.config.steps.saturating_sub(self.step)),
        };
        while !self.is_finished() {
            report.steps.push(self.step()?);
        }
        debug!(
            steps = report.steps.len(),
            iterations = report.total_iterations(),
            "simulation finished"
        );
        Ok(report)
    }
}
