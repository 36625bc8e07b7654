//! Time stepping and scenario import for heatnet.
//!
//! Provides:
//! - `Scenario`: YAML description of assets, junctions, controller data and
//!   run settings, turned into a [`hn_graph::Network`]
//! - `Simulation`: per-timestep loop of dispatch, setpoint application,
//!   network solve and storage update

pub mod config;
pub mod error;
pub mod record;
pub mod scenario;
pub mod simulation;

pub use config::SimulationConfig;
pub use error::{SimError, SimResult};
pub use record::{AssetState, SimulationReport, StepRecord};
pub use scenario::{AssetDef, AssetKindDef, FluidChoice, JunctionDef, PortRef, Scenario, load_yaml};
pub use simulation::Simulation;
