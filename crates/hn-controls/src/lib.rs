//! Hierarchical dispatch for district heating networks.
//!
//! This crate splits a [`hn_graph::Network`] into hydraulically separated
//! zones (sub-networks joined only through heat exchangers or heat pumps),
//! arranges them in a tree rooted at the primary side of the first
//! heat-transfer asset, and turns demand profiles, producer capacities and
//! storage limits into per-asset setpoints every timestep.
//!
//! # Architecture
//!
//! - Zones are discovered once, when the controller is built
//! - The zone tree may be at most two stages deep
//! - Powers are compared in root units: each zone's powers are scaled by the
//!   product of heat-transfer coefficients on its path to the root
//! - Producers are dispatched by priority tier; storages charge or
//!   discharge the remaining surplus or deficit

pub mod controller;
pub mod dispatch;
pub mod entities;
pub mod error;
pub mod metadata;
pub mod profile;
pub mod tree;
pub mod zones;

pub use controller::{DispatchSummary, NetworkController};
pub use dispatch::{Allocation, StorageLimits, allocate, priority_factors};
pub use entities::{
    ControllerConsumer, ControllerHeatTransferAsset, ControllerProducer, ControllerStorage,
};
pub use error::{ControlError, ControlResult};
pub use metadata::{ConsumerSpec, ControlMetadata, ProducerSpec};
pub use profile::DemandProfile;
pub use tree::ZoneTree;
pub use zones::{ControllerNetwork, Side};
