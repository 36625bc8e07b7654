//! hn-components: asset library for district heating networks.
//!
//! Every asset owns three unknowns (mass flow, pressure, internal energy)
//! per connection point and emits exactly that many linearised equations
//! per iteration:
//! - `PressureBoundary`: fixes pressure level and temperature of a point
//! - `HeatBoundary`: producer or consumer between return and supply
//! - `Pipe`: friction loss and heat loss to ground
//! - `Buffer`: stratified hot-water storage with a fill level
//! - `HeatTransfer`: heat exchanger or heat pump coupling two networks
//!
//! Positive mass flow at a connection point means flow leaving the asset.
//!
//! # Example
//!
//! ```
//! use hn_components::{Asset, AssetKind, Pipe};
//! use hn_core::units::m;
//!
//! let pipe = Asset::new("supply_1", AssetKind::Pipe(Pipe::new(m(120.0), m(0.1))));
//! assert_eq!(pipe.connection_count(), 2);
//! assert_eq!(pipe.unknown_count(), 6);
//! ```

pub mod asset;
pub mod buffer;
pub mod common;
pub mod error;
pub mod heat_boundary;
pub mod heat_transfer;
pub mod pipe;
pub mod ports;
pub mod pressure_boundary;
pub mod setpoint;

// Re-exports
pub use asset::{Asset, AssetKind, NodeLink};
pub use buffer::Buffer;
pub use common::FlowRegime;
pub use error::{ComponentError, ComponentResult};
pub use heat_boundary::{HeatBoundary, HeatRole};
pub use heat_transfer::{HeatTransfer, HeatTransferKind};
pub use pipe::Pipe;
pub use ports::Ports;
pub use pressure_boundary::{BoundaryMode, PressureBoundary};
pub use setpoint::{SetpointKey, SetpointRecord, SetpointValue};
