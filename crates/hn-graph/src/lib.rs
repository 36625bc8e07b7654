//! hn-graph: network topology and equation assembly for heatnet.
//!
//! Provides:
//! - `Node`: hydraulic junction with three unknowns
//! - `Network`: owns assets, nodes, the fluid table and the `Matrix`;
//!   connects and merges, checks connectivity, assembles and writes back
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hn_components::{AssetKind, Pipe};
//! use hn_core::units::m;
//! use hn_fluids::WaterTable;
//! use hn_graph::Network;
//!
//! let mut net = Network::new(Arc::new(WaterTable::new()));
//! let a = net.add_asset("a", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1)))).unwrap();
//! let b = net.add_asset("b", AssetKind::Pipe(Pipe::new(m(10.0), m(0.1)))).unwrap();
//! let n = net.connect_assets(a, 1, b, 0).unwrap();
//! assert_eq!(net.connect_assets(a, 1, b, 0).unwrap(), n);
//! assert!(!net.check_connectivity());
//! ```

pub mod error;
pub mod network;
pub mod node;
pub mod results;

pub use error::{NetworkError, NetworkResult};
pub use network::Network;
pub use node::{AttachedFlow, Node};
pub use results::ResultProperty;
