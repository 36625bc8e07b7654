//! hn-fluids: fluid property tables for heatnet.
//!
//! Provides:
//! - `FluidProperties` trait: `T -> {rho, mu, cp, k}` and `T <-> u`
//! - `WaterTable`: tabulated liquid water between 0 and 150 °C
//!
//! # Architecture
//!
//! The network solver only ever sees the `FluidProperties` trait, so a
//! different medium (glycol mixtures, a full equation of state) can be
//! swapped in without touching the asset equations.
//!
//! # Example
//!
//! ```
//! use hn_fluids::{FluidProperties, WaterTable};
//!
//! let water = WaterTable::new();
//! let u = water.internal_energy(353.15).unwrap();
//! let t = water.temperature(u).unwrap();
//! assert!((t - 353.15).abs() < 1e-9);
//! ```

pub mod error;
pub mod model;
pub mod water;

// Re-exports for ergonomics
pub use error::{FluidError, FluidResult};
pub use model::{FluidProperties, PropertyPack};
pub use water::WaterTable;
