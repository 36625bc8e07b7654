//! hn-core: stable foundation for heatnet.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (typed node and asset handles)
//! - unknowns (unknown blocks and per-point property layout)
//! - equation (one linearised row of the network system)
//! - error (shared error types)

pub mod equation;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;
pub mod unknowns;

// Re-exports: nice ergonomics for downstream crates
pub use equation::Equation;
pub use error::{HnError, HnResult};
pub use ids::*;
pub use numeric::*;
pub use unknowns::{Property, UNKNOWNS_PER_POINT, UnknownBlock};
