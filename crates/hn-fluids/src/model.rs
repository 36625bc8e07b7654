//! Fluid property trait.

use crate::error::FluidResult;
use hn_core::Real;

/// Properties at one temperature, fetched together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyPack {
    /// Density [kg/m³]
    pub density: Real,
    /// Dynamic viscosity [Pa·s]
    pub viscosity: Real,
    /// Specific heat capacity [J/(kg·K)]
    pub heat_capacity: Real,
    /// Thermal conductivity [W/(m·K)]
    pub thermal_conductivity: Real,
}

impl PropertyPack {
    /// Prandtl number `mu * cp / k`.
    pub fn prandtl(&self) -> Real {
        self.viscosity * self.heat_capacity / self.thermal_conductivity
    }
}

/// Pure, monotone property lookups used by the asset equations.
///
/// Implementations must be thread-safe: equations are assembled in parallel.
/// Temperatures are in kelvin, internal energies in J/kg.
pub trait FluidProperties: Send + Sync {
    /// Model name (for logging).
    fn name(&self) -> &str;

    fn density(&self, t: Real) -> FluidResult<Real>;

    fn viscosity(&self, t: Real) -> FluidResult<Real>;

    fn heat_capacity(&self, t: Real) -> FluidResult<Real>;

    fn thermal_conductivity(&self, t: Real) -> FluidResult<Real>;

    /// Specific internal energy at `t`.
    fn internal_energy(&self, t: Real) -> FluidResult<Real>;

    /// Inverse of [`FluidProperties::internal_energy`].
    fn temperature(&self, u: Real) -> FluidResult<Real>;

    /// All transport properties at `t` in one call.
    fn pack(&self, t: Real) -> FluidResult<PropertyPack> {
        Ok(PropertyPack {
            density: self.density(t)?,
            viscosity: self.viscosity(t)?,
            heat_capacity: self.heat_capacity(t)?,
            thermal_conductivity: self.thermal_conductivity(t)?,
        })
    }
}
