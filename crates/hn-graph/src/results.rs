//! Reading converged values back by property name.

use core::fmt;
use core::str::FromStr;

use hn_core::{HnError, Property, Real};
use hn_fluids::FluidProperties;

use crate::error::NetworkResult;

/// A solved unknown or a quantity derived from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultProperty {
    State(Property),
    /// Derived from internal energy through the fluid table.
    Temperature,
}

impl ResultProperty {
    pub fn name(self) -> &'static str {
        match self {
            ResultProperty::State(p) => p.name(),
            ResultProperty::Temperature => "temperature",
        }
    }

    pub(crate) fn evaluate(
        self,
        read: impl Fn(Property) -> NetworkResult<Real>,
        fluid: &dyn FluidProperties,
    ) -> NetworkResult<Real> {
        match self {
            ResultProperty::State(p) => read(p),
            ResultProperty::Temperature => Ok(fluid.temperature(read(Property::InternalEnergy)?)?),
        }
    }
}

impl From<Property> for ResultProperty {
    fn from(p: Property) -> Self {
        ResultProperty::State(p)
    }
}

impl fmt::Display for ResultProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResultProperty {
    type Err = HnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "temperature" {
            return Ok(ResultProperty::Temperature);
        }
        s.parse::<Property>().map(ResultProperty::State)
    }
}
