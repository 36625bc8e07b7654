//! Unknown-vector layout.
//!
//! Every node and asset owns a contiguous block of the global unknown vector.
//! A block is a sequence of "points"; each point holds three unknowns in the
//! fixed order mass-flow-rate, pressure, internal-energy.

use core::fmt;
use core::str::FromStr;

use crate::error::{HnError, HnResult};

/// Unknowns per connection point (and per node).
pub const UNKNOWNS_PER_POINT: usize = 3;

/// A solved quantity stored in the unknown vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    MassFlowRate,
    Pressure,
    InternalEnergy,
}

impl Property {
    pub const ALL: [Property; UNKNOWNS_PER_POINT] = [
        Property::MassFlowRate,
        Property::Pressure,
        Property::InternalEnergy,
    ];

    /// Offset of this property within a point.
    pub fn offset(self) -> usize {
        match self {
            Property::MassFlowRate => 0,
            Property::Pressure => 1,
            Property::InternalEnergy => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::MassFlowRate => "mass_flow_rate",
            Property::Pressure => "pressure",
            Property::InternalEnergy => "internal_energy",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = HnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| HnError::UnknownProperty { name: s.to_string() })
    }
}

/// Handle to a contiguous range of the unknown vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownBlock {
    offset: usize,
    count: usize,
}

impl UnknownBlock {
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn end(&self) -> usize {
        self.offset + self.count
    }

    pub fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.end()
    }

    /// Number of (mass-flow, pressure, internal-energy) points in the block.
    pub fn points(&self) -> usize {
        self.count / UNKNOWNS_PER_POINT
    }

    /// Absolute index of `property` at `point`.
    pub fn index(&self, point: usize, property: Property) -> HnResult<usize> {
        if point >= self.points() {
            return Err(HnError::IndexOob {
                what: "connection point",
                index: point,
                len: self.points(),
            });
        }
        Ok(self.offset + point * UNKNOWNS_PER_POINT + property.offset())
    }

    /// Index relative to the block start, for reading cached local solutions.
    pub fn local_index(&self, point: usize, property: Property) -> HnResult<usize> {
        Ok(self.index(point, property)? - self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_indexing_follows_point_layout() {
        let block = UnknownBlock::new(10, 6);
        assert_eq!(block.points(), 2);
        assert_eq!(block.index(0, Property::MassFlowRate).unwrap(), 10);
        assert_eq!(block.index(0, Property::InternalEnergy).unwrap(), 12);
        assert_eq!(block.index(1, Property::Pressure).unwrap(), 14);
        assert_eq!(block.local_index(1, Property::Pressure).unwrap(), 4);
        assert_eq!(block.range(), 10..16);
    }

    #[test]
    fn block_rejects_point_out_of_range() {
        let block = UnknownBlock::new(0, 3);
        assert!(block.index(1, Property::MassFlowRate).is_err());
    }

    proptest::proptest! {
        #[test]
        fn block_indices_stay_inside_range(offset in 0usize..1000, points in 1usize..8) {
            let block = UnknownBlock::new(offset, points * Property::ALL.len());
            let mut seen = Vec::new();
            for point in 0..points {
                for p in Property::ALL {
                    let idx = block.index(point, p).unwrap();
                    proptest::prop_assert!(block.range().contains(&idx));
                    proptest::prop_assert!(!seen.contains(&idx));
                    seen.push(idx);
                }
            }
            proptest::prop_assert!(block.index(points, Property::MassFlowRate).is_err());
        }
    }

    #[test]
    fn property_parses_from_name() {
        for p in Property::ALL {
            assert_eq!(p.name().parse::<Property>().unwrap(), p);
        }
        assert!("temperature".parse::<Property>().is_err());
    }
}
