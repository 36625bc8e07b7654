//! Typed handles for nodes and assets.
//!
//! Both are 0-based registry slots stored as `index + 1` in a `NonZeroU32`,
//! so `Option<NodeId>` costs nothing extra in per-port link tables.

use core::fmt;
use core::num::NonZeroU32;

macro_rules! registry_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub fn from_index(index: u32) -> Self {
                Self(NonZeroU32::MIN.saturating_add(index))
            }

            pub fn index(self) -> u32 {
                self.0.get() - 1
            }

            /// Position in the owning registry.
            pub fn slot(self) -> usize {
                self.index() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

registry_id!(
    /// Hydraulic junction, in creation order.
    NodeId,
    "node"
);
registry_id!(
    /// Network asset, in registration order.
    AssetId,
    "asset"
);
