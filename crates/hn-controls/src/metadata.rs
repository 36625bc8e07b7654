//! Controller inputs that are not part of the hydraulic model.

use std::collections::BTreeMap;

use hn_core::Real;
use serde::{Deserialize, Serialize};

use crate::profile::DemandProfile;

/// Rated output and dispatch tier of a producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerSpec {
    /// Rated thermal power [W]
    pub power: Real,
    /// Tier 0 always runs; higher tiers are switched in one after another.
    #[serde(default)]
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerSpec {
    pub profile: DemandProfile,
}

/// Producer and consumer data keyed by asset name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlMetadata {
    pub producers: BTreeMap<String, ProducerSpec>,
    pub consumers: BTreeMap<String, ConsumerSpec>,
}

impl ControlMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_producer(mut self, name: impl Into<String>, power: Real, priority: u32) -> Self {
        self.producers
            .insert(name.into(), ProducerSpec { power, priority });
        self
    }

    pub fn with_consumer(mut self, name: impl Into<String>, profile: DemandProfile) -> Self {
        self.consumers
            .insert(name.into(), ConsumerSpec { profile });
        self
    }
}
