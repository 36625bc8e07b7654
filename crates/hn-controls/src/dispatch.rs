//! Balancing supply, storage and demand in root units.

use std::collections::BTreeMap;

use hn_core::Real;

/// Per-producer output fractions for priority dispatch towards `target`.
///
/// `producers` holds `(priority, capacity)`. Tier 0 always runs at full
/// capacity. Higher tiers are added in ascending order until the target is
/// covered; the tier that overshoots runs partly loaded and every later
/// tier is off. Producers sharing a priority share one fraction.
pub fn priority_factors(producers: &[(u32, Real)], target: Real) -> Vec<Real> {
    let mut tiers: BTreeMap<u32, Real> = BTreeMap::new();
    for &(priority, capacity) in producers {
        *tiers.entry(priority).or_default() += capacity.max(0.0);
    }

    let mut remaining = target;
    let mut tier_factor: BTreeMap<u32, Real> = BTreeMap::new();
    for (&priority, &capacity) in &tiers {
        let factor = if priority == 0 {
            remaining -= capacity;
            1.0
        } else if remaining <= 0.0 || capacity <= 0.0 {
            0.0
        } else {
            remaining -= capacity;
            if remaining >= 0.0 {
                1.0
            } else {
                1.0 + remaining / capacity
            }
        };
        tier_factor.insert(priority, factor);
    }

    producers
        .iter()
        .map(|(priority, _)| tier_factor.get(priority).copied().unwrap_or(0.0))
        .collect()
}

/// Limits of one storage over the coming timestep, in root units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StorageLimits {
    pub chargeable: Real,
    pub dischargeable: Real,
}

/// Outcome of balancing one timestep, in root units.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Fraction of every consumer's demand that is served.
    pub consumer_scale: Real,
    /// Output fraction of each producer.
    pub producer_factors: Vec<Real>,
    /// Power of each storage, positive when discharging.
    pub storage_power: Vec<Real>,
}

impl Allocation {
    pub fn is_curtailed(&self) -> bool {
        self.consumer_scale < 1.0
    }
}

/// Decide consumer scaling, producer outputs and storage use.
pub fn allocate(demand: Real, producers: &[(u32, Real)], storages: &[StorageLimits]) -> Allocation {
    let supply: Real = producers.iter().map(|(_, c)| c.max(0.0)).sum();
    let chargeable: Real = storages.iter().map(|s| s.chargeable).sum();
    let dischargeable: Real = storages.iter().map(|s| s.dischargeable).sum();
    let all_on = vec![1.0; producers.len()];

    if supply + dischargeable <= demand {
        let consumer_scale = if demand > 0.0 {
            (supply + dischargeable) / demand
        } else {
            1.0
        };
        return Allocation {
            consumer_scale,
            producer_factors: all_on,
            storage_power: storages.iter().map(|s| s.dischargeable).collect(),
        };
    }

    let surplus = supply - demand;
    if surplus < 0.0 {
        // dischargeable > -surplus here, so the share is well defined
        let deficit = -surplus;
        return Allocation {
            consumer_scale: 1.0,
            producer_factors: all_on,
            storage_power: storages
                .iter()
                .map(|s| deficit * s.dischargeable / dischargeable)
                .collect(),
        };
    }

    if surplus <= chargeable {
        let storage_power = storages
            .iter()
            .map(|s| {
                if chargeable > 0.0 {
                    -surplus * s.chargeable / chargeable
                } else {
                    0.0
                }
            })
            .collect();
        return Allocation {
            consumer_scale: 1.0,
            producer_factors: all_on,
            storage_power,
        };
    }

    Allocation {
        consumer_scale: 1.0,
        producer_factors: priority_factors(producers, demand + chargeable),
        storage_power: storages.iter().map(|s| -s.chargeable).collect(),
    }
}
