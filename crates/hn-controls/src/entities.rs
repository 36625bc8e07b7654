//! Controller-side views of the assets it steers.
//!
//! Each view records the zone its asset lives in and the temperatures the
//! controller hands back with every setpoint.

use hn_components::{HeatBoundary, HeatTransfer, SetpointKey, SetpointRecord};
use hn_core::{AssetId, Real};

use crate::profile::DemandProfile;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConsumer {
    pub asset: AssetId,
    pub name: String,
    pub zone: usize,
    pub profile: DemandProfile,
    pub temperature_in: Real,
    pub temperature_out: Real,
}

impl ControllerConsumer {
    pub(crate) fn from_boundary(
        asset: AssetId,
        name: &str,
        zone: usize,
        boundary: &HeatBoundary,
        profile: DemandProfile,
    ) -> Self {
        Self {
            asset,
            name: name.to_string(),
            zone,
            profile,
            temperature_in: boundary.temperature_in,
            temperature_out: boundary.temperature_out,
        }
    }

    /// Demand [W] at `time`, positive for heat taken from the network.
    pub fn demand_at(&self, time: Real) -> Real {
        self.profile.value_at(time).max(0.0)
    }

    pub(crate) fn setpoints(&self, served: Real) -> SetpointRecord {
        SetpointRecord::new()
            .with_flag(SetpointKey::SetPressure, false)
            .with_real(SetpointKey::TemperatureIn, self.temperature_in)
            .with_real(SetpointKey::TemperatureOut, self.temperature_out)
            .with_real(SetpointKey::HeatDemand, -served)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerProducer {
    pub asset: AssetId,
    pub name: String,
    pub zone: usize,
    /// Rated power [W]
    pub power: Real,
    pub priority: u32,
    pub temperature_in: Real,
    pub temperature_out: Real,
}

impl ControllerProducer {
    pub(crate) fn from_boundary(
        asset: AssetId,
        name: &str,
        zone: usize,
        boundary: &HeatBoundary,
        power: Real,
        priority: u32,
    ) -> Self {
        Self {
            asset,
            name: name.to_string(),
            zone,
            power,
            priority,
            temperature_in: boundary.temperature_in,
            temperature_out: boundary.temperature_out,
        }
    }

    pub(crate) fn setpoints(&self, output: Real, set_pressure: bool) -> SetpointRecord {
        SetpointRecord::new()
            .with_flag(SetpointKey::SetPressure, set_pressure)
            .with_real(SetpointKey::TemperatureIn, self.temperature_in)
            .with_real(SetpointKey::TemperatureOut, self.temperature_out)
            .with_real(SetpointKey::HeatDemand, output)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerStorage {
    pub asset: AssetId,
    pub name: String,
    pub zone: usize,
    pub temperature_in: Real,
    pub temperature_out: Real,
}

impl ControllerStorage {
    /// `power` is positive when discharging into the network.
    pub(crate) fn setpoints(&self, power: Real) -> SetpointRecord {
        SetpointRecord::new()
            .with_real(SetpointKey::TemperatureIn, self.temperature_in)
            .with_real(SetpointKey::TemperatureOut, self.temperature_out)
            .with_real(SetpointKey::HeatDemand, power)
    }
}

/// A heat exchanger or heat pump seen as an edge between two zones.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerHeatTransferAsset {
    pub asset: AssetId,
    pub name: String,
    pub primary_zone: usize,
    pub secondary_zone: usize,
    /// Primary heat per unit of secondary heat, refreshed every timestep.
    pub htc: Real,
    pub temperature_in_primary: Real,
    pub temperature_out_primary: Real,
    pub temperature_in_secondary: Real,
    pub temperature_out_secondary: Real,
}

impl ControllerHeatTransferAsset {
    pub(crate) fn from_model(
        asset: AssetId,
        name: &str,
        zones: (usize, usize),
        model: &HeatTransfer,
    ) -> Self {
        Self {
            asset,
            name: name.to_string(),
            primary_zone: zones.0,
            secondary_zone: zones.1,
            htc: model.htc(),
            temperature_in_primary: model.temperature_in_primary,
            temperature_out_primary: model.temperature_out_primary,
            temperature_in_secondary: model.temperature_in_secondary,
            temperature_out_secondary: model.temperature_out_secondary,
        }
    }

    /// Heat this asset adds to `zone` when running at secondary duty `duty`.
    pub fn contribution(&self, zone: usize, duty: Real) -> Real {
        if zone == self.secondary_zone {
            duty
        } else if zone == self.primary_zone {
            -self.htc * duty
        } else {
            0.0
        }
    }

    pub(crate) fn setpoints(&self, duty: Real, set_pressure: bool) -> SetpointRecord {
        SetpointRecord::new()
            .with_flag(SetpointKey::SetPressure, set_pressure)
            .with_real(SetpointKey::TemperatureInPrimary, self.temperature_in_primary)
            .with_real(SetpointKey::TemperatureOutPrimary, self.temperature_out_primary)
            .with_real(SetpointKey::TemperatureInSecondary, self.temperature_in_secondary)
            .with_real(SetpointKey::TemperatureOutSecondary, self.temperature_out_secondary)
            .with_real(SetpointKey::HeatDemand, duty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pump() -> ControllerHeatTransferAsset {
        ControllerHeatTransferAsset {
            asset: AssetId::from_index(0),
            name: "hp".into(),
            primary_zone: 0,
            secondary_zone: 1,
            htc: 0.75,
            temperature_in_primary: 330.0,
            temperature_out_primary: 320.0,
            temperature_in_secondary: 310.0,
            temperature_out_secondary: 340.0,
        }
    }

    #[test]
    fn contribution_draws_htc_from_primary() {
        let hp = pump();
        assert_relative_eq!(hp.contribution(1, 100.0), 100.0);
        assert_relative_eq!(hp.contribution(0, 100.0), -75.0);
        assert_eq!(hp.contribution(7, 100.0), 0.0);
    }

    #[test]
    fn setpoints_carry_every_side_temperature() {
        let rec = pump().setpoints(1.0e4, false);
        for key in [
            SetpointKey::SetPressure,
            SetpointKey::TemperatureInPrimary,
            SetpointKey::TemperatureOutPrimary,
            SetpointKey::TemperatureInSecondary,
            SetpointKey::TemperatureOutSecondary,
            SetpointKey::HeatDemand,
        ] {
            assert!(rec.contains(key), "{key} missing");
        }
    }
}
