//! Controller setpoints handed to assets once per timestep.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use crate::error::{ComponentError, ComponentResult};
use hn_core::Real;
use serde::{Deserialize, Serialize};

/// Setpoint names understood by the assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetpointKey {
    /// Signed heat flow into the network at the asset [W].
    HeatDemand,
    /// Return-side temperature [K].
    TemperatureIn,
    /// Supply-side temperature [K].
    TemperatureOut,
    /// Whether the asset holds the pressure of its network.
    SetPressure,
    TemperatureInPrimary,
    TemperatureOutPrimary,
    TemperatureInSecondary,
    TemperatureOutSecondary,
}

impl SetpointKey {
    pub const ALL: [SetpointKey; 8] = [
        SetpointKey::HeatDemand,
        SetpointKey::TemperatureIn,
        SetpointKey::TemperatureOut,
        SetpointKey::SetPressure,
        SetpointKey::TemperatureInPrimary,
        SetpointKey::TemperatureOutPrimary,
        SetpointKey::TemperatureInSecondary,
        SetpointKey::TemperatureOutSecondary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SetpointKey::HeatDemand => "heat_demand",
            SetpointKey::TemperatureIn => "temperature_in",
            SetpointKey::TemperatureOut => "temperature_out",
            SetpointKey::SetPressure => "set_pressure",
            SetpointKey::TemperatureInPrimary => "temperature_in_primary",
            SetpointKey::TemperatureOutPrimary => "temperature_out_primary",
            SetpointKey::TemperatureInSecondary => "temperature_in_secondary",
            SetpointKey::TemperatureOutSecondary => "temperature_out_secondary",
        }
    }
}

impl fmt::Display for SetpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetpointKey {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SetpointKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or(ComponentError::InvalidArg {
                what: "unknown setpoint key",
            })
    }
}

/// A setpoint is either a number or an on/off flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetpointValue {
    Flag(bool),
    Real(Real),
}

/// Setpoints for one asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetpointRecord {
    values: BTreeMap<SetpointKey, SetpointValue>,
}

impl SetpointRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_real(mut self, key: SetpointKey, value: Real) -> Self {
        self.set_real(key, value);
        self
    }

    pub fn with_flag(mut self, key: SetpointKey, value: bool) -> Self {
        self.set_flag(key, value);
        self
    }

    pub fn set_real(&mut self, key: SetpointKey, value: Real) {
        self.values.insert(key, SetpointValue::Real(value));
    }

    pub fn set_flag(&mut self, key: SetpointKey, value: bool) {
        self.values.insert(key, SetpointValue::Flag(value));
    }

    pub fn get(&self, key: SetpointKey) -> Option<SetpointValue> {
        self.values.get(&key).copied()
    }

    pub fn contains(&self, key: SetpointKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SetpointKey, SetpointValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail with every key of `required` that is absent.
    pub fn require(&self, asset: &str, required: &[SetpointKey]) -> ComponentResult<()> {
        let missing: Vec<SetpointKey> = required
            .iter()
            .copied()
            .filter(|k| !self.contains(*k))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ComponentError::MissingSetpoints {
                asset: asset.to_string(),
                keys: missing,
            })
        }
    }

    /// Check `keys` plus `heat_demand` unless `set_pressure` is on, in one
    /// pass so every absent key is reported. Returns the pressure-mode flag.
    pub fn require_with_mode(&self, asset: &str, keys: &[SetpointKey]) -> ComponentResult<bool> {
        let pressure_mode = match self.get(SetpointKey::SetPressure) {
            Some(_) => self.flag(asset, SetpointKey::SetPressure)?,
            None => false,
        };
        let mut required = Vec::with_capacity(keys.len() + 2);
        required.push(SetpointKey::SetPressure);
        required.extend_from_slice(keys);
        if !pressure_mode {
            required.push(SetpointKey::HeatDemand);
        }
        self.require(asset, &required)?;
        Ok(pressure_mode)
    }

    /// Numeric setpoint; a flag under this key is a type error.
    pub fn real(&self, asset: &str, key: SetpointKey) -> ComponentResult<Real> {
        match self.get(key) {
            Some(SetpointValue::Real(v)) => Ok(v),
            Some(SetpointValue::Flag(_)) => Err(ComponentError::SetpointType {
                asset: asset.to_string(),
                key,
            }),
            None => Err(ComponentError::MissingSetpoints {
                asset: asset.to_string(),
                keys: vec![key],
            }),
        }
    }

    /// Flag setpoint; numbers are accepted as "non-zero means on".
    pub fn flag(&self, asset: &str, key: SetpointKey) -> ComponentResult<bool> {
        match self.get(key) {
            Some(SetpointValue::Flag(b)) => Ok(b),
            Some(SetpointValue::Real(v)) => Ok(v != 0.0),
            None => Err(ComponentError::MissingSetpoints {
                asset: asset.to_string(),
                keys: vec![key],
            }),
        }
    }
}
