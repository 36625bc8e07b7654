//! Tabulated liquid water properties.

use crate::error::{FluidError, FluidResult};
use crate::model::FluidProperties;
use hn_core::Real;
use hn_core::units::constants::ZERO_CELSIUS_K;
use interp::{InterpMode, interp};

/// Table temperatures [°C], 10 K spacing.
const T_C: [Real; 16] = [
    0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0, 130.0, 140.0,
    150.0,
];

/// Density [kg/m³] at saturation pressure or above.
const RHO: [Real; 16] = [
    999.84, 999.70, 998.21, 995.65, 992.22, 988.04, 983.20, 977.76, 971.79, 965.31, 958.35,
    950.95, 943.11, 934.83, 926.13, 917.01,
];

/// Specific heat capacity [J/(kg·K)].
const CP: [Real; 16] = [
    4219.9, 4195.5, 4184.4, 4180.1, 4179.6, 4181.5, 4185.1, 4190.2, 4196.9, 4205.0, 4215.6,
    4227.6, 4244.8, 4263.5, 4285.1, 4310.0,
];

/// Dynamic viscosity [Pa·s].
const MU: [Real; 16] = [
    1.792e-3, 1.306e-3, 1.002e-3, 0.798e-3, 0.653e-3, 0.547e-3, 0.467e-3, 0.404e-3, 0.355e-3,
    0.315e-3, 0.282e-3, 0.255e-3, 0.232e-3, 0.213e-3, 0.197e-3, 0.183e-3,
];

/// Thermal conductivity [W/(m·K)].
const K: [Real; 16] = [
    0.561, 0.580, 0.598, 0.615, 0.631, 0.644, 0.654, 0.663, 0.670, 0.675, 0.679, 0.682, 0.683,
    0.684, 0.683, 0.682,
];

/// Liquid water between 0 and 150 °C.
///
/// Transport properties clamp to the table range. `u <-> T` extrapolates
/// linearly with the end-segment slope so that unconverged iterates outside
/// the table still map to finite values.
#[derive(Debug, Clone)]
pub struct WaterTable {
    temperature: Vec<Real>,
    internal_energy: Vec<Real>,
}

impl Default for WaterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterTable {
    pub fn new() -> Self {
        let temperature: Vec<Real> = T_C.iter().map(|t| t + ZERO_CELSIUS_K).collect();

        // u(T) = ∫ cp dT from 0 °C, trapezoidal
        let mut internal_energy = Vec::with_capacity(T_C.len());
        internal_energy.push(0.0);
        for i in 1..T_C.len() {
            let du = 0.5 * (CP[i - 1] + CP[i]) * (T_C[i] - T_C[i - 1]);
            internal_energy.push(internal_energy[i - 1] + du);
        }

        Self {
            temperature,
            internal_energy,
        }
    }

    /// Properties hold their end values outside the table.
    fn lookup(&self, t: Real, table: &[Real]) -> FluidResult<Real> {
        check_input(t, "temperature")?;
        Ok(interp(&self.temperature, table, t, &InterpMode::FirstLast))
    }
}

fn check_input(v: Real, what: &'static str) -> FluidResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FluidError::NonFinite { what, value: v })
    }
}

impl FluidProperties for WaterTable {
    fn name(&self) -> &str {
        "water"
    }

    fn density(&self, t: Real) -> FluidResult<Real> {
        self.lookup(t, &RHO)
    }

    fn viscosity(&self, t: Real) -> FluidResult<Real> {
        self.lookup(t, &MU)
    }

    fn heat_capacity(&self, t: Real) -> FluidResult<Real> {
        self.lookup(t, &CP)
    }

    fn thermal_conductivity(&self, t: Real) -> FluidResult<Real> {
        self.lookup(t, &K)
    }

    fn internal_energy(&self, t: Real) -> FluidResult<Real> {
        check_input(t, "temperature")?;
        Ok(interp(
            &self.temperature,
            &self.internal_energy,
            t,
            &InterpMode::Extrapolate,
        ))
    }

    fn temperature(&self, u: Real) -> FluidResult<Real> {
        check_input(u, "internal energy")?;
        Ok(interp(
            &self.internal_energy,
            &self.temperature,
            u,
            &InterpMode::Extrapolate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn internal_energy_is_zero_at_freezing() {
        let water = WaterTable::new();
        assert_relative_eq!(water.internal_energy(273.15).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn internal_energy_step_matches_heat_capacity() {
        let water = WaterTable::new();
        let du = water.internal_energy(363.15).unwrap() - water.internal_energy(353.15).unwrap();
        // mean cp between 80 and 90 °C
        assert_relative_eq!(du, 0.5 * (4196.9 + 4205.0) * 10.0, epsilon = 1e-6);
    }

    #[test]
    fn round_trip_inside_table() {
        let water = WaterTable::new();
        for t in [280.0, 293.15, 330.5, 353.15, 400.0] {
            let u = water.internal_energy(t).unwrap();
            assert_relative_eq!(water.temperature(u).unwrap(), t, epsilon = 1e-9);
        }
    }

    #[test]
    fn temperature_extrapolates_below_table() {
        let water = WaterTable::new();
        let t = water.temperature(-4219.9).unwrap();
        assert!(t < 273.15 && t > 271.0, "got {t}");
    }

    #[test]
    fn transport_properties_clamp_outside_table() {
        let water = WaterTable::new();
        assert_relative_eq!(water.density(200.0).unwrap(), 999.84);
        assert_relative_eq!(water.density(500.0).unwrap(), 917.01);
    }

    #[test]
    fn density_decreases_with_temperature() {
        let water = WaterTable::new();
        assert!(water.density(353.15).unwrap() < water.density(313.15).unwrap());
    }

    #[test]
    fn nan_input_is_rejected() {
        let water = WaterTable::new();
        assert!(matches!(
            water.density(f64::NAN),
            Err(FluidError::NonFinite { .. })
        ));
        assert!(water.temperature(f64::INFINITY).is_err());
    }

    #[test]
    fn prandtl_number_is_plausible() {
        let water = WaterTable::new();
        let pr = water.pack(293.15).unwrap().prandtl();
        assert!(pr > 6.0 && pr < 8.0, "Pr = {pr}");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn internal_energy_is_monotone(a in 250.0_f64..450.0, b in 250.0_f64..450.0) {
            let water = WaterTable::new();
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assume!(hi - lo > 1e-6);
            prop_assert!(water.internal_energy(lo).unwrap() < water.internal_energy(hi).unwrap());
        }

        #[test]
        fn temperature_inverts_internal_energy(t in 260.0_f64..440.0) {
            let water = WaterTable::new();
            let u = water.internal_energy(t).unwrap();
            prop_assert!((water.temperature(u).unwrap() - t).abs() < 1e-6);
        }
    }
}
