//! SI quantities used when assets are parameterised.
//!
//! Equations work on raw `f64` in base SI units; these `uom` types only
//! appear at construction boundaries so that `degc(70.0)` and `k(343.15)`
//! cannot be confused.

use uom::si::f64 as si;

pub type Length = si::Length;
pub type MassRate = si::MassRate;
pub type Power = si::Power;
pub type Pressure = si::Pressure;
pub type Temperature = si::ThermodynamicTemperature;

macro_rules! constructor {
    ($(#[$meta:meta])* $fn_name:ident -> $ty:ident, $unit:ty) => {
        $(#[$meta])*
        #[inline]
        pub fn $fn_name(v: f64) -> $ty {
            $ty::new::<$unit>(v)
        }
    };
}

constructor!(pa -> Pressure, uom::si::pressure::pascal);
constructor!(bar -> Pressure, uom::si::pressure::bar);
constructor!(k -> Temperature, uom::si::thermodynamic_temperature::kelvin);
constructor!(
    /// Absolute temperature from degrees Celsius.
    degc -> Temperature,
    uom::si::thermodynamic_temperature::degree_celsius
);
constructor!(kgps -> MassRate, uom::si::mass_rate::kilogram_per_second);
constructor!(m -> Length, uom::si::length::meter);
constructor!(w -> Power, uom::si::power::watt);

pub mod constants {
    /// 0 °C in kelvin.
    pub const ZERO_CELSIUS_K: f64 = 273.15;
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::constants::ZERO_CELSIUS_K;

    #[test]
    fn boundary_quantities_hold_base_si() {
        assert!((degc(70.0).value - (ZERO_CELSIUS_K + 70.0)).abs() < 1e-9);
        assert!((bar(2.0).value - pa(2.0e5).value).abs() < 1e-9);
        assert_eq!(kgps(-10.0).value, -10.0);
        assert_eq!(m(0.1).value, 0.1);
        assert_eq!(w(1.0e6).value, 1.0e6);
        assert_eq!(k(293.15).value, 293.15);
    }
}
