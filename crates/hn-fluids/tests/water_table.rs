use approx::assert_relative_eq;
use hn_fluids::{FluidProperties, WaterTable};
use std::sync::Arc;

#[test]
fn usable_as_shared_trait_object() {
    let fluid: Arc<dyn FluidProperties> = Arc::new(WaterTable::new());
    let handle = Arc::clone(&fluid);
    let rho = std::thread::spawn(move || handle.density(333.15).unwrap())
        .join()
        .unwrap();
    assert_relative_eq!(rho, 983.20, epsilon = 1e-9);
    assert_eq!(fluid.name(), "water");
}

#[test]
fn heating_by_delta_u_raises_temperature_by_expected_amount() {
    let water = WaterTable::new();
    let cold = 323.15;
    let u_cold = water.internal_energy(cold).unwrap();
    let cp = water.heat_capacity(cold).unwrap();
    let hot = water.temperature(u_cold + cp * 5.0).unwrap();
    assert!((hot - cold - 5.0).abs() < 0.01, "dT = {}", hot - cold);
}
