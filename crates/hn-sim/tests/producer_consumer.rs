//! Whole-run checks on small scenarios.

use approx::assert_relative_eq;
use hn_fluids::{FluidProperties, WaterTable};
use hn_sim::{Scenario, SimError, Simulation};

const LOOP: &str = r#"
name: loop
simulation:
  time_step_s: 600
  steps: 3
assets:
  - name: plant
    type: producer
    temperature_in_k: 313.15
    temperature_out_k: 353.15
    return_pressure_pa: 1.0e5
    supply_pressure_pa: 3.0e5
  - name: house
    type: consumer
    temperature_in_k: 313.15
    temperature_out_k: 353.15
  - name: supply
    type: pipe
    length_m: 500
    diameter_m: 0.1
    wall_htc: 1.0
    ambient_temperature_k: 283.15
  - name: return
    type: pipe
    length_m: 500
    diameter_m: 0.1
junctions:
  - ports: [{asset: plant, cp: 1}, {asset: supply, cp: 0}]
  - ports: [{asset: supply, cp: 1}, {asset: house, cp: 1}]
  - ports: [{asset: house, cp: 0}, {asset: return, cp: 0}]
  - ports: [{asset: return, cp: 1}, {asset: plant, cp: 0}]
control:
  producers:
    plant: {power: 2.0e6, priority: 0}
  consumers:
    house:
      profile: {times: [0, 3600], values: [5.0e5, 1.0e6]}
"#;

#[test]
fn loop_follows_the_demand_profile() {
    let scenario = Scenario::from_yaml_str(LOOP).unwrap();
    let mut sim = Simulation::from_scenario(&scenario).unwrap();
    let report = sim.run().unwrap();
    assert_eq!(report.steps.len(), 3);
    assert!(sim.is_finished());
    assert_relative_eq!(sim.time(), 1800.0);

    let water = WaterTable::new();
    let du = water.internal_energy(353.15).unwrap() - water.internal_energy(313.15).unwrap();
    for record in &report.steps {
        let demand = 5.0e5 + 5.0e5 * record.time_s / 3600.0;
        assert_relative_eq!(record.dispatch.demand, demand, max_relative = 1e-12);
        assert_relative_eq!(record.dispatch.consumer_scale, 1.0);

        let house = &record.assets["house"];
        assert_eq!(house.kind, "consumer");
        assert_relative_eq!(house.mass_flow_kg_s[1], -demand / du, max_relative = 1e-9);
        let plant = &record.assets["plant"];
        assert_relative_eq!(plant.mass_flow_kg_s[1], demand / du, max_relative = 1e-9);
        assert_relative_eq!(plant.pressure_pa[1], 3.0e5, max_relative = 1e-9);

        // heat loss on the supply line only
        assert!(house.temperature_k[1] < 353.15);
        assert!(record.iterations >= 1);
    }
}

#[test]
fn undersized_plant_curtails() {
    let scenario = Scenario::from_yaml_str(&LOOP.replace("power: 2.0e6", "power: 2.5e5")).unwrap();
    let mut sim = Simulation::from_scenario(&scenario).unwrap();
    let record = sim.step().unwrap();
    assert_relative_eq!(record.dispatch.consumer_scale, 0.5);
    assert_relative_eq!(record.dispatch.served, 2.5e5);
    assert_eq!(sim.steps_taken(), 1);
}

#[test]
fn missing_consumer_profile_is_fatal() {
    let yaml = LOOP.replace("    house:\n      profile", "    villa:\n      profile");
    let scenario = Scenario::from_yaml_str(&yaml).unwrap();
    let err = Simulation::from_scenario(&scenario).unwrap_err();
    assert!(matches!(err, SimError::Control(_)), "{err}");
    assert!(err.to_string().contains("house"));
}

const STORAGE: &str = r#"
name: storage
simulation:
  time_step_s: 900
  steps: 2
assets:
  - name: plant
    type: producer
    temperature_in_k: 313.15
    temperature_out_k: 353.15
  - name: house
    type: consumer
    temperature_in_k: 313.15
    temperature_out_k: 353.15
  - name: tank
    type: buffer
    volume_m3: 100
    max_power_w: 2.0e5
    temperature_in_k: 313.15
    temperature_out_k: 353.15
    fill_level: 0.2
junctions:
  - ports: [{asset: plant, cp: 1}, {asset: house, cp: 1}, {asset: tank, cp: 1}]
  - ports: [{asset: plant, cp: 0}, {asset: house, cp: 0}, {asset: tank, cp: 0}]
control:
  producers:
    plant: {power: 1.0e6, priority: 0}
  consumers:
    house:
      profile: {times: [0], values: [9.0e5]}
"#;

#[test]
fn surplus_charges_the_tank() {
    let scenario = Scenario::from_yaml_str(STORAGE).unwrap();
    let mut sim = Simulation::from_scenario(&scenario).unwrap();
    let report = sim.run().unwrap();

    let first = &report.steps[0];
    assert_relative_eq!(first.dispatch.storage, -1.0e5, max_relative = 1e-12);
    let tank = &first.assets["tank"];
    assert!(tank.mass_flow_kg_s[1] < 0.0, "hot side takes water in");
    let fill = tank.fill_level.unwrap();
    assert!(fill > 0.2, "fill level {fill}");

    let second = report.last().unwrap().assets["tank"].fill_level.unwrap();
    assert!(second > fill);
}
