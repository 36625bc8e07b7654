//! The shipped demo scenarios stay loadable.

use std::path::PathBuf;

use approx::assert_relative_eq;
use hn_sim::{Simulation, load_yaml};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn heat_pump_demo_builds_two_zones() {
    let scenario = load_yaml(&demo("two_zone_heat_pump.yaml")).unwrap();
    assert_eq!(scenario.simulation.steps, 6);

    let sim = Simulation::from_scenario(&scenario).unwrap();
    let ctl = sim.controller();
    assert_eq!(ctl.zones().len(), 2);
    assert_eq!(ctl.pressure_holder(0), Some("plant"));
    assert_eq!(ctl.pressure_holder(1), Some("hp"));
    assert_eq!(ctl.storages().len(), 1);
    assert_eq!(ctl.storages()[0].zone, 0);
    assert_relative_eq!(ctl.zones()[1].factor, 0.75);
    assert_eq!(ctl.zones()[1].path, vec![1, 0]);
}

#[test]
fn report_serializes_to_json() {
    let scenario = load_yaml(&demo("two_zone_heat_pump.yaml")).unwrap();
    let sim = Simulation::from_scenario(&scenario).unwrap();
    let text = serde_json::to_string(&hn_sim::SimulationReport {
        name: sim.name().to_string(),
        steps: Vec::new(),
    })
    .unwrap();
    assert!(text.contains("two_zone_heat_pump"));
}
