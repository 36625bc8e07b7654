//! YAML scenario files.
//!
//! A scenario lists assets with their parameters, junctions joining asset
//! ports, controller data for producers and consumers, and run settings.
//! Quantities carry their SI unit in the field name.

use std::path::Path;
use std::sync::Arc;

use hn_components::{
    AssetKind, Buffer, HeatBoundary, HeatTransfer, HeatTransferKind, Pipe, PressureBoundary,
};
use hn_controls::ControlMetadata;
use hn_core::Real;
use hn_core::units::{k, kgps, m, pa, w};
use hn_fluids::{FluidProperties, WaterTable};
use hn_graph::Network;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidChoice {
    #[default]
    Water,
}

impl FluidChoice {
    pub fn properties(self) -> Arc<dyn FluidProperties> {
        match self {
            FluidChoice::Water => Arc::new(WaterTable::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub fluid: FluidChoice,
    /// Temperature of freshly created junctions (kelvin)
    #[serde(default = "default_initial_temperature")]
    pub initial_temperature_k: Real,
    #[serde(default)]
    pub assets: Vec<AssetDef>,
    #[serde(default)]
    pub junctions: Vec<JunctionDef>,
    #[serde(default)]
    pub control: ControlMetadata,
}

fn default_initial_temperature() -> Real {
    293.15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: AssetKindDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetKindDef {
    /// Exactly one of `pressure_pa` and `mass_flow_kg_s` must be given.
    PressureBoundary {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pressure_pa: Option<Real>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mass_flow_kg_s: Option<Real>,
        temperature_k: Real,
    },
    Producer {
        temperature_in_k: Real,
        temperature_out_k: Real,
        #[serde(default = "default_return_pressure")]
        return_pressure_pa: Real,
        #[serde(default = "default_supply_pressure")]
        supply_pressure_pa: Real,
    },
    Consumer {
        temperature_in_k: Real,
        temperature_out_k: Real,
    },
    Pipe {
        length_m: Real,
        diameter_m: Real,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        roughness_m: Option<Real>,
        #[serde(default)]
        zeta: Real,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ambient_temperature_k: Option<Real>,
        /// Wall heat-transfer coefficient [W/(m²·K)]; no heat loss when zero.
        #[serde(default)]
        wall_htc: Real,
        #[serde(default)]
        fluid_side_resistance: bool,
    },
    Buffer {
        volume_m3: Real,
        max_power_w: Real,
        temperature_in_k: Real,
        temperature_out_k: Real,
        #[serde(default = "default_fill_level")]
        fill_level: Real,
    },
    HeatExchanger {
        efficiency: Real,
        #[serde(flatten)]
        sides: HeatTransferSides,
    },
    HeatPump {
        cop: Real,
        #[serde(flatten)]
        sides: HeatTransferSides,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatTransferSides {
    pub temperature_in_primary_k: Real,
    pub temperature_out_primary_k: Real,
    pub temperature_in_secondary_k: Real,
    pub temperature_out_secondary_k: Real,
    #[serde(default = "default_supply_pressure")]
    pub pressure_setpoint_pa: Real,
    #[serde(default = "default_primary_mass_flow")]
    pub default_primary_mass_flow_kg_s: Real,
}

fn default_return_pressure() -> Real {
    1.0e5
}

fn default_supply_pressure() -> Real {
    2.0e5
}

fn default_fill_level() -> Real {
    0.5
}

fn default_primary_mass_flow() -> Real {
    1.0
}

/// One asset port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub asset: String,
    pub cp: usize,
}

/// Ports sharing one hydraulic junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ports: Vec<PortRef>,
    /// Geodetic height of the junction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_m: Option<Real>,
    /// Temperature held while no flow passes; defaults to the initial temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_k: Option<Real>,
}

impl AssetKindDef {
    pub fn build(&self) -> SimResult<AssetKind> {
        let kind = match self {
            AssetKindDef::PressureBoundary {
                pressure_pa,
                mass_flow_kg_s,
                temperature_k,
            } => match (pressure_pa, mass_flow_kg_s) {
                (Some(p), None) => AssetKind::PressureBoundary(PressureBoundary::with_pressure(
                    pa(*p),
                    k(*temperature_k),
                )),
                (None, Some(q)) => AssetKind::PressureBoundary(PressureBoundary::with_mass_flow(
                    kgps(*q),
                    k(*temperature_k),
                )),
                _ => {
                    return Err(SimError::InvalidArg {
                        what: "pressure boundary needs exactly one of pressure_pa and mass_flow_kg_s",
                    });
                }
            },
            AssetKindDef::Producer {
                temperature_in_k,
                temperature_out_k,
                return_pressure_pa,
                supply_pressure_pa,
            } => AssetKind::HeatBoundary(
                HeatBoundary::producer(k(*temperature_in_k), k(*temperature_out_k))
                    .with_pressures(pa(*return_pressure_pa), pa(*supply_pressure_pa)),
            ),
            AssetKindDef::Consumer {
                temperature_in_k,
                temperature_out_k,
            } => AssetKind::HeatBoundary(HeatBoundary::consumer(
                k(*temperature_in_k),
                k(*temperature_out_k),
            )),
            AssetKindDef::Pipe {
                length_m,
                diameter_m,
                roughness_m,
                zeta,
                ambient_temperature_k,
                wall_htc,
                fluid_side_resistance,
            } => {
                if *length_m <= 0.0 || *diameter_m <= 0.0 {
                    return Err(SimError::InvalidArg {
                        what: "pipe length and diameter must be positive",
                    });
                }
                let mut pipe = Pipe::new(m(*length_m), m(*diameter_m))
                    .with_zeta(*zeta)
                    .with_fluid_side_resistance(*fluid_side_resistance);
                if let Some(r) = roughness_m {
                    pipe = pipe.with_roughness(m(*r));
                }
                if *wall_htc > 0.0 {
                    let ambient = ambient_temperature_k.unwrap_or(pipe.ambient_temperature);
                    pipe = pipe.with_heat_loss(k(ambient), *wall_htc);
                }
                AssetKind::Pipe(pipe)
            }
            AssetKindDef::Buffer {
                volume_m3,
                max_power_w,
                temperature_in_k,
                temperature_out_k,
                fill_level,
            } => {
                if *volume_m3 <= 0.0 {
                    return Err(SimError::InvalidArg {
                        what: "buffer volume must be positive",
                    });
                }
                AssetKind::Buffer(
                    Buffer::new(*volume_m3, w(*max_power_w), k(*temperature_in_k), k(*temperature_out_k))
                        .with_fill_level(*fill_level),
                )
            }
            AssetKindDef::HeatExchanger { efficiency, sides } => {
                if *efficiency <= 0.0 {
                    return Err(SimError::InvalidArg {
                        what: "heat exchanger efficiency must be positive",
                    });
                }
                sides.build(HeatTransferKind::Exchanger {
                    efficiency: *efficiency,
                })
            }
            AssetKindDef::HeatPump { cop, sides } => {
                if *cop <= 1.0 {
                    return Err(SimError::InvalidArg {
                        what: "heat pump COP must exceed one",
                    });
                }
                sides.build(HeatTransferKind::HeatPump { cop: *cop })
            }
        };
        Ok(kind)
    }
}

impl HeatTransferSides {
    fn build(&self, kind: HeatTransferKind) -> AssetKind {
        AssetKind::HeatTransfer(
            HeatTransfer::new(
                kind,
                (k(self.temperature_in_primary_k), k(self.temperature_out_primary_k)),
                (k(self.temperature_in_secondary_k), k(self.temperature_out_secondary_k)),
            )
            .with_pressure_setpoint(pa(self.pressure_setpoint_pa))
            .with_default_primary_mass_flow(kgps(self.default_primary_mass_flow_kg_s)),
        )
    }
}

impl Scenario {
    pub fn from_yaml_str(content: &str) -> SimResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.simulation.validate()?;
        Ok(scenario)
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Register every asset and join the ports of every junction.
    pub fn build_network(&self) -> SimResult<Network> {
        let mut network =
            Network::new(self.fluid.properties()).with_default_temperature(self.initial_temperature_k);
        for def in &self.assets {
            network.add_asset(def.name.as_str(), def.kind.build()?)?;
        }
        for (j, junction) in self.junctions.iter().enumerate() {
            let Some((first, rest)) = junction.ports.split_first() else {
                return Err(SimError::Scenario {
                    what: format!("junction {j} has no ports"),
                });
            };
            if rest.is_empty() {
                return Err(SimError::Scenario {
                    what: format!("junction {j} joins a single port"),
                });
            }
            for port in rest {
                network.connect(&first.asset, first.cp, &port.asset, port.cp)?;
            }
        }
        // later junctions may merge nodes, so attributes go on afterwards
        for junction in &self.junctions {
            if junction.height_m.is_none() && junction.temperature_k.is_none() {
                continue;
            }
            let Some(port) = junction.ports.first() else {
                continue;
            };
            let asset = network.asset_id(&port.asset)?;
            let Some(id) = network.node_of(asset, port.cp)? else {
                continue;
            };
            let node = network.node_mut(id)?;
            if let Some(height) = junction.height_m {
                node.set_height(height);
            }
            if let Some(temperature) = junction.temperature_k {
                node.set_temperature(temperature);
            }
        }
        if !network.check_connectivity() {
            return Err(SimError::Scenario {
                what: "every asset port must belong to a junction".to_string(),
            });
        }
        debug!(
            scenario = %self.name,
            assets = network.asset_count(),
            nodes = network.node_count(),
            "network built"
        );
        Ok(network)
    }
}

/// Read and parse a scenario file.
pub fn load_yaml(path: &Path) -> SimResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    Scenario::from_yaml_str(&content)
}
