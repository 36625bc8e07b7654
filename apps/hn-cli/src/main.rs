use clap::{Parser, Subcommand};
use hn_sim::{SimResult, SimulationReport, Simulation, load_yaml};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "heatnet CLI - district heating network simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a scenario parses, connects and has a valid zone tree
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Run a scenario
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Override the number of steps
        #[arg(long)]
        steps: Option<usize>,
        /// Override the step length in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// With --json, print every step instead of the summary
        #[arg(long, requires = "json")]
        full: bool,
    },
}

#[derive(Serialize)]
struct RunSummary<'a> {
    name: &'a str,
    steps: usize,
    total_iterations: usize,
    min_consumer_scale: f64,
    final_time_s: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            steps,
            dt,
            json,
            full,
        } => cmd_run(&scenario_path, steps, dt, json, full),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn cmd_validate(scenario_path: &Path) -> SimResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_yaml(scenario_path)?;
    let sim = Simulation::from_scenario(&scenario)?;
    let network = sim.network();
    println!("✓ Scenario '{}' is valid", scenario.name);
    println!(
        "  {} assets, {} nodes, {} unknowns",
        network.asset_count(),
        network.node_count(),
        network.num_unknowns()
    );
    for zone in sim.controller().zones() {
        println!(
            "  zone {}: {} consumers, {} producers, {} storages, factor {:.4}, pressure held by {}",
            zone.id,
            zone.consumers.len(),
            zone.producers.len(),
            zone.storages.len(),
            zone.factor,
            sim.controller().pressure_holder(zone.id).unwrap_or("-")
        );
    }
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    steps: Option<usize>,
    dt: Option<f64>,
    json: bool,
    full: bool,
) -> SimResult<()> {
    let mut scenario = load_yaml(scenario_path)?;
    if let Some(steps) = steps {
        scenario.simulation.steps = steps;
    }
    if let Some(dt) = dt {
        scenario.simulation.time_step_s = dt;
    }
    info!(scenario = %scenario.name, steps = scenario.simulation.steps, "starting run");

    let mut sim = Simulation::from_scenario(&scenario)?;
    let report = sim.run()?;

    let summary = summarize(&report, sim.time());
    match (json, full) {
        (true, true) => print_json(&report),
        (true, false) => print_json(&summary),
        _ => print_summary(&report, &summary),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: cannot encode output: {e}"),
    }
}

fn summarize(report: &SimulationReport, final_time_s: f64) -> RunSummary<'_> {
    RunSummary {
        name: &report.name,
        steps: report.steps.len(),
        total_iterations: report.total_iterations(),
        min_consumer_scale: report
            .steps
            .iter()
            .map(|s| s.dispatch.consumer_scale)
            .fold(1.0, f64::min),
        final_time_s,
    }
}

fn print_summary(report: &SimulationReport, summary: &RunSummary<'_>) {
    println!("✓ Simulation '{}' completed", summary.name);
    println!("  Steps: {}", summary.steps);
    println!("  Solver iterations: {}", summary.total_iterations);
    println!("  Lowest consumer supply fraction: {:.3}", summary.min_consumer_scale);
    println!("  Final time: {:.0} s", summary.final_time_s);
    if let Some(last) = report.last() {
        println!("  Last step:");
        for (name, state) in &last.assets {
            let t = state
                .temperature_k
                .iter()
                .map(|t| format!("{t:.2}"))
                .collect::<Vec<_>>()
                .join(" / ");
            println!("    {name:<16} {:<18} T[K] {t}", state.kind);
        }
    }
}
