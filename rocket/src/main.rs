//! Flies a thrust-vector-controlled rocket from a scenario file (or the built-in demo vehicle) and
//! prints the flight as CSV.
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tvc_rocket::{CsvPlotter, HistoryPlotter, PrintType, ScenarioConfig};

/// Rigid-body flight simulator for a gimballed model rocket
#[derive(Parser)]
#[command(name = "tvc-rocket")]
#[command(version)]
struct Cli {
    /// Scenario JSON file (defaults to the built-in demo vehicle)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the flight duration in seconds
    #[arg(long)]
    t_final: Option<f64>,

    /// Override the time step in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Write the CSV history here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every n-th sample
    #[arg(short, long)]
    print_interval: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut scenario = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            ScenarioConfig::from_json_str(&text)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => {
            info!("no scenario given, flying the demo vehicle");
            ScenarioConfig::demo()
        }
    };
    if let Some(t_final) = cli.t_final {
        scenario.simulation.t_final = t_final;
    }
    if let Some(dt) = cli.dt {
        scenario.simulation.dt = dt;
    }
    let interval = cli.print_interval.unwrap_or(scenario.print.interval);

    let mut ctx = scenario.assemble().context("assembling vehicle")?;
    let history = tvc_rocket::run(&mut ctx).context("flight aborted")?;

    let print_type = if interval <= 1 {
        PrintType::All
    } else {
        PrintType::Every(interval)
    };
    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output {}", path.display()))?;
            CsvPlotter::new(BufWriter::new(file), print_type).plot(&history)?;
            info!(path = %path.display(), rows = history.len(), "history written");
        }
        None => CsvPlotter::new(io::stdout().lock(), print_type).plot(&history)?,
    }
    Ok(())
}
