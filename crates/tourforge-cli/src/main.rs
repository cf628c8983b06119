//! tourforge CLI: optimize a closed tour through a TSPLIB point file.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tourforge::console::{self, Output};
use tourforge::{
    parse_duration_ms, total_distance, tsplib, MechanismKind, Point, RunReport, SolverConfig,
    SolverEvent, SolverManager, StartRequest,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tourforge")]
#[command(about = "Parallel PMX / 3-opt tour optimizer")]
#[command(version)]
struct Cli {
    /// Point file (TSPLIB NODE_COORD_SECTION or plain `id x y` rows)
    points_file: PathBuf,

    /// Run configuration (TOML, or YAML by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker mechanism: tasks or threads
    #[arg(short, long)]
    mechanism: Option<MechanismKind>,

    /// Number of workers per phase
    #[arg(short, long)]
    workers: Option<usize>,

    /// Recombination phase timeout (e.g. 500ms, 2s, 1m)
    #[arg(long, value_parser = parse_duration_arg)]
    first_phase: Option<u64>,

    /// Local search phase timeout (e.g. 500ms, 2s, 1m)
    #[arg(long, value_parser = parse_duration_arg)]
    second_phase: Option<u64>,

    /// Last epoch to run
    #[arg(short, long)]
    epochs: Option<u64>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print events and the final tour as JSON lines
    #[arg(long)]
    json: bool,
}

fn parse_duration_arg(s: &str) -> Result<u64, String> {
    parse_duration_ms(s).map_err(|e| e.to_string())
}

/// Final line of `--json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    best_distance: f64,
    epochs_completed: u64,
    solutions: u64,
    cancelled: bool,
    points: &'a [Point],
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    console::init_with(if cli.json {
        Output::Stderr
    } else {
        Output::Stdout
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = build_config(cli)?;
    let points = tsplib::read_points(&cli.points_file)?;
    info!(
        event = "points_loaded",
        file = %cli.points_file.display(),
        points = points.len(),
        distance = total_distance(&points),
    );

    let mut job = SolverManager::new().start(StartRequest::from_config(&config, points))?;
    while let Some(event) = job.next_event() {
        if cli.json {
            println!("{}", serde_json::to_string(&event)?);
        } else if let SolverEvent::BestRoute(update) = &event {
            info!(event = "best_route_received", distance = update.distance());
        }
    }
    let report = job.join()?;

    if cli.json {
        print_json(&report)?;
    } else {
        print_tour(&report);
    }
    Ok(())
}

/// Loads the configuration file, then applies flag overrides.
fn build_config(cli: &Cli) -> Result<SolverConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SolverConfig::default(),
    };

    if let Some(mechanism) = cli.mechanism {
        config = config.with_mechanism(mechanism);
    }
    if let Some(workers) = cli.workers {
        config = config.with_mechanisms_engaged(workers);
    }
    if let Some(first) = cli.first_phase {
        config.first_phase_timeout_ms = first;
    }
    if let Some(second) = cli.second_phase {
        config.second_phase_timeout_ms = second;
    }
    if let Some(epochs) = cli.epochs {
        config.max_epochs = epochs;
    }
    if let Some(seed) = cli.seed {
        config = config.with_random_seed(seed);
    }

    config.validate()?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<SolverConfig, Box<dyn Error>> {
    Ok(SolverConfig::load(path)?)
}

fn print_json(report: &RunReport) -> Result<(), Box<dyn Error>> {
    let summary = Summary {
        best_distance: report.best_distance,
        epochs_completed: report.epochs_completed,
        solutions: report.solutions,
        cancelled: report.cancelled,
        points: &report.best,
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn print_tour(report: &RunReport) {
    println!();
    println!("Best tour");
    println!("=========");
    println!("Distance:     {:.4}", report.best_distance);
    println!("Epochs:       {}", report.epochs_completed);
    println!("Solutions:    {}", report.solutions);
    println!("Timeouts:     {}", report.phase_timeouts);
    println!();
    for (i, point) in report.best.iter().enumerate() {
        println!("{:>6} {:>14.4} {:>14.4}", i + 1, point.x, point.y);
    }
}
