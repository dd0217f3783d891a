mod config;
mod output;
mod runner;

use clap::Parser;
use config::Config;
use output::BoxError;
use rr_core::{MechanismKind, RrParams};
use runner::RunPlan;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Randomized-response simulation: perturb a seed population with each
/// mechanism and write the aggregated frequencies.
#[derive(Parser)]
#[command(name = "simulator")]
struct Args {
    /// Path to the seed JSON file
    #[arg(long)]
    seed: PathBuf,

    /// Truth-telling probability (fox)
    #[arg(long)]
    q: f64,

    /// Lie / flip probability
    #[arg(long)]
    r: f64,

    /// Max zero-valued categories randomized per record (fixed)
    #[arg(long)]
    tau: usize,

    /// Run counter; the RNG seed is base_seed + run
    #[arg(long)]
    run: u64,

    /// Optional TOML config file
    #[arg(long, default_value = "simulation.toml")]
    config: PathBuf,

    /// Override the results directory
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Override the base RNG seed
    #[arg(long)]
    base_seed: Option<u64>,

    /// Restrict to these mechanisms (repeatable)
    #[arg(long = "mechanism")]
    mechanisms: Vec<MechanismKind>,
}

fn load_config(path: &Path) -> Result<Config, BoxError> {
    if path.exists() {
        Config::load(path).map_err(|e| format!("failed to load {}: {e}", path.display()).into())
    } else {
        Ok(Config::default_config())
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    // Config decides the log format, so it is loaded before tracing exists.
    let config = load_config(&args.config)?;
    init_tracing(config.logging.json);

    let sim = config.simulation;
    let plan = RunPlan {
        seed: Arc::new(output::read_seed(&args.seed)?),
        params: RrParams::new(args.q, args.r, args.tau),
        run: args.run,
        base_seed: args.base_seed.unwrap_or(sim.base_seed),
        results_dir: args.results_dir.unwrap_or(sim.results_dir),
        mechanisms: if args.mechanisms.is_empty() {
            sim.mechanisms
        } else {
            args.mechanisms
        },
        replicate_fixed_last_value: sim.replicate_fixed_last_value,
    };

    tracing::info!(
        seed = %args.seed.display(),
        records = plan.seed.len(),
        categories = plan.seed.num_categories(),
        q = plan.params.q,
        r = plan.params.r,
        tau = plan.params.tau,
        run = plan.run,
        rng_seed = plan.rng_seed(),
        mechanisms = ?plan.mechanisms,
        "simulation starting"
    );

    match runner::run_all(plan).await {
        Ok(outcomes) => {
            tracing::info!(written = outcomes.len(), "simulation finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            Err(e)
        }
    }
}
