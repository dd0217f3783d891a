use clap::Parser;
use rr_core::extremes::top_n_by_value;
use rr_core::zipf::{DEFAULT_EXPONENT, DEFAULT_MAX_ATTEMPTS};
use rr_core::{population, ZipfGenerator};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Seed generator: Zipf-distributed category popularity expanded into a
/// population of per-user membership records.
#[derive(Parser)]
#[command(name = "seedgen")]
struct Args {
    /// Number of distinct categories
    #[arg(long, default_value_t = 50)]
    categories: usize,

    /// Population the modal category is scaled to
    #[arg(long, default_value_t = 50_000)]
    population: u64,

    /// Number of user records in the seed
    #[arg(long, default_value_t = 100_000)]
    records: usize,

    /// Zipf exponent
    #[arg(long, default_value_t = DEFAULT_EXPONENT)]
    exponent: f64,

    /// RNG seed for the popularity draw
    #[arg(long, default_value_t = 22527)]
    rng_seed: u64,

    /// Give up after this many draws
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Seed output path
    #[arg(long, default_value = "zipf_50k_seed.json")]
    output: PathBuf,

    /// Also write the popularity mapping here
    #[arg(long)]
    popularity_output: Option<PathBuf>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BoxError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file =
        File::create(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.population > args.records as u64 {
        tracing::warn!(
            population = args.population,
            records = args.records,
            "population exceeds record count, popular categories will saturate"
        );
    }

    let mut gen =
        ZipfGenerator::new(args.exponent, args.rng_seed)?.with_max_attempts(args.max_attempts);
    let popularity = gen.generate(args.categories, args.population)?;

    tracing::info!(
        categories = popularity.len(),
        exponent = gen.exponent(),
        total = popularity.values().sum::<u64>(),
        top = ?top_n_by_value(popularity.iter(), 5),
        "popularity generated"
    );

    if let Some(path) = &args.popularity_output {
        write_json(path, &popularity)?;
        tracing::info!(path = %path.display(), "popularity written");
    }

    let seed = population::build(args.records, &popularity);
    write_json(&args.output, &seed)?;

    tracing::info!(
        records = seed.len(),
        categories = seed.num_categories(),
        path = %args.output.display(),
        "seed written"
    );
    Ok(())
}
