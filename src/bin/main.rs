//! tablesample CLI - sample rows from local table files
//!
//! Usage:
//!   tablesample sample [--table <name> | <files>...] [--query <expr>] [--limit <n>]
//!   tablesample columns [--table <name> | <files>...]
//!   tablesample services
//!
//! Examples:
//!   tablesample sample data/part-0.jsonl data/part-1.jsonl --percentage 20 --seed 7
//!   tablesample sample --table orders --query "status = 'open'"
//!   tablesample columns --table orders

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tablesample::config::{ProfileSample, ProfileSampleType, SampleConfig, Settings};
use tablesample::sampler::Sampler;
use tablesample::service_spec;
use tablesample::source::{EntityRef, JsonFileSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tablesample")]
#[command(about = "tablesample - partition-aware row sampling for data profiling")]
#[command(version)]
struct Cli {
    /// Path to a settings file (defaults to TABLESAMPLE_CONFIG, then ./tablesample.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sample rows as JSON
    Sample {
        #[command(flatten)]
        table: TableArgs,

        /// Materialize the statistical sample instead of the cached frames
        #[arg(long)]
        statistical: bool,
    },

    /// Print the inferred column descriptors as JSON
    Columns {
        #[command(flatten)]
        table: TableArgs,
    },

    /// List known service types and how they are sampled
    Services,
}

#[derive(Args)]
struct TableArgs {
    /// Table from the settings file
    #[arg(short, long, conflicts_with = "files")]
    table: Option<String>,

    /// Files to read, one frame per file (.json, .jsonl)
    files: Vec<PathBuf>,

    /// Filter expression applied to every frame
    #[arg(short, long)]
    query: Option<String>,

    /// Sample this percentage of each frame
    #[arg(long, conflicts_with = "rows")]
    percentage: Option<f64>,

    /// Sample this many rows across all frames
    #[arg(long)]
    rows: Option<u64>,

    /// Maximum rows to print
    #[arg(short, long)]
    limit: Option<usize>,

    /// Seed for reproducible samples
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample { table, statistical } => cmd_sample(cli.config, table, statistical),
        Commands::Columns { table } => cmd_columns(cli.config, table),
        Commands::Services => cmd_services(),
    }
}

fn cmd_sample(config: Option<PathBuf>, args: TableArgs, statistical: bool) -> ExitCode {
    let mut sampler = match build_sampler(config, args) {
        Ok(sampler) => sampler,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let columns = sampler.describe_columns().to_vec();
    let result = if statistical {
        sampler
            .select_sample(false)
            .and_then(|frames| sampler.materialize(&frames, Some(&columns)))
    } else {
        sampler.fetch_sample_data(Some(&columns))
    };

    match result {
        Ok(data) => print_json(&data),
        Err(e) => {
            eprintln!("Sampling error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_columns(config: Option<PathBuf>, args: TableArgs) -> ExitCode {
    match build_sampler(config, args) {
        Ok(sampler) => print_json(sampler.describe_columns()),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_services() -> ExitCode {
    println!("{:<12} {:<8} METADATA SOURCE", "SERVICE", "SAMPLER");
    for spec in service_spec::all() {
        println!(
            "{:<12} {:<8} {}",
            spec.service_type, spec.sampler, spec.metadata_source
        );
    }
    ExitCode::SUCCESS
}

fn build_sampler(config: Option<PathBuf>, args: TableArgs) -> Result<Sampler, String> {
    let settings = match &config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
    .map_err(|e| e.to_string())?;

    let (entity, paths, service_type, mut sample) = match &args.table {
        Some(name) => {
            let table = settings.get_table(name).map_err(|e| e.to_string())?;
            let paths = table.resolved_paths().map_err(|e| e.to_string())?;
            (
                EntityRef::table(name.as_str()),
                paths,
                table.service_type.clone(),
                table.sample.clone(),
            )
        }
        None if !args.files.is_empty() => (
            EntityRef::table("files"),
            args.files.clone(),
            "datalake".to_string(),
            SampleConfig::default(),
        ),
        None => return Err("pass --table or at least one file".to_string()),
    };

    let spec = service_spec::lookup(&service_type)
        .ok_or_else(|| format!("unknown service type '{}'", service_type))?;
    if !spec.uses_frames() {
        return Err(format!(
            "service type '{}' samples in SQL and cannot be read from files",
            spec.service_type
        ));
    }

    if let Some(query) = args.query {
        sample = sample.with_sample_query(query);
    }
    if let Some(percentage) = args.percentage {
        sample.profile_sample_type = ProfileSampleType::Percentage;
        sample.profile_sample = Some(ProfileSample::Number(percentage));
    }
    if let Some(rows) = args.rows {
        sample.profile_sample_type = ProfileSampleType::RowCount;
        sample.profile_sample = Some(ProfileSample::Number(rows as f64));
    }

    let mut builder = Sampler::builder(JsonFileSource::new(paths), entity, sample)
        .sample_limit(args.limit.unwrap_or(settings.sampler.sample_limit));
    if let Some(seed) = args.seed.or(settings.sampler.seed) {
        builder = builder.seed(seed);
    }
    builder.build().map_err(|e| e.to_string())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
