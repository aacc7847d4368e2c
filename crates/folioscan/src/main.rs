use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use folioscan::commands::{price_source, run_describe, run_frontier, run_search};
use folioscan::prompt::prompt_target;
use folioscan::report::{
    export_frontier_csv, write_describe_report, write_frontier_report, write_search_report,
};
use folioscan::{OutputFormat, RunConfig, init_logging};
use folioscan_core::RunControl;
use rand::Rng;

#[derive(Parser, Debug)]
#[command(name = "folioscan")]
#[command(about = "Random-sampling portfolio search over historical daily returns")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to the YAML run configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Random seed (overrides the configuration; random when unset)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Stop the run after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search random equal-weighted subsets for one that reaches a target return
    Search {
        /// Target cumulative growth factor (prompted for when neither this nor the config sets it)
        #[arg(short, long)]
        target: Option<f64>,
    },
    /// Sample random weight vectors and report the maximum-Sharpe allocation
    Frontier {
        /// Number of weight vectors to sample
        #[arg(short, long)]
        trials: Option<usize>,

        /// Write every trial to this CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Summarize the distribution of daily returns per asset and sector
    Describe,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    let mut config = RunConfig::load(args.config.as_deref()).wrap_err("Failed to load configuration")?;
    let seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(|| rand::rng().random());
    tracing::info!(seed, "folioscan starting");

    let mut control = RunControl::default();
    if let Some(secs) = args.timeout_secs.or(config.timeout_secs) {
        control = control.with_timeout(Duration::from_secs(secs));
    }

    let source = price_source(&config, seed)?;
    let mut stdout = io::stdout().lock();

    match args.command {
        Command::Search { target } => {
            let target = match target.or(config.search.target_cumulative_return) {
                Some(t) => t,
                None => prompt_target(&mut io::stdin().lock(), &mut stdout)?,
            };
            let report = run_search(&config, source.as_ref(), target, seed, &control)?;
            write_search_report(&mut stdout, &report, args.format)?;
        }
        Command::Frontier { trials, export } => {
            if let Some(trials) = trials {
                config.frontier.trials = trials;
            }
            let report = run_frontier(&config, source.as_ref(), seed, &control)?;
            write_frontier_report(&mut stdout, &report, args.format)?;
            if let Some(path) = export.or_else(|| config.frontier.export_csv.clone()) {
                export_frontier_csv(&path, &report)?;
            }
        }
        Command::Describe => {
            let report = run_describe(&config, source.as_ref())?;
            write_describe_report(&mut stdout, &report, args.format)?;
        }
    }

    tracing::info!("folioscan finished");
    Ok(())
}
