use clap::{Parser, Subcommand};
use driverbench_runner::{
    config::{BenchConfig, ConfigErrors},
    estimate::{CostEstimator, Projection, SpeedCoefficients},
    executors::Executors,
    plan::RunPlan,
};
use std::{io, path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every planned benchmark, tags and runner output go to stdout
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Only print the execution tags of the plan
        #[arg(long)]
        dry_run: bool,
    },
    /// Estimate how long the whole plan takes
    Estimate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn load(path: &PathBuf) -> Result<BenchConfig, ConfigErrors> {
    let config = BenchConfig::load(path)?;

    if config.preflight_checks() {
        return Err(ConfigErrors::FailedPreflight);
    }

    Ok(config)
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Run { config, dry_run } => {
            let config = load(&config)?;

            if !dry_run {
                config.check_runners()?;
            }

            let estimator = CostEstimator::from(&config.estimate);
            let plan = RunPlan::new(
                &estimator,
                config.space()?.configurations(),
                &config.drivers,
                config.samples,
            );
            info!("Planned {} runs", plan.len());

            let stdout = io::stdout();
            let summary = Executors::load(&config, dry_run).execute(&plan, &mut stdout.lock())?;

            if summary.failed > 0 {
                info!(
                    "{} runs failed, use driverbench-ingest --reconcile to list them",
                    summary.failed
                );
            }
        }
        Command::Estimate { config } => {
            let config = load(&config)?;
            let estimator = CostEstimator::from(&config.estimate);
            let plan = RunPlan::new(
                &estimator,
                config.space()?.configurations(),
                &config.drivers,
                config.samples,
            );
            let projection = Projection::new(
                &estimator,
                &plan,
                &SpeedCoefficients::from_baseline(&config.estimate.baseline),
                config.restart_overhead(),
            );

            println!("Number of configurations: {}", projection.configurations);
            println!("Number of runs: {}", projection.runs);
            println!("total_time: {:.2} hours", projection.hours());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // stdout is reserved for the dispatch stream
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse().command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
