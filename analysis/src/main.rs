use clap::{ArgGroup, Parser};
use driverbench_analysis::{BarChart, BenchmarkResultSet, ChartConfig, ChartError, Selection};
use driverbench_ingest::ResultRecord;
use driverbench_runner::space::Workload;
use std::{
    fs,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Draw a bar chart comparing drivers
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["config", "records"])))]
struct Args {
    /// YAML file with `title` and `results` (driver -> milliseconds)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON lines written by driverbench-ingest
    #[arg(short, long, requires_all = ["workload", "concurrency", "tasks"])]
    records: Option<PathBuf>,
    #[arg(long, value_enum)]
    workload: Option<Workload>,
    #[arg(long)]
    concurrency: Option<u32>,
    #[arg(long)]
    tasks: Option<u64>,
    /// Overrides the title of the chart
    #[arg(long)]
    title: Option<String>,
    #[arg(short, long, default_value = "chart.svg")]
    output: PathBuf,
}

fn load_records(path: &Path) -> Result<Vec<ResultRecord>, ChartError> {
    fs::read_to_string(path)?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ChartError::from))
        .collect()
}

fn run(args: Args) -> Result<(), ChartError> {
    let (results, title) = match (args.config, args.records) {
        (Some(config), _) => {
            let config = ChartConfig::load(&config)?;

            (config.result_set()?, config.title)
        }
        (None, Some(records)) => {
            let selection = Selection::from_parts(args.workload, args.concurrency, args.tasks)?;

            (
                BenchmarkResultSet::from_records(&load_records(&records)?, &selection),
                selection.title(),
            )
        }
        (None, None) => return Err(ChartError::MissingSource),
    };

    let title = args.title.unwrap_or(title);

    BarChart::default().save(&results, &title, &args.output)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
