use clap::Parser;
use driverbench_ingest::{parse, reconcile};
use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Turn dispatch output into JSON lines, one per run that reported a time
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Dispatch log, stdin if omitted
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Also list the runs that never reported a time
    #[arg(long)]
    reconcile: bool,
}

fn read_input(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;

            Ok(buffer)
        }
    }
}

fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let text = read_input(args.input.as_ref())?;
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    if args.reconcile {
        let reconciliation = reconcile(&text);

        for record in reconciliation.completed.iter() {
            writeln!(stdout, "{}", serde_json::to_string(record)?)?;
        }

        for error in reconciliation.errors.iter() {
            error!("{error}");
        }

        info!(
            "{} runs completed, {} without benchmark time, {} malformed",
            reconciliation.completed.len(),
            reconciliation.missing.len(),
            reconciliation.errors.len()
        );

        return Ok(reconciliation.is_complete());
    }

    let mut clean = true;

    for record in parse(&text) {
        match record {
            Ok(record) => writeln!(stdout, "{}", serde_json::to_string(&record)?)?,
            Err(e) => {
                error!("{e}");
                clean = false;
            }
        }
    }

    Ok(clean)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
