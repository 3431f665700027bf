mod local;

pub use local::LocalExecutor;

use crate::{config::BenchConfig, plan::RunPlan, tag::ExecutionTag};
use std::io::Write;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Failed to write to the dispatch output")]
    Output(#[from] std::io::Error),
    #[error("Failed to serialize execution tag")]
    Tag(#[from] serde_json::Error),
}

/// Outcome of dispatching a whole plan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub failed: usize,
}

#[derive(Clone, Debug)]
pub enum Executors {
    /// invoke every driver runner in order
    Local(LocalExecutor),
    /// only write the execution tags, nothing is spawned
    DryRun,
}

impl Executors {
    pub fn load(config: &BenchConfig, dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Local(LocalExecutor::load(config))
        }
    }

    pub fn execute<W: Write>(
        &mut self,
        plan: &RunPlan<'_>,
        output: &mut W,
    ) -> Result<DispatchSummary, ExecutorError> {
        match self {
            Self::Local(executor) => executor.execute(plan, output),
            Self::DryRun => {
                let mut summary = DispatchSummary::default();

                for run in plan.iter() {
                    write_tag(output, &ExecutionTag::from(&run))?;
                    summary.dispatched += 1;
                }

                info!("Dry run listed {} runs", summary.dispatched);

                Ok(summary)
            }
        }
    }
}

/// tag on its own line, flushed so a supervisor sees it before the child writes anything
pub(crate) fn write_tag<W: Write>(output: &mut W, tag: &ExecutionTag) -> Result<(), ExecutorError> {
    writeln!(output)?;
    writeln!(output, "{}", tag.to_line()?)?;
    output.flush()?;

    Ok(())
}
