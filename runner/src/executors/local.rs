use super::{write_tag, DispatchSummary, ExecutorError};
use crate::{
    config::{BenchConfig, NodesConfig},
    plan::{RunPlan, RunRecord},
    tag::ExecutionTag,
};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::{Command, ExitStatus, Stdio},
    time::Instant,
};
use tracing::{debug, info, instrument, warn};
use tracing_unwrap::OptionExt;

/// Executor that runs every planned run on this machine, one after another
#[derive(Clone, Debug)]
pub struct LocalExecutor {
    runners: PathBuf,
    nodes: NodesConfig,
}

impl LocalExecutor {
    pub fn load(config: &BenchConfig) -> Self {
        Self {
            runners: config.runners.clone(),
            nodes: config.nodes.clone(),
        }
    }

    /// execute all runs sequentially, a failing run never stops the plan
    #[instrument(skip_all, level = "info")]
    pub fn execute<W: Write>(
        &mut self,
        plan: &RunPlan<'_>,
        output: &mut W,
    ) -> Result<DispatchSummary, ExecutorError> {
        let total = plan.len();
        let mut summary = DispatchSummary::default();

        for run in plan.iter() {
            write_tag(output, &ExecutionTag::from(&run))?;

            let start = Instant::now();

            match self.invoke(&run, output)? {
                Some(status) if status.success() => {
                    debug!("Finished in {} ms", start.elapsed().as_millis());
                }
                Some(status) => {
                    warn!(
                        driver = %run.driver.name,
                        "Run {} failed with {status}, continuing with the plan",
                        run.configuration
                    );
                    summary.failed += 1;
                }
                None => {
                    summary.failed += 1;
                }
            }

            summary.dispatched += 1;
            info!("Done with {}/{total}", summary.dispatched);
        }

        info!(
            "Done with processing, {} of {} runs failed",
            summary.failed, summary.dispatched
        );

        Ok(summary)
    }

    /// spawn the runner and stream its stdout into `output`, `None` if it never started
    fn invoke<W: Write>(
        &self,
        run: &RunRecord<'_>,
        output: &mut W,
    ) -> Result<Option<ExitStatus>, ExecutorError> {
        let runner = run.driver.runner(&self.runners);
        let nodes = self.nodes.render(run.driver.bare_hosts);

        debug!(
            "Processing {} with {} (sample {})",
            run.configuration, run.driver.name, run.sample
        );

        let mut child = match Command::new(&runner)
            .arg("--nodes")
            .arg(&nodes)
            .arg("--workload")
            .arg(run.configuration.workload.as_str())
            .arg("--concurrency")
            .arg(run.configuration.concurrency.to_string())
            .arg("--tasks")
            .arg(run.configuration.tasks.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    driver = %run.driver.name,
                    "Failed to spawn {}: {e}",
                    runner.to_string_lossy()
                );

                return Ok(None);
            }
        };

        let mut stdout = child.stdout.take().unwrap_or_log();
        if let Err(e) = io::copy(&mut stdout, output) {
            // the runner would block on a full pipe and never exit
            drop(stdout);
            if let Err(kill) = child.kill() {
                warn!(driver = %run.driver.name, "Failed to kill runner: {kill}");
            }
            let _ = child.wait();

            return Err(e.into());
        }

        drop(stdout);
        let status = child.wait();

        output.flush()?;

        match status {
            Ok(status) => Ok(Some(status)),
            Err(e) => {
                warn!(driver = %run.driver.name, "Failed to wait for runner: {e}");

                Ok(None)
            }
        }
    }
}
