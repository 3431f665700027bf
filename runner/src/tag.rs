use crate::{plan::RunRecord, space::Workload};
use serde::{Deserialize, Serialize};

/// Literal that starts every tag line in the dispatch output
pub const TAG_PREFIX: &str = "BENCHMARK";

/// Marker written before each run to correlate the log with the plan
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecutionTag {
    pub driver: String,
    pub workload: Workload,
    pub concurrency: u32,
    pub tasks: u64,
    pub sample: u32,
}

impl ExecutionTag {
    /// `BENCHMARK {...}` without a trailing newline
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        Ok(format!("{TAG_PREFIX} {}", serde_json::to_string(self)?))
    }
}

impl From<&RunRecord<'_>> for ExecutionTag {
    fn from(run: &RunRecord<'_>) -> Self {
        Self {
            driver: run.driver.name.clone(),
            workload: run.configuration.workload,
            concurrency: run.configuration.concurrency,
            tasks: run.configuration.tasks,
            sample: run.sample,
        }
    }
}
