use crate::parser::{segments, ParseError, ResultRecord};
use driverbench_runner::tag::ExecutionTag;
use tracing::warn;

/// Every tag of a dispatch log, sorted into what became of its run
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub completed: Vec<ResultRecord>,
    /// runs that were started but never reported a time
    pub missing: Vec<ExecutionTag>,
    pub errors: Vec<ParseError>,
}

impl Reconciliation {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.errors.is_empty()
    }
}

pub fn reconcile(text: &str) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();

    for segment in segments(text) {
        match segment.record() {
            Some(Ok(record)) => reconciliation.completed.push(record),
            Some(Err(error)) => reconciliation.errors.push(error),
            None => match segment.execution_tag() {
                Ok(tag) => {
                    warn!(
                        driver = %tag.driver,
                        "Run {} concurrency={} tasks={} sample={} has no benchmark time",
                        tag.workload,
                        tag.concurrency,
                        tag.tasks,
                        tag.sample
                    );
                    reconciliation.missing.push(tag);
                }
                Err(error) => reconciliation.errors.push(error),
            },
        }
    }

    reconciliation
}
