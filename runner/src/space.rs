use crate::config::ConfigErrors;
use clap::ValueEnum;
use itertools::{iproduct, Itertools};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation mix a driver runner performs
#[derive(
    Deserialize, Serialize, ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    Inserts,
    Selects,
    Mixed,
}

impl Workload {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserts => "inserts",
            Self::Selects => "selects",
            Self::Mixed => "mixed",
        }
    }

    /// selects and mixed read data that has to be written first
    pub fn needs_population(&self) -> bool {
        matches!(self, Self::Selects | Self::Mixed)
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (tasks, concurrency, workload) triple under test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub tasks: u64,
    pub concurrency: u32,
    pub workload: Workload,
}

impl Configuration {
    pub fn new(tasks: u64, concurrency: u32, workload: Workload) -> Self {
        Self {
            tasks,
            concurrency,
            workload,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks={} concurrency={}",
            self.workload, self.tasks, self.concurrency
        )
    }
}

/// Option sets the configurations are drawn from
#[derive(Clone, Debug)]
pub struct ConfigurationSpace {
    tasks: Vec<u64>,
    concurrency: Vec<u32>,
    workloads: Vec<Workload>,
    // concurrency below this is skipped for every task count but the smallest
    large_task_min_concurrency: u32,
}

impl ConfigurationSpace {
    pub fn new(
        tasks: Vec<u64>,
        concurrency: Vec<u32>,
        workloads: Vec<Workload>,
        large_task_min_concurrency: u32,
    ) -> Result<Self, ConfigErrors> {
        if tasks.is_empty() || concurrency.is_empty() || workloads.is_empty() {
            return Err(ConfigErrors::InvalidSpace(
                "tasks, concurrency and workloads must not be empty".to_string(),
            ));
        }

        if tasks.contains(&0) {
            return Err(ConfigErrors::InvalidSpace(
                "task counts must be positive".to_string(),
            ));
        }

        if concurrency.contains(&0) {
            return Err(ConfigErrors::InvalidSpace(
                "concurrency levels must be positive".to_string(),
            ));
        }

        Ok(Self {
            tasks,
            concurrency,
            workloads,
            large_task_min_concurrency,
        })
    }

    fn smallest_tasks(&self) -> u64 {
        self.tasks.iter().copied().min().unwrap_or(0)
    }

    /// large task counts at low concurrency take hours and are skipped
    pub fn is_excluded(&self, configuration: &Configuration) -> bool {
        configuration.tasks > self.smallest_tasks()
            && configuration.concurrency < self.large_task_min_concurrency
    }

    /// Cartesian product of all option sets minus the excluded combinations
    pub fn configurations(&self) -> Vec<Configuration> {
        iproduct!(
            self.tasks.iter().copied(),
            self.concurrency.iter().copied(),
            self.workloads.iter().copied()
        )
        .map(|(tasks, concurrency, workload)| Configuration::new(tasks, concurrency, workload))
        .filter(|configuration| !self.is_excluded(configuration))
        .collect_vec()
    }
}
