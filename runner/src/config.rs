use crate::space::{ConfigurationSpace, Workload};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::Error,
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, warn};

// check if a file is executable
pub fn check_executable(path: &Path) -> Result<bool, ConfigErrors> {
    if !path.is_file() {
        Err(ConfigErrors::FileNotFound(path.to_path_buf()))
    } else {
        match File::open(path).map(|file| file.metadata()) {
            Ok(Ok(metadata)) => Ok((metadata.mode() & 0o111) != 0),
            Ok(Err(e)) | Err(e) => Err(ConfigErrors::MetadataNotFound(e)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to read config")]
    ReadConfig(#[source] Error),
    #[error("Failed to parse config")]
    ParseConfig(#[from] serde_yaml::Error),
    #[error("Configuration space is invalid: {0}")]
    InvalidSpace(String),
    #[error("Config failed preflight checks")]
    FailedPreflight,
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Metadata not found")]
    MetadataNotFound(#[source] Error),
    #[error("Runner for {0} is missing or not executable")]
    RunnerNotExecutable(String),
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    // directory holding one `<driver>/run.sh` per driver
    #[serde(default = "default_runners")]
    pub runners: PathBuf,
    // each configuration is repeated `samples` times per driver
    #[serde(default = "default_samples")]
    pub samples: u32,
    pub nodes: NodesConfig,
    // drivers in the order they are run within a configuration
    pub drivers: Vec<DriverConfig>,
    pub space: SpaceConfig,
    #[serde(default)]
    pub estimate: EstimateConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NodesConfig {
    pub hosts: Vec<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl NodesConfig {
    /// comma separated node list, some client libraries reject `host:port`
    pub fn render(&self, bare_hosts: bool) -> String {
        if bare_hosts {
            self.hosts.join(",")
        } else {
            self.hosts
                .iter()
                .map(|host| format!("{host}:{}", self.port))
                .join(",")
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    pub name: String,
    // overrides `<runners>/<name>/run.sh`
    pub exec: Option<PathBuf>,
    #[serde(default)]
    pub bare_hosts: bool,
}

impl DriverConfig {
    pub fn runner(&self, runners: &Path) -> PathBuf {
        match self.exec {
            Some(ref exec) => exec.clone(),
            None => runners.join(&self.name).join("run.sh"),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SpaceConfig {
    pub tasks: Vec<u64>,
    pub concurrency: Vec<u32>,
    pub workloads: Vec<Workload>,
    /// Task counts above the smallest one are only run at this concurrency or higher
    #[serde(default = "default_large_task_min_concurrency")]
    pub large_task_min_concurrency: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct EstimateConfig {
    /// Seconds one task takes at concurrency 1 on the reference driver
    #[serde(default = "default_seconds_per_task")]
    pub seconds_per_task: f64,
    /// Lowest concurrency the population phase of selects/mixed runs with
    #[serde(default = "default_population_concurrency_floor")]
    pub population_concurrency_floor: u32,
    #[serde(default)]
    pub restarts: bool,
    /// Seconds added per run when the cluster is restarted between runs
    #[serde(default = "default_restart_overhead")]
    pub restart_overhead: f64,
    // driver -> reference total time, used for relative speeds
    #[serde(default)]
    pub baseline: BTreeMap<String, u64>,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            seconds_per_task: default_seconds_per_task(),
            population_concurrency_floor: default_population_concurrency_floor(),
            restarts: false,
            restart_overhead: default_restart_overhead(),
            baseline: BTreeMap::new(),
        }
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let file = File::open(path).map_err(ConfigErrors::ReadConfig)?;

        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn space(&self) -> Result<ConfigurationSpace, ConfigErrors> {
        ConfigurationSpace::new(
            self.space.tasks.clone(),
            self.space.concurrency.clone(),
            self.space.workloads.clone(),
            self.space.large_task_min_concurrency,
        )
    }

    /// restart overhead per run, if restarts are enabled
    pub fn restart_overhead(&self) -> Option<f64> {
        self.estimate.restarts.then_some(self.estimate.restart_overhead)
    }

    /// returns true if any error was found, all errors are logged
    pub fn preflight_checks(&self) -> bool {
        // attempt to catch all errors instead of piece-by-piece to make debugging easier for users
        let mut contains_error = false;

        if self.drivers.is_empty() {
            error!("No driver was defined, unable to build a run plan");
            contains_error = true;
        }

        for (name, count) in self.drivers.iter().map(|driver| &driver.name).counts() {
            if count > 1 {
                error!("Driver {name} is defined {count} times");
                contains_error = true;
            }
        }

        if self.samples == 0 {
            error!("samples must be at least 1");
            contains_error = true;
        }

        if self.nodes.hosts.is_empty() {
            error!("nodes.hosts must contain at least one host");
            contains_error = true;
        }

        let space = &self.space;

        if space.tasks.is_empty() || space.concurrency.is_empty() || space.workloads.is_empty() {
            error!("space.tasks, space.concurrency and space.workloads must not be empty");
            contains_error = true;
        }

        if space.tasks.contains(&0) || space.concurrency.contains(&0) {
            error!("space.tasks and space.concurrency must only contain positive values");
            contains_error = true;
        }

        if !space.tasks.iter().all_unique() {
            error!("space.tasks contains duplicates");
            contains_error = true;
        }

        if !space.concurrency.iter().all_unique() {
            error!("space.concurrency contains duplicates");
            contains_error = true;
        }

        if !space.workloads.iter().all_unique() {
            error!("space.workloads contains duplicates");
            contains_error = true;
        }

        if !(self.estimate.seconds_per_task > 0.0) {
            error!("estimate.seconds_per_task must be positive");
            contains_error = true;
        }

        if self.estimate.population_concurrency_floor == 0 {
            error!("estimate.population_concurrency_floor must be positive");
            contains_error = true;
        }

        if self.estimate.restart_overhead < 0.0 {
            error!("estimate.restart_overhead cannot be negative");
            contains_error = true;
        }

        for driver in self.drivers.iter() {
            if !self.estimate.baseline.is_empty()
                && !self.estimate.baseline.contains_key(&driver.name)
            {
                warn!(
                    "Driver {} has no baseline, estimates treat it like the fastest driver",
                    driver.name
                );
            }
        }

        contains_error
    }

    /// every driver runner has to exist and be executable before the cluster is touched
    pub fn check_runners(&self) -> Result<(), ConfigErrors> {
        let mut failed = None;

        for driver in self.drivers.iter() {
            let runner = driver.runner(&self.runners);

            match check_executable(&runner) {
                Ok(true) => {}
                Ok(false) => {
                    error!(
                        "Runner {} for {} is not executable",
                        runner.to_string_lossy(),
                        driver.name
                    );
                    failed.get_or_insert_with(|| driver.name.clone());
                }
                Err(e) => {
                    error!(
                        "Failed to determine if runner {} for {} is executable: {e}",
                        runner.to_string_lossy(),
                        driver.name
                    );
                    failed.get_or_insert_with(|| driver.name.clone());
                }
            }
        }

        match failed {
            Some(name) => Err(ConfigErrors::RunnerNotExecutable(name)),
            None => Ok(()),
        }
    }
}

fn default_runners() -> PathBuf {
    PathBuf::from("benchmarks/basic")
}

fn default_samples() -> u32 {
    3
}

fn default_port() -> u16 {
    9042
}

fn default_large_task_min_concurrency() -> u32 {
    512
}

fn default_seconds_per_task() -> f64 {
    0.005
}

fn default_population_concurrency_floor() -> u32 {
    1024
}

fn default_restart_overhead() -> f64 {
    240.0
}
