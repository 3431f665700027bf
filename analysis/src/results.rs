use crate::ChartError;
use driverbench_ingest::ResultRecord;
use driverbench_runner::space::Workload;
use itertools::Itertools;
use serde::Deserialize;
use std::{fs::File, path::Path};

/// One scalar result per driver, in the order the drivers were added
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BenchmarkResultSet {
    results: Vec<(String, f64)>,
}

impl BenchmarkResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// a driver added twice keeps its position and takes the new value
    pub fn insert(&mut self, driver: impl Into<String>, value: f64) {
        let driver = driver.into();

        match self.results.iter_mut().find(|(name, _)| *name == driver) {
            Some((_, existing)) => *existing = value,
            None => self.results.push((driver, value)),
        }
    }

    pub fn get(&self, driver: &str) -> Option<f64> {
        self.results
            .iter()
            .find(|(name, _)| name == driver)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.results.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn max(&self) -> Option<f64> {
        self.results.iter().map(|(_, value)| *value).reduce(f64::max)
    }

    /// mean time of every driver over the samples of one configuration
    pub fn from_records(records: &[ResultRecord], selection: &Selection) -> Self {
        let matching = records
            .iter()
            .filter(|record| selection.matches(record))
            .collect_vec();
        let mut samples = matching
            .iter()
            .into_group_map_by(|record| record.tag.driver.clone());
        let mut set = Self::new();

        // drivers in order of their first sample
        for driver in matching.iter().map(|record| record.tag.driver.as_str()).unique() {
            if let Some(runs) = samples.remove(driver) {
                let total: u64 = runs.iter().map(|record| record.time).sum();
                set.insert(driver, total as f64 / runs.len() as f64);
            }
        }

        set
    }
}

/// The configuration a chart is drawn for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub workload: Workload,
    pub concurrency: u32,
    pub tasks: u64,
}

impl Selection {
    pub fn matches(&self, record: &ResultRecord) -> bool {
        record.tag.workload == self.workload
            && record.tag.concurrency == self.concurrency
            && record.tag.tasks == self.tasks
    }

    /// all three parts are needed to pick a configuration
    pub fn from_parts(
        workload: Option<Workload>,
        concurrency: Option<u32>,
        tasks: Option<u64>,
    ) -> Result<Self, ChartError> {
        match (workload, concurrency, tasks) {
            (Some(workload), Some(concurrency), Some(tasks)) => Ok(Self {
                workload,
                concurrency,
                tasks,
            }),
            (None, _, _) => Err(ChartError::MissingSelection("workload")),
            (_, None, _) => Err(ChartError::MissingSelection("concurrency")),
            (_, _, None) => Err(ChartError::MissingSelection("tasks")),
        }
    }

    pub fn title(&self) -> String {
        format!(
            "{} {}, concurrency = {}",
            self.tasks, self.workload, self.concurrency
        )
    }
}

/// Hand-written chart input: a title and one result per driver
#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ChartConfig {
    pub title: String,
    // mapping keeps the order of the file
    pub results: serde_yaml::Mapping,
}

impl ChartConfig {
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        Ok(serde_yaml::from_reader(File::open(path)?)?)
    }

    pub fn result_set(&self) -> Result<BenchmarkResultSet, ChartError> {
        let mut set = BenchmarkResultSet::new();

        for (driver, value) in self.results.iter() {
            let driver = driver
                .as_str()
                .ok_or_else(|| ChartError::InvalidResult(format!("{driver:?}")))?;
            let value = value
                .as_f64()
                .ok_or_else(|| ChartError::InvalidResult(driver.to_string()))?;

            set.insert(driver, value);
        }

        Ok(set)
    }
}
