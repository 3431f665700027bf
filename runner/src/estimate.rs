use crate::{
    config::EstimateConfig,
    plan::RunPlan,
    space::{Configuration, Workload},
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Estimates the wall-clock time of a single sample of a configuration,
/// calibrated against one reference driver
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostEstimator {
    pub seconds_per_task: f64,
    pub population_concurrency_floor: u32,
}

impl CostEstimator {
    pub fn new(seconds_per_task: f64, population_concurrency_floor: u32) -> Self {
        Self {
            seconds_per_task,
            population_concurrency_floor,
        }
    }

    /// estimated seconds for one sample of `configuration`
    pub fn estimate(&self, configuration: &Configuration) -> f64 {
        let mut seconds =
            configuration.tasks as f64 / configuration.concurrency as f64 * self.seconds_per_task;

        // reads need the table filled first, which runs at population speed
        if configuration.workload.needs_population() {
            seconds += self.estimate(&self.population_phase(configuration));
        }

        seconds
    }

    /// the insert run that precedes a selects or mixed run
    pub fn population_phase(&self, configuration: &Configuration) -> Configuration {
        Configuration::new(
            configuration.tasks,
            configuration
                .concurrency
                .max(self.population_concurrency_floor),
            Workload::Inserts,
        )
    }

    /// stable ascending sort, ties keep their enumeration order
    pub fn sort(&self, configurations: &mut [Configuration]) {
        configurations.sort_by(|a, b| self.estimate(a).total_cmp(&self.estimate(b)));
    }
}

impl From<&EstimateConfig> for CostEstimator {
    fn from(config: &EstimateConfig) -> Self {
        Self::new(config.seconds_per_task, config.population_concurrency_floor)
    }
}

/// Relative speed of each driver compared to the fastest one of a baseline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeedCoefficients {
    coefficients: BTreeMap<String, f64>,
}

impl SpeedCoefficients {
    /// `baseline` maps driver names to their reference total time
    pub fn from_baseline(baseline: &BTreeMap<String, u64>) -> Self {
        let fastest = baseline.values().copied().filter(|time| *time > 0).min();

        let coefficients = match fastest {
            Some(fastest) => baseline
                .iter()
                .filter(|(_, time)| **time > 0)
                .map(|(driver, time)| (driver.clone(), *time as f64 / fastest as f64))
                .collect(),
            None => BTreeMap::new(),
        };

        Self { coefficients }
    }

    /// drivers without a baseline are assumed to be as fast as the reference
    pub fn get(&self, driver: &str) -> f64 {
        match self.coefficients.get(driver) {
            Some(coefficient) => *coefficient,
            None => {
                warn!("No baseline for driver {driver}, assuming coefficient 1.0");
                1.0
            }
        }
    }
}

/// Projected wall-clock time of a whole plan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub configurations: usize,
    pub runs: usize,
    pub seconds: f64,
}

impl Projection {
    pub fn new(
        estimator: &CostEstimator,
        plan: &RunPlan<'_>,
        coefficients: &SpeedCoefficients,
        restart_overhead: Option<f64>,
    ) -> Self {
        let driver_factor: f64 = plan
            .drivers()
            .iter()
            .map(|driver| coefficients.get(&driver.name))
            .sum();
        let samples = plan.samples() as f64;

        let mut seconds = plan
            .configurations()
            .iter()
            .map(|configuration| {
                let estimate = estimator.estimate(configuration);
                debug!("{configuration}: {estimate:.1} s per sample");

                estimate * driver_factor * samples
            })
            .sum::<f64>();

        // every run is preceded by a cluster restart
        if let Some(overhead) = restart_overhead {
            seconds += plan.len() as f64 * overhead;
        }

        Self {
            configurations: plan.configurations().len(),
            runs: plan.len(),
            seconds,
        }
    }

    pub fn hours(&self) -> f64 {
        self.seconds / 60.0 / 60.0
    }
}
