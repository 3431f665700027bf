use crate::{config::DriverConfig, estimate::CostEstimator, space::Configuration};
use itertools::iproduct;

/// A single planned invocation of a driver runner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunRecord<'a> {
    pub configuration: Configuration,
    pub driver: &'a DriverConfig,
    pub sample: u32,
}

/// Configurations ordered by estimated cost, expanded lazily over drivers and samples
#[derive(Clone, Debug)]
pub struct RunPlan<'a> {
    configurations: Vec<Configuration>,
    drivers: &'a [DriverConfig],
    samples: u32,
}

impl<'a> RunPlan<'a> {
    /// Sort `configurations` cheapest first, so a broken driver or cluster shows up early
    pub fn new(
        estimator: &CostEstimator,
        mut configurations: Vec<Configuration>,
        drivers: &'a [DriverConfig],
        samples: u32,
    ) -> Self {
        estimator.sort(&mut configurations);

        Self {
            configurations,
            drivers,
            samples,
        }
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn drivers(&self) -> &'a [DriverConfig] {
        self.drivers
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.configurations.len() * self.drivers.len() * self.samples as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// configuration -> driver -> sample, all drivers see a configuration
    /// before the plan moves on to the next one
    pub fn iter(&self) -> impl Iterator<Item = RunRecord<'a>> + '_ {
        iproduct!(
            self.configurations.iter().copied(),
            self.drivers.iter(),
            0..self.samples
        )
        .map(|(configuration, driver, sample)| RunRecord {
            configuration,
            driver,
            sample,
        })
    }
}
