use crate::{
    config::DriverConfig,
    estimate::{CostEstimator, Projection, SpeedCoefficients},
    plan::RunPlan,
    space::{Configuration, Workload},
};
use std::collections::BTreeMap;

fn estimator() -> CostEstimator {
    CostEstimator::new(0.005, 1024)
}

fn driver(name: &str) -> DriverConfig {
    DriverConfig {
        name: name.to_string(),
        exec: None,
        bare_hosts: false,
    }
}

fn assert_close(left: f64, right: f64) {
    assert!((left - right).abs() < 1e-9, "{left} != {right}");
}

#[test]
pub fn inserts_scale_with_tasks_over_concurrency() {
    let estimate = estimator().estimate(&Configuration::new(1_000_000, 1000, Workload::Inserts));

    assert_close(estimate, 5.0);
}

#[test]
pub fn reads_include_population_at_floor() {
    let estimator = estimator();
    let selects = Configuration::new(1_024_000, 64, Workload::Selects);

    // 16000 * 0.005 + 1000 * 0.005
    assert_close(estimator.estimate(&selects), 80.0 + 5.0);
    assert_eq!(
        estimator.population_phase(&selects),
        Configuration::new(1_024_000, 1024, Workload::Inserts)
    );
    assert!(estimator.estimate(&selects) >= estimator.estimate(&estimator.population_phase(&selects)));
}

#[test]
pub fn population_uses_higher_concurrency_above_floor() {
    let estimator = estimator();
    let mixed = Configuration::new(2_048_000, 2048, Workload::Mixed);

    assert_close(estimator.estimate(&mixed), 10.0);
}

#[test]
pub fn estimate_is_deterministic_and_monotonic() {
    let estimator = estimator();

    for workload in [Workload::Inserts, Workload::Selects, Workload::Mixed] {
        let configuration = Configuration::new(1_000_000, 256, workload);
        assert_eq!(
            estimator.estimate(&configuration),
            estimator.estimate(&configuration)
        );

        let more_tasks = Configuration::new(10_000_000, 256, workload);
        assert!(estimator.estimate(&more_tasks) >= estimator.estimate(&configuration));

        let mut previous = f64::INFINITY;
        for concurrency in [64, 128, 512, 1024, 4096, 8192] {
            let current = estimator.estimate(&Configuration::new(1_000_000, concurrency, workload));
            assert!(current <= previous);
            assert!(current > 0.0);
            previous = current;
        }
    }
}

#[test]
pub fn coefficients_are_relative_to_fastest() {
    let baseline = BTreeMap::from([
        ("rust".to_string(), 3734),
        ("cpp".to_string(), 5510),
        ("gocql".to_string(), 14802),
    ]);
    let coefficients = SpeedCoefficients::from_baseline(&baseline);

    assert_close(coefficients.get("rust"), 1.0);
    assert_close(coefficients.get("cpp"), 5510.0 / 3734.0);
    assert_close(coefficients.get("unknown"), 1.0);
}

#[test]
pub fn projection_sums_over_drivers_and_samples() {
    let estimator = estimator();
    let drivers = vec![driver("rust"), driver("cpp")];
    let configurations = vec![
        Configuration::new(1_000_000, 1000, Workload::Inserts),
        Configuration::new(2_000_000, 1000, Workload::Inserts),
    ];
    let plan = RunPlan::new(&estimator, configurations, &drivers, 3);
    let coefficients = SpeedCoefficients::from_baseline(&BTreeMap::from([
        ("rust".to_string(), 100),
        ("cpp".to_string(), 200),
    ]));

    let projection = Projection::new(&estimator, &plan, &coefficients, None);

    assert_eq!(projection.configurations, 2);
    assert_eq!(projection.runs, 12);
    // (5 + 10) * (1 + 2) * 3
    assert_close(projection.seconds, 135.0);

    let with_restarts = Projection::new(&estimator, &plan, &coefficients, Some(240.0));
    assert_close(with_restarts.seconds, 135.0 + 12.0 * 240.0);
    assert_close(with_restarts.hours(), with_restarts.seconds / 3600.0);
}
