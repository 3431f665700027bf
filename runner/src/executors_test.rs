use crate::{
    config::{BenchConfig, DriverConfig, EstimateConfig, NodesConfig, SpaceConfig},
    estimate::CostEstimator,
    executors::{DispatchSummary, ExecutorError, Executors},
    plan::RunPlan,
    space::{Configuration, Workload},
    tag::ExecutionTag,
};
use std::{
    fs,
    io::{self, Write},
    os::unix::fs::PermissionsExt,
    path::Path,
    path::PathBuf,
};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(drivers: Vec<DriverConfig>) -> BenchConfig {
    BenchConfig {
        runners: PathBuf::from("does-not-exist"),
        samples: 1,
        nodes: NodesConfig {
            hosts: vec!["node-a".to_string(), "node-b".to_string()],
            port: 9042,
        },
        drivers,
        space: SpaceConfig {
            tasks: vec![1000],
            concurrency: vec![64],
            workloads: vec![Workload::Inserts],
            large_task_min_concurrency: 512,
        },
        estimate: EstimateConfig::default(),
    }
}

#[test]
pub fn node_list_with_and_without_ports() {
    let nodes = NodesConfig {
        hosts: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
        port: 9042,
    };

    assert_eq!(nodes.render(true), "10.0.0.1,10.0.0.2");
    assert_eq!(nodes.render(false), "10.0.0.1:9042,10.0.0.2:9042");
}

#[test]
pub fn dry_run_writes_one_tag_per_run() {
    let drivers = vec![
        DriverConfig {
            name: "rust".to_string(),
            exec: None,
            bare_hosts: false,
        },
        DriverConfig {
            name: "cpp".to_string(),
            exec: None,
            bare_hosts: true,
        },
    ];
    let config = config(drivers.clone());
    let estimator = CostEstimator::from(&config.estimate);
    let plan = RunPlan::new(
        &estimator,
        vec![Configuration::new(1000, 64, Workload::Selects)],
        &drivers,
        2,
    );
    let mut output = Vec::new();

    let summary = Executors::load(&config, true)
        .execute(&plan, &mut output)
        .unwrap();
    let output = String::from_utf8(output).unwrap();
    let tags = output
        .lines()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    assert_eq!(summary, DispatchSummary { dispatched: 4, failed: 0 });
    assert_eq!(tags.len(), 4);
    assert_eq!(
        tags[2],
        r#"BENCHMARK {"driver":"cpp","workload":"selects","concurrency":64,"tasks":1000,"sample":0}"#
    );
}

/// accepts `limit` bytes, then fails like a closed pipe
struct ClosingSink {
    written: Vec<u8>,
    limit: usize,
}

impl Write for ClosingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() + buf.len() > self.limit {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }

        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// all spawning happens in this one test, writing a script while another
// thread forks can fail with ETXTBSY
#[test]
pub fn local_executor_runs() {
    let dir = tempfile::tempdir().unwrap();
    let good = script(
        dir.path(),
        "good.sh",
        "echo \"args: $*\"\necho 'Benchmark time: 42 ms'",
    );
    let bad = script(dir.path(), "bad.sh", "echo 'Connecting...'\nexit 3");
    // more than a pipe buffer holds
    let chatty = script(dir.path(), "chatty.sh", "head -c 1048576 /dev/zero");

    streams_output_and_survives_failures(dir.path(), good.clone(), bad);
    broken_sink_stops_the_plan(chatty, good);
}

fn broken_sink_stops_the_plan(chatty: PathBuf, good: PathBuf) {
    let drivers = vec![
        DriverConfig {
            name: "chatty".to_string(),
            exec: Some(chatty),
            bare_hosts: false,
        },
        DriverConfig {
            name: "good".to_string(),
            exec: Some(good),
            bare_hosts: false,
        },
    ];
    let config = config(drivers.clone());
    let estimator = CostEstimator::from(&config.estimate);
    let plan = RunPlan::new(
        &estimator,
        vec![Configuration::new(1000, 64, Workload::Inserts)],
        &drivers,
        1,
    );
    let mut sink = ClosingSink {
        written: Vec::new(),
        limit: 1024,
    };

    let result = Executors::load(&config, false).execute(&plan, &mut sink);

    assert!(matches!(result, Err(ExecutorError::Output(_))), "{result:?}");
    let written = String::from_utf8_lossy(&sink.written);
    assert!(written.contains(r#""driver":"chatty""#));
    assert!(!written.contains(r#""driver":"good""#));
}

fn streams_output_and_survives_failures(dir: &Path, good: PathBuf, bad: PathBuf) {
    let drivers = vec![
        DriverConfig {
            name: "bad".to_string(),
            exec: Some(bad),
            bare_hosts: true,
        },
        DriverConfig {
            name: "missing".to_string(),
            exec: Some(dir.join("missing.sh")),
            bare_hosts: false,
        },
        DriverConfig {
            name: "good".to_string(),
            exec: Some(good),
            bare_hosts: false,
        },
    ];
    let config = config(drivers.clone());
    let estimator = CostEstimator::from(&config.estimate);
    let plan = RunPlan::new(
        &estimator,
        vec![Configuration::new(1000, 64, Workload::Mixed)],
        &drivers,
        1,
    );
    let mut output = Vec::new();

    let summary = Executors::load(&config, false)
        .execute(&plan, &mut output)
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(summary, DispatchSummary { dispatched: 3, failed: 2 });

    let good_tag = ExecutionTag {
        driver: "good".to_string(),
        workload: Workload::Mixed,
        concurrency: 64,
        tasks: 1000,
        sample: 0,
    };
    let expected_tail = format!(
        "\n{}\nargs: --nodes node-a:9042,node-b:9042 --workload mixed --concurrency 64 --tasks 1000\nBenchmark time: 42 ms\n",
        good_tag.to_line().unwrap()
    );
    assert!(output.ends_with(&expected_tail), "{output}");

    // the failed runs still have their tags, followed by whatever they printed
    let bad_position = output.find(r#""driver":"bad""#).unwrap();
    let missing_position = output.find(r#""driver":"missing""#).unwrap();
    let connecting_position = output.find("Connecting...").unwrap();
    assert!(bad_position < connecting_position && connecting_position < missing_position);
}

#[test]
pub fn config_loads_from_yaml_with_defaults() {
    let config: BenchConfig = serde_yaml::from_str(
        r#"
nodes:
  hosts: [scylla]
drivers:
  - name: rust
  - name: cpp
    bare_hosts: true
space:
  tasks: [1000000, 10000000]
  concurrency: [64, 1024]
  workloads: [inserts, selects]
"#,
    )
    .unwrap();

    assert!(!config.preflight_checks());
    assert_eq!(config.samples, 3);
    assert_eq!(config.nodes.port, 9042);
    assert_eq!(config.space.large_task_min_concurrency, 512);
    assert_eq!(config.space.concurrency, vec![64, 1024]);
    assert_eq!(config.estimate.population_concurrency_floor, 1024);
    assert_eq!(config.restart_overhead(), None);
    assert_eq!(
        config.drivers[0].runner(&config.runners),
        PathBuf::from("benchmarks/basic/rust/run.sh")
    );
    assert!(config.check_runners().is_err());
}

#[test]
pub fn preflight_reports_invalid_config() {
    let mut config = config(Vec::new());
    config.samples = 0;

    assert!(config.preflight_checks());
    assert!(serde_yaml::from_str::<BenchConfig>("nodes: {hosts: []}\nunknown: 1").is_err());
}

#[test]
pub fn preflight_rejects_duplicate_options() {
    let driver = DriverConfig {
        name: "rust".to_string(),
        exec: None,
        bare_hosts: false,
    };
    let valid = config(vec![driver.clone()]);
    assert!(!valid.preflight_checks());

    let mut duplicate_concurrency = valid.clone();
    duplicate_concurrency.space.concurrency = vec![64, 1024, 1024];
    assert!(duplicate_concurrency.preflight_checks());

    let mut duplicate_workload = valid.clone();
    duplicate_workload.space.workloads = vec![Workload::Inserts, Workload::Inserts];
    assert!(duplicate_workload.preflight_checks());

    let mut duplicate_driver = valid;
    duplicate_driver.drivers.push(driver);
    assert!(duplicate_driver.preflight_checks());
}
