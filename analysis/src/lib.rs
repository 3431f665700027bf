pub mod chart;
pub mod results;

pub use chart::BarChart;
pub use results::{BenchmarkResultSet, ChartConfig, Selection};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No results to draw")]
    EmptyResults,
    #[error("Records need --{0} to select a configuration")]
    MissingSelection(&'static str),
    #[error("Either --config or --records is required")]
    MissingSource,
    #[error("Result for {0} is not a number")]
    InvalidResult(String),
    #[error("Failed to read or write chart data")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse chart config")]
    Config(#[from] serde_yaml::Error),
    #[error("Failed to parse result record")]
    Record(#[from] serde_json::Error),
    #[error("Failed to render chart")]
    Format(#[from] std::fmt::Error),
}
