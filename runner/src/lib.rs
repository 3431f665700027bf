pub mod config;
pub mod estimate;
pub mod executors;
pub mod plan;
pub mod space;
pub mod tag;

#[cfg(test)]
mod estimate_test;
#[cfg(test)]
mod executors_test;
