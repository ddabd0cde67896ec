//! Statistical job tests.

pub mod cross_validation;
pub mod grid_search;
pub mod manager;
pub mod model_comparison;
pub mod monte_carlo;
pub mod reduction;

use bindfit_rs::manager::run_descriptor;
use bindfit_rs::{JobDescriptor, JobResult, Model};

use crate::test_helpers::*;

/// Run one descriptor against `model` with four threads and `seed`.
pub fn run(model: &dyn Model, descriptor: JobDescriptor, seed: u64) -> JobResult {
    run_descriptor(model, &descriptor, &optimizer_config(), &runner_config(seed)).unwrap()
}
