use bindfit_rs::jobs::{MonteCarloResult, VarianceSource};
use bindfit_rs::{JobDescriptor, JobPayload, Method};

use super::run;
use crate::test_helpers::*;

fn payload(result: bindfit_rs::JobResult) -> MonteCarloResult {
    match result.payload {
        JobPayload::MonteCarlo(mc) => mc,
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_distribution_brackets_the_fit() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let descriptor = JobDescriptor::new(Method::MonteCarlo).with_max_steps(200);
    let result = run(model.as_ref(), descriptor, 11);

    assert_eq!(result.counts.total, 200);
    assert!(result.counts.converged > 190);
    let mc = payload(result);
    assert_eq!(mc.variance_source, VarianceSource::SEy);
    assert!((mc.sigma - model.statistics().unwrap().sey).abs() < 1e-15);

    let lg_k = &mc.summary.parameters[0];
    assert_eq!(lg_k.name, "lg K11");
    let dist = lg_k.distribution.as_ref().unwrap();
    assert!(dist.confidence.contains(lg_k.value));
    assert!(dist.std_dev > 0.0);
    assert!(dist.entropy > 0.0);
    assert_eq!(dist.histogram.total(), dist.count);

    assert_eq!(mc.summary.correlation.len(), 3);
    assert!((mc.summary.correlation[1][1] - 1.0).abs() < 1e-12);
}

#[test]
fn test_bootstrap_and_original_data() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let mut descriptor = JobDescriptor::new(Method::MonteCarlo).with_max_steps(50);
    descriptor.bootstrap = true;
    descriptor.original_data = true;
    let result = run(model.as_ref(), descriptor, 5);
    let mc = payload(result);
    assert!(mc.bootstrap && mc.original_data);
    assert_eq!(mc.trials.len(), 50);
    assert!(mc.trials.iter().all(|t| t.held_out.is_none()));
}

#[test]
fn test_result_serializes() {
    let model = fitted_one_to_one(noisy_one_to_one(12));
    let result = run(
        model.as_ref(),
        JobDescriptor::new(Method::MonteCarlo).with_max_steps(10),
        1,
    );
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"MonteCarlo\""));
    assert!(json.contains("\"converged\""));
}
