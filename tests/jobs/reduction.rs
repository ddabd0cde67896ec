use bindfit_rs::jobs::{ReductionResult, ReductionRuntype};
use bindfit_rs::{JobDescriptor, JobPayload, Method, TrialStatus};

use super::run;
use crate::test_helpers::*;

fn payload(result: bindfit_rs::JobResult) -> ReductionResult {
    match result.payload {
        JobPayload::Reduction(r) => r,
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_zero_shift_is_eliminated_first() {
    let data = one_to_one_dataset(20, 1000.0, &[(0.0, 1.5)], 0.002);
    let model = fitted_one_to_one(data);
    let result = payload(run(model.as_ref(), JobDescriptor::new(Method::Reduction), 2));

    assert_eq!(result.runtype, ReductionRuntype::Parameter);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].name, "δ H [1]");
    assert_eq!(result.steps[0].parameters[1], 0.0);
    assert!(result.steps[0].sse <= result.cutoff);
    assert!(result.steps[0].aicc < result.initial_aicc);
}

#[test]
fn test_backward_truncation_keeps_enough_points() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let descriptor =
        JobDescriptor::new(Method::Reduction).with_reduction_runtype(ReductionRuntype::Backward);
    let result = run(model.as_ref(), descriptor, 2);
    assert_eq!(result.counts.total, 17);

    let series = payload(result).data_series;
    let points: Vec<usize> = series.iter().map(|p| p.points).collect();
    assert_eq!(points, (4..=20).rev().collect::<Vec<_>>());
    assert_eq!(series[0].status, TrialStatus::Converged);
    assert!((series[0].parameters[0] - model.parameters()[0]).abs() < 1e-6);
    for (k, point) in series.iter().enumerate() {
        assert_eq!(point.removed, (20 - k..20).collect::<Vec<_>>());
    }
}

#[test]
fn test_forward_truncation_drops_leading_rows() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let descriptor =
        JobDescriptor::new(Method::Reduction).with_reduction_runtype(ReductionRuntype::Forward);
    let result = payload(run(model.as_ref(), descriptor, 2));

    assert_eq!(result.runtype, ReductionRuntype::Forward);
    assert_eq!(result.data_series.len(), 17);
    for (k, point) in result.data_series.iter().enumerate() {
        assert_eq!(point.points, 20 - k);
        assert_eq!(point.removed, (0..k).collect::<Vec<_>>());
    }
    assert!(result.steps.is_empty());
}
