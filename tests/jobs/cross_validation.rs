use bindfit_rs::jobs::{CrossValidationResult, CvAlgorithm, CvType};
use bindfit_rs::manager::run_descriptor;
use bindfit_rs::resampling::CombinationStrategy;
use bindfit_rs::{FitError, JobDescriptor, JobPayload, Method};

use super::run;
use crate::test_helpers::*;

fn payload(result: bindfit_rs::JobResult) -> CrossValidationResult {
    match result.payload {
        JobPayload::CrossValidation(cv) => cv,
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_leave_one_out_holds_out_every_point_once() {
    let model = fitted_one_to_one(noisy_one_to_one(15));
    let result = run(model.as_ref(), JobDescriptor::new(Method::CrossValidation), 3);
    let cv = payload(result);

    assert_eq!(cv.trials.len(), 15);
    let mut held: Vec<usize> = cv
        .trials
        .iter()
        .map(|t| {
            let rows = t.held_out.as_ref().unwrap();
            assert_eq!(rows.len(), 1);
            rows[0]
        })
        .collect();
    held.sort_unstable();
    assert_eq!(held, (0..15).collect::<Vec<_>>());
    assert!(cv.trials.iter().all(|t| t.prediction_error.unwrap() >= 0.0));
    assert!(cv.mean_prediction_error.unwrap() > 0.0);
}

#[test]
fn test_leave_x_out_random_strategy() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let mut descriptor = JobDescriptor::new(Method::CrossValidation)
        .with_cross_validation(CvType::LeaveXOut, 4)
        .with_max_steps(60);
    descriptor.algorithm = CvAlgorithm::Random;
    let cv = payload(run(model.as_ref(), descriptor, 8));
    assert_eq!(cv.strategy, CombinationStrategy::Random);
    assert_eq!(cv.trials.len(), 60);
    assert!(cv.trials.iter().all(|t| t.held_out.as_ref().unwrap().len() == 4));
}

#[test]
fn test_too_many_left_out_points_is_rejected() {
    let model = fitted_one_to_one(noisy_one_to_one(8));
    let descriptor =
        JobDescriptor::new(Method::CrossValidation).with_cross_validation(CvType::LeaveXOut, 7);
    let result = run_descriptor(
        model.as_ref(),
        &descriptor,
        &optimizer_config(),
        &runner_config(1),
    );
    assert!(matches!(result, Err(FitError::InvalidJob(_))));
}
