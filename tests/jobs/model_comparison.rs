use bindfit_rs::jobs::model_comparison::fast_confidence;
use bindfit_rs::jobs::ModelComparisonResult;
use bindfit_rs::{JobDescriptor, JobPayload, Method};

use super::run;
use crate::test_helpers::*;

fn payload(result: bindfit_rs::JobResult) -> ModelComparisonResult {
    match result.payload {
        JobPayload::ModelComparison(mc) => mc,
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_bisection_lands_on_the_ceiling() {
    let mut model = fitted_one_to_one(noisy_one_to_one(20));
    let ceiling = model.error_threshold(95.0).unwrap();
    let fitted = model.parameters()[0];
    let upper = fast_confidence(model.as_ref(), 0, 1.0, ceiling);
    let lower = fast_confidence(model.as_ref(), 0, -1.0, ceiling);
    assert!(lower < fitted && fitted < upper);

    let mut p = model.parameters().to_vec();
    p[0] = upper;
    model.set_parameters(&p);
    model.calculate();
    assert!((model.sse() - ceiling).abs() < 1e-6);
}

#[test]
fn test_area_and_inside_extremes() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let descriptor = JobDescriptor::new(Method::ModelComparison).with_max_steps(450);
    let result = run(model.as_ref(), descriptor, 21);
    assert_eq!(result.counts.total, 5);

    let mc = payload(result);
    assert_eq!(mc.draws, 450);
    assert!(mc.inside > 0 && mc.inside < mc.draws);
    assert!(mc.area > 0.0 && mc.area < mc.box_volume);
    let b = &mc.parameters[0];
    let (min, max) = (b.inside_min.unwrap(), b.inside_max.unwrap());
    assert!(b.box_lower <= min && max <= b.box_upper);
    assert!(min >= b.lower_limit - 1e-4 && max <= b.upper_limit + 1e-4);
}

#[test]
fn test_local_shift_bisection_holds_the_shift() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let ceiling = model.error_threshold(95.0).unwrap();
    let fitted = model.parameters()[2];
    let upper = fast_confidence(model.as_ref(), 2, 1.0, ceiling);
    let lower = fast_confidence(model.as_ref(), 2, -1.0, ceiling);
    assert!(lower < fitted && fitted < upper);
    assert!(upper - lower < 1.0, "[{}, {}]", lower, upper);

    let mut work = model.clone_model(false);
    work.core_mut().lock(2, true);
    let mut p = work.parameters().to_vec();
    p[2] = upper;
    work.set_parameters(&p);
    work.calculate();
    assert!((work.sse() - ceiling).abs() < 1e-6);
}

#[test]
fn test_selected_local_shift_is_sampled() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let descriptor = JobDescriptor::from_json(
        r#"{"Method": 3, "MaxSteps": 300, "GlobalParameterList": [1], "LocalParameterList": [0, 1]}"#,
    )
    .unwrap();
    let mc = payload(run(model.as_ref(), descriptor, 5));

    let names: Vec<&str> = mc.parameters.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["lg K11", "δ HG [1]"]);
    assert_eq!(mc.draws, 300);
    assert!(mc.inside > 0 && mc.inside < mc.draws, "{} of {}", mc.inside, mc.draws);
    assert!(mc.area < mc.box_volume);
    let shift = &mc.parameters[1];
    assert!(shift.box_upper - shift.box_lower < 3.0);
}
