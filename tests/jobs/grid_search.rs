use bindfit_rs::jobs::GridSearchResult;
use bindfit_rs::resampling::ScanStop;
use bindfit_rs::{JobDescriptor, JobPayload, Method};

use super::run;
use crate::test_helpers::*;

fn payload(result: bindfit_rs::JobResult) -> GridSearchResult {
    match result.payload {
        JobPayload::GridSearch(gs) => gs,
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_scan_brackets_the_constant() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let mut descriptor = JobDescriptor::new(Method::GridSearch);
    descriptor.step_scaling_factor = 0.001;
    let result = run(model.as_ref(), descriptor, 1);
    assert_eq!(result.counts.total, 2);
    assert_eq!(result.counts.converged, 2);

    let gs = payload(result);
    assert_eq!(gs.scans.len(), 1);
    let scan = &gs.scans[0];
    assert!(scan.converged());
    assert_eq!(scan.lower_stop, ScanStop::CeilingExceeded);
    assert!(scan.lower < scan.value && scan.value < scan.upper);
    assert!(scan.points.windows(2).all(|w| w[0].value < w[1].value));
    assert!(gs.max_error > model.sse());
}

#[test]
fn test_selection_lists_and_raw_storage() {
    let data = one_to_one_dataset(20, 1000.0, &[(7.0, 8.5)], 0.01);
    let model = fitted_one_to_one(data);
    let descriptor = bindfit_rs::JobDescriptor::from_json(
        r#"{"Method": "GridSearch", "GlobalParameterList": [1], "LocalParameterList": [0, 1],
            "StoreRaw": true, "StepScalingFactor": 0.002, "Relax": false}"#,
    )
    .unwrap();
    let gs = payload(run(model.as_ref(), descriptor, 1));
    let names: Vec<&str> = gs.scans.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["lg K11", "δ HG [1]"]);
    assert!(!gs.relax);
    for scan in &gs.scans {
        assert!(scan.points.iter().all(|p| p.parameters.is_some() && p.statistics.is_some()));
    }
}

#[test]
fn test_explicit_ceiling() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let mut descriptor = JobDescriptor::new(Method::GridSearch);
    descriptor.max_parameter = Some(model.sse() * 1.01);
    descriptor.step_scaling_factor = 0.0005;
    let gs = payload(run(model.as_ref(), descriptor, 1));
    assert_eq!(gs.max_error, model.sse() * 1.01);
}
