//! Outer fit loop.

use bindfit_rs::{create_model, fit, FitError, ModelId, Optimizer};
use std::sync::Arc;

use crate::test_helpers::*;

#[test]
fn test_one_to_one_recovers_constant_from_half_guess() {
    let config = optimizer_config();
    let mut model = create_model(ModelId::OneToOne, exact_one_to_one(20)).unwrap();
    let mut start = model.parameters().to_vec();
    start[0] = 500f64.log10();

    let report = fit(model.as_mut(), &start, &config).unwrap();
    let k = 10f64.powf(report.parameters[0]);
    assert!(report.converged);
    assert!(report.iterations < config.max_iter);
    assert!((k - 1000.0).abs() / 1000.0 < 0.01, "K = {}", k);
}

#[test]
fn test_masked_rows_do_not_count() {
    let data = exact_one_to_one(12);
    let masked = Arc::new(data.with_masked_rows(&[0, 5, 11]).unwrap());
    let mut model = create_model(ModelId::OneToOne, masked).unwrap();
    let mut start = model.parameters().to_vec();
    start[0] = 2.5;
    let report = Optimizer::new(optimizer_config())
        .unwrap()
        .fit(model.as_mut(), &start)
        .unwrap();
    assert_eq!(model.residuals().len(), 9);
    assert!(report.converged);
    assert!(approx_eq(10f64.powf(report.parameters[0]), 1000.0, 1.0));
}

#[test]
fn test_non_finite_start_is_refused() {
    let mut model = create_model(ModelId::OneToOne, exact_one_to_one(10)).unwrap();
    model.core_mut().set_inline_locals(false);
    let result = fit(model.as_mut(), &[f64::NAN, 7.0, 8.5], &optimizer_config());
    assert!(matches!(result, Err(FitError::NonFinite(_))));
}

#[test]
fn test_invalid_config_is_refused() {
    let config = optimizer_config().with_max_iter(0);
    assert!(Optimizer::new(config).is_err());
}
