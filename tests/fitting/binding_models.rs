//! Model behaviour on synthetic data.

use approx::assert_relative_eq;
use bindfit_rs::models::equilibrium::one_to_two_species;
use bindfit_rs::{create_model, Dataset, ModelId, Optimizer, ParameterKind};
use ndarray::Array2;
use std::sync::Arc;

use crate::test_helpers::*;

#[test]
fn test_parameter_names_follow_layout() {
    let data = one_to_one_dataset(10, 1000.0, &[(7.0, 8.0), (3.0, 3.5)], 0.0);
    let model = create_model(ModelId::OneToOne, data).unwrap();
    assert_eq!(
        model.parameter_names(),
        vec!["lg K11", "δ H [1]", "δ HG [1]", "δ H [2]", "δ HG [2]"]
    );
    assert_eq!(model.core().parameter_kind(0), Some(ParameterKind::Global));
    assert_eq!(
        model.core().parameter_kind(3),
        Some(ParameterKind::Local { series: 1 })
    );
}

#[test]
fn test_two_series_share_the_constant() {
    let data = one_to_one_dataset(15, 2500.0, &[(7.0, 8.0), (3.0, 3.5)], 0.0);
    let model = fitted_one_to_one(data);
    let p = model.parameters();
    assert_relative_eq!(p[0], 2500f64.log10(), epsilon = 1e-5);
    assert_relative_eq!(p[1], 7.0, epsilon = 1e-5);
    assert_relative_eq!(p[2], 8.0, epsilon = 1e-5);
    assert_relative_eq!(p[3], 3.0, epsilon = 1e-5);
    assert_relative_eq!(p[4], 3.5, epsilon = 1e-5);
}

#[test]
fn test_one_to_two_fit() {
    let (k11, k12) = (1e3, 1e2);
    let points = 20;
    let mut independent = Array2::zeros((points, 2));
    let mut dependent = Array2::zeros((points, 1));
    for r in 0..points {
        let guest = 1e-2 * r as f64 / (points - 1) as f64;
        independent[[r, 0]] = HOST;
        independent[[r, 1]] = guest;
        let (h, hg, hg2) = one_to_two_species(HOST, guest, k11, k12);
        dependent[[r, 0]] = (7.0 * h + 8.0 * hg + 9.0 * hg2) / HOST;
    }
    let data = Arc::new(Dataset::new(independent, dependent).unwrap());
    let mut model = create_model(ModelId::OneToTwo, data).unwrap();
    let mut start = model.parameters().to_vec();
    start[0] = 2.8;
    start[1] = 1.8;

    let report = Optimizer::new(optimizer_config())
        .unwrap()
        .fit(model.as_mut(), &start)
        .unwrap();
    assert!(report.sse < 1e-10, "sse = {}", report.sse);
    assert_relative_eq!(report.parameters[0], 3.0, epsilon = 1e-3);
    assert_relative_eq!(report.parameters[1], 2.0, epsilon = 1e-3);
}

#[test]
fn test_statistics_after_fit() {
    let model = fitted_one_to_one(noisy_one_to_one(20));
    let stats = model.statistics().unwrap();
    assert_eq!(stats.points, 20);
    assert_eq!(stats.parameters, 3);
    assert!(stats.valid);
    assert_relative_eq!(stats.sey, (stats.sse / 17.0).sqrt(), epsilon = 1e-12);
    assert!(stats.aicc > stats.aic);
}
