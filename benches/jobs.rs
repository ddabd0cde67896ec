//! Benchmarks for the resampling jobs on a fitted 1:1 model.

use bindfit_rs::manager::run_descriptor;
use bindfit_rs::models::equilibrium::one_to_one_complex;
use bindfit_rs::{
    create_model, Dataset, JobDescriptor, LmConfig, Method, Model, ModelId, Optimizer, OptimizerConfig,
    RunnerConfig,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use std::sync::Arc;

fn optimizer_config() -> OptimizerConfig {
    OptimizerConfig::new(
        100,
        1e-10,
        1e-8,
        LmConfig::new(1e-3, 1000, 1e-10, 1e-10, 1e-12, 1e-8).with_iterations_per_cycle(5),
    )
}

fn fitted_model() -> Box<dyn Model> {
    let host = 1e-3;
    let points = 25;
    let independent = Array2::from_shape_fn((points, 2), |(r, c)| {
        if c == 0 {
            host
        } else {
            3.0 * host * r as f64 / (points - 1) as f64
        }
    });
    let dependent = Array2::from_shape_fn((points, 1), |(r, _)| {
        let x = one_to_one_complex(host, independent[[r, 1]], 1000.0) / host;
        7.0 + 1.5 * x + if r % 3 == 0 { 0.01 } else { -0.005 }
    });
    let data = Arc::new(Dataset::new(independent, dependent).unwrap());
    let mut model = create_model(ModelId::OneToOne, data).unwrap();
    let mut start = model.parameters().to_vec();
    start[0] = 2.5;
    Optimizer::new(optimizer_config())
        .unwrap()
        .fit(model.as_mut(), &start)
        .unwrap();
    model
}

fn bench_monte_carlo_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo_threads");
    group.sample_size(10);
    let model = fitted_model();
    let descriptor = JobDescriptor::new(Method::MonteCarlo).with_max_steps(200);

    for threads in [1, 2, 4] {
        let runner = RunnerConfig::default().with_threads(threads).with_seed(7);
        group.bench_with_input(BenchmarkId::from_parameter(threads), &runner, |b, runner| {
            b.iter(|| {
                let _ = run_descriptor(
                    model.as_ref(),
                    black_box(&descriptor),
                    &optimizer_config(),
                    runner,
                );
            })
        });
    }

    group.finish();
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("methods");
    group.sample_size(10);
    let model = fitted_model();
    let runner = RunnerConfig::default().with_seed(7);

    let jobs = [
        ("leave_one_out", r#"{"Method": 4, "CXO": 1}"#),
        ("leave_two_out", r#"{"Method": 4, "CXO": 2, "MaxSteps": 100}"#),
        ("grid_search", r#"{"Method": 2, "MaxSteps": 200, "StepScalingFactor": 0.005}"#),
        ("model_comparison", r#"{"Method": 3, "MaxSteps": 1000}"#),
        ("reduction", r#"{"Method": 5, "ReductionRuntype": 1}"#),
    ];
    for (name, json) in jobs {
        let descriptor = JobDescriptor::from_json(json).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = run_descriptor(
                    model.as_ref(),
                    black_box(&descriptor),
                    &optimizer_config(),
                    &runner,
                );
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_monte_carlo_threads, bench_methods);
criterion_main!(benches);
