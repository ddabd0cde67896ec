use bindfit_rs::{JobDescriptor, JobManager, JobState, Method, ProgressObserver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::test_helpers::*;

#[derive(Default)]
struct CountingProgress {
    batches: AtomicUsize,
    maximum: AtomicUsize,
    done: AtomicUsize,
}

impl ProgressObserver for CountingProgress {
    fn maximum_steps(&self, steps: usize) {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.maximum.fetch_add(steps, Ordering::SeqCst);
    }

    fn increment_progress(&self, _elapsed_ms: u64) {
        self.done.fetch_add(1, Ordering::SeqCst);
    }
}

fn manager() -> JobManager {
    let model = fitted_one_to_one(noisy_one_to_one(15));
    JobManager::new(model, optimizer_config(), runner_config(3)).unwrap()
}

#[test]
fn test_jobs_run_in_order_and_report_progress() {
    let progress = Arc::new(CountingProgress::default());
    let mut manager = manager().with_progress(progress.clone());
    let mc = manager
        .add_single_job(JobDescriptor::new(Method::MonteCarlo).with_max_steps(40))
        .unwrap();
    let cv = manager.add_job_json(r#"{"Method": 4, "CXO": 1}"#).unwrap();
    assert_eq!(manager.state(mc), JobState::Queued);

    let reports = manager.run_jobs().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].method, Method::MonteCarlo);
    assert_eq!(reports[1].method, Method::CrossValidation);
    assert_eq!(manager.state(mc), JobState::Completed);
    assert_eq!(manager.state(cv), JobState::Completed);
    assert_eq!(manager.trials_spawned(), 55);
    assert_eq!(progress.maximum.load(Ordering::SeqCst), 55);
    assert_eq!(progress.done.load(Ordering::SeqCst), 55);
}

#[test]
fn test_reduction_announces_every_round() {
    let data = one_to_one_dataset(20, 1000.0, &[(0.0, 1.5)], 0.002);
    let progress = Arc::new(CountingProgress::default());
    let mut manager = JobManager::new(fitted_one_to_one(data), optimizer_config(), runner_config(3))
        .unwrap()
        .with_progress(progress.clone());
    manager
        .add_single_job(JobDescriptor::new(Method::Reduction))
        .unwrap();
    manager.run_jobs().unwrap();

    // one round removes δ H, the next finds nothing to remove
    assert!(progress.batches.load(Ordering::SeqCst) >= 2);
    assert_eq!(
        progress.maximum.load(Ordering::SeqCst),
        progress.done.load(Ordering::SeqCst)
    );
    assert_eq!(progress.done.load(Ordering::SeqCst), manager.trials_spawned());
}

#[test]
fn test_invalid_job_fails_alone() {
    let mut manager = manager();
    let bad = manager
        .add_job_json(r#"{"Method": "CrossValidation", "CXO": 3, "X": 14}"#)
        .unwrap();
    let good = manager
        .add_single_job(JobDescriptor::new(Method::MonteCarlo).with_max_steps(5))
        .unwrap();

    let reports = manager.run_jobs().unwrap();
    assert_eq!(manager.state(bad), JobState::Failed);
    assert!(reports[0].error.as_ref().unwrap().contains("14"));
    assert!(reports[0].result.is_none());
    assert_eq!(manager.state(good), JobState::Completed);
}

#[test]
fn test_interrupted_job_keeps_partial_result() {
    let mut manager = manager();
    let id = manager
        .add_single_job(JobDescriptor::new(Method::MonteCarlo).with_max_steps(30))
        .unwrap();
    manager.interrupt();
    let reports = manager.run_jobs().unwrap();

    assert_eq!(manager.state(id), JobState::Interrupted);
    let result = reports[0].result.as_ref().unwrap();
    assert!(result.interrupted);
    assert_eq!(result.counts.skipped, 30);
    assert_eq!(manager.trials_spawned(), 0);
    // the token is cleared for the next run
    assert!(!manager.cancellation_token().is_cancelled());
}

#[test]
fn test_unknown_id_is_idle() {
    assert_eq!(manager().state(42), JobState::Idle);
}
