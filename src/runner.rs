//! Bounded worker pool for the trials of a job.
//!
//! Trials are independent closures indexed `0..count`. They run on a rayon
//! pool sized by [`RunnerConfig::threads`]; each trial derives its own RNG
//! from the job seed and its index, so results are reproducible regardless
//! of scheduling. Cancellation is cooperative and checked before a trial
//! starts.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

use crate::error::{FitError, Result};

/// Default job seed when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Threading and reproducibility settings shared by every job of a manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub threads: usize,
    pub seed: Option<u64>,
    /// Trials stop being started once this file exists.
    pub stop_file: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            threads,
            seed: None,
            stop_file: None,
        }
    }
}

impl RunnerConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stop_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stop_file = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(FitError::InvalidInput(
                "runner needs at least one thread".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shared interruption flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Receives progress of the running job.
pub trait ProgressObserver: Send + Sync {
    /// Called at the start of every batch of trials with the batch size.
    ///
    /// Most jobs run a single batch. Parameter reduction runs one batch per
    /// elimination round and announces each round as it starts, so observers
    /// should add these values up rather than keep the last one.
    fn maximum_steps(&self, _steps: usize) {}

    /// Called after each finished trial with its wall time.
    fn increment_progress(&self, _elapsed_ms: u64) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Trial results in index order.
#[derive(Debug, Clone)]
pub struct TrialBatch<T> {
    /// `(trial index, result)` for every trial that ran.
    pub results: Vec<(usize, T)>,
    pub requested: usize,
    pub interrupted: bool,
}

impl<T> TrialBatch<T> {
    /// Trials that were never started because of an interruption.
    pub fn skipped(&self) -> usize {
        self.requested - self.results.len()
    }
}

/// Runs trials of one job at a time on a fixed pool.
pub struct TrialRunner {
    pool: rayon::ThreadPool,
    token: CancellationToken,
    progress: Arc<dyn ProgressObserver>,
    stop_file: Option<PathBuf>,
    spawned: AtomicUsize,
}

impl TrialRunner {
    /// Build the pool described by `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Thread count and optional stop file
    /// * `token` - Interruption flag shared with the caller
    /// * `progress` - Observer notified per trial
    pub fn new(
        config: &RunnerConfig,
        token: CancellationToken,
        progress: Arc<dyn ProgressObserver>,
    ) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| FitError::Other(format!("failed to build worker pool: {}", e)))?;
        Ok(Self {
            pool,
            token,
            progress,
            stop_file: config.stop_file.clone(),
            spawned: AtomicUsize::new(0),
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Total trials started by this runner.
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    fn should_stop(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        if let Some(path) = &self.stop_file {
            if path.exists() {
                debug!(path = %path.display(), "stop file found");
                self.token.cancel();
                return true;
            }
        }
        false
    }

    /// Run `trial(i)` for `i in 0..count` and collect the results sorted by
    /// index.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of trials
    /// * `trial` - Work of one trial, called with its index
    pub fn run<T, F>(&self, count: usize, trial: F) -> TrialBatch<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        self.progress.maximum_steps(count);
        let collected: Mutex<Vec<(usize, T)>> = Mutex::new(Vec::with_capacity(count));

        self.pool.install(|| {
            (0..count).into_par_iter().for_each(|index| {
                if self.should_stop() {
                    return;
                }
                self.spawned.fetch_add(1, Ordering::SeqCst);
                let started = Instant::now();
                let result = trial(index);
                self.progress
                    .increment_progress(started.elapsed().as_millis() as u64);
                collected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((index, result));
            });
        });

        let mut results = collected.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.sort_by_key(|(index, _)| *index);
        let interrupted = results.len() < count && self.token.is_cancelled();
        TrialBatch {
            results,
            requested: count,
            interrupted,
        }
    }
}
