//! Job queue of one fitted model.
//!
//! ```text
//! Idle ──add──▶ Queued ──run_jobs──▶ Running ──▶ Completed
//!                                       │──────▶ Interrupted
//!                                       └──────▶ Failed
//! ```
//!
//! Jobs run one after another; the trials inside a job use the runner's
//! pool. A failing job never stops the queue.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{FitError, Result};
use crate::jobs::{run_job, JobContext, JobDescriptor, JobResult, Method};
use crate::lm::OptimizerConfig;
use crate::model::Model;
use crate::optimizer::Optimizer;
use crate::runner::{
    CancellationToken, NoProgress, ProgressObserver, RunnerConfig, TrialRunner, DEFAULT_SEED,
};

/// Lifecycle of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Queued,
    Running,
    Completed,
    Interrupted,
    Failed,
}

/// Handle returned when a job is queued.
pub type JobId = usize;

/// State and outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub id: JobId,
    pub method: Method,
    pub state: JobState,
    pub result: Option<JobResult>,
    pub error: Option<String>,
}

struct QueuedJob {
    descriptor: JobDescriptor,
    report: JobReport,
}

pub struct JobManager {
    model: Box<dyn Model>,
    optimizer: Optimizer,
    runner_config: RunnerConfig,
    token: CancellationToken,
    progress: Arc<dyn ProgressObserver>,
    jobs: Vec<QueuedJob>,
    spawned: usize,
}

impl JobManager {
    /// Manage jobs on `model`, which should already be fitted. The model is
    /// calculated once so that its statistics are available.
    pub fn new(
        mut model: Box<dyn Model>,
        optimizer: OptimizerConfig,
        runner: RunnerConfig,
    ) -> Result<Self> {
        runner.validate()?;
        let optimizer = Optimizer::new(optimizer)?;
        model.calculate();
        Ok(Self {
            model,
            optimizer,
            runner_config: runner,
            token: CancellationToken::new(),
            progress: Arc::new(NoProgress),
            jobs: Vec::new(),
            spawned: 0,
        })
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    /// Token shared with every job; cancelling it interrupts the running job.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Queue a job. Descriptors without a method are refused here and never
    /// reach the runner.
    pub fn add_single_job(&mut self, descriptor: JobDescriptor) -> Result<JobId> {
        let method = descriptor.require_method()?;
        let id = self.jobs.len();
        self.jobs.push(QueuedJob {
            descriptor,
            report: JobReport {
                id,
                method,
                state: JobState::Queued,
                result: None,
                error: None,
            },
        });
        info!(id, ?method, "job queued");
        Ok(id)
    }

    pub fn add_job_json(&mut self, json: &str) -> Result<JobId> {
        self.add_single_job(JobDescriptor::from_json(json)?)
    }

    /// State of job `id`; unknown ids are `Idle`.
    pub fn state(&self, id: JobId) -> JobState {
        self.jobs
            .get(id)
            .map(|job| job.report.state)
            .unwrap_or(JobState::Idle)
    }

    pub fn report(&self, id: JobId) -> Option<&JobReport> {
        self.jobs.get(id).map(|job| &job.report)
    }

    /// Request a cooperative stop of the running job.
    pub fn interrupt(&self) {
        self.token.cancel();
    }

    /// Trials started over the manager's lifetime.
    pub fn trials_spawned(&self) -> usize {
        self.spawned
    }

    /// Run every queued job in order and return their reports.
    pub fn run_jobs(&mut self) -> Result<Vec<JobReport>> {
        let runner = TrialRunner::new(
            &self.runner_config,
            self.token.clone(),
            Arc::clone(&self.progress),
        )?;
        let mut reports = Vec::new();

        for job in self.jobs.iter_mut() {
            if job.report.state != JobState::Queued {
                continue;
            }
            job.report.state = JobState::Running;
            let seed = job
                .descriptor
                .seed
                .or(self.runner_config.seed)
                .unwrap_or(DEFAULT_SEED);
            let ctx = JobContext {
                model: self.model.as_ref(),
                optimizer: &self.optimizer,
                runner: &runner,
                seed,
            };
            info!(id = job.report.id, method = ?job.report.method, seed, "job started");

            match run_job(&job.descriptor, &ctx) {
                Ok(result) => {
                    job.report.state = if result.interrupted {
                        JobState::Interrupted
                    } else {
                        JobState::Completed
                    };
                    info!(id = job.report.id, state = ?job.report.state, "job finished");
                    job.report.result = Some(result);
                }
                Err(e) => {
                    warn!(id = job.report.id, error = %e, "job failed");
                    job.report.state = if self.token.is_cancelled() {
                        JobState::Interrupted
                    } else {
                        JobState::Failed
                    };
                    job.report.error = Some(e.to_string());
                }
            }
            reports.push(job.report.clone());
        }

        self.spawned += runner.spawned();
        self.token.reset();
        Ok(reports)
    }
}

impl std::fmt::Debug for JobManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobManager")
            .field("model", &self.model.name())
            .field("jobs", &self.jobs.len())
            .field("spawned", &self.spawned)
            .finish()
    }
}

/// Parse and run a single job outside a manager.
pub fn run_descriptor(
    model: &dyn Model,
    descriptor: &JobDescriptor,
    optimizer: &OptimizerConfig,
    runner: &RunnerConfig,
) -> Result<JobResult> {
    if model.statistics().is_none() {
        return Err(FitError::InvalidInput(
            "jobs need a calculated model".to_string(),
        ));
    }
    let optimizer = Optimizer::new(optimizer.clone())?;
    let trial_runner = TrialRunner::new(runner, CancellationToken::new(), Arc::new(NoProgress))?;
    let seed = descriptor.seed.or(runner.seed).unwrap_or(DEFAULT_SEED);
    run_job(
        descriptor,
        &JobContext {
            model,
            optimizer: &optimizer,
            runner: &trial_runner,
            seed,
        },
    )
}
