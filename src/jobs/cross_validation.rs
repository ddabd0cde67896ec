//! Leave-X-out cross-validation.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FitError, Result};
use crate::model::Model;
use crate::resampling::{choose_strategy, job_rng, leave_x_out, CombinationStrategy};

use super::{
    refit_trial, CvAlgorithm, CvType, JobContext, JobDescriptor, JobPayload, JobResult, Method,
    ResamplingSummary, TrialCounts, TrialRecord,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationResult {
    pub cxo: CvType,
    /// Rows left out per trial.
    pub x: usize,
    pub strategy: CombinationStrategy,
    pub summary: ResamplingSummary,
    /// Mean held-out SSE over the converged trials.
    pub mean_prediction_error: Option<f64>,
    pub trials: Vec<TrialRecord>,
}

/// SSE of `model`'s signal against the original data on `rows`.
fn prediction_error(model: &dyn Model, original: &ndarray::Array2<f64>, rows: &[usize]) -> f64 {
    let core = model.core();
    let signal = core.signal();
    let mut sse = 0.0;
    for (s, &active) in core.active_series().iter().enumerate() {
        if !active {
            continue;
        }
        for &r in rows {
            let d = signal[[r, s]] - original[[r, s]];
            sse += d * d;
        }
    }
    sse
}

pub(crate) fn run(descriptor: &JobDescriptor, ctx: &JobContext<'_>) -> Result<JobResult> {
    let model = ctx.model;
    let core = model.core();
    let dataset = core.dataset().as_ref();
    let rows = dataset.active_row_indices();
    let n = rows.len();

    let x = match descriptor.cxo {
        CvType::LeaveOneOut => 1,
        CvType::LeaveTwoOut => 2,
        CvType::LeaveXOut => descriptor.x,
    };
    if x + 1 >= n {
        return Err(FitError::InvalidJob(format!(
            "cannot leave {} of {} points out",
            x, n
        )));
    }
    let series = core.active_series().iter().filter(|&&a| a).count();
    let free = core.free_indices().len();
    if (n - x) * series < free {
        return Err(FitError::InvalidJob(format!(
            "leaving {} points out leaves {} residuals for {} parameters",
            x,
            (n - x) * series,
            free
        )));
    }

    let (cap, strategy) = match descriptor.cxo {
        CvType::LeaveOneOut => (None, CombinationStrategy::Precomputed),
        CvType::LeaveTwoOut => (Some(descriptor.max_steps), CombinationStrategy::Precomputed),
        CvType::LeaveXOut => {
            let strategy = match descriptor.algorithm {
                CvAlgorithm::Precomputed => CombinationStrategy::Precomputed,
                CvAlgorithm::Random => CombinationStrategy::Random,
                CvAlgorithm::Auto => choose_strategy(n, x, descriptor.max_steps),
            };
            (Some(descriptor.max_steps), strategy)
        }
    };

    let mut rng = job_rng(ctx.seed);
    let combinations = leave_x_out(&rows, x, cap, strategy, &mut rng)?;
    info!(x, trials = combinations.len(), ?strategy, "cross-validation started");

    let original = dataset.dependent();
    let batch = ctx.runner.run(combinations.len(), |index| {
        let held_out = &combinations[index];
        dataset.with_masked_rows(held_out).map(|masked| {
            let (mut record, fitted) = refit_trial(model, masked, ctx.optimizer, index);
            record.prediction_error = Some(prediction_error(fitted.as_ref(), original, held_out));
            record.held_out = Some(held_out.clone());
            record
        })
    });

    let mut trials = Vec::with_capacity(batch.results.len());
    for (_, record) in batch.results {
        trials.push(record?);
    }
    let counts = TrialCounts::from_records(batch.requested, &trials);
    let summary =
        ResamplingSummary::from_records(model, &trials, descriptor.confidence, descriptor.entropy_bins);
    let errors: Vec<f64> = trials
        .iter()
        .filter(|t| t.is_converged())
        .filter_map(|t| t.prediction_error)
        .collect();
    let mean_prediction_error = if errors.is_empty() {
        None
    } else {
        Some(errors.iter().sum::<f64>() / errors.len() as f64)
    };
    info!(converged = counts.converged, interrupted = batch.interrupted, "cross-validation finished");

    Ok(JobResult {
        method: Method::CrossValidation,
        seed: ctx.seed,
        confidence: descriptor.confidence,
        interrupted: batch.interrupted,
        counts,
        payload: JobPayload::CrossValidation(CrossValidationResult {
            cxo: descriptor.cxo,
            x,
            strategy,
            summary,
            mean_prediction_error,
            trials,
        }),
    })
}
