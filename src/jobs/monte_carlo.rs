//! Monte Carlo resampling.
//!
//! Every trial adds noise to either the fitted signal or the measured data,
//! refits the free parameters and keeps the resulting vector.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FitError, Result};
use crate::model::Model;
use crate::resampling::{inject_bootstrap, inject_gaussian, trial_rng};

use super::{
    refit_trial, JobContext, JobDescriptor, JobPayload, JobResult, Method, ResamplingSummary,
    TrialCounts, TrialRecord, VarianceSource,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub variance_source: VarianceSource,
    /// Noise standard deviation actually used.
    pub sigma: f64,
    pub bootstrap: bool,
    pub original_data: bool,
    pub summary: ResamplingSummary,
    pub trials: Vec<TrialRecord>,
}

/// Table the noise is added to: the measured data for `original_data`,
/// otherwise the fitted signal on active cells and the data elsewhere.
pub fn noise_base(model: &dyn Model, original_data: bool) -> Array2<f64> {
    let core = model.core();
    let data = core.dataset().dependent();
    if original_data {
        return data.clone();
    }
    let mut base = data.clone();
    let series = core.active_series();
    for r in core.dataset().active_row_indices() {
        for s in 0..base.ncols() {
            if series.get(s).copied().unwrap_or(false) {
                base[[r, s]] = core.signal()[[r, s]];
            }
        }
    }
    base
}

fn noise_level(descriptor: &JobDescriptor, model: &dyn Model) -> Result<f64> {
    let stats = model.statistics().ok_or_else(|| {
        FitError::InvalidInput("Monte Carlo needs a calculated model".to_string())
    })?;
    let sigma = match descriptor.resolved_variance_source() {
        VarianceSource::Custom => descriptor.variance.unwrap_or(0.0),
        VarianceSource::SEy => stats.sey,
        VarianceSource::StdDeviation => stats.sigma,
    };
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(FitError::InvalidJob(format!(
            "noise deviation {} is not usable",
            sigma
        )));
    }
    Ok(sigma)
}

pub(crate) fn run(descriptor: &JobDescriptor, ctx: &JobContext<'_>) -> Result<JobResult> {
    let model = ctx.model;
    let core = model.core();
    let sigma = noise_level(descriptor, model)?;
    let base = noise_base(model, descriptor.original_data);
    let sigmas = vec![sigma; core.series_count()];
    let pool = model.residuals().to_vec();
    let dataset = core.dataset().as_ref();
    let active_rows = dataset.active_rows();
    let active_series = core.active_series();

    info!(
        steps = descriptor.max_steps,
        sigma,
        bootstrap = descriptor.bootstrap,
        "monte carlo started"
    );

    let batch = ctx.runner.run(descriptor.max_steps, |index| {
        let mut rng = trial_rng(ctx.seed, index);
        let noisy = if descriptor.bootstrap {
            inject_bootstrap(&base, &pool, active_rows, active_series, &mut rng)
        } else {
            inject_gaussian(&base, &sigmas, active_rows, active_series, &mut rng)
        };
        noisy
            .and_then(|table| dataset.with_dependent(table))
            .map(|copy| refit_trial(model, copy, ctx.optimizer, index).0)
    });

    let mut trials = Vec::with_capacity(batch.results.len());
    for (_, record) in batch.results {
        trials.push(record?);
    }
    let counts = TrialCounts::from_records(batch.requested, &trials);
    let summary =
        ResamplingSummary::from_records(model, &trials, descriptor.confidence, descriptor.entropy_bins);
    info!(
        converged = counts.converged,
        discarded = counts.non_finite + counts.not_converged,
        interrupted = batch.interrupted,
        "monte carlo finished"
    );

    Ok(JobResult {
        method: Method::MonteCarlo,
        seed: ctx.seed,
        confidence: descriptor.confidence,
        interrupted: batch.interrupted,
        counts,
        payload: JobPayload::MonteCarlo(MonteCarloResult {
            variance_source: descriptor.resolved_variance_source(),
            sigma,
            bootstrap: descriptor.bootstrap,
            original_data: descriptor.original_data,
            summary,
            trials,
        }),
    })
}
