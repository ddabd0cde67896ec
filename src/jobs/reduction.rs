//! Reduction analysis.
//!
//! Parameter mode eliminates, round by round, the parameter whose removal
//! (locking at zero) costs the least SSE, until every remaining candidate
//! would push the SSE above the cutoff. The data modes refit on datasets
//! truncated from the end (backward) or the start (forward) and record how
//! the parameters drift.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FitError, Result};
use crate::model::Model;

use super::{
    refit_model, refit_trial, JobContext, JobDescriptor, JobPayload, JobResult, Method, ReductionRuntype,
    TrialCounts, TrialRecord, TrialStatus,
};

/// One accepted elimination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionStep {
    pub removed: usize,
    pub name: String,
    pub sse: f64,
    pub aicc: f64,
    pub parameters: Vec<f64>,
}

/// Fit on a truncated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataReductionPoint {
    /// Active rows used by the fit.
    pub points: usize,
    /// Dataset rows masked out for this fit.
    pub removed: Vec<usize>,
    pub status: TrialStatus,
    pub sse: f64,
    pub parameters: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionResult {
    pub runtype: ReductionRuntype,
    pub cutoff: f64,
    /// SSE and AICc of the unreduced fit.
    pub initial_sse: f64,
    pub initial_aicc: f64,
    pub steps: Vec<ReductionStep>,
    pub data_series: Vec<DataReductionPoint>,
}

pub(crate) fn run(descriptor: &JobDescriptor, ctx: &JobContext<'_>) -> Result<JobResult> {
    let model = ctx.model;
    let cutoff = match descriptor.cutoff {
        Some(cutoff) => cutoff,
        None => model.error_threshold(descriptor.confidence)?,
    };
    let initial = model
        .statistics()
        .cloned()
        .ok_or_else(|| FitError::InvalidInput("reduction needs a calculated model".to_string()))?;

    info!(runtype = ?descriptor.reduction_runtype, cutoff, "reduction started");
    let (steps, data_series, counts, interrupted) = match descriptor.reduction_runtype {
        ReductionRuntype::Parameter => {
            let (steps, counts, interrupted) = eliminate_parameters(descriptor, ctx, cutoff)?;
            (steps, Vec::new(), counts, interrupted)
        }
        runtype => {
            let (series, counts, interrupted) = truncate_data(runtype, ctx)?;
            (Vec::new(), series, counts, interrupted)
        }
    };
    info!(removed = steps.len(), fits = data_series.len(), interrupted, "reduction finished");

    Ok(JobResult {
        method: Method::Reduction,
        seed: ctx.seed,
        confidence: descriptor.confidence,
        interrupted,
        counts,
        payload: JobPayload::Reduction(ReductionResult {
            runtype: descriptor.reduction_runtype,
            cutoff,
            initial_sse: initial.sse,
            initial_aicc: initial.aicc,
            steps,
            data_series,
        }),
    })
}

fn eliminate_parameters(
    descriptor: &JobDescriptor,
    ctx: &JobContext<'_>,
    cutoff: f64,
) -> Result<(Vec<ReductionStep>, TrialCounts, bool)> {
    let names = ctx.model.parameter_names();
    let mut current: Box<dyn Model> = ctx.model.clone_model(true);
    let mut candidates = descriptor.selected_parameters(ctx.model, true);
    let mut steps = Vec::new();
    let mut counts = TrialCounts::default();

    // keep at least one free parameter
    while !candidates.is_empty() && current.core().free_indices().len() > 1 {
        let base: &dyn Model = current.as_ref();
        let batch = ctx.runner.run(candidates.len(), |slot| {
            let index = candidates[slot];
            let mut trial = base.clone_model(false);
            trial.core_mut().lock(index, true);
            let mut start = base.parameters().to_vec();
            start[index] = 0.0;
            refit_model(trial, &start, ctx.optimizer, slot)
        });

        let round: Vec<TrialRecord> = batch.results.iter().map(|(_, (r, _))| r.clone()).collect();
        counts.merge(TrialCounts::from_records(batch.requested, &round));
        if batch.interrupted {
            return Ok((steps, counts, true));
        }

        let best = batch
            .results
            .into_iter()
            .filter(|(_, (record, _))| record.status != TrialStatus::NonFinite)
            .min_by(|(_, (a, _)), (_, (b, _))| a.sse.total_cmp(&b.sse));
        let Some((slot, (record, fitted))) = best else {
            warn!("no candidate removal could be refitted");
            break;
        };
        if record.sse > cutoff {
            break;
        }

        let removed = candidates.remove(slot);
        let aicc = fitted.statistics().map(|s| s.aicc).unwrap_or(f64::NAN);
        steps.push(ReductionStep {
            removed,
            name: names[removed].clone(),
            sse: record.sse,
            aicc,
            parameters: record.parameters,
        });
        current = fitted;
    }
    Ok((steps, counts, false))
}

fn truncate_data(
    runtype: ReductionRuntype,
    ctx: &JobContext<'_>,
) -> Result<(Vec<DataReductionPoint>, TrialCounts, bool)> {
    let model = ctx.model;
    let dataset = model.core().dataset();
    let rows = dataset.active_row_indices();
    let free = model.core().free_indices().len();
    let minimum = free + 1;
    if rows.len() < minimum {
        return Err(FitError::InvalidJob(format!(
            "{} points cannot support {} parameters",
            rows.len(),
            free
        )));
    }
    let fits = rows.len() - minimum + 1;

    let batch = ctx.runner.run(fits, |dropped| {
        let removed: Vec<usize> = match runtype {
            ReductionRuntype::Forward => rows[..dropped].to_vec(),
            _ => rows[rows.len() - dropped..].to_vec(),
        };
        dataset.with_masked_rows(&removed).map(|masked| {
            let (record, _) = refit_trial(model, masked, ctx.optimizer, dropped);
            DataReductionPoint {
                points: rows.len() - dropped,
                removed,
                status: record.status,
                sse: record.sse,
                parameters: record.parameters,
            }
        })
    });

    let mut series_out = Vec::with_capacity(batch.results.len());
    let mut counts = TrialCounts {
        total: batch.requested,
        skipped: batch.skipped(),
        ..Default::default()
    };
    for (_, point) in batch.results {
        let point = point?;
        match point.status {
            TrialStatus::Converged => counts.converged += 1,
            TrialStatus::NotConverged => counts.not_converged += 1,
            TrialStatus::NonFinite => counts.non_finite += 1,
        }
        series_out.push(point);
    }
    Ok((series_out, counts, batch.interrupted))
}
