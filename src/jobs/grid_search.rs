//! Weakened grid search: one-dimensional confidence scans.
//!
//! Each selected parameter is scanned down and up from its fitted value
//! until the SSE leaves the confidence region. The two scans of every
//! parameter are independent trials on the worker pool.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::optimizer::Optimizer;
use crate::resampling::{
    scan_direction, Direction, ScanLimits, ScanOutcome, ScanPoint, ScanStop, StepPerturbation,
};

use super::{JobContext, JobDescriptor, JobPayload, JobResult, Method, TrialCounts};

/// Scan result of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterScan {
    pub index: usize,
    pub name: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    pub lower_stop: ScanStop,
    pub upper_stop: ScanStop,
    /// (value, SSE) points in ascending parameter order.
    pub points: Vec<ScanPoint>,
}

impl ParameterScan {
    pub fn lower_converged(&self) -> bool {
        self.lower_stop == ScanStop::CeilingExceeded
    }

    pub fn upper_converged(&self) -> bool {
        self.upper_stop == ScanStop::CeilingExceeded
    }

    pub fn converged(&self) -> bool {
        self.lower_converged() && self.upper_converged()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// SSE ceiling the scans were run against.
    pub max_error: f64,
    pub relax: bool,
    pub scans: Vec<ParameterScan>,
}

pub(crate) fn run(descriptor: &JobDescriptor, ctx: &JobContext<'_>) -> Result<JobResult> {
    let model = ctx.model;
    let selected = descriptor.selected_parameters(model, false);
    let max_error = match descriptor.max_parameter {
        Some(ceiling) => ceiling,
        None => model.error_threshold(descriptor.confidence)?,
    };
    let limits = ScanLimits {
        max_steps: descriptor.max_steps,
        max_error,
        fit_error: model.sse(),
        overshoot: descriptor.overshot_counter,
        error_decrease: descriptor.error_decrease_counter,
    };
    let refit = if descriptor.relax {
        Some(Optimizer::new(
            ctx.optimizer
                .config()
                .clone()
                .with_error_convergence(descriptor.error_convergency),
        )?)
    } else {
        None
    };
    let fitted = model.parameters();
    let names = model.parameter_names();

    info!(parameters = selected.len(), max_error, "grid search started");

    let batch = ctx.runner.run(selected.len() * 2, |trial| {
        let index = selected[trial / 2];
        let direction = if trial % 2 == 0 {
            Direction::Down
        } else {
            Direction::Up
        };
        let perturbation =
            StepPerturbation::new(index, fitted[index], descriptor.step_scaling_factor);
        scan_direction(
            model,
            &perturbation,
            direction,
            &limits,
            refit.as_ref(),
            descriptor.store_raw,
            ctx.runner.token(),
        )
    });

    let mut outcomes: Vec<Option<ScanOutcome>> = vec![None; selected.len() * 2];
    for (trial, outcome) in batch.results {
        outcomes[trial] = Some(outcome);
    }

    let mut counts = TrialCounts {
        total: batch.requested,
        ..Default::default()
    };
    let mut scans = Vec::with_capacity(selected.len());
    for (slot, &index) in selected.iter().enumerate() {
        let (down, up) = match (outcomes[2 * slot].take(), outcomes[2 * slot + 1].take()) {
            (Some(down), Some(up)) => (down, up),
            _ => {
                counts.skipped += 2;
                continue;
            }
        };
        for outcome in [&down, &up] {
            match outcome.stop {
                ScanStop::CeilingExceeded => counts.converged += 1,
                ScanStop::NonFinite => counts.non_finite += 1,
                ScanStop::Interrupted => counts.skipped += 1,
                ScanStop::StepLimit | ScanStop::NotAtMinimum => counts.not_converged += 1,
            }
        }
        if down.stop == ScanStop::NotAtMinimum || up.stop == ScanStop::NotAtMinimum {
            warn!(parameter = %names[index], "fit is not at a minimum along this parameter");
        }

        let mut points: Vec<ScanPoint> = down.points.into_iter().rev().collect();
        points.extend(up.points);
        scans.push(ParameterScan {
            index,
            name: names[index].clone(),
            value: fitted[index],
            lower: down.bound,
            upper: up.bound,
            lower_stop: down.stop,
            upper_stop: up.stop,
            points,
        });
    }
    info!(converged = counts.converged, interrupted = batch.interrupted, "grid search finished");

    Ok(JobResult {
        method: Method::GridSearch,
        seed: ctx.seed,
        confidence: descriptor.confidence,
        interrupted: batch.interrupted || counts.skipped > 0,
        counts,
        payload: JobPayload::GridSearch(GridSearchResult {
            max_error,
            relax: descriptor.relax,
            scans,
        }),
    })
}
