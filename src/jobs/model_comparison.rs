//! Model comparison: area of the joint confidence region.
//!
//! A fast bisection locates, for every selected parameter, where the SSE
//! crosses the confidence ceiling with all other parameters at their fitted
//! values. The resulting box is widened by `BoxScalingFactor` and sampled
//! uniformly; the share of draws inside the region times the box volume
//! estimates the region's area.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FitError, Result};
use crate::model::Model;
use crate::resampling::trial_rng;

use super::{JobContext, JobDescriptor, JobPayload, JobResult, Method, TrialCounts};

const BISECTION_STEP: f64 = 0.5;
const BISECTION_TOLERANCE: f64 = 1e-7;
const BISECTION_ITERATIONS: usize = 100;
/// Draws handled by one trial.
const DRAWS_PER_TRIAL: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBox {
    pub index: usize,
    pub name: String,
    pub value: f64,
    /// Crossing points found by the bisection.
    pub lower_limit: f64,
    pub upper_limit: f64,
    /// Sampled interval after scaling.
    pub box_lower: f64,
    pub box_upper: f64,
    /// Extremes of the draws inside the region.
    pub inside_min: Option<f64>,
    pub inside_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparisonResult {
    pub max_error: f64,
    pub parameters: Vec<ParameterBox>,
    pub draws: usize,
    pub inside: usize,
    pub box_volume: f64,
    pub area: f64,
}

fn sse_at(work: &mut dyn Model, index: usize, value: f64) -> f64 {
    work.core_mut().set_parameter(index, value);
    work.calculate();
    work.sse()
}

/// Where the SSE along `direction` (±1) from the fitted value first reaches
/// `max_error`.
///
/// Steps of fixed size move outward while the SSE stays below the ceiling;
/// once it is passed the step is halved around the last inside point until
/// the SSE matches the ceiling within tolerance. The parameter is locked
/// while it moves, so a local is not solved back to its fitted value.
pub fn fast_confidence(base: &dyn Model, index: usize, direction: f64, max_error: f64) -> f64 {
    let mut work = base.clone_model(false);
    work.core_mut().lock(index, true);
    let fitted = base.parameters().to_vec();
    let origin = fitted[index];

    let mut inside = origin;
    let mut step = BISECTION_STEP;
    let mut candidate = origin + direction * step;
    let mut error = sse_at(work.as_mut(), index, candidate);

    for iteration in 0..BISECTION_ITERATIONS {
        if (error - max_error).abs() <= BISECTION_TOLERANCE {
            break;
        }
        if error < max_error {
            inside = candidate;
        } else {
            step *= 0.5;
        }
        candidate = inside + direction * step;
        error = sse_at(work.as_mut(), index, candidate);
        debug!(index, iteration, candidate, error, "fast confidence");
    }
    candidate
}

pub(crate) fn run(descriptor: &JobDescriptor, ctx: &JobContext<'_>) -> Result<JobResult> {
    let model = ctx.model;
    let selected = descriptor.selected_parameters(model, false);
    if selected.is_empty() {
        return Err(FitError::InvalidJob(
            "model comparison needs at least one selected parameter".to_string(),
        ));
    }
    let max_error = model.error_threshold(descriptor.confidence)?;
    let fitted = model.parameters();
    let names = model.parameter_names();
    let scale = descriptor.box_scaling_factor;

    let mut boxes: Vec<ParameterBox> = selected
        .iter()
        .map(|&index| {
            let value = fitted[index];
            let lower_limit = fast_confidence(model, index, -1.0, max_error);
            let upper_limit = fast_confidence(model, index, 1.0, max_error);
            ParameterBox {
                index,
                name: names[index].clone(),
                value,
                lower_limit,
                upper_limit,
                box_lower: value - scale * (value - lower_limit),
                box_upper: value + scale * (upper_limit - value),
                inside_min: None,
                inside_max: None,
            }
        })
        .collect();
    let box_volume: f64 = boxes.iter().map(|b| b.box_upper - b.box_lower).product();
    if !box_volume.is_finite() || box_volume <= 0.0 {
        return Err(FitError::NonFinite(format!(
            "confidence box has volume {}",
            box_volume
        )));
    }

    let trials = descriptor.max_steps.div_ceil(DRAWS_PER_TRIAL);
    info!(parameters = selected.len(), draws = descriptor.max_steps, max_error, "model comparison started");

    let batch = ctx.runner.run(trials, |trial| {
        let mut rng = trial_rng(ctx.seed, trial);
        let mut work = model.clone_model(false);
        for b in &boxes {
            work.core_mut().lock(b.index, true);
        }
        let draws = DRAWS_PER_TRIAL.min(descriptor.max_steps - trial * DRAWS_PER_TRIAL);
        let mut inside = Vec::new();
        let mut non_finite = 0;
        for _ in 0..draws {
            let point: Vec<f64> = boxes
                .iter()
                .map(|b| rng.gen_range(b.box_lower..=b.box_upper))
                .collect();
            for (b, &v) in boxes.iter().zip(&point) {
                work.core_mut().set_parameter(b.index, v);
            }
            work.calculate();
            let sse = work.sse();
            if !sse.is_finite() {
                non_finite += 1;
            } else if sse <= max_error {
                inside.push(point);
            }
        }
        (draws, inside, non_finite)
    });

    let mut draws = 0;
    let mut inside = 0;
    let mut counts = TrialCounts {
        total: batch.requested,
        skipped: batch.skipped(),
        ..Default::default()
    };
    for (_, (trial_draws, points, non_finite)) in batch.results {
        draws += trial_draws;
        inside += points.len();
        if non_finite > 0 {
            counts.non_finite += 1;
        } else {
            counts.converged += 1;
        }
        for point in points {
            for (b, v) in boxes.iter_mut().zip(point) {
                b.inside_min = Some(b.inside_min.map_or(v, |m| m.min(v)));
                b.inside_max = Some(b.inside_max.map_or(v, |m| m.max(v)));
            }
        }
    }
    let area = if draws > 0 {
        inside as f64 / draws as f64 * box_volume
    } else {
        0.0
    };
    info!(draws, inside, area, interrupted = batch.interrupted, "model comparison finished");

    Ok(JobResult {
        method: Method::ModelComparison,
        seed: ctx.seed,
        confidence: descriptor.confidence,
        interrupted: batch.interrupted,
        counts,
        payload: JobPayload::ModelComparison(ModelComparisonResult {
            max_error,
            parameters: boxes,
            draws,
            inside,
            box_volume,
            area,
        }),
    })
}
