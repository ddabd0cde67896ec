//! Outer fit loop around the Levenberg-Marquardt driver.
//!
//! Each outer cycle re-derives the inline parameters for the current outer
//! parameters, takes one LM cycle on the outer parameters, and compares the
//! SSE and the L1 drift of the inline parameters with the previous cycle.
//! The loop stops when both the SSE change is below `error_convergence` and
//! the drift is below `delta_parameter`, or after `max_iter` cycles. Models
//! without inline parameters measure the drift over their outer parameters.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FitError, Result};
use crate::lm::{LevenbergMarquardt, OptimizerConfig};
use crate::model::{Model, ModelProblem};

/// Outcome of [`Optimizer::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Full parameter vector after the fit.
    pub parameters: Vec<f64>,
    /// Outer cycles taken.
    pub iterations: usize,
    /// `iterations < max_iter` and no cycle had to be rolled back.
    pub converged: bool,
    /// SSE at the returned parameters.
    pub sse: f64,
}

/// Fits one model instance with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
    lm: LevenbergMarquardt,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        let lm = LevenbergMarquardt::with_config(config.lm.clone());
        Ok(Self { config, lm })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Fit `model` starting from `initial` (zero-filled or truncated to the
    /// model's parameter count). Locked parameters keep their initial bits.
    pub fn fit(&self, model: &mut dyn Model, initial: &[f64]) -> Result<FitReport> {
        model.set_parameters(initial);

        let free = model.core().free_indices();
        let inline = model.core().inline_indices();
        let outer = model.core().outer_indices();
        let residuals = model.core().active_residual_count();
        if residuals < free.len() {
            return Err(FitError::UnderdeterminedSystem {
                residuals,
                parameters: free.len(),
            });
        }

        let start = model.parameters();
        let locked: Vec<(usize, f64)> = model
            .core()
            .locked()
            .iter()
            .enumerate()
            .filter(|(_, &l)| l)
            .map(|(i, _)| (i, start[i]))
            .collect();

        model.calculate();
        let mut sse = model.sse();
        if !sse.is_finite() {
            return Err(FitError::NonFinite(format!(
                "{} model gives non-finite residuals at the starting parameters",
                model.name()
            )));
        }

        let drift_indices = if inline.is_empty() { &outer } else { &inline };
        let mut iterations = 0;
        let mut rolled_back = false;

        while iterations < self.config.max_iter {
            iterations += 1;
            let before = model.parameters();
            let old_sse = sse;

            model.calculate();
            restore_locked(model, &locked);

            if !outer.is_empty() {
                let mut problem = ModelProblem::new(&mut *model, outer.clone());
                let initial = problem.initial();
                match self.lm.minimize(&mut problem, initial) {
                    Ok(result) => debug!(
                        cycle = iterations,
                        lm_iterations = result.iterations,
                        status = result.status.description(),
                        "lm cycle finished"
                    ),
                    Err(FitError::NonFinite(message)) => {
                        debug!(cycle = iterations, %message, "lm cycle started from non-finite state");
                        rolled_back = true;
                    }
                    Err(e) => return Err(e),
                }
            }
            restore_locked(model, &locked);
            model.calculate();
            sse = model.sse();

            if rolled_back || !sse.is_finite() {
                model.set_parameters(&before.to_vec());
                model.calculate();
                sse = model.sse();
                rolled_back = true;
                debug!(cycle = iterations, "non-finite cycle rolled back");
                break;
            }

            let after = model.parameters();
            let drift = l1_drift(&before, &after, drift_indices);
            let improvement = (old_sse - sse).abs();
            debug!(cycle = iterations, sse, improvement, drift, "outer cycle");

            if improvement < self.config.error_convergence && drift < self.config.delta_parameter {
                break;
            }
        }

        Ok(FitReport {
            parameters: model.parameters().to_vec(),
            iterations,
            converged: !rolled_back && iterations < self.config.max_iter,
            sse,
        })
    }
}

/// Convenience wrapper: validate `config` and fit once.
pub fn fit(model: &mut dyn Model, initial: &[f64], config: &OptimizerConfig) -> Result<FitReport> {
    Optimizer::new(config.clone())?.fit(model, initial)
}

fn restore_locked(model: &mut dyn Model, locked: &[(usize, f64)]) {
    for &(index, value) in locked {
        model.core_mut().set_parameter(index, value);
    }
}

fn l1_drift(before: &Array1<f64>, after: &Array1<f64>, indices: &[usize]) -> f64 {
    indices
        .iter()
        .map(|&i| (after[i] - before[i]).abs())
        .sum()
}
