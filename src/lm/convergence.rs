//! Stopping criteria for one Levenberg-Marquardt cycle.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::config::LmConfig;

/// Why an LM cycle stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The cycle is still running.
    Running,

    /// Relative step size fell below `xtol`.
    ParameterConvergence,

    /// Relative cost reduction fell below `ftol`.
    FunctionValueConvergence,

    /// Gradient infinity norm fell below `gtol`.
    GradientConvergence,

    /// The per-cycle iteration count was used up.
    CycleComplete,

    /// The function-evaluation budget was used up.
    EvaluationLimit,

    /// No acceptable step was found before lambda hit its ceiling.
    DampingExhausted,
}

impl ConvergenceStatus {
    /// Returns true if the cycle has terminated.
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::Running)
    }

    /// Returns true if the cycle stopped on a tolerance.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::FunctionValueConvergence
                | ConvergenceStatus::GradientConvergence
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::Running => "running",
            ConvergenceStatus::ParameterConvergence => "converged: small parameter change",
            ConvergenceStatus::FunctionValueConvergence => "converged: small cost change",
            ConvergenceStatus::GradientConvergence => "converged: small gradient",
            ConvergenceStatus::CycleComplete => "cycle iteration count reached",
            ConvergenceStatus::EvaluationLimit => "function-evaluation limit reached",
            ConvergenceStatus::DampingExhausted => "no acceptable step, damping exhausted",
        }
    }
}

/// Tolerances checked after every accepted step.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    pub xtol: f64,
    pub ftol: f64,
    pub gtol: f64,
}

impl From<&LmConfig> for ConvergenceCriteria {
    fn from(config: &LmConfig) -> Self {
        Self {
            xtol: config.xtol,
            ftol: config.ftol,
            gtol: config.gtol,
        }
    }
}

impl ConvergenceCriteria {
    /// Checks the gradient before a step is attempted.
    pub fn check_gradient(&self, gradient_norm: f64) -> ConvergenceStatus {
        if gradient_norm <= self.gtol {
            ConvergenceStatus::GradientConvergence
        } else {
            ConvergenceStatus::Running
        }
    }

    /// Checks an accepted step.
    pub fn check_step(
        &self,
        params: &Array1<f64>,
        new_params: &Array1<f64>,
        cost: f64,
        new_cost: f64,
    ) -> ConvergenceStatus {
        let step_norm = (new_params - params).mapv(|v| v * v).sum().sqrt();
        let param_norm = params.mapv(|v| v * v).sum().sqrt();
        if step_norm <= self.xtol * (param_norm + self.xtol) {
            return ConvergenceStatus::ParameterConvergence;
        }

        if new_cost == 0.0 || (cost - new_cost).abs() <= self.ftol * cost {
            return ConvergenceStatus::FunctionValueConvergence;
        }

        ConvergenceStatus::Running
    }
}
