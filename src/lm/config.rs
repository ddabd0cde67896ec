//! Configuration options for the Levenberg-Marquardt driver and the outer
//! fit loop.
//!
//! Every numeric knob is supplied by the caller. Neither struct implements
//! `Default`; construct them with `new` and adjust with the `with_*` methods.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};

/// Knobs of one Levenberg-Marquardt cycle on the outer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmConfig {
    /// Scale of the initial damping relative to the largest diagonal entry of JᵀJ.
    pub trust_region_factor: f64,

    /// Upper bound on residual evaluations within one cycle (Jacobian columns count).
    pub max_function_evaluations: usize,

    /// LM iterations taken per outer cycle.
    pub iterations_per_cycle: usize,

    /// Tolerance on the relative step size.
    pub xtol: f64,

    /// Tolerance on the relative cost reduction.
    pub ftol: f64,

    /// Tolerance on the infinity norm of the gradient Jᵀr.
    pub gtol: f64,

    /// Relative finite-difference step.
    pub epsilon: f64,

    /// Factor applied to lambda after a rejected step.
    pub lambda_up_factor: f64,

    /// Factor applied to lambda after a successful step.
    pub lambda_down_factor: f64,
}

impl LmConfig {
    /// Create a configuration from the trust-region factor, the evaluation
    /// budget, the x/f/g tolerances and the finite-difference epsilon.
    ///
    /// Lambda moves by a factor of ten in both directions unless changed
    /// with [`LmConfig::with_lambda_factors`]; one LM iteration is taken per
    /// outer cycle unless changed with [`LmConfig::with_iterations_per_cycle`].
    pub fn new(
        trust_region_factor: f64,
        max_function_evaluations: usize,
        xtol: f64,
        ftol: f64,
        gtol: f64,
        epsilon: f64,
    ) -> Self {
        Self {
            trust_region_factor,
            max_function_evaluations,
            iterations_per_cycle: 1,
            xtol,
            ftol,
            gtol,
            epsilon,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
        }
    }

    /// Set the number of LM iterations per outer cycle.
    pub fn with_iterations_per_cycle(mut self, iterations: usize) -> Self {
        self.iterations_per_cycle = iterations;
        self
    }

    /// Set the lambda increase/decrease factors.
    pub fn with_lambda_factors(mut self, up: f64, down: f64) -> Self {
        self.lambda_up_factor = up;
        self.lambda_down_factor = down;
        self
    }

    /// Set the finite-difference epsilon.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Check that every knob is in its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.trust_region_factor > 0.0) {
            return Err(FitError::InvalidInput(
                "trust_region_factor must be positive".to_string(),
            ));
        }
        if self.max_function_evaluations == 0 || self.iterations_per_cycle == 0 {
            return Err(FitError::InvalidInput(
                "function-evaluation and per-cycle iteration limits must be positive".to_string(),
            ));
        }
        if !(self.epsilon > 0.0) {
            return Err(FitError::InvalidInput(
                "finite-difference epsilon must be positive".to_string(),
            ));
        }
        if !(self.lambda_up_factor > 1.0) || !(self.lambda_down_factor > 0.0 && self.lambda_down_factor < 1.0) {
            return Err(FitError::InvalidInput(
                "lambda factors must satisfy up > 1 and 0 < down < 1".to_string(),
            ));
        }
        if self.xtol < 0.0 || self.ftol < 0.0 || self.gtol < 0.0 {
            return Err(FitError::InvalidInput(
                "tolerances must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Thresholds of the outer fit loop plus the LM knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Maximum number of outer cycles.
    pub max_iter: usize,

    /// SSE improvement below which a cycle counts as converged.
    pub error_convergence: f64,

    /// L1 drift of the inline parameters below which a cycle counts as converged.
    pub delta_parameter: f64,

    /// Levenberg-Marquardt knobs.
    pub lm: LmConfig,
}

impl OptimizerConfig {
    pub fn new(max_iter: usize, error_convergence: f64, delta_parameter: f64, lm: LmConfig) -> Self {
        Self {
            max_iter,
            error_convergence,
            delta_parameter,
            lm,
        }
    }

    /// Set the maximum number of outer cycles.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the SSE convergence threshold.
    pub fn with_error_convergence(mut self, error_convergence: f64) -> Self {
        self.error_convergence = error_convergence;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(FitError::InvalidInput("max_iter must be positive".to_string()));
        }
        if !(self.error_convergence >= 0.0) || !(self.delta_parameter >= 0.0) {
            return Err(FitError::InvalidInput(
                "convergence thresholds must be non-negative numbers".to_string(),
            ));
        }
        self.lm.validate()
    }
}
