//! Damping control for the Levenberg-Marquardt driver.
//!
//! The damping parameter adapts to the agreement between the predicted and
//! the actual reduction in cost.

use super::config::LmConfig;

const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e15;

/// Damping state for one LM cycle.
#[derive(Debug, Clone)]
pub struct TrustRegion {
    /// Current value of the damping parameter
    pub lambda: f64,

    /// Factor to increase lambda by when a step is rejected
    pub lambda_increase_factor: f64,

    /// Factor to decrease lambda by when a step is accepted
    pub lambda_decrease_factor: f64,

    /// Minimum gain ratio required to accept a step
    pub min_gain_ratio: f64,

    /// Gain ratio above which lambda is decreased
    pub good_gain_ratio: f64,
}

impl TrustRegion {
    /// Start a trust region scaled to the largest diagonal entry of JᵀJ.
    pub fn from_config(config: &LmConfig, max_diagonal: f64) -> Self {
        let scale = if max_diagonal.is_finite() && max_diagonal > 0.0 {
            max_diagonal
        } else {
            1.0
        };
        Self {
            lambda: (config.trust_region_factor * scale).clamp(LAMBDA_MIN, LAMBDA_MAX),
            lambda_increase_factor: config.lambda_up_factor,
            lambda_decrease_factor: config.lambda_down_factor,
            min_gain_ratio: 1e-4,
            good_gain_ratio: 0.75,
        }
    }

    /// Update lambda from the gain ratio; returns whether the step is accepted.
    pub fn update_lambda(&mut self, gain_ratio: f64) -> bool {
        if gain_ratio > self.min_gain_ratio {
            if gain_ratio > self.good_gain_ratio {
                self.lambda = (self.lambda * self.lambda_decrease_factor).max(LAMBDA_MIN);
            }
            true
        } else {
            self.reject();
            false
        }
    }

    /// Increase lambda after a step that could not be evaluated.
    pub fn reject(&mut self) {
        self.lambda = (self.lambda * self.lambda_increase_factor).min(LAMBDA_MAX);
    }

    /// Whether lambda has hit its ceiling.
    pub fn exhausted(&self) -> bool {
        self.lambda >= LAMBDA_MAX
    }

    /// Ratio of actual to predicted cost reduction.
    pub fn gain_ratio(current_cost: f64, new_cost: f64, predicted_reduction: f64) -> f64 {
        let actual_reduction = current_cost - new_cost;

        if predicted_reduction.abs() < 1e-300 {
            if actual_reduction.abs() < 1e-300 {
                1.0
            } else {
                0.0
            }
        } else {
            actual_reduction / predicted_reduction
        }
    }
}
