//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! One call to [`LevenbergMarquardt::minimize`] runs a bounded cycle of damped
//! Gauss-Newton iterations. The outer fit loop in [`crate::optimizer`] chains
//! cycles and interleaves them with the inline parameter solves.

use ndarray::Array1;
use std::fmt;

use crate::error::{FitError, Result};
use crate::problem::Problem;

use super::config::LmConfig;
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};
use super::step::{calculate_step, NormalEquations};
use super::trust_region::TrustRegion;

/// Result of one Levenberg-Marquardt cycle.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted iterations
    pub iterations: usize,

    /// Number of residual evaluations
    pub func_evals: usize,

    /// Why the cycle stopped
    pub status: ConvergenceStatus,
}

impl LmResult {
    /// Whether the cycle ended on a tolerance.
    pub fn success(&self) -> bool {
        self.status.is_converged()
    }
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Status: {}", self.status.description())?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create an optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Run one cycle from `initial_params`.
    ///
    /// The problem is left evaluated at the returned parameters. A rejected
    /// trial point whose residuals are not finite only raises the damping; a
    /// non-finite starting point is an error.
    pub fn minimize<P: Problem>(
        &self,
        problem: &mut P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        let mut cost = sum_of_squares(&residuals);
        if !cost.is_finite() {
            return Err(FitError::NonFinite(
                "residuals at the starting point are not finite".to_string(),
            ));
        }

        if n_params == 0 {
            return Ok(LmResult {
                params,
                residuals,
                cost,
                iterations: 0,
                func_evals,
                status: ConvergenceStatus::ParameterConvergence,
            });
        }

        let criteria = ConvergenceCriteria::from(&self.config);
        let mut trust: Option<TrustRegion> = None;
        let mut iterations = 0;
        let mut status = ConvergenceStatus::Running;

        'outer: while iterations < self.config.iterations_per_cycle {
            if func_evals + n_params + 2 > self.config.max_function_evaluations {
                status = ConvergenceStatus::EvaluationLimit;
                break;
            }

            let jacobian = problem.jacobian(&params, self.config.epsilon)?;
            func_evals += n_params + 2;
            let equations = NormalEquations::assemble(&jacobian, &residuals)?;

            status = criteria.check_gradient(equations.gradient_norm());
            if status.is_terminated() {
                break;
            }

            let tr = trust.get_or_insert_with(|| {
                TrustRegion::from_config(&self.config, equations.max_diagonal())
            });

            loop {
                if func_evals >= self.config.max_function_evaluations {
                    status = ConvergenceStatus::EvaluationLimit;
                    break 'outer;
                }

                let step = match calculate_step(&equations, tr.lambda) {
                    Ok(step) => step,
                    Err(_) => {
                        tr.reject();
                        if tr.exhausted() {
                            status = ConvergenceStatus::DampingExhausted;
                            break 'outer;
                        }
                        continue;
                    }
                };

                let new_params = &params + &step.step;
                let evaluated = problem.eval(&new_params);
                func_evals += 1;

                let new_residuals = match evaluated {
                    Ok(r) if r.iter().all(|v| v.is_finite()) => r,
                    _ => {
                        tr.reject();
                        if tr.exhausted() {
                            status = ConvergenceStatus::DampingExhausted;
                            break 'outer;
                        }
                        continue;
                    }
                };
                let new_cost = sum_of_squares(&new_residuals);

                let gain = TrustRegion::gain_ratio(cost, new_cost, step.predicted_reduction);
                if new_cost <= cost && tr.update_lambda(gain) {
                    status = criteria.check_step(&params, &new_params, cost, new_cost);
                    params = new_params;
                    residuals = new_residuals;
                    cost = new_cost;
                    iterations += 1;
                    if status.is_terminated() {
                        break 'outer;
                    }
                    break;
                }

                if new_cost > cost {
                    // update_lambda was short-circuited
                    tr.reject();
                }
                if tr.exhausted() {
                    status = ConvergenceStatus::DampingExhausted;
                    break 'outer;
                }
            }
        }

        if !status.is_terminated() {
            status = ConvergenceStatus::CycleComplete;
        }

        // Trial points may have been evaluated last; restore the accepted state.
        residuals = problem.eval(&params)?;
        func_evals += 1;

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct ExponentialDecay {
        x: Vec<f64>,
        y: Vec<f64>,
    }

    impl Problem for ExponentialDecay {
        fn eval(&mut self, params: &Array1<f64>) -> Result<Array1<f64>> {
            Ok(self
                .x
                .iter()
                .zip(&self.y)
                .map(|(&x, &y)| params[0] * (-params[1] * x).exp() - y)
                .collect())
        }

        fn parameter_count(&self) -> usize {
            2
        }

        fn residual_count(&self) -> usize {
            self.x.len()
        }
    }

    fn decay_problem() -> ExponentialDecay {
        let x: Vec<f64> = (0..15).map(|i| i as f64 * 0.3).collect();
        let y = x.iter().map(|&x| 3.0 * (-0.7 * x).exp()).collect();
        ExponentialDecay { x, y }
    }

    fn config(iterations: usize) -> LmConfig {
        LmConfig::new(1e-3, 10_000, 1e-12, 1e-14, 1e-14, 1e-8).with_iterations_per_cycle(iterations)
    }

    #[test]
    fn test_exponential_decay_converges() {
        let mut problem = decay_problem();
        let lm = LevenbergMarquardt::with_config(config(200));
        let result = lm
            .minimize(&mut problem, Array1::from_vec(vec![1.0, 0.2]))
            .unwrap();

        assert_ne!(result.status, ConvergenceStatus::EvaluationLimit, "{}", result);
        assert_relative_eq!(result.params[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(result.params[1], 0.7, epsilon = 1e-6);
        assert!(result.cost < 1e-12);
    }

    #[test]
    fn test_single_iteration_cycle_reports_cycle_complete() {
        let mut problem = decay_problem();
        let lm = LevenbergMarquardt::with_config(config(1));
        let start = Array1::from_vec(vec![1.0, 0.2]);
        let initial_cost = problem.eval_cost(&start).unwrap();
        let result = lm.minimize(&mut problem, start).unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.status, ConvergenceStatus::CycleComplete);
        assert!(result.cost < initial_cost);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut problem = decay_problem();
        let lm = LevenbergMarquardt::with_config(config(10));
        let result = lm.minimize(&mut problem, Array1::from_vec(vec![1.0]));
        assert!(matches!(result, Err(FitError::DimensionMismatch(_))));
    }

    #[test]
    fn test_evaluation_budget_is_respected() {
        let mut problem = decay_problem();
        let lm = LevenbergMarquardt::with_config(
            LmConfig::new(1e-3, 6, 1e-12, 1e-14, 1e-14, 1e-8).with_iterations_per_cycle(100),
        );
        let result = lm
            .minimize(&mut problem, Array1::from_vec(vec![1.0, 0.2]))
            .unwrap();
        assert_eq!(result.status, ConvergenceStatus::EvaluationLimit);
    }
}
