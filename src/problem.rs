//! Problem definition trait.
//!
//! This module defines the `Problem` trait, the least-squares surface the
//! Levenberg-Marquardt driver works against. Binding models are exposed to it
//! through [`crate::model::ModelProblem`], which maps the free outer
//! parameters of a model onto a plain parameter vector.

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A nonlinear least squares problem.
///
/// Evaluation takes `&mut self` because evaluating a binding model mutates
/// its signal table and its inline parameters.
pub trait Problem {
    /// Evaluate the residuals at the given parameters.
    fn eval(&mut self, params: &Array1<f64>) -> Result<Array1<f64>>;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;

    /// Get the number of residuals in the problem.
    fn residual_count(&self) -> usize;

    /// Evaluate the Jacobian matrix at the given parameters.
    ///
    /// The default implementation uses forward finite differences with a
    /// step relative to the parameter magnitude.
    fn jacobian(&mut self, params: &Array1<f64>, epsilon: f64) -> Result<Array2<f64>>
    where
        Self: Sized,
    {
        crate::utils::finite_difference::jacobian(self, params, epsilon)
    }

    /// Evaluate the sum of squared residuals at the given parameters.
    fn eval_cost(&mut self, params: &Array1<f64>) -> Result<f64> {
        let residuals = self.eval(params)?;
        Ok(residuals.iter().map(|r| r.powi(2)).sum())
    }
}
