//! Step calculation for the Levenberg-Marquardt driver.
//!
//! Solves the damped normal equations (JᵀJ + λI)·δ = −Jᵀr with a Cholesky
//! factorisation and falls back to an SVD pseudo-solve when the damped matrix
//! is not numerically positive definite.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::error::{FitError, Result};
use crate::utils::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};

/// Normal-equation pieces shared by every trial step of one LM iteration.
pub struct NormalEquations {
    /// JᵀJ
    pub jtj: DMatrix<f64>,
    /// Jᵀr
    pub gradient: DVector<f64>,
}

impl NormalEquations {
    pub fn assemble(jacobian: &Array2<f64>, residuals: &Array1<f64>) -> Result<Self> {
        let j = ndarray_to_nalgebra(jacobian)?;
        let r = ndarray_vec_to_nalgebra(residuals)?;
        let jt = j.transpose();
        Ok(Self {
            jtj: &jt * &j,
            gradient: &jt * &r,
        })
    }

    /// Largest diagonal entry of JᵀJ.
    pub fn max_diagonal(&self) -> f64 {
        self.jtj.diagonal().iter().cloned().fold(0.0, f64::max)
    }

    /// Infinity norm of the gradient.
    pub fn gradient_norm(&self) -> f64 {
        self.gradient.amax()
    }
}

/// Result of a Levenberg-Marquardt step calculation.
pub struct StepResult {
    /// The calculated step vector
    pub step: Array1<f64>,

    /// The predicted reduction in the sum of squared residuals
    pub predicted_reduction: f64,
}

/// Compute the damped step for the given lambda.
pub fn calculate_step(equations: &NormalEquations, lambda: f64) -> Result<StepResult> {
    let n = equations.jtj.nrows();
    let mut damped = equations.jtj.clone();
    for i in 0..n {
        damped[(i, i)] += lambda;
    }
    let rhs = -&equations.gradient;

    let step = match damped.clone().cholesky() {
        Some(cholesky) => cholesky.solve(&rhs),
        None => damped
            .svd(true, true)
            .solve(&rhs, 1e-14)
            .map_err(|e| FitError::ConvergenceFailure(format!("step solve failed: {}", e)))?,
    };

    if step.iter().any(|v| !v.is_finite()) {
        return Err(FitError::SingularMatrix);
    }

    // For cost = |r|², the linear model predicts cost(δ) = |r|² + 2δᵀg + δᵀJᵀJδ.
    let jtj_step = &equations.jtj * &step;
    let predicted_reduction = -(2.0 * step.dot(&equations.gradient) + step.dot(&jtj_step));

    Ok(StepResult {
        step: nalgebra_vec_to_ndarray(&step),
        predicted_reduction,
    })
}
