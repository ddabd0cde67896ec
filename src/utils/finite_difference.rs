//! Finite difference methods for numerical differentiation.

use crate::error::{FitError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Compute the Jacobian matrix using forward finite differences.
///
/// J[i,j] = ∂residual[i]/∂param[j]. The step for parameter `j` is
/// `|p_j|·epsilon` when `|p_j| > epsilon`, otherwise `epsilon`.
pub fn jacobian<P: Problem + ?Sized>(
    problem: &mut P,
    params: &Array1<f64>,
    epsilon: f64,
) -> Result<Array2<f64>> {
    if !(epsilon > 0.0) {
        return Err(FitError::InvalidInput(format!(
            "finite-difference epsilon must be positive, got {}",
            epsilon
        )));
    }

    let n_params = params.len();
    let residuals = problem.eval(params)?;
    let n_residuals = residuals.len();

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        let mut params_perturbed = params.clone();

        let param_j = params[j];
        let eps_j = if param_j.abs() > epsilon {
            param_j.abs() * epsilon
        } else {
            epsilon
        };
        params_perturbed[j] += eps_j;

        let residuals_perturbed = problem.eval(&params_perturbed)?;
        if residuals_perturbed.len() != n_residuals {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} residuals, got {}",
                n_residuals,
                residuals_perturbed.len()
            )));
        }

        for i in 0..n_residuals {
            jac[[i, j]] = (residuals_perturbed[i] - residuals[i]) / eps_j;
        }
    }

    // Leave the problem evaluated at the unperturbed point.
    problem.eval(params)?;

    Ok(jac)
}
