//! Goodness-of-fit scalars.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Ordered goodness-of-fit scalars of one fit.
///
/// `points` is the number of active residuals and `parameters` the number of
/// fitted (unlocked) parameters. `valid` is false when a residual is not
/// finite or the system has no degrees of freedom left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticVector {
    pub sse: f64,
    pub sey: f64,
    pub chi: f64,
    pub sigma: f64,
    pub mean_error: f64,
    pub variance: f64,
    pub std_error: f64,
    pub aic: f64,
    pub aicc: f64,
    pub points: usize,
    pub parameters: usize,
    pub valid: bool,
}

impl StatisticVector {
    /// Compute the statistics of a residual vector.
    pub fn from_residuals(residuals: &Array1<f64>, parameters: usize) -> Self {
        let n = residuals.len();
        let finite = residuals.iter().all(|r| r.is_finite());
        let nf = n as f64;
        let k = parameters as f64;

        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let dof = nf - k;

        let sey = if dof > 0.0 { (sse / dof).sqrt() } else { f64::NAN };
        let chi = if dof > 1.0 {
            (sse / (dof - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        let mean_error = if n > 0 { residuals.sum() / nf } else { f64::NAN };
        let variance = if n > 1 {
            residuals
                .iter()
                .map(|r| (r - mean_error).powi(2))
                .sum::<f64>()
                / (nf - 1.0)
        } else {
            f64::NAN
        };
        let sigma = variance.sqrt();
        let std_error = sigma / nf.sqrt();

        let aic = if n > 0 {
            nf * (sse.max(f64::MIN_POSITIVE) / nf).ln() + 2.0 * k
        } else {
            f64::NAN
        };
        let aicc = if nf - k - 1.0 > 0.0 {
            aic + 2.0 * k * (k + 1.0) / (nf - k - 1.0)
        } else {
            f64::INFINITY
        };

        Self {
            sse,
            sey,
            chi,
            sigma,
            mean_error,
            variance,
            std_error,
            aic,
            aicc,
            points: n,
            parameters,
            valid: finite && dof > 0.0,
        }
    }

    /// Degrees of freedom, `points - parameters`, saturating at zero.
    pub fn degrees_of_freedom(&self) -> usize {
        self.points.saturating_sub(self.parameters)
    }
}
