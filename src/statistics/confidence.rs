//! F-quantile confidence thresholds and percentile bars.
//!
//! The region of parameter space compatible with the data at a confidence
//! level `p` is bounded by
//!
//! `SSE_max = SSE_fit · (F(p; k, n−k) · k / (n−k) + 1)`
//!
//! where `k` is the number of fitted parameters and `n` the number of active
//! data points. Grid search and model comparison classify candidate
//! parameter sets against this ceiling.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::{FitError, Result};

fn check_confidence(confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 100.0) {
        return Err(FitError::InvalidInput(format!(
            "confidence must lie strictly between 0 and 100 percent, got {}",
            confidence
        )));
    }
    Ok(confidence / 100.0)
}

/// Quantile of the F(k, n−k) distribution at `confidence` percent.
pub fn f_value(confidence: f64, parameters: usize, points: usize) -> Result<f64> {
    let p = check_confidence(confidence)?;
    if parameters == 0 || points <= parameters {
        return Err(FitError::InvalidInput(format!(
            "F quantile needs 0 < k < n, got k = {}, n = {}",
            parameters, points
        )));
    }
    let dist = FisherSnedecor::new(parameters as f64, (points - parameters) as f64)
        .map_err(|e| FitError::Statistics(e.to_string()))?;
    Ok(dist.inverse_cdf(p))
}

/// SSE ceiling of the confidence region around a fit with the given SSE.
pub fn sse_threshold(sse: f64, parameters: usize, points: usize, confidence: f64) -> Result<f64> {
    let f = f_value(confidence, parameters, points)?;
    let k = parameters as f64;
    let dof = (points - parameters) as f64;
    Ok(sse * (f * k / dof + 1.0))
}

/// Two-sided percentile interval of a resampled distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBar {
    pub lower: f64,
    pub upper: f64,
    /// Confidence level in percent.
    pub confidence: f64,
}

impl ConfidenceBar {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Percentile bar of an ascending-sorted sample.
///
/// `lower = sorted[⌊n·α⌋]` and `upper = sorted[⌈n·(1−α)⌉ − 1]` with
/// `α = (100 − confidence)/200`. Returns `None` for an empty sample.
pub fn percentile_bar(sorted: &[f64], confidence: f64) -> Option<ConfidenceBar> {
    let n = sorted.len();
    if n == 0 || !(confidence > 0.0 && confidence <= 100.0) {
        return None;
    }
    let alpha = (100.0 - confidence) / 200.0;
    let lower_index = ((n as f64 * alpha).floor() as usize).min(n - 1);
    let upper_index = ((n as f64 * (1.0 - alpha)).ceil() as usize)
        .saturating_sub(1)
        .clamp(lower_index, n - 1);

    Some(ConfidenceBar {
        lower: sorted[lower_index],
        upper: sorted[upper_index],
        confidence,
    })
}
