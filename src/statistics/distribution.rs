//! Summaries of resampled parameter distributions.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::confidence::{percentile_bar, ConfidenceBar};

/// Equal-width histogram over `[lower, upper]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin centres, one per count.
    pub fn centres(&self) -> Vec<f64> {
        (0..self.counts.len())
            .map(|i| self.lower + (i as f64 + 0.5) * self.bin_width)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` into `bins` equal-width bins spanning their range.
///
/// A degenerate range (all values equal) puts every value into the first bin.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let lower = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let upper = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut counts = vec![0usize; bins];

    if values.is_empty() {
        return Histogram {
            lower: 0.0,
            upper: 0.0,
            bin_width: 0.0,
            counts,
        };
    }

    let span = upper - lower;
    let bin_width = span / bins as f64;
    for &v in values {
        let index = if span > 0.0 {
            (((v - lower) / bin_width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[index] += 1;
    }

    Histogram {
        lower,
        upper,
        bin_width,
        counts,
    }
}

/// Shannon entropy `−Σ pᵢ ln pᵢ` of the normalised histogram.
pub fn entropy(hist: &Histogram) -> f64 {
    let total = hist.total() as f64;
    if total == 0.0 {
        return 0.0;
    }
    -hist
        .counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * p.ln()
        })
        .sum::<f64>()
}

/// Summary of one parameter's resampled distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub confidence: ConfidenceBar,
    pub histogram: Histogram,
    pub entropy: f64,
}

/// Summarise a sample; `None` when it is empty.
pub fn summarize(values: &[f64], confidence: f64, bins: usize) -> Option<DistributionSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std_dev = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let bar = percentile_bar(&sorted, confidence)?;
    let hist = histogram(&sorted, bins);
    let h = entropy(&hist);

    Some(DistributionSummary {
        count: n,
        mean,
        std_dev,
        median,
        min: sorted[0],
        max: sorted[n - 1],
        confidence: bar,
        histogram: hist,
        entropy: h,
    })
}

/// Pearson correlation between the columns of a sample table.
///
/// `samples[t][p]` is parameter `p` in trial `t`. Columns with zero variance
/// correlate 0 with everything else and 1 with themselves.
pub fn correlation_matrix(samples: &[Vec<f64>]) -> Array2<f64> {
    let width = samples.first().map(|s| s.len()).unwrap_or(0);
    let n = samples.len();
    let mut covar = Array2::<f64>::zeros((width, width));
    if n < 2 {
        return Array2::eye(width);
    }

    let means: Vec<f64> = (0..width)
        .map(|p| samples.iter().map(|s| s[p]).sum::<f64>() / n as f64)
        .collect();
    for i in 0..width {
        for j in i..width {
            let c = samples
                .iter()
                .map(|s| (s[i] - means[i]) * (s[j] - means[j]))
                .sum::<f64>()
                / (n - 1) as f64;
            covar[[i, j]] = c;
            covar[[j, i]] = c;
        }
    }

    let mut correl = Array2::zeros((width, width));
    for i in 0..width {
        for j in 0..width {
            if i == j {
                correl[[i, j]] = 1.0;
            } else {
                let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
                if denom > 0.0 {
                    correl[[i, j]] = covar[[i, j]] / denom;
                }
            }
        }
    }
    correl
}
