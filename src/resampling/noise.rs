//! Noise injection into dependent tables.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{FitError, Result};

fn active(mask: &[bool], index: usize) -> bool {
    mask.get(index).copied().unwrap_or(false)
}

/// Add zero-mean Gaussian noise with the per-series standard deviation
/// `sigma[s]` to the active cells of `base`. Inactive rows and series, and
/// series with a zero deviation, are copied unchanged.
pub fn inject_gaussian<R: Rng + ?Sized>(
    base: &Array2<f64>,
    sigma: &[f64],
    active_rows: &[bool],
    active_series: &[bool],
    rng: &mut R,
) -> Result<Array2<f64>> {
    if sigma.len() != base.ncols() {
        return Err(FitError::DimensionMismatch(format!(
            "{} standard deviations for {} series",
            sigma.len(),
            base.ncols()
        )));
    }
    let mut out = base.clone();
    for (s, &sd) in sigma.iter().enumerate() {
        if !active(active_series, s) || sd == 0.0 {
            continue;
        }
        let normal = Normal::new(0.0, sd)
            .map_err(|e| FitError::InvalidInput(format!("noise deviation {}: {}", sd, e)))?;
        for r in 0..out.nrows() {
            if active(active_rows, r) {
                out[[r, s]] += normal.sample(rng);
            }
        }
    }
    Ok(out)
}

/// Add residuals drawn with replacement from `pool` to the active cells of
/// `base`.
pub fn inject_bootstrap<R: Rng + ?Sized>(
    base: &Array2<f64>,
    pool: &[f64],
    active_rows: &[bool],
    active_series: &[bool],
    rng: &mut R,
) -> Result<Array2<f64>> {
    if pool.is_empty() {
        return Err(FitError::InvalidInput(
            "bootstrap needs at least one residual".to_string(),
        ));
    }
    let mut out = base.clone();
    for s in 0..out.ncols() {
        if !active(active_series, s) {
            continue;
        }
        for r in 0..out.nrows() {
            if active(active_rows, r) {
                out[[r, s]] += pool[rng.gen_range(0..pool.len())];
            }
        }
    }
    Ok(out)
}
