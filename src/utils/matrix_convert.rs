//! Conversions between `ndarray` and `nalgebra` containers.
//!
//! Tables and residual vectors live in `ndarray`; the dense solves of the
//! damped normal equations and of the inline least-squares problems run on
//! `nalgebra`.

use crate::error::{FitError, Result};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray matrix into a nalgebra `DMatrix<f64>`.
pub fn ndarray_to_nalgebra(arr: &Array2<f64>) -> Result<DMatrix<f64>> {
    let (rows, cols) = arr.dim();
    if rows == 0 || cols == 0 {
        return Err(FitError::DimensionMismatch(format!(
            "cannot convert an empty {}x{} matrix",
            rows, cols
        )));
    }
    Ok(DMatrix::from_fn(rows, cols, |i, j| arr[[i, j]]))
}

/// Convert an ndarray vector into a nalgebra `DVector<f64>`.
pub fn ndarray_vec_to_nalgebra(arr: &Array1<f64>) -> Result<DVector<f64>> {
    if arr.is_empty() {
        return Err(FitError::DimensionMismatch(
            "cannot convert an empty vector".to_string(),
        ));
    }
    Ok(DVector::from_iterator(arr.len(), arr.iter().copied()))
}

/// Convert a nalgebra vector back into an ndarray vector.
pub fn nalgebra_vec_to_ndarray(vec: &DVector<f64>) -> Array1<f64> {
    Array1::from_iter(vec.iter().copied())
}
