//! Titration data tables.

use ndarray::Array2;
use std::sync::Arc;

use crate::error::{FitError, Result};

/// Independent and dependent tables of one titration experiment.
///
/// Rows are data points; the independent table holds the input columns
/// (e.g. host and guest totals) and the dependent table holds one column per
/// measured series. The independent table is shared between every resampled
/// copy derived from the same dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    independent: Arc<Array2<f64>>,
    dependent: Array2<f64>,
    active_rows: Vec<bool>,
}

impl Dataset {
    /// Create a dataset with every row active.
    pub fn new(independent: Array2<f64>, dependent: Array2<f64>) -> Result<Self> {
        if independent.nrows() != dependent.nrows() {
            return Err(FitError::DimensionMismatch(format!(
                "independent table has {} rows, dependent table has {}",
                independent.nrows(),
                dependent.nrows()
            )));
        }
        if dependent.nrows() == 0 || dependent.ncols() == 0 || independent.ncols() == 0 {
            return Err(FitError::InvalidInput(
                "dataset tables must not be empty".to_string(),
            ));
        }
        let rows = dependent.nrows();
        Ok(Self {
            independent: Arc::new(independent),
            dependent,
            active_rows: vec![true; rows],
        })
    }

    pub fn rows(&self) -> usize {
        self.dependent.nrows()
    }

    pub fn series(&self) -> usize {
        self.dependent.ncols()
    }

    pub fn inputs(&self) -> usize {
        self.independent.ncols()
    }

    pub fn independent(&self) -> &Array2<f64> {
        &self.independent
    }

    pub fn dependent(&self) -> &Array2<f64> {
        &self.dependent
    }

    pub fn active_rows(&self) -> &[bool] {
        &self.active_rows
    }

    pub fn is_row_active(&self, row: usize) -> bool {
        self.active_rows.get(row).copied().unwrap_or(false)
    }

    pub fn active_row_count(&self) -> usize {
        self.active_rows.iter().filter(|&&a| a).count()
    }

    /// Indices of the active rows in ascending order.
    pub fn active_row_indices(&self) -> Vec<usize> {
        self.active_rows
            .iter()
            .enumerate()
            .filter(|(_, &a)| a)
            .map(|(i, _)| i)
            .collect()
    }

    /// Enable or disable one row.
    pub fn set_row_active(&mut self, row: usize, active: bool) -> Result<()> {
        match self.active_rows.get_mut(row) {
            Some(flag) => {
                *flag = active;
                Ok(())
            }
            None => Err(FitError::InvalidInput(format!(
                "row {} out of range for {} rows",
                row,
                self.rows()
            ))),
        }
    }

    /// Copy with a replaced dependent table and the same row mask.
    pub fn with_dependent(&self, dependent: Array2<f64>) -> Result<Self> {
        if dependent.dim() != self.dependent.dim() {
            return Err(FitError::DimensionMismatch(format!(
                "replacement table is {:?}, expected {:?}",
                dependent.dim(),
                self.dependent.dim()
            )));
        }
        Ok(Self {
            independent: Arc::clone(&self.independent),
            dependent,
            active_rows: self.active_rows.clone(),
        })
    }

    /// Copy with the given rows additionally disabled.
    pub fn with_masked_rows(&self, rows: &[usize]) -> Result<Self> {
        let mut copy = self.clone();
        for &row in rows {
            copy.set_row_active(row, false)?;
        }
        Ok(copy)
    }
}
