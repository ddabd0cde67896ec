//! Model trait and the state shared by every binding model.
//!
//! Binding isotherms in this crate are linear in their local parameters: the
//! signal of series `s` at row `r` is `Σₖ basisₖ(r; globals) · localₛₖ`. A
//! concrete model only supplies the basis for a row given the current global
//! parameters; everything else (parameter storage, locking, the inline linear
//! solve for the locals, the signal table, residuals and statistics) lives in
//! [`ModelCore`] and in the provided methods of [`Model`].
//!
//! The full parameter vector is laid out as all globals followed by the
//! locals of series 0, then series 1, and so on.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::ModelId;
use crate::problem::Problem;
use crate::statistics::{sse_threshold, StatisticVector};

/// Whether a parameter is shared by all series or belongs to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    Global,
    Local { series: usize },
}

/// Parameter storage, masks and computed tables of a model instance.
#[derive(Debug, Clone)]
pub struct ModelCore {
    dataset: Arc<Dataset>,
    global_names: Vec<String>,
    local_names: Vec<String>,
    globals: Vec<f64>,
    locals: Array2<f64>,
    locked: Vec<bool>,
    active_series: Vec<bool>,
    inline_locals: bool,
    signal: Array2<f64>,
    statistics: Option<StatisticVector>,
}

impl ModelCore {
    /// Create the core for the given parameter names. Locals start at zero,
    /// globals at the supplied values, nothing is locked and every series is
    /// active. Local parameters are solved inline by default.
    pub fn new(
        dataset: Arc<Dataset>,
        global_names: &[&str],
        initial_globals: &[f64],
        local_names: &[&str],
    ) -> Self {
        let series = dataset.series();
        let rows = dataset.rows();
        let mut globals = vec![0.0; global_names.len()];
        for (g, v) in globals.iter_mut().zip(initial_globals) {
            *g = *v;
        }
        let total = global_names.len() + series * local_names.len();
        Self {
            dataset,
            global_names: global_names.iter().map(|s| s.to_string()).collect(),
            local_names: local_names.iter().map(|s| s.to_string()).collect(),
            globals,
            locals: Array2::zeros((series, local_names.len())),
            locked: vec![false; total],
            active_series: vec![true; series],
            inline_locals: true,
            signal: Array2::from_elem((rows, series), f64::NAN),
            statistics: None,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn global_count(&self) -> usize {
        self.global_names.len()
    }

    /// Number of local parameters per series.
    pub fn local_count(&self) -> usize {
        self.local_names.len()
    }

    pub fn series_count(&self) -> usize {
        self.locals.nrows()
    }

    pub fn parameter_count(&self) -> usize {
        self.global_count() + self.series_count() * self.local_count()
    }

    pub fn globals(&self) -> &[f64] {
        &self.globals
    }

    pub fn locals(&self) -> &Array2<f64> {
        &self.locals
    }

    /// Full parameter vector.
    pub fn parameters(&self) -> Array1<f64> {
        self.globals
            .iter()
            .copied()
            .chain(self.locals.iter().copied())
            .collect()
    }

    /// Overwrite the parameters; extra values are ignored and missing ones
    /// become zero.
    pub fn set_parameters(&mut self, values: &[f64]) {
        let mut it = values.iter().copied().chain(std::iter::repeat(0.0));
        for g in self.globals.iter_mut() {
            *g = it.next().unwrap_or(0.0);
        }
        for l in self.locals.iter_mut() {
            *l = it.next().unwrap_or(0.0);
        }
    }

    /// Overwrite a single parameter.
    pub fn set_parameter(&mut self, index: usize, value: f64) {
        let g = self.global_count();
        if index < g {
            self.globals[index] = value;
        } else if self.local_count() > 0 {
            let local = index - g;
            let (s, k) = (local / self.local_count(), local % self.local_count());
            if s < self.series_count() {
                self.locals[[s, k]] = value;
            }
        }
    }

    pub fn parameter(&self, index: usize) -> Option<f64> {
        let g = self.global_count();
        if index < g {
            return Some(self.globals[index]);
        }
        let lc = self.local_count();
        if lc == 0 {
            return None;
        }
        let local = index - g;
        self.locals.get([local / lc, local % lc]).copied()
    }

    pub fn parameter_kind(&self, index: usize) -> Option<ParameterKind> {
        let g = self.global_count();
        if index < g {
            Some(ParameterKind::Global)
        } else if index < self.parameter_count() {
            Some(ParameterKind::Local {
                series: (index - g) / self.local_count(),
            })
        } else {
            None
        }
    }

    /// Human-readable parameter names, locals suffixed with their series.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = self.global_names.clone();
        for s in 0..self.series_count() {
            for name in &self.local_names {
                names.push(format!("{} [{}]", name, s + 1));
            }
        }
        names
    }

    pub fn locked(&self) -> &[bool] {
        &self.locked
    }

    /// Replace the lock mask; missing entries are unlocked.
    pub fn set_locked(&mut self, mask: &[bool]) {
        for (i, flag) in self.locked.iter_mut().enumerate() {
            *flag = mask.get(i).copied().unwrap_or(false);
        }
    }

    pub fn lock(&mut self, index: usize, locked: bool) {
        if let Some(flag) = self.locked.get_mut(index) {
            *flag = locked;
        }
    }

    pub fn active_series(&self) -> &[bool] {
        &self.active_series
    }

    /// Replace the active-series mask; missing entries are active.
    pub fn set_active_series(&mut self, mask: &[bool]) {
        for (i, flag) in self.active_series.iter_mut().enumerate() {
            *flag = mask.get(i).copied().unwrap_or(true);
        }
    }

    pub fn inline_locals(&self) -> bool {
        self.inline_locals
    }

    /// Choose whether `calculate()` solves the locals by linear least squares.
    pub fn set_inline_locals(&mut self, inline: bool) {
        self.inline_locals = inline;
    }

    fn local_index(&self, series: usize, k: usize) -> usize {
        self.global_count() + series * self.local_count() + k
    }

    /// Unlocked parameters that influence the residuals.
    pub fn free_indices(&self) -> Vec<usize> {
        let mut free: Vec<usize> = (0..self.global_count())
            .filter(|&i| !self.locked[i])
            .collect();
        for s in 0..self.series_count() {
            if !self.active_series[s] {
                continue;
            }
            for k in 0..self.local_count() {
                let i = self.local_index(s, k);
                if !self.locked[i] {
                    free.push(i);
                }
            }
        }
        free
    }

    /// Free parameters that `calculate()` solves analytically.
    pub fn inline_indices(&self) -> Vec<usize> {
        if !self.inline_locals {
            return Vec::new();
        }
        let g = self.global_count();
        self.free_indices().into_iter().filter(|&i| i >= g).collect()
    }

    /// Free parameters left to the Levenberg-Marquardt driver.
    pub fn outer_indices(&self) -> Vec<usize> {
        let inline = self.inline_indices();
        self.free_indices()
            .into_iter()
            .filter(|i| !inline.contains(i))
            .collect()
    }

    pub fn active_residual_count(&self) -> usize {
        let series = self.active_series.iter().filter(|&&a| a).count();
        series * self.dataset.active_row_count()
    }

    pub fn signal(&self) -> &Array2<f64> {
        &self.signal
    }

    pub fn statistics(&self) -> Option<&StatisticVector> {
        self.statistics.as_ref()
    }

    pub fn clear_statistics(&mut self) {
        self.statistics = None;
    }

    /// Install another dataset of the same shape (resampled or masked copy).
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = dataset;
        self.statistics = None;
    }

    /// Solve the free locals of each active series by linear least squares
    /// over the active rows; locked locals are held at their values.
    fn solve_inline(&mut self, basis: &Array2<f64>) {
        let rows = self.dataset.active_row_indices();
        if rows.is_empty() || basis.iter().any(|v| !v.is_finite()) {
            return;
        }
        let lc = self.local_count();
        for s in 0..self.series_count() {
            if !self.active_series[s] {
                continue;
            }
            let free: Vec<usize> = (0..lc)
                .filter(|&k| !self.locked[self.local_index(s, k)])
                .collect();
            if free.is_empty() {
                continue;
            }

            let dependent = self.dataset.dependent();
            let a = DMatrix::from_fn(rows.len(), free.len(), |i, j| basis[[rows[i], free[j]]]);
            let b = DVector::from_fn(rows.len(), |i, _| {
                let r = rows[i];
                let fixed: f64 = (0..lc)
                    .filter(|k| !free.contains(k))
                    .map(|k| basis[[r, k]] * self.locals[[s, k]])
                    .sum();
                dependent[[r, s]] - fixed
            });

            if let Ok(solution) = a.svd(true, true).solve(&b, 1e-12) {
                if solution.iter().all(|v| v.is_finite()) {
                    for (j, &k) in free.iter().enumerate() {
                        self.locals[[s, k]] = solution[j];
                    }
                }
            }
        }
    }

    fn fill_signal(&mut self, basis: &Array2<f64>) {
        // (rows × locals) · (locals × series)
        self.signal = basis.dot(&self.locals.t());
    }

    /// Residuals `signal − data` over active series and rows, series-major.
    pub fn residuals(&self) -> Array1<f64> {
        let dependent = self.dataset.dependent();
        let rows = self.dataset.active_row_indices();
        let mut out = Vec::with_capacity(self.active_residual_count());
        for s in 0..self.series_count() {
            if !self.active_series[s] {
                continue;
            }
            for &r in &rows {
                out.push(self.signal[[r, s]] - dependent[[r, s]]);
            }
        }
        Array1::from_vec(out)
    }

    fn refresh_statistics(&mut self) {
        let fitted = self.free_indices().len();
        self.statistics = Some(StatisticVector::from_residuals(&self.residuals(), fitted));
    }
}

/// A binding model: a fixed capability surface over a [`ModelCore`].
///
/// Implementors provide the model id, access to their core, a boxed clone,
/// and the basis row that multiplies the local parameters.
pub trait Model: Send + Sync {
    fn id(&self) -> ModelId;

    fn core(&self) -> &ModelCore;

    fn core_mut(&mut self) -> &mut ModelCore;

    fn clone_box(&self) -> Box<dyn Model>;

    /// Coefficients that multiply the local parameters at `row`, computed
    /// from the current global parameters. May contain NaN for
    /// out-of-domain globals.
    fn local_basis(&self, row: usize) -> Vec<f64>;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Basis for every row of the dataset.
    fn basis_table(&self) -> Array2<f64> {
        let core = self.core();
        let rows = core.dataset().rows();
        let lc = core.local_count();
        let mut table = Array2::from_elem((rows, lc), f64::NAN);
        for r in 0..rows {
            for (k, v) in self.local_basis(r).into_iter().take(lc).enumerate() {
                table[[r, k]] = v;
            }
        }
        table
    }

    /// Recompute inline locals (if enabled), the signal table and the
    /// statistics from the current parameters.
    fn calculate(&mut self) {
        let basis = self.basis_table();
        let core = self.core_mut();
        if core.inline_locals {
            core.solve_inline(&basis);
        }
        core.fill_signal(&basis);
        core.refresh_statistics();
    }

    fn parameters(&self) -> Array1<f64> {
        self.core().parameters()
    }

    fn set_parameters(&mut self, values: &[f64]) {
        self.core_mut().set_parameters(values);
    }

    fn parameter_names(&self) -> Vec<String> {
        self.core().parameter_names()
    }

    fn residuals(&self) -> Array1<f64> {
        self.core().residuals()
    }

    fn statistics(&self) -> Option<&StatisticVector> {
        self.core().statistics()
    }

    /// SSE of the last `calculate()`, NaN before the first one.
    fn sse(&self) -> f64 {
        self.statistics().map(|s| s.sse).unwrap_or(f64::NAN)
    }

    /// Deep copy sharing the dataset; statistics are kept only on request.
    fn clone_model(&self, with_statistics: bool) -> Box<dyn Model> {
        let mut copy = self.clone_box();
        if !with_statistics {
            copy.core_mut().clear_statistics();
        }
        copy
    }

    fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.core_mut().set_dataset(dataset);
    }

    /// SSE ceiling of the confidence region at `confidence` percent.
    fn error_threshold(&self, confidence: f64) -> Result<f64> {
        let core = self.core();
        sse_threshold(
            self.sse(),
            core.free_indices().len(),
            core.active_residual_count(),
            confidence,
        )
    }
}

impl Clone for Box<dyn Model> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Exposes the outer free parameters of a model as a [`Problem`].
pub struct ModelProblem<'a> {
    model: &'a mut dyn Model,
    outer: Vec<usize>,
    base: Vec<f64>,
}

impl<'a> ModelProblem<'a> {
    /// `outer` lists the full-vector indices the optimizer may move; every
    /// other parameter is held at its current value.
    pub fn new(model: &'a mut dyn Model, outer: Vec<usize>) -> Self {
        let base = model.parameters().to_vec();
        Self { model, outer, base }
    }

    /// Current values of the outer parameters.
    pub fn initial(&self) -> Array1<f64> {
        self.outer.iter().map(|&i| self.base[i]).collect()
    }
}

impl<'a> Problem for ModelProblem<'a> {
    fn eval(&mut self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let mut full = self.base.clone();
        for (value, &index) in params.iter().zip(&self.outer) {
            full[index] = *value;
        }
        self.model.set_parameters(&full);
        self.model.calculate();
        Ok(self.model.residuals())
    }

    fn parameter_count(&self) -> usize {
        self.outer.len()
    }

    fn residual_count(&self) -> usize {
        self.model.core().active_residual_count()
    }
}
