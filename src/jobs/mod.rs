//! Statistical jobs over a fitted model.
//!
//! A job is described by a [`JobDescriptor`] (deserialized from JSON),
//! spawns its trials on the [`TrialRunner`](crate::runner::TrialRunner) and
//! returns a serializable [`JobResult`].
//!
//! | Method | Trials |
//! |--------|--------|
//! | MonteCarlo | noise-injected copies of the data, `MaxSteps` of them |
//! | CrossValidation | leave-X-out row masks |
//! | GridSearch | one scan per selected parameter and direction |
//! | ModelComparison | uniform draws inside the confidence box |
//! | Reduction | candidate removals per round, or truncated datasets |

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::dataset::Dataset;
use crate::error::{FitError, Result};
use crate::model::{Model, ParameterKind};
use crate::optimizer::Optimizer;
use crate::runner::TrialRunner;
use crate::statistics::{correlation_matrix, summarize, DistributionSummary};

pub mod cross_validation;
pub mod grid_search;
pub mod model_comparison;
pub mod monte_carlo;
pub mod reduction;

pub use cross_validation::CrossValidationResult;
pub use grid_search::{GridSearchResult, ParameterScan};
pub use model_comparison::{ModelComparisonResult, ParameterBox};
pub use monte_carlo::MonteCarloResult;
pub use reduction::{DataReductionPoint, ReductionResult, ReductionStep};

/// Numeric code or name as found in a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeOrName {
    Code(u32),
    Name(String),
}

/// Enumerations a descriptor may spell as a number or a name.
trait Coded: Sized {
    const KIND: &'static str;

    fn from_code(code: u32) -> Option<Self>;

    /// `name` is lowercased with spaces, hyphens and underscores removed.
    fn from_name(name: &str) -> Option<Self>;
}

fn decode<T: Coded>(raw: CodeOrName) -> std::result::Result<T, String> {
    match raw {
        CodeOrName::Code(code) => {
            T::from_code(code).ok_or_else(|| format!("unknown {} code {}", T::KIND, code))
        }
        CodeOrName::Name(name) => {
            let key: String = name
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .flat_map(char::to_lowercase)
                .collect();
            T::from_name(&key).ok_or_else(|| format!("unknown {} '{}'", T::KIND, name))
        }
    }
}

/// Job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName")]
pub enum Method {
    MonteCarlo,
    GridSearch,
    ModelComparison,
    CrossValidation,
    Reduction,
}

impl Coded for Method {
    const KIND: &'static str = "method";

    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Method::MonteCarlo),
            2 => Some(Method::GridSearch),
            3 => Some(Method::ModelComparison),
            4 => Some(Method::CrossValidation),
            5 => Some(Method::Reduction),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "montecarlo" | "mc" => Some(Method::MonteCarlo),
            "gridsearch" | "weakenedgridsearch" | "wgs" => Some(Method::GridSearch),
            "modelcomparison" | "moco" => Some(Method::ModelComparison),
            "crossvalidation" | "cv" => Some(Method::CrossValidation),
            "reduction" | "reductionanalysis" => Some(Method::Reduction),
            _ => None,
        }
    }
}

impl TryFrom<CodeOrName> for Method {
    type Error = String;

    fn try_from(raw: CodeOrName) -> std::result::Result<Self, String> {
        decode(raw)
    }
}

/// Where Monte Carlo takes its noise level from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName")]
pub enum VarianceSource {
    /// The descriptor's `Variance`.
    Custom,
    /// Standard error of the fit.
    SEy,
    /// Standard deviation of the fit residuals.
    StdDeviation,
}

impl Coded for VarianceSource {
    const KIND: &'static str = "variance source";

    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(VarianceSource::Custom),
            2 => Some(VarianceSource::SEy),
            3 => Some(VarianceSource::StdDeviation),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "custom" => Some(VarianceSource::Custom),
            "sey" => Some(VarianceSource::SEy),
            "stddeviation" | "stddev" | "sigma" => Some(VarianceSource::StdDeviation),
            _ => None,
        }
    }
}

impl TryFrom<CodeOrName> for VarianceSource {
    type Error = String;

    fn try_from(raw: CodeOrName) -> std::result::Result<Self, String> {
        decode(raw)
    }
}

/// Cross-validation flavour (`CXO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName")]
pub enum CvType {
    LeaveOneOut,
    LeaveTwoOut,
    LeaveXOut,
}

impl Coded for CvType {
    const KIND: &'static str = "cross-validation type";

    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(CvType::LeaveOneOut),
            2 => Some(CvType::LeaveTwoOut),
            3 => Some(CvType::LeaveXOut),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "l1o" | "leaveoneout" => Some(CvType::LeaveOneOut),
            "l2o" | "leavetwoout" => Some(CvType::LeaveTwoOut),
            "lxo" | "leavexout" => Some(CvType::LeaveXOut),
            _ => None,
        }
    }
}

impl TryFrom<CodeOrName> for CvType {
    type Error = String;

    fn try_from(raw: CodeOrName) -> std::result::Result<Self, String> {
        decode(raw)
    }
}

/// Combination strategy requested for leave-X-out (`Algorithm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName")]
pub enum CvAlgorithm {
    Precomputed,
    Auto,
    Random,
}

impl Coded for CvAlgorithm {
    const KIND: &'static str = "cross-validation algorithm";

    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(CvAlgorithm::Precomputed),
            2 => Some(CvAlgorithm::Auto),
            3 => Some(CvAlgorithm::Random),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "precomputed" | "precompute" => Some(CvAlgorithm::Precomputed),
            "auto" | "automatic" => Some(CvAlgorithm::Auto),
            "random" => Some(CvAlgorithm::Random),
            _ => None,
        }
    }
}

impl TryFrom<CodeOrName> for CvAlgorithm {
    type Error = String;

    fn try_from(raw: CodeOrName) -> std::result::Result<Self, String> {
        decode(raw)
    }
}

/// What a reduction job removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CodeOrName")]
pub enum ReductionRuntype {
    /// Eliminate parameters one at a time.
    Parameter,
    /// Drop data points from the end.
    Backward,
    /// Drop data points from the start.
    Forward,
}

impl Coded for ReductionRuntype {
    const KIND: &'static str = "reduction runtype";

    fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ReductionRuntype::Parameter),
            1 => Some(ReductionRuntype::Backward),
            2 => Some(ReductionRuntype::Forward),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "parameter" | "parameters" => Some(ReductionRuntype::Parameter),
            "backward" | "backwards" => Some(ReductionRuntype::Backward),
            "forward" | "forwards" => Some(ReductionRuntype::Forward),
            _ => None,
        }
    }
}

impl TryFrom<CodeOrName> for ReductionRuntype {
    type Error = String;

    fn try_from(raw: CodeOrName) -> std::result::Result<Self, String> {
        decode(raw)
    }
}

/// Entry of a parameter selection list: `true`/`false` or `1`/`0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    pub fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

fn default_max_steps() -> usize {
    1000
}

fn default_confidence() -> f64 {
    95.0
}

fn default_x() -> usize {
    3
}

fn default_cxo() -> CvType {
    CvType::LeaveOneOut
}

fn default_algorithm() -> CvAlgorithm {
    CvAlgorithm::Auto
}

fn default_step_scaling() -> f64 {
    0.01
}

fn default_error_convergency() -> f64 {
    1e-10
}

fn default_overshot() -> usize {
    5
}

fn default_error_decrease() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_box_scaling() -> f64 {
    1.5
}

fn default_runtype() -> ReductionRuntype {
    ReductionRuntype::Parameter
}

fn default_entropy_bins() -> usize {
    30
}

/// One statistical job as submitted to the manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    #[serde(rename = "Method", default)]
    pub method: Option<Method>,

    #[serde(rename = "MaxSteps", default = "default_max_steps")]
    pub max_steps: usize,

    /// Noise standard deviation for a custom variance source.
    #[serde(rename = "Variance", default)]
    pub variance: Option<f64>,

    #[serde(rename = "VarianceSource", default)]
    pub variance_source: Option<VarianceSource>,

    #[serde(rename = "Bootstrap", default)]
    pub bootstrap: bool,

    #[serde(rename = "OriginalData", default)]
    pub original_data: bool,

    #[serde(rename = "CXO", default = "default_cxo")]
    pub cxo: CvType,

    #[serde(rename = "X", default = "default_x")]
    pub x: usize,

    #[serde(rename = "Algorithm", default = "default_algorithm")]
    pub algorithm: CvAlgorithm,

    /// Confidence level in percent.
    #[serde(rename = "confidence", default = "default_confidence")]
    pub confidence: f64,

    #[serde(rename = "GlobalParameterList", default)]
    pub global_parameters: Option<Vec<Flag>>,

    #[serde(rename = "LocalParameterList", default)]
    pub local_parameters: Option<Vec<Flag>>,

    #[serde(rename = "StepScalingFactor", default = "default_step_scaling")]
    pub step_scaling_factor: f64,

    #[serde(rename = "ErrorConvergency", default = "default_error_convergency")]
    pub error_convergency: f64,

    #[serde(rename = "OverShotCounter", default = "default_overshot")]
    pub overshot_counter: usize,

    #[serde(rename = "ErrorDecreaseCounter", default = "default_error_decrease")]
    pub error_decrease_counter: usize,

    #[serde(rename = "StoreRaw", default)]
    pub store_raw: bool,

    #[serde(rename = "Relax", default = "default_true")]
    pub relax: bool,

    /// Explicit SSE ceiling for scans, replacing the F-test value.
    #[serde(rename = "MaxParameter", default)]
    pub max_parameter: Option<f64>,

    #[serde(rename = "BoxScalingFactor", default = "default_box_scaling")]
    pub box_scaling_factor: f64,

    #[serde(rename = "cutoff", default)]
    pub cutoff: Option<f64>,

    #[serde(rename = "ReductionRuntype", default = "default_runtype")]
    pub reduction_runtype: ReductionRuntype,

    #[serde(rename = "EntropyBins", default = "default_entropy_bins")]
    pub entropy_bins: usize,

    #[serde(rename = "Seed", default)]
    pub seed: Option<u64>,
}

impl JobDescriptor {
    /// Descriptor with every field at its default.
    pub fn new(method: Method) -> Self {
        Self {
            method: Some(method),
            max_steps: default_max_steps(),
            variance: None,
            variance_source: None,
            bootstrap: false,
            original_data: false,
            cxo: default_cxo(),
            x: default_x(),
            algorithm: default_algorithm(),
            confidence: default_confidence(),
            global_parameters: None,
            local_parameters: None,
            step_scaling_factor: default_step_scaling(),
            error_convergency: default_error_convergency(),
            overshot_counter: default_overshot(),
            error_decrease_counter: default_error_decrease(),
            store_raw: false,
            relax: true,
            max_parameter: None,
            box_scaling_factor: default_box_scaling(),
            cutoff: None,
            reduction_runtype: default_runtype(),
            entropy_bins: default_entropy_bins(),
            seed: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_variance(mut self, sigma: f64) -> Self {
        self.variance = Some(sigma);
        self.variance_source = Some(VarianceSource::Custom);
        self
    }

    pub fn with_cross_validation(mut self, cxo: CvType, x: usize) -> Self {
        self.cxo = cxo;
        self.x = x;
        self
    }

    pub fn with_reduction_runtype(mut self, runtype: ReductionRuntype) -> Self {
        self.reduction_runtype = runtype;
        self
    }

    /// Variance source after defaults: an explicit `Variance` without a
    /// source means a custom level, otherwise SEy.
    pub fn resolved_variance_source(&self) -> VarianceSource {
        match (self.variance_source, self.variance) {
            (Some(source), _) => source,
            (None, Some(_)) => VarianceSource::Custom,
            (None, None) => VarianceSource::SEy,
        }
    }

    /// The job method, or an error naming the missing field.
    pub fn require_method(&self) -> Result<Method> {
        self.method.ok_or_else(|| {
            FitError::InvalidJob("job descriptor has no 'Method' field".to_string())
        })
    }

    /// Structural checks that do not need a model.
    pub fn validate(&self) -> Result<()> {
        let method = self.require_method()?;
        if !(self.confidence > 0.0 && self.confidence < 100.0) {
            return Err(FitError::InvalidJob(format!(
                "confidence must lie in (0, 100), got {}",
                self.confidence
            )));
        }
        if self.max_steps == 0 {
            return Err(FitError::InvalidJob("MaxSteps must be positive".to_string()));
        }
        if self.entropy_bins == 0 {
            return Err(FitError::InvalidJob("EntropyBins must be positive".to_string()));
        }
        match method {
            Method::MonteCarlo => {
                if self.resolved_variance_source() == VarianceSource::Custom {
                    match self.variance {
                        Some(v) if v.is_finite() && v >= 0.0 => {}
                        Some(v) => {
                            return Err(FitError::InvalidJob(format!(
                                "Variance must be a finite non-negative deviation, got {}",
                                v
                            )))
                        }
                        None => {
                            return Err(FitError::InvalidJob(
                                "custom variance source needs a 'Variance' value".to_string(),
                            ))
                        }
                    }
                }
            }
            Method::CrossValidation => {
                if self.cxo == CvType::LeaveXOut && self.x == 0 {
                    return Err(FitError::InvalidJob("X must be positive".to_string()));
                }
            }
            Method::GridSearch => {
                if !(self.step_scaling_factor > 0.0) {
                    return Err(FitError::InvalidJob(
                        "StepScalingFactor must be positive".to_string(),
                    ));
                }
                if !(self.error_convergency > 0.0) {
                    return Err(FitError::InvalidJob(
                        "ErrorConvergency must be positive".to_string(),
                    ));
                }
            }
            Method::ModelComparison => {
                if !(self.box_scaling_factor > 0.0) {
                    return Err(FitError::InvalidJob(
                        "BoxScalingFactor must be positive".to_string(),
                    ));
                }
            }
            Method::Reduction => {
                if let Some(cutoff) = self.cutoff {
                    if !(cutoff >= 0.0) {
                        return Err(FitError::InvalidJob(format!(
                            "cutoff must be non-negative, got {}",
                            cutoff
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Free parameters of `model` picked by the selection lists. Parameters
    /// missing from a list fall back to selected for globals and to
    /// `locals_by_default` for locals.
    pub fn selected_parameters(&self, model: &dyn Model, locals_by_default: bool) -> Vec<usize> {
        let core = model.core();
        let g = core.global_count();
        let lc = core.local_count().max(1);
        let flag = |list: &Option<Vec<Flag>>, i: usize, default: bool| {
            list.as_ref()
                .and_then(|l| l.get(i))
                .map(|f| f.is_set())
                .unwrap_or(default)
        };
        core.free_indices()
            .into_iter()
            .filter(|&i| match core.parameter_kind(i) {
                Some(ParameterKind::Global) => flag(&self.global_parameters, i, true),
                Some(ParameterKind::Local { .. }) => {
                    flag(&self.local_parameters, (i - g) % lc, locals_by_default)
                }
                None => false,
            })
            .collect()
    }
}

/// Outcome class of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialStatus {
    Converged,
    NotConverged,
    NonFinite,
}

/// One refit trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub index: usize,
    pub status: TrialStatus,
    pub parameters: Vec<f64>,
    pub sse: f64,
    /// Rows left out of the fit, for cross-validation.
    pub held_out: Option<Vec<usize>>,
    /// SSE of the refitted model on the held-out rows.
    pub prediction_error: Option<f64>,
}

impl TrialRecord {
    pub fn is_converged(&self) -> bool {
        self.status == TrialStatus::Converged
    }
}

/// Trial bookkeeping common to every job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialCounts {
    pub total: usize,
    pub converged: usize,
    pub not_converged: usize,
    pub non_finite: usize,
    pub skipped: usize,
}

impl TrialCounts {
    pub fn from_records(requested: usize, records: &[TrialRecord]) -> Self {
        let mut counts = TrialCounts {
            total: requested,
            skipped: requested.saturating_sub(records.len()),
            ..Default::default()
        };
        for record in records {
            match record.status {
                TrialStatus::Converged => counts.converged += 1,
                TrialStatus::NotConverged => counts.not_converged += 1,
                TrialStatus::NonFinite => counts.non_finite += 1,
            }
        }
        counts
    }

    pub fn merge(&mut self, other: TrialCounts) {
        self.total += other.total;
        self.converged += other.converged;
        self.not_converged += other.not_converged;
        self.non_finite += other.non_finite;
        self.skipped += other.skipped;
    }
}

/// Resampled distribution of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub index: usize,
    pub name: String,
    /// Value in the base fit.
    pub value: f64,
    pub distribution: Option<DistributionSummary>,
}

/// Aggregate of the converged trials of a resampling job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResamplingSummary {
    pub parameters: Vec<ParameterSummary>,
    /// Pearson correlation between the summarized parameters.
    pub correlation: Vec<Vec<f64>>,
}

impl ResamplingSummary {
    /// Summarize the free parameters of `base` over the converged records.
    pub fn from_records(
        base: &dyn Model,
        records: &[TrialRecord],
        confidence: f64,
        bins: usize,
    ) -> Self {
        let indices = base.core().free_indices();
        let names = base.parameter_names();
        let fitted = base.parameters();
        let samples: Vec<Vec<f64>> = records
            .iter()
            .filter(|r| r.is_converged())
            .map(|r| indices.iter().map(|&i| r.parameters[i]).collect())
            .collect();

        let parameters = indices
            .iter()
            .enumerate()
            .map(|(column, &index)| {
                let values: Vec<f64> = samples.iter().map(|s| s[column]).collect();
                ParameterSummary {
                    index,
                    name: names[index].clone(),
                    value: fitted[index],
                    distribution: summarize(&values, confidence, bins),
                }
            })
            .collect();

        Self {
            parameters,
            correlation: rows_of(&correlation_matrix(&samples)),
        }
    }

    /// Mean histogram entropy over the summarized parameters.
    pub fn mean_entropy(&self) -> Option<f64> {
        let entropies: Vec<f64> = self
            .parameters
            .iter()
            .filter_map(|p| p.distribution.as_ref().map(|d| d.entropy))
            .collect();
        if entropies.is_empty() {
            None
        } else {
            Some(entropies.iter().sum::<f64>() / entropies.len() as f64)
        }
    }
}

fn rows_of(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.outer_iter().map(|row| row.to_vec()).collect()
}

/// Method-specific part of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobPayload {
    MonteCarlo(MonteCarloResult),
    CrossValidation(CrossValidationResult),
    GridSearch(GridSearchResult),
    ModelComparison(ModelComparisonResult),
    Reduction(ReductionResult),
}

/// Result of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub method: Method,
    pub seed: u64,
    pub confidence: f64,
    /// Set when the job was cancelled; the payload is then partial.
    pub interrupted: bool,
    pub counts: TrialCounts,
    pub payload: JobPayload,
}

/// What a job runs against.
pub struct JobContext<'a> {
    /// Fitted model; read-only while trials run.
    pub model: &'a dyn Model,
    pub optimizer: &'a Optimizer,
    pub runner: &'a TrialRunner,
    pub seed: u64,
}

/// Validate `descriptor` and run it.
pub fn run_job(descriptor: &JobDescriptor, ctx: &JobContext<'_>) -> Result<JobResult> {
    descriptor.validate()?;
    match descriptor.require_method()? {
        Method::MonteCarlo => monte_carlo::run(descriptor, ctx),
        Method::CrossValidation => cross_validation::run(descriptor, ctx),
        Method::GridSearch => grid_search::run(descriptor, ctx),
        Method::ModelComparison => model_comparison::run(descriptor, ctx),
        Method::Reduction => reduction::run(descriptor, ctx),
    }
}

/// Refit a copy of `base` on `dataset`, starting from the base parameters.
pub(crate) fn refit_trial(
    base: &dyn Model,
    dataset: Dataset,
    optimizer: &Optimizer,
    index: usize,
) -> (TrialRecord, Box<dyn Model>) {
    let mut model = base.clone_model(false);
    model.set_dataset(Arc::new(dataset));
    let start = base.parameters().to_vec();
    refit_model(model, &start, optimizer, index)
}

/// Fit `model` from `start` and classify the outcome.
pub(crate) fn refit_model(
    mut model: Box<dyn Model>,
    start: &[f64],
    optimizer: &Optimizer,
    index: usize,
) -> (TrialRecord, Box<dyn Model>) {
    let (status, sse) = match optimizer.fit(model.as_mut(), start) {
        Ok(report) if !report.sse.is_finite() => (TrialStatus::NonFinite, report.sse),
        Ok(report) if report.converged => (TrialStatus::Converged, report.sse),
        Ok(report) => (TrialStatus::NotConverged, report.sse),
        Err(FitError::NonFinite(message)) => {
            warn!(trial = index, %message, "trial discarded");
            (TrialStatus::NonFinite, f64::NAN)
        }
        Err(e) => {
            warn!(trial = index, error = %e, "trial refit failed");
            (TrialStatus::NotConverged, f64::NAN)
        }
    };
    let parameters = model.parameters().to_vec();
    let status = if status == TrialStatus::Converged && parameters.iter().any(|v| !v.is_finite()) {
        TrialStatus::NonFinite
    } else {
        status
    };

    let record = TrialRecord {
        index,
        status,
        parameters,
        sse,
        held_out: None,
        prediction_error: None,
    };
    (record, model)
}
