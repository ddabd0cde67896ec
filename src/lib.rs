//! # bindfit-rs
//!
//! `bindfit-rs` fits binding isotherms (host-guest titrations and similar
//! saturation curves) with a Levenberg-Marquardt optimizer and estimates
//! parameter uncertainty through resampling.
//!
//! The library provides:
//! - A model contract with globally shared and per-series parameters, where
//!   the per-series parameters are solved analytically inside each step
//! - A Levenberg-Marquardt driver wrapped in an outer fit loop
//! - Monte Carlo, cross-validation, grid-search, model-comparison and
//!   reduction jobs running on a bounded worker pool
//! - F-test confidence thresholds, percentile intervals, histogram entropy
//!   and AICc model ranking
//!
//! ## Basic Usage
//!
//! ```no_run
//! use bindfit_rs::{create_model, Dataset, JobDescriptor, JobManager, LmConfig,
//!     Method, ModelId, Optimizer, OptimizerConfig, RunnerConfig};
//! use ndarray::Array2;
//! use std::sync::Arc;
//!
//! # fn main() -> bindfit_rs::Result<()> {
//! let independent = Array2::from_shape_vec((3, 2), vec![1e-3, 0.0, 1e-3, 5e-4, 1e-3, 1e-3])
//!     .map_err(|e| bindfit_rs::FitError::InvalidInput(e.to_string()))?;
//! let dependent = Array2::from_shape_vec((3, 1), vec![7.0, 7.4, 7.6])
//!     .map_err(|e| bindfit_rs::FitError::InvalidInput(e.to_string()))?;
//! let data = Arc::new(Dataset::new(independent, dependent)?);
//! let mut model = create_model(ModelId::OneToOne, data)?;
//!
//! let config = OptimizerConfig::new(200, 1e-10, 1e-8, LmConfig::new(1e-3, 1000, 1e-10, 1e-10, 1e-12, 1e-8));
//! Optimizer::new(config.clone())?.fit(model.as_mut(), &[3.0])?;
//!
//! let mut manager = JobManager::new(model, config, RunnerConfig::default().with_seed(7))?;
//! manager.add_single_job(JobDescriptor::new(Method::MonteCarlo).with_max_steps(100))?;
//! let _reports = manager.run_jobs()?;
//! # Ok(())
//! # }
//! ```

pub mod error;

mod utils;

pub mod problem;

pub mod lm;

pub mod dataset;

pub mod model;

pub mod models;

pub mod optimizer;

pub mod statistics;

pub mod resampling;

pub mod runner;

pub mod jobs;

pub mod manager;

pub mod statistic_tool;

// Re-exports for convenience
pub use dataset::Dataset;
pub use error::{FitError, Result};
pub use jobs::{JobDescriptor, JobPayload, JobResult, Method, TrialCounts, TrialRecord, TrialStatus};
pub use lm::{LevenbergMarquardt, LmConfig, OptimizerConfig};
pub use manager::{JobId, JobManager, JobReport, JobState};
pub use model::{Model, ModelCore, ParameterKind};
pub use models::{create_model, ModelId};
pub use optimizer::{fit, FitReport, Optimizer};
pub use problem::Problem;
pub use runner::{CancellationToken, ProgressObserver, RunnerConfig};
pub use statistic_tool::StatisticTool;
pub use statistics::StatisticVector;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
