//! Levenberg-Marquardt algorithm implementation.
//!
//! A damped Gauss-Newton driver with a finite-difference Jacobian, an
//! adaptive trust region, and caller-supplied tolerances.

pub mod algorithm;
pub mod config;
pub mod convergence;
pub mod step;
pub mod trust_region;

pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::{LmConfig, OptimizerConfig};
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
pub use trust_region::TrustRegion;
