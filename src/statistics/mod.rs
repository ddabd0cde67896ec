//! Statistics shared by the fit, the jobs and the cross-model tool.
//!
//! - [`vector`]: goodness-of-fit scalars computed after every `calculate()`
//! - [`confidence`]: F-quantile based SSE thresholds and percentile bars
//! - [`distribution`]: summaries, histograms, entropy and correlation of
//!   resampled parameter distributions

pub mod confidence;
pub mod distribution;
pub mod vector;

pub use confidence::{f_value, percentile_bar, sse_threshold, ConfidenceBar};
pub use distribution::{correlation_matrix, entropy, histogram, summarize, DistributionSummary, Histogram};
pub use vector::StatisticVector;
