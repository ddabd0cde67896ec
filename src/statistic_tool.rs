//! Comparison of competing models and of their resampling results.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::jobs::{JobPayload, JobResult, ResamplingSummary};
use crate::model::Model;

/// Position of one model in an AICc ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRank {
    /// Position of the model in the input slice.
    pub model: usize,
    pub name: String,
    pub sse: f64,
    pub aicc: f64,
    /// AICc difference to the best model.
    pub delta: f64,
    pub weight: f64,
}

/// Resampling quality of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResamplingScore {
    pub model: usize,
    /// Mean histogram entropy over the parameters.
    pub mean_entropy: f64,
    /// Mean of `std_dev / |mean|` over the parameters.
    pub relative_deviation: f64,
}

pub struct StatisticTool;

impl StatisticTool {
    /// Rank calculated models by AICc, best first, with Akaike weights.
    pub fn rank_models(models: &[&dyn Model]) -> Result<Vec<ModelRank>> {
        let mut ranks = Vec::with_capacity(models.len());
        for (i, model) in models.iter().enumerate() {
            let stats = model.statistics().ok_or_else(|| {
                FitError::InvalidInput(format!("model {} has not been calculated", i))
            })?;
            ranks.push(ModelRank {
                model: i,
                name: model.name().to_string(),
                sse: stats.sse,
                aicc: stats.aicc,
                delta: 0.0,
                weight: 0.0,
            });
        }
        ranks.sort_by(|a, b| a.aicc.total_cmp(&b.aicc));

        let best = match ranks.first() {
            Some(first) if first.aicc.is_finite() => first.aicc,
            Some(_) => {
                return Err(FitError::NonFinite(
                    "no model has a finite AICc".to_string(),
                ))
            }
            None => return Ok(ranks),
        };
        for rank in ranks.iter_mut() {
            rank.delta = rank.aicc - best;
        }
        let total: f64 = ranks.iter().map(|r| (-0.5 * r.delta).exp()).sum();
        for rank in ranks.iter_mut() {
            rank.weight = (-0.5 * rank.delta).exp() / total;
        }
        Ok(ranks)
    }

    /// Score Monte Carlo or cross-validation results, lowest entropy first.
    pub fn compare_resampling(results: &[&JobResult]) -> Result<Vec<ResamplingScore>> {
        let mut scores = Vec::with_capacity(results.len());
        for (i, result) in results.iter().enumerate() {
            let summary = resampling_summary(result).ok_or_else(|| {
                FitError::InvalidInput(format!(
                    "result {} is a {:?} job, not a resampling job",
                    i, result.method
                ))
            })?;
            let mean_entropy = summary.mean_entropy().unwrap_or(f64::NAN);
            let deviations: Vec<f64> = summary
                .parameters
                .iter()
                .filter_map(|p| p.distribution.as_ref())
                .filter(|d| d.mean != 0.0)
                .map(|d| d.std_dev / d.mean.abs())
                .collect();
            let relative_deviation = if deviations.is_empty() {
                f64::NAN
            } else {
                deviations.iter().sum::<f64>() / deviations.len() as f64
            };
            scores.push(ResamplingScore {
                model: i,
                mean_entropy,
                relative_deviation,
            });
        }
        scores.sort_by(|a, b| a.mean_entropy.total_cmp(&b.mean_entropy));
        Ok(scores)
    }
}

fn resampling_summary(result: &JobResult) -> Option<&ResamplingSummary> {
    match &result.payload {
        JobPayload::MonteCarlo(mc) => Some(&mc.summary),
        JobPayload::CrossValidation(cv) => Some(&cv.summary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::models::{create_model, ModelId};
    use ndarray::Array2;
    use std::sync::Arc;

    #[test]
    fn test_weights_sum_to_one_and_favour_better_fit() {
        let substrate: Vec<f64> = (1..=10).map(|i| i as f64 * 0.5).collect();
        let independent = Array2::from_shape_vec((10, 1), substrate.clone()).unwrap();
        let dependent =
            Array2::from_shape_fn((10, 1), |(r, _)| 5.0 * substrate[r] / (0.7 + substrate[r]));
        let data = Arc::new(Dataset::new(independent, dependent).unwrap());

        let mut good = create_model(ModelId::MichaelisMenten, data.clone()).unwrap();
        good.set_parameters(&[0.71]);
        good.calculate();
        let mut poor = create_model(ModelId::MichaelisMenten, data).unwrap();
        poor.set_parameters(&[3.0]);
        poor.calculate();

        let ranks = StatisticTool::rank_models(&[poor.as_ref(), good.as_ref()]).unwrap();
        assert_eq!(ranks[0].model, 1);
        assert_eq!(ranks[0].delta, 0.0);
        assert!(ranks[0].weight > ranks[1].weight);
        let total: f64 = ranks.iter().map(|r| r.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uncalculated_model_is_rejected() {
        let independent = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let dependent = Array2::from_shape_vec((3, 1), vec![1.0, 1.5, 1.7]).unwrap();
        let data = Arc::new(Dataset::new(independent, dependent).unwrap());
        let model = create_model(ModelId::MichaelisMenten, data).unwrap();
        assert!(StatisticTool::rank_models(&[model.as_ref()]).is_err());
    }
}
