//! Aggregate statistics over a set of model analyses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Metric, ModelAnalysis};

/// The best model on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLeader {
    pub metric: Metric,
    pub model: String,
    pub value: f64,
}

/// Distribution of one metric across models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// For each metric, the model with the highest value. Ties go to the model
/// that comes first in `analyses`.
pub fn metric_leaders(analyses: &[ModelAnalysis]) -> Vec<MetricLeader> {
    Metric::ALL
        .iter()
        .filter_map(|&metric| {
            analyses
                .iter()
                .fold(None::<&ModelAnalysis>, |best, a| match best {
                    Some(b) if b.metrics.get(metric) >= a.metrics.get(metric) => Some(b),
                    _ => Some(a),
                })
                .map(|a| MetricLeader {
                    metric,
                    model: a.model.clone(),
                    value: a.metrics.get(metric),
                })
        })
        .collect()
}

/// Mean, min and max of every metric. Empty when there are no analyses.
pub fn metric_summaries(analyses: &[ModelAnalysis]) -> HashMap<Metric, MetricSummary> {
    if analyses.is_empty() {
        return HashMap::new();
    }
    let n = analyses.len() as f64;

    Metric::ALL
        .iter()
        .map(|&metric| {
            let values = analyses.iter().map(|a| a.metrics.get(metric));
            let summary = MetricSummary {
                mean: values.clone().sum::<f64>() / n,
                min: values.clone().fold(f64::INFINITY, f64::min),
                max: values.fold(f64::NEG_INFINITY, f64::max),
            };
            (metric, summary)
        })
        .collect()
}

/// Gap between the best and second-best total score.
///
/// `None` with fewer than two analyses.
pub fn score_spread(analyses: &[ModelAnalysis]) -> Option<f64> {
    let mut totals: Vec<f64> = analyses.iter().map(|a| a.total_score).collect();
    if totals.len() < 2 {
        return None;
    }
    totals.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    Some(totals[0] - totals[1])
}
