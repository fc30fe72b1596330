//! Core data model types for sumbench.
//!
//! These are the types that the entire system uses to describe a
//! summarization task, the scores assigned to each model, and the rows of a
//! comparison report.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source word count assumed when a task names neither an article nor a count.
pub const DEFAULT_SOURCE_WORDS: usize = 4200;

/// One of the five sub-metrics a summary is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Faithfulness,
    Coverage,
    PromptAdherence,
    Coherence,
    Compression,
}

impl Metric {
    /// All metrics in report column order.
    pub const ALL: [Metric; 5] = [
        Metric::Faithfulness,
        Metric::Coverage,
        Metric::PromptAdherence,
        Metric::Coherence,
        Metric::Compression,
    ];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Faithfulness => write!(f, "faithfulness"),
            Metric::Coverage => write!(f, "coverage"),
            Metric::PromptAdherence => write!(f, "prompt_adherence"),
            Metric::Coherence => write!(f, "coherence"),
            Metric::Compression => write!(f, "compression"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(&[' ', '-'][..], "_").as_str() {
            "faithfulness" => Ok(Metric::Faithfulness),
            "coverage" => Ok(Metric::Coverage),
            "prompt_adherence" | "adherence" => Ok(Metric::PromptAdherence),
            "coherence" => Ok(Metric::Coherence),
            "compression" | "compression_ratio" => Ok(Metric::Compression),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// Scores for the five sub-metrics, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricScores {
    pub faithfulness: f64,
    pub coverage: f64,
    pub prompt_adherence: f64,
    pub coherence: f64,
    pub compression: f64,
}

impl MetricScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Faithfulness => self.faithfulness,
            Metric::Coverage => self.coverage,
            Metric::PromptAdherence => self.prompt_adherence,
            Metric::Coherence => self.coherence,
            Metric::Compression => self.compression,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Faithfulness => self.faithfulness = value,
            Metric::Coverage => self.coverage = value,
            Metric::PromptAdherence => self.prompt_adherence = value,
            Metric::Coherence => self.coherence = value,
            Metric::Compression => self.compression = value,
        }
    }

    /// Iterate `(metric, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self.get(m)))
    }

    /// The smallest sub-metric value.
    pub fn min(&self) -> f64 {
        self.iter().map(|(_, v)| v).fold(f64::INFINITY, f64::min)
    }

    /// The largest sub-metric value.
    pub fn max(&self) -> f64 {
        self.iter().map(|(_, v)| v).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Relative weight of each metric in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    pub faithfulness: f64,
    pub coverage: f64,
    pub prompt_adherence: f64,
    pub coherence: f64,
    pub compression: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            faithfulness: 0.30,
            coverage: 0.25,
            prompt_adherence: 0.20,
            coherence: 0.15,
            compression: 0.10,
        }
    }
}

impl MetricWeights {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Faithfulness => self.faithfulness,
            Metric::Coverage => self.coverage,
            Metric::PromptAdherence => self.prompt_adherence,
            Metric::Coherence => self.coherence,
            Metric::Compression => self.compression,
        }
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        Metric::ALL.iter().map(|&m| self.get(m)).sum()
    }

    /// Check that weights are non-negative and sum to 1.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(m) = Metric::ALL.iter().find(|&&m| self.get(m) < 0.0) {
            return Err(format!("weight for {m} is negative"));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("weights sum to {sum:.4}, expected 1.0"));
        }
        Ok(())
    }

    /// Weighted sum of the scores, rounded to two decimals.
    pub fn weighted_total(&self, scores: &MetricScores) -> f64 {
        let total: f64 = scores.iter().map(|(m, v)| v * self.get(m)).sum();
        round2(total)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Constraints the summarization prompt imposes on the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConstraints {
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Markers that must all appear for the structure to count as followed.
    #[serde(default = "default_structure_markers")]
    pub structure_markers: Vec<String>,
}

impl Default for PromptConstraints {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_words: default_max_words(),
            structure_markers: default_structure_markers(),
        }
    }
}

fn default_min_words() -> usize {
    100
}

fn default_max_words() -> usize {
    150
}

fn default_structure_markers() -> Vec<String> {
    vec!["1.".into(), "2.".into(), "3.".into()]
}

/// Section markers that delimit the summary inside a markdown results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMarkers {
    #[serde(default = "default_start_marker")]
    pub start: String,
    #[serde(default = "default_end_marker")]
    pub end: String,
}

impl Default for SummaryMarkers {
    fn default() -> Self {
        Self {
            start: default_start_marker(),
            end: default_end_marker(),
        }
    }
}

fn default_start_marker() -> String {
    "**Summary:**".to_string()
}

fn default_end_marker() -> String {
    "**Statistics:**".to_string()
}

/// Where a model's summary lives, and optionally how to regenerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySource {
    /// Display name used in reports (e.g. "Claude 3.5 Sonnet").
    pub model: String,
    /// Path to a `.json` result or a markdown/text file.
    pub path: PathBuf,
    /// Provider used by `summarize` (e.g. "groq").
    #[serde(default)]
    pub provider: Option<String>,
    /// Provider model identifier (e.g. "llama3-8b-8192").
    #[serde(default)]
    pub provider_model: Option<String>,
}

/// A summarization task: one source article, scored summaries from many models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Path to the source article.
    #[serde(default)]
    pub article: Option<PathBuf>,
    /// Word count of the source, used for the compression metric.
    #[serde(default)]
    pub source_word_count: Option<usize>,
    #[serde(default)]
    pub constraints: PromptConstraints,
    /// Names, figures and terms a good summary mentions.
    #[serde(default)]
    pub key_elements: Vec<String>,
    /// Facts from the source checked for faithfulness.
    #[serde(default)]
    pub source_facts: Vec<String>,
    #[serde(default)]
    pub markers: SummaryMarkers,
    /// Metric weights for this task; the defaults apply when absent.
    #[serde(default)]
    pub weights: Option<MetricWeights>,
    #[serde(default)]
    pub summaries: Vec<SummarySource>,
}

impl SummaryTask {
    /// Source word count, falling back to [`DEFAULT_SOURCE_WORDS`].
    pub fn source_words(&self) -> usize {
        self.source_word_count.unwrap_or(DEFAULT_SOURCE_WORDS)
    }
}

/// Token accounting for a single provider call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost_usd: f64,
}

/// A summary produced by a provider, as persisted by `summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub model: String,
    pub provider: String,
    pub summary: String,
    pub word_count: usize,
    pub token_usage: TokenUsage,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Scored analysis of one model's summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnalysis {
    pub model: String,
    pub word_count: usize,
    pub metrics: MetricScores,
    pub total_score: f64,
}

/// One row of a comparison report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub model: String,
    pub overall: f64,
    pub word_count: usize,
    pub metrics: MetricScores,
}

impl From<&ModelAnalysis> for ReportRow {
    fn from(a: &ModelAnalysis) -> Self {
        Self {
            model: a.model.clone(),
            overall: a.total_score,
            word_count: a.word_count,
            metrics: a.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_display_and_parse() {
        assert_eq!(Metric::PromptAdherence.to_string(), "prompt_adherence");
        assert_eq!(
            "prompt adherence".parse::<Metric>().unwrap(),
            Metric::PromptAdherence
        );
        assert_eq!("Coverage".parse::<Metric>().unwrap(), Metric::Coverage);
        assert_eq!(
            "compression_ratio".parse::<Metric>().unwrap(),
            Metric::Compression
        );
        assert!("fluency".parse::<Metric>().is_err());
    }

    #[test]
    fn default_weights_are_valid() {
        let weights = MetricWeights::default();
        assert!(weights.validate().is_ok());
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_weights_rejected() {
        let weights = MetricWeights {
            compression: 0.5,
            ..Default::default()
        };
        assert!(weights.validate().unwrap_err().contains("sum"));

        let weights = MetricWeights {
            faithfulness: -0.1,
            coverage: 0.65,
            ..Default::default()
        };
        assert!(weights.validate().unwrap_err().contains("negative"));
    }

    #[test]
    fn weighted_total_rounds_to_two_decimals() {
        let scores = MetricScores {
            faithfulness: 100.0,
            coverage: 57.142857,
            prompt_adherence: 100.0,
            coherence: 80.0,
            compression: 32.0610687,
        };
        let total = MetricWeights::default().weighted_total(&scores);
        // 30 + 14.2857 + 20 + 12 + 3.2061 = 79.4918
        assert_eq!(total, 79.49);
    }

    #[test]
    fn scores_min_max() {
        let scores = MetricScores {
            faithfulness: 100.0,
            coverage: 20.0,
            prompt_adherence: 70.0,
            coherence: 60.0,
            compression: 35.0,
        };
        assert_eq!(scores.min(), 20.0);
        assert_eq!(scores.max(), 100.0);
    }

    #[test]
    fn task_source_words_fallback() {
        let task: SummaryTask = serde_json::from_str(r#"{"id": "t", "name": "T"}"#).unwrap();
        assert_eq!(task.source_words(), DEFAULT_SOURCE_WORDS);
        assert_eq!(task.constraints, PromptConstraints::default());
        assert_eq!(task.markers.start, "**Summary:**");
    }
}
