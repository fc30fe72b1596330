//! Scores summaries against a task and ranks the models.

use std::cmp::Ordering;

use tracing::debug;

use crate::metrics;
use crate::model::{MetricScores, MetricWeights, ModelAnalysis, SummaryTask};

/// Faithfulness granted when the task lists no source facts to check.
pub const ASSUMED_FAITHFULNESS: f64 = 100.0;

/// Applies the metric heuristics and weights to model summaries.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    weights: MetricWeights,
}

impl Analyzer {
    pub fn new(weights: MetricWeights) -> Self {
        Self { weights }
    }

    /// Score a single model's summary.
    pub fn analyze(&self, model: &str, summary: &str, task: &SummaryTask) -> ModelAnalysis {
        let word_count = metrics::word_count(summary);

        let faithfulness = if task.source_facts.is_empty() {
            ASSUMED_FAITHFULNESS
        } else {
            metrics::faithfulness(summary, &task.source_facts)
        };

        let scores = MetricScores {
            faithfulness,
            coverage: metrics::coverage(summary, &task.key_elements),
            prompt_adherence: metrics::prompt_adherence(summary, word_count, &task.constraints),
            coherence: metrics::coherence(summary),
            compression: metrics::compression_score(task.source_words(), word_count),
        };
        let total_score = self.weights.weighted_total(&scores);

        debug!(model, word_count, total_score, "analyzed summary");

        ModelAnalysis {
            model: model.to_string(),
            word_count,
            metrics: scores,
            total_score,
        }
    }

    /// Score many summaries and rank them by total score, best first.
    pub fn analyze_all<'a, I>(&self, inputs: I, task: &SummaryTask) -> Vec<ModelAnalysis>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut analyses: Vec<ModelAnalysis> = inputs
            .into_iter()
            .map(|(model, summary)| self.analyze(model, summary, task))
            .collect();
        rank(&mut analyses);
        analyses
    }
}

/// Sort by total score descending, then by model name.
pub fn rank(analyses: &mut [ModelAnalysis]) {
    analyses.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.model.cmp(&b.model))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromptConstraints;

    fn task() -> SummaryTask {
        SummaryTask {
            id: "market".into(),
            name: "LLM market".into(),
            description: String::new(),
            article: None,
            source_word_count: Some(4200),
            constraints: PromptConstraints {
                min_words: 10,
                max_words: 30,
                ..Default::default()
            },
            key_elements: vec!["DeepSeek R1".into(), "GigaChat".into(), "128K".into()],
            source_facts: vec![],
            markers: Default::default(),
            weights: None,
            summaries: vec![],
        }
    }

    const GOOD: &str = "1. DeepSeek R1 leads open models with a 128K context window. \
        2. GigaChat targets the Russian market. 3. Prices keep falling across vendors.";
    const WEAK: &str = "Models got better";

    #[test]
    fn analyze_good_summary() {
        let analysis = Analyzer::default().analyze("claude", GOOD, &task());
        assert_eq!(analysis.model, "claude");
        assert_eq!(analysis.metrics.faithfulness, 100.0);
        assert_eq!(analysis.metrics.coverage, 100.0);
        assert_eq!(analysis.metrics.prompt_adherence, 100.0);
        assert_eq!(analysis.metrics.coherence, 80.0);
        assert!(analysis.total_score > 80.0, "got {}", analysis.total_score);
    }

    #[test]
    fn faithfulness_uses_facts_when_present() {
        let mut t = task();
        t.source_facts = vec!["128K".into(), "1M tokens".into()];
        let analysis = Analyzer::default().analyze("claude", GOOD, &t);
        assert_eq!(analysis.metrics.faithfulness, 50.0);
    }

    #[test]
    fn total_lies_within_metric_range() {
        let analyzer = Analyzer::default();
        for summary in [GOOD, WEAK, ""] {
            let a = analyzer.analyze("m", summary, &task());
            assert!(a.total_score >= a.metrics.min() - 0.01);
            assert!(a.total_score <= a.metrics.max() + 0.01);
        }
    }

    #[test]
    fn custom_weights_change_total() {
        let coherence_only = MetricWeights {
            faithfulness: 0.0,
            coverage: 0.0,
            prompt_adherence: 0.0,
            coherence: 1.0,
            compression: 0.0,
        };
        let analysis = Analyzer::new(coherence_only).analyze("claude", GOOD, &task());
        assert_eq!(analysis.total_score, 80.0);
        assert_eq!(analysis.metrics.coverage, 100.0);
    }

    #[test]
    fn analyze_all_ranks_best_first() {
        let analyses =
            Analyzer::default().analyze_all([("groq", WEAK), ("claude", GOOD)], &task());
        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].model, "claude");
        assert!(analyses[0].total_score >= analyses[1].total_score);
    }

    #[test]
    fn ties_break_by_model_name() {
        let analyses = Analyzer::default().analyze_all([("b", WEAK), ("a", WEAK)], &task());
        assert_eq!(analyses[0].model, "a");
        assert_eq!(analyses[1].model, "b");
    }
}
