//! Summary quality heuristics.
//!
//! Every function returns a score in `[0, 100]` except
//! [`compression_ratio`], which returns the raw ratio; use
//! [`compression_score`] for the clamped value that feeds the weighted total.

use crate::model::PromptConstraints;

const WORD_RANGE_POINTS: f64 = 40.0;
const STRUCTURE_POINTS: f64 = 30.0;
const PARTIAL_STRUCTURE_POINTS: f64 = 15.0;
const STYLE_POINTS: f64 = 30.0;

const MULTI_SENTENCE_COHERENCE: f64 = 80.0;
const BASE_COHERENCE: f64 = 60.0;

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Percentage of `needles` found in `haystack`, case-insensitively.
fn percent_present(haystack: &str, needles: &[String]) -> f64 {
    if needles.is_empty() {
        return 0.0;
    }
    let haystack = haystack.to_lowercase();
    let found = needles
        .iter()
        .filter(|n| haystack.contains(&n.to_lowercase()))
        .count();
    found as f64 / needles.len() as f64 * 100.0
}

/// Share of source facts reproduced in the summary.
pub fn faithfulness(summary: &str, source_facts: &[String]) -> f64 {
    percent_present(summary, source_facts)
}

/// Share of key elements mentioned in the summary.
pub fn coverage(summary: &str, key_elements: &[String]) -> f64 {
    percent_present(summary, key_elements)
}

/// Compliance with the prompt's word range, numbered structure, and style.
///
/// The style component is a flat grant: tone is assumed neutral.
pub fn prompt_adherence(summary: &str, word_count: usize, constraints: &PromptConstraints) -> f64 {
    let word_score = if (constraints.min_words..=constraints.max_words).contains(&word_count) {
        WORD_RANGE_POINTS
    } else {
        0.0
    };

    let structure_score = if constraints
        .structure_markers
        .iter()
        .all(|m| summary.contains(m.as_str()))
    {
        STRUCTURE_POINTS
    } else {
        PARTIAL_STRUCTURE_POINTS
    };

    word_score + structure_score + STYLE_POINTS
}

/// Rough coherence estimate: multi-sentence summaries score higher.
pub fn coherence(summary: &str) -> f64 {
    if summary.split('.').count() > 2 {
        MULTI_SENTENCE_COHERENCE
    } else {
        BASE_COHERENCE
    }
}

/// Source words per summary word. Zero when the summary is empty.
pub fn compression_ratio(source_words: usize, summary_words: usize) -> f64 {
    if summary_words == 0 {
        return 0.0;
    }
    source_words as f64 / summary_words as f64
}

/// [`compression_ratio`] clamped to the report's `[0, 100]` range.
pub fn compression_score(source_words: usize, summary_words: usize) -> f64 {
    compression_ratio(source_words, summary_words).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn word_count_handles_mixed_whitespace() {
        assert_eq!(word_count("one  two\tthree\nfour"), 4);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn coverage_is_case_insensitive() {
        let summary = "DeepSeek R1 and GigaChat were released; o3-mini too.";
        let elements = strings(&["deepseek r1", "GigaChat", "Grok", "O3-MINI"]);
        assert_eq!(coverage(summary, &elements), 75.0);
    }

    #[test]
    fn coverage_empty_list_scores_zero() {
        assert_eq!(coverage("anything", &[]), 0.0);
    }

    #[test]
    fn faithfulness_counts_found_facts() {
        let facts = strings(&["1,75 трлн $", "36%"]);
        assert_eq!(faithfulness("Рынок достигнет 1,75 трлн $.", &facts), 50.0);
        assert_eq!(faithfulness("no facts", &[]), 0.0);
    }

    #[test]
    fn prompt_adherence_full_marks() {
        let summary = "1. First point. 2. Second point. 3. Third point.";
        let constraints = PromptConstraints {
            min_words: 5,
            max_words: 20,
            ..Default::default()
        };
        let wc = word_count(summary);
        assert_eq!(prompt_adherence(summary, wc, &constraints), 100.0);
    }

    #[test]
    fn prompt_adherence_out_of_range_without_structure() {
        let summary = "A short unstructured summary.";
        let constraints = PromptConstraints::default();
        // 0 (word range) + 15 (partial structure) + 30 (style)
        assert_eq!(prompt_adherence(summary, 4, &constraints), 45.0);
    }

    #[test]
    fn prompt_adherence_range_is_inclusive() {
        let constraints = PromptConstraints::default();
        let summary = "1. 2. 3.";
        assert_eq!(prompt_adherence(summary, 100, &constraints), 100.0);
        assert_eq!(prompt_adherence(summary, 150, &constraints), 100.0);
        assert_eq!(prompt_adherence(summary, 151, &constraints), 60.0);
    }

    #[test]
    fn coherence_thresholds() {
        assert_eq!(coherence("One sentence."), 60.0);
        assert_eq!(coherence("One. Two."), 80.0);
        assert_eq!(coherence("This is a test summary with about ten words."), 60.0);
    }

    #[test]
    fn compression_ratio_and_score() {
        assert_eq!(compression_ratio(4200, 0), 0.0);
        assert!((compression_ratio(4200, 131) - 32.061).abs() < 0.001);
        assert_eq!(compression_score(4200, 10), 100.0);
        assert_eq!(compression_score(4200, 210), 20.0);
    }
}
