//! Comparison report with JSON persistence, regression detection, and
//! parsing of rendered markdown tables back into rows.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::rank;
use crate::model::{Metric, MetricScores, ModelAnalysis, ReportRow, SummaryTask};

/// Allowed slack when checking an overall score against its sub-metrics.
/// Covers the one-decimal rounding of rendered metric values.
pub const CONSISTENCY_TOLERANCE: f64 = 0.05;

/// A complete comparison report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the task the models were scored on.
    pub task: TaskSummary,
    /// Per-model analyses, best first.
    pub analyses: Vec<ModelAnalysis>,
}

/// Summary of a task (without summaries or article text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    pub source_words: usize,
    pub key_element_count: usize,
}

impl From<&SummaryTask> for TaskSummary {
    fn from(task: &SummaryTask) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            source_words: task.source_words(),
            key_element_count: task.key_elements.len(),
        }
    }
}

impl ComparisonReport {
    /// Build a report; analyses are ranked best first.
    pub fn new(task: &SummaryTask, mut analyses: Vec<ModelAnalysis>) -> Self {
        rank(&mut analyses);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            task: task.into(),
            analyses,
        }
    }

    /// One row per model, in rank order.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.analyses.iter().map(ReportRow::from).collect()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ComparisonReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline. `threshold` is in score points.
    pub fn compare(&self, baseline: &ComparisonReport, threshold: f64) -> RegressionReport {
        let scores = |report: &ComparisonReport| -> HashMap<String, f64> {
            report
                .analyses
                .iter()
                .map(|a| (a.model.clone(), a.total_score))
                .collect()
        };

        let baseline_scores = scores(baseline);
        let current_scores = scores(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_models = 0usize;

        for analysis in &self.analyses {
            let current = analysis.total_score;
            let Some(&baseline_score) = baseline_scores.get(&analysis.model) else {
                new_models += 1;
                continue;
            };
            let delta = current - baseline_score;
            let change = ScoreChange {
                model: analysis.model.clone(),
                baseline_score,
                current_score: current,
                delta,
            };
            if delta < -threshold {
                regressions.push(change);
            } else if delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_models = baseline_scores
            .keys()
            .filter(|m| !current_scores.contains_key(*m))
            .count();

        RegressionReport {
            regressions,
            improvements,
            unchanged,
            new_models,
            removed_models,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Models whose score went down.
    pub regressions: Vec<ScoreChange>,
    /// Models whose score went up.
    pub improvements: Vec<ScoreChange>,
    /// Models with no significant change.
    pub unchanged: usize,
    /// Models in current but not baseline.
    pub new_models: usize,
    /// Models in baseline but not current.
    pub removed_models: usize,
}

/// A score change for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub model: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl RegressionReport {
    /// Format the regression report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Model | Baseline | Current | Delta |\n");
            md.push_str("|-------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.2} | {:.2} | {:+.2} |\n",
                    c.model, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Markdown table parsing and consistency checks
// ---------------------------------------------------------------------------

/// Rows recovered from a rendered markdown report.
#[derive(Debug, Clone, Default)]
pub struct ParsedTables {
    /// Models present in both the summary and the detail table.
    pub rows: Vec<ReportRow>,
    /// Models present in only one of the two tables.
    pub unmatched: Vec<String>,
    /// Repeated rows as `(model, table)`; only the first row is joined.
    pub duplicates: Vec<(String, &'static str)>,
}

/// A documentation-consistency problem found in a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyIssue {
    pub model: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct SummaryCells {
    overall: f64,
    word_count: usize,
}

/// Parse the summary (`Model | Overall | Words`) and detail (model plus the
/// five metric columns) tables of a markdown report and join them by model.
pub fn parse_markdown_tables(markdown: &str) -> Result<ParsedTables> {
    let mut summary: Vec<(String, SummaryCells)> = Vec::new();
    let mut detail: Vec<(String, MetricScores)> = Vec::new();

    let lines: Vec<&str> = markdown.lines().map(str::trim).collect();
    let mut i = 0;
    while i < lines.len() {
        if !lines[i].starts_with('|') {
            i += 1;
            continue;
        }

        let header = split_row(lines[i]);
        let mut body = Vec::new();
        i += 1;
        while i < lines.len() && lines[i].starts_with('|') {
            let cells = split_row(lines[i]);
            if !is_separator(&cells) {
                body.push(cells);
            }
            i += 1;
        }

        if let Some(layout) = summary_layout(&header) {
            for (n, cells) in body.iter().enumerate() {
                let model = cell_text(cells, 0);
                let overall = parse_number(cells.get(layout.overall))
                    .with_context(|| format!("summary row {}: bad overall score", n + 1))?;
                let word_count = parse_count(cells.get(layout.words))
                    .with_context(|| format!("summary row {}: bad word count", n + 1))?;
                summary.push((model, SummaryCells { overall, word_count }));
            }
        } else if let Some(columns) = detail_layout(&header) {
            for (n, cells) in body.iter().enumerate() {
                let mut scores = MetricScores::default();
                for &(col, metric) in &columns {
                    let value = parse_number(cells.get(col)).with_context(|| {
                        format!("detail row {}: bad {metric} value", n + 1)
                    })?;
                    scores.set(metric, value);
                }
                detail.push((cell_text(cells, 0), scores));
            }
        }
    }

    anyhow::ensure!(!summary.is_empty(), "no summary table found");

    let detail_models: HashSet<&str> = detail.iter().map(|(m, _)| m.as_str()).collect();
    let summary_models: HashSet<&str> = summary.iter().map(|(m, _)| m.as_str()).collect();

    let mut parsed = ParsedTables::default();
    let mut seen: HashSet<&str> = HashSet::new();
    for (model, _) in &detail {
        if !seen.insert(model.as_str()) {
            parsed.duplicates.push((model.clone(), "detail"));
        }
    }

    seen.clear();
    for (model, cells) in &summary {
        if !seen.insert(model.as_str()) {
            parsed.duplicates.push((model.clone(), "summary"));
            continue;
        }
        match detail.iter().find(|(m, _)| m == model) {
            Some((_, metrics)) => parsed.rows.push(ReportRow {
                model: model.clone(),
                overall: cells.overall,
                word_count: cells.word_count,
                metrics: *metrics,
            }),
            None => parsed.unmatched.push(model.clone()),
        }
    }
    seen.clear();
    for (model, _) in &detail {
        if !summary_models.contains(model.as_str()) && seen.insert(model.as_str()) {
            parsed.unmatched.push(model.clone());
        }
    }
    tracing::debug!(
        rows = parsed.rows.len(),
        detail = detail_models.len(),
        "parsed report tables"
    );

    Ok(parsed)
}

/// Check every row: values in `[0, 100]`, and the overall score between the
/// smallest and largest sub-metric.
pub fn check_rows(rows: &[ReportRow]) -> Vec<ConsistencyIssue> {
    let mut issues = Vec::new();

    for row in rows {
        let issue = |message: String| ConsistencyIssue {
            model: row.model.clone(),
            message,
        };

        if !(0.0..=100.0).contains(&row.overall) {
            issues.push(issue(format!(
                "overall score {:.2} is outside 0–100",
                row.overall
            )));
        }
        for (metric, value) in row.metrics.iter() {
            if !(0.0..=100.0).contains(&value) {
                issues.push(issue(format!("{metric} {value:.1} is outside 0–100")));
            }
        }

        let (lo, hi) = (row.metrics.min(), row.metrics.max());
        if row.overall < lo - CONSISTENCY_TOLERANCE || row.overall > hi + CONSISTENCY_TOLERANCE {
            issues.push(issue(format!(
                "overall score {:.2} is outside its sub-metric range {lo:.1}–{hi:.1}",
                row.overall
            )));
        }
    }

    issues
}

/// Run [`check_rows`] and flag models missing from one of the tables or
/// listed twice in one.
pub fn check_tables(parsed: &ParsedTables) -> Vec<ConsistencyIssue> {
    let mut issues = check_rows(&parsed.rows);
    issues.extend(parsed.unmatched.iter().map(|model| ConsistencyIssue {
        model: model.clone(),
        message: "appears in only one of the summary and detail tables".into(),
    }));
    issues.extend(parsed.duplicates.iter().map(|(model, table)| ConsistencyIssue {
        model: model.clone(),
        message: format!("listed more than once in the {table} table"),
    }));
    issues
}

struct SummaryLayout {
    overall: usize,
    words: usize,
}

fn summary_layout(header: &[String]) -> Option<SummaryLayout> {
    let find = |names: &[&str]| {
        header
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };
    Some(SummaryLayout {
        overall: find(&["overall", "overall score", "total", "score"])?,
        words: find(&["words", "word count"])?,
    })
}

fn detail_layout(header: &[String]) -> Option<Vec<(usize, Metric)>> {
    let columns: Vec<(usize, Metric)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(i, h)| h.parse::<Metric>().ok().map(|m| (i, m)))
        .collect();
    let complete = Metric::ALL
        .iter()
        .all(|m| columns.iter().any(|(_, c)| c == m));
    complete.then_some(columns)
}

fn split_row(line: &str) -> Vec<String> {
    let inner = line.trim().trim_start_matches('|').trim_end_matches('|');
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn is_separator(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':' | ' ')))
}

fn cell_text(cells: &[String], idx: usize) -> String {
    cells
        .get(idx)
        .map(|c| c.trim_matches('*').trim().to_string())
        .unwrap_or_default()
}

/// Parse a word count, ignoring thousands separators (`1,200`, `1 200`).
fn parse_count(cell: Option<&String>) -> Result<usize> {
    let raw = cell.context("missing cell")?;
    let cleaned: String = raw
        .trim_matches('*')
        .chars()
        .filter(|c| !matches!(*c, ',' | '_' | '\'' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    cleaned
        .parse::<usize>()
        .with_context(|| format!("not a word count: {raw:?}"))
}

fn parse_number(cell: Option<&String>) -> Result<f64> {
    let raw = cell.context("missing cell")?;
    let cleaned = raw.trim_matches('*').trim().trim_end_matches('%').trim();
    cleaned
        .replace(',', ".")
        .parse::<f64>()
        .with_context(|| format!("not a number: {raw:?}"))
}
