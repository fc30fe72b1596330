//! Markdown report renderer.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use sumbench_core::model::Metric;
use sumbench_core::report::ComparisonReport;
use sumbench_core::statistics::metric_leaders;

/// Column heading for a metric in the detail table.
fn metric_heading(metric: Metric) -> &'static str {
    match metric {
        Metric::Faithfulness => "Faithfulness",
        Metric::Coverage => "Coverage",
        Metric::PromptAdherence => "Prompt Adherence",
        Metric::Coherence => "Coherence",
        Metric::Compression => "Compression",
    }
}

/// Pipes would split a table cell.
fn cell(s: &str) -> String {
    s.replace('|', "/")
}

/// Render the comparison as markdown: a summary table and a per-metric
/// detail table, both in rank order.
pub fn render_markdown(report: &ComparisonReport) -> String {
    let rows = report.rows();
    let mut md = String::new();

    md.push_str("# LLM Summarization Comparison\n\n");
    let _ = writeln!(md, "**Task:** {}  ", report.task.name);
    let _ = writeln!(md, "**Date:** {}  ", report.created_at.format("%d.%m.%Y"));
    let _ = writeln!(
        md,
        "**Source:** {} words, {} key elements\n",
        report.task.source_words, report.task.key_element_count
    );

    md.push_str("## Summary\n\n");
    md.push_str("| Model | Overall | Words |\n");
    md.push_str("|-------|--------:|------:|\n");
    for row in &rows {
        let _ = writeln!(
            md,
            "| {} | {:.2} | {} |",
            cell(&row.model),
            row.overall,
            row.word_count
        );
    }

    md.push_str("\n## Detailed Metrics\n\n");
    md.push_str("| Model |");
    for metric in Metric::ALL {
        let _ = write!(md, " {} |", metric_heading(metric));
    }
    md.push_str("\n|-------|");
    for _ in Metric::ALL {
        md.push_str("------:|");
    }
    md.push('\n');
    for row in &rows {
        let _ = write!(md, "| {} |", cell(&row.model));
        for (_, value) in row.metrics.iter() {
            let _ = write!(md, " {value:.1} |");
        }
        md.push('\n');
    }

    let leaders = metric_leaders(&report.analyses);
    if !leaders.is_empty() {
        md.push_str("\n## Metric Leaders\n\n");
        for leader in leaders {
            let _ = writeln!(
                md,
                "- {}: {} ({:.1})",
                metric_heading(leader.metric),
                leader.model,
                leader.value
            );
        }
    }

    md
}

/// Write a markdown report to a file, creating parent directories.
pub fn write_markdown_report(report: &ComparisonReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_markdown(report))
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}
