//! The `sumbench analyze` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use sumbench_core::analyzer::Analyzer;
use sumbench_core::extract::load_summary;
use sumbench_core::model::SummaryTask;
use sumbench_core::parser;
use sumbench_core::report::ComparisonReport;
use sumbench_core::statistics::score_spread;
use sumbench_report::{write_html_report, write_markdown_report};

/// Parse a `--format` value into the list of formats to write.
pub fn parse_formats(format: &str) -> Vec<String> {
    if format.trim() == "all" {
        return vec!["md".into(), "json".into(), "html".into()];
    }
    format
        .split(',')
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Load and score every summary a task lists with the task's weights.
/// Unreadable summaries are reported and skipped.
fn analyze_task(task: &SummaryTask) -> ComparisonReport {
    let analyzer = Analyzer::new(task.weights.unwrap_or_default());
    let mut loaded = Vec::new();
    for source in &task.summaries {
        match load_summary(&source.path, &task.markers) {
            Ok(text) => loaded.push((source.model.as_str(), text)),
            Err(e) => {
                tracing::warn!("skipping {}: {e}", source.model);
                eprintln!("Warning: skipping {}: {e}", source.model);
            }
        }
    }

    let analyses = analyzer.analyze_all(loaded.iter().map(|(m, s)| (*m, s.as_str())), task);
    ComparisonReport::new(task, analyses)
}

fn print_summary(report: &ComparisonReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Model",
        "Overall",
        "Words",
        "Faithfulness",
        "Coverage",
        "Adherence",
        "Coherence",
        "Compression",
    ]);

    for (rank, row) in report.rows().iter().enumerate() {
        let mut cells = vec![
            Cell::new(rank + 1),
            Cell::new(&row.model),
            Cell::new(format!("{:.2}", row.overall)),
            Cell::new(row.word_count),
        ];
        cells.extend(
            row.metrics
                .iter()
                .map(|(_, value)| Cell::new(format!("{value:.1}"))),
        );
        table.add_row(cells);
    }

    println!("\n{}\n{table}", report.task.name);
    if let Some(spread) = score_spread(&report.analyses) {
        println!("Lead over runner-up: {spread:.2} points");
    }
}

fn write_reports(report: &ComparisonReport, output: &Path, formats: &[String]) -> Result<()> {
    let stem = format!("{}-report", report.task.id);

    for fmt in formats {
        match fmt.as_str() {
            "md" | "markdown" => {
                let path = output.join(format!("{stem}.md"));
                write_markdown_report(report, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => {
                eprintln!("Unknown format: {other}");
            }
        }
    }
    Ok(())
}

pub fn execute(task_path: PathBuf, output: PathBuf, format: String) -> Result<()> {
    let tasks = parser::load_tasks(&task_path)?;
    anyhow::ensure!(!tasks.is_empty(), "no tasks found in {}", task_path.display());

    let formats = parse_formats(&format);

    for task in &tasks {
        let report = analyze_task(task);
        if report.analyses.is_empty() {
            eprintln!("Warning: task '{}' has no readable summaries", task.id);
            continue;
        }
        print_summary(&report);
        write_reports(&report, &output, &formats)?;
    }

    Ok(())
}
