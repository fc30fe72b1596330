//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use sumbench_core::model::{Metric, ReportRow};
use sumbench_core::report::ComparisonReport;
use sumbench_core::statistics::metric_summaries;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn metric_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Faithfulness => "Faithfulness",
        Metric::Coverage => "Coverage",
        Metric::PromptAdherence => "Prompt Adherence",
        Metric::Coherence => "Coherence",
        Metric::Compression => "Compression",
    }
}

fn score_class(score: f64) -> &'static str {
    if score >= 80.0 {
        "good"
    } else if score >= 50.0 {
        "fair"
    } else {
        "poor"
    }
}

/// Generate an HTML report from a comparison report.
pub fn generate_html(report: &ComparisonReport) -> String {
    let rows = report.rows();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(
        html,
        "<title>sumbench report: {}</title>",
        html_escape(&report.task.name)
    );
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>LLM Summarization Comparison</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">Task: <strong>{}</strong> | {} models | {} source words | {}</p>",
        html_escape(&report.task.name),
        rows.len(),
        report.task.source_words,
        report.created_at.format("%d.%m.%Y %H:%M UTC")
    );
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Model</th><th>Overall</th><th>Words</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for row in &rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td class=\"{}\">{:.2}</td><td>{}</td></tr>",
            html_escape(&row.model),
            score_class(row.overall),
            row.overall,
            row.word_count
        );
    }
    html.push_str("</tbody></table>\n");

    if !rows.is_empty() {
        html.push_str(&generate_bar_chart(&rows));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Detailed Metrics</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n<thead><tr>");
    html.push_str("<th onclick=\"sortTable(0)\">Model</th>");
    for (i, metric) in Metric::ALL.iter().enumerate() {
        let _ = write!(
            html,
            "<th onclick=\"sortTable({})\">{}</th>",
            i + 1,
            metric_label(*metric)
        );
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &rows {
        let _ = write!(html, "<tr><td>{}</td>", html_escape(&row.model));
        for (_, value) in row.metrics.iter() {
            let _ = write!(html, "<td class=\"{}\">{value:.1}</td>", score_class(value));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");

    let summaries = metric_summaries(&report.analyses);
    if !summaries.is_empty() {
        html.push_str("<h2>Metric Distribution</h2>\n");
        html.push_str("<table class=\"distribution\">\n");
        html.push_str("<thead><tr><th>Metric</th><th>Mean</th><th>Min</th><th>Max</th>");
        html.push_str("</tr></thead>\n");
        html.push_str("<tbody>\n");
        for metric in Metric::ALL {
            if let Some(s) = summaries.get(&metric) {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr>",
                    metric_label(metric),
                    s.mean,
                    s.min,
                    s.max
                );
            }
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ComparisonReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Horizontal bar per model, scaled to an overall score of 100.
fn generate_bar_chart(rows: &[ReportRow]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = rows.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, row) in rows.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let score = row.overall.clamp(0.0, 100.0);
        let width = (score / 100.0 * max_width as f64) as usize;

        let color = match score_class(score) {
            "good" => "#22c55e",
            "fair" => "#eab308",
            _ => "#ef4444",
        };

        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&row.model)
        );
        let _ = writeln!(
            svg,
            "  <rect x=\"{label_width}\" y=\"{y}\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>"
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.2}</text>",
            label_width + width + 8,
            y + bar_height / 2,
            row.overall
        );
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --good: #dcfce7; --fair: #fef9c3; --poor: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --good: #064e3b; --fair: #713f12; --poor: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.good { background: var(--good); }
.fair { background: var(--fair); }
.poor { background: var(--poor); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
