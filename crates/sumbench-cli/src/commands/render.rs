//! The `sumbench render` command.

use std::path::PathBuf;

use anyhow::Result;

use sumbench_core::report::ComparisonReport;
use sumbench_report::{write_html_report, write_markdown_report};

pub fn execute(report_path: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let report = ComparisonReport::load_json(&report_path)?;

    let extension = match format.as_str() {
        "md" | "markdown" => "md",
        "html" => "html",
        other => anyhow::bail!("unknown format '{other}' (expected md or html)"),
    };
    let path = output.unwrap_or_else(|| report_path.with_extension(extension));

    if extension == "md" {
        write_markdown_report(&report, &path)?;
    } else {
        write_html_report(&report, &path)?;
    }

    println!("Rendered {} model(s) to {}", report.analyses.len(), path.display());
    Ok(())
}
