//! The `sumbench check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use sumbench_core::report::{check_tables, parse_markdown_tables};

pub fn execute(report_path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&report_path)
        .with_context(|| format!("failed to read report: {}", report_path.display()))?;
    let parsed = parse_markdown_tables(&content)
        .with_context(|| format!("invalid report: {}", report_path.display()))?;

    let issues = check_tables(&parsed);
    if issues.is_empty() {
        println!("OK: {} model(s) consistent", parsed.rows.len());
        return Ok(());
    }

    for issue in &issues {
        println!("  [{}] {}", issue.model, issue.message);
    }
    println!("\n{} issue(s) found.", issues.len());
    std::process::exit(1);
}
