//! The `sumbench compare` command.

use std::path::PathBuf;

use anyhow::Result;

use sumbench_core::report::ComparisonReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = ComparisonReport::load_json(&baseline_path)?;
    let current = ComparisonReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {}: {:.2} -> {:.2} ({:+.2})",
                        r.model, r.baseline_score, r.current_score, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {}: {:.2} -> {:.2} ({:+.2})",
                        i.model, i.baseline_score, i.current_score, i.delta
                    );
                }
            }

            if report.new_models > 0 {
                println!("\n{} new model(s)", report.new_models);
            }
            if report.removed_models > 0 {
                println!("{} removed model(s)", report.removed_models);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
