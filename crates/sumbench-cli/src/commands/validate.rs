//! The `sumbench validate` command.

use std::path::PathBuf;

use anyhow::Result;

use sumbench_core::parser::{load_tasks, validate_task};

pub fn execute(task_path: PathBuf) -> Result<()> {
    let tasks = load_tasks(&task_path)?;
    anyhow::ensure!(!tasks.is_empty(), "no tasks found in {}", task_path.display());

    let mut total_warnings = 0;

    for task in &tasks {
        println!(
            "Task: {} ({} summaries, {} key elements)",
            task.name,
            task.summaries.len(),
            task.key_elements.len()
        );

        let warnings = validate_task(task);
        for w in &warnings {
            let prefix = w
                .model
                .as_ref()
                .map(|m| format!("  [{m}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All tasks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
