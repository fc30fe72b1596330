//! The `sumbench stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Line, word and character counts of a text.
#[derive(Debug, PartialEq, Eq)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub characters: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.lines().count(),
            words: sumbench_core::metrics::word_count(text),
            characters: text.chars().count(),
        }
    }
}

pub fn execute(report_path: PathBuf) -> Result<()> {
    anyhow::ensure!(
        report_path.is_file(),
        "report not found: {}",
        report_path.display()
    );
    let content = std::fs::read_to_string(&report_path)
        .with_context(|| format!("failed to read report: {}", report_path.display()))?;

    let stats = TextStats::of(&content);
    println!("Report: {}", report_path.display());
    println!("Lines: {}", stats.lines);
    println!("Words: {}", stats.words);
    println!("Characters: {}", stats.characters);

    Ok(())
}
