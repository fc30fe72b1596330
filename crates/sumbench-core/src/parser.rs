//! TOML task parser.
//!
//! Loads summarization tasks from TOML files and directories, and validates
//! them. Relative paths inside a task file resolve against the file's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::metrics::word_count;
use crate::model::{MetricWeights, PromptConstraints, SummaryMarkers, SummarySource, SummaryTask};

/// Intermediate TOML structure for parsing task files.
#[derive(Debug, Deserialize)]
struct TomlTaskFile {
    task: TomlTaskHeader,
    #[serde(default)]
    summaries: Vec<TomlSummary>,
}

#[derive(Debug, Deserialize)]
struct TomlTaskHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    article: Option<PathBuf>,
    #[serde(default)]
    source_word_count: Option<usize>,
    #[serde(default)]
    key_elements: Vec<String>,
    #[serde(default)]
    source_facts: Vec<String>,
    #[serde(default)]
    constraints: Option<PromptConstraints>,
    #[serde(default)]
    markers: Option<SummaryMarkers>,
    #[serde(default)]
    weights: Option<MetricWeights>,
}

#[derive(Debug, Deserialize)]
struct TomlSummary {
    model: String,
    path: PathBuf,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    provider_model: Option<String>,
}

/// Parse a single TOML file into a `SummaryTask`.
pub fn parse_task(path: &Path) -> Result<SummaryTask> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read task file: {}", path.display()))?;

    parse_task_str(&content, path)
}

/// Parse a TOML string into a `SummaryTask` (useful for testing).
pub fn parse_task_str(content: &str, source_path: &Path) -> Result<SummaryTask> {
    let parsed: TomlTaskFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let base = source_path.parent().unwrap_or_else(|| Path::new(""));
    let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

    let header = parsed.task;
    if let Some(weights) = &header.weights {
        weights.validate().map_err(|e| {
            anyhow::anyhow!("invalid [task.weights] in {}: {e}", source_path.display())
        })?;
    }
    let article = header.article.map(resolve);

    let source_word_count = match (header.source_word_count, &article) {
        (Some(count), _) => Some(count),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(text) => Some(word_count(&text)),
            Err(e) => {
                tracing::warn!("cannot count words in {}: {e}", path.display());
                None
            }
        },
        (None, None) => None,
    };

    let summaries = parsed
        .summaries
        .into_iter()
        .map(|s| SummarySource {
            model: s.model,
            path: resolve(s.path),
            provider: s.provider,
            provider_model: s.provider_model,
        })
        .collect();

    Ok(SummaryTask {
        id: header.id,
        name: header.name,
        description: header.description,
        article,
        source_word_count,
        constraints: header.constraints.unwrap_or_default(),
        key_elements: header.key_elements,
        source_facts: header.source_facts,
        markers: header.markers.unwrap_or_default(),
        weights: header.weights,
        summaries,
    })
}

/// Recursively load all `.toml` task files from a directory.
pub fn load_task_directory(dir: &Path) -> Result<Vec<SummaryTask>> {
    let mut tasks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            tasks.extend(load_task_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_task(&path) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(tasks)
}

/// Load one task file, or every task in a directory.
pub fn load_tasks(path: &Path) -> Result<Vec<SummaryTask>> {
    if path.is_dir() {
        load_task_directory(path)
    } else {
        Ok(vec![parse_task(path)?])
    }
}

/// A warning from task validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The model the warning concerns, if any.
    pub model: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn task(message: impl Into<String>) -> Self {
        Self {
            model: None,
            message: message.into(),
        }
    }

    fn model(model: &str, message: impl Into<String>) -> Self {
        Self {
            model: Some(model.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a task for common issues.
pub fn validate_task(task: &SummaryTask) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if task.constraints.min_words > task.constraints.max_words {
        warnings.push(ValidationWarning::task(format!(
            "min_words ({}) is greater than max_words ({})",
            task.constraints.min_words, task.constraints.max_words
        )));
    }

    if task.key_elements.is_empty() {
        warnings.push(ValidationWarning::task(
            "key_elements is empty; coverage will score 0",
        ));
    }

    if let Some(article) = &task.article {
        if !article.exists() {
            warnings.push(ValidationWarning::task(format!(
                "article not found: {}",
                article.display()
            )));
        }
    }

    if task.summaries.is_empty() {
        warnings.push(ValidationWarning::task("no summaries listed"));
    }

    let mut seen = std::collections::HashSet::new();
    for summary in &task.summaries {
        if !seen.insert(summary.model.as_str()) {
            warnings.push(ValidationWarning::model(
                &summary.model,
                format!("duplicate model: {}", summary.model),
            ));
        }
        if !summary.path.exists() {
            warnings.push(ValidationWarning::model(
                &summary.model,
                format!("summary file not found: {}", summary.path.display()),
            ));
        }
    }

    warnings
}
