//! The `sumbench summarize` command.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use sumbench_core::engine::{ModelSpec, ProgressReporter, SummaryEngine};
use sumbench_core::model::{SummaryRecord, SummaryTask};
use sumbench_core::parser;
use sumbench_core::traits::LlmProvider;
use sumbench_providers::config::{load_config_from, SumbenchConfig, GROQ_KEY_ENV};
use sumbench_providers::create_provider;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_start(&self, label: &str, model: &str) {
        eprintln!("  Starting: {label} ({model})");
    }

    fn on_complete(&self, record: &SummaryRecord) {
        eprintln!(
            "  Done: {} [{} words, {} tokens, ${:.4}] ({}ms)",
            record.model,
            record.word_count,
            record.token_usage.total_tokens,
            record.token_usage.estimated_cost_usd,
            record.latency_ms,
        );
    }

    fn on_error(&self, label: &str, error: &str) {
        eprintln!("  ERROR: {label}: {error}");
    }

    fn on_finish(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} succeeded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

/// File-name stem for a model label: lowercase letters and digits, anything
/// else becomes `_`.
pub fn slug(label: &str) -> String {
    let slug: String = label
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec!['_']
            }
        })
        .collect();
    slug.trim_matches('_').to_string()
}

/// Output stem per model label. Falls back to the provider model id when the
/// label has no usable characters; two labels sharing a stem is an error.
fn output_stems(models: &[ModelSpec]) -> Result<HashMap<String, String>> {
    let mut stems: HashMap<String, String> = HashMap::new();
    let mut owners: HashMap<String, &str> = HashMap::new();

    for spec in models {
        let mut stem = slug(&spec.label);
        if stem.is_empty() {
            stem = slug(&spec.model);
        }
        anyhow::ensure!(
            !stem.is_empty(),
            "model '{}' has no characters usable in a file name",
            spec.label
        );
        if let Some(owner) = owners.get(stem.as_str()) {
            anyhow::bail!(
                "models '{owner}' and '{}' would both write {stem}_result.json; rename one",
                spec.label
            );
        }
        owners.insert(stem.clone(), &spec.label);
        stems.insert(spec.label.clone(), stem);
    }

    Ok(stems)
}

/// Models from `--models`, else the task's summaries that name a provider
/// model, else the configured default.
fn resolve_models(
    models_str: Option<&str>,
    task: &SummaryTask,
    config: &SumbenchConfig,
) -> Vec<ModelSpec> {
    if let Some(list) = models_str {
        return list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| ModelSpec::parse(s, &config.default_provider))
            .collect();
    }

    let from_task: Vec<ModelSpec> = task
        .summaries
        .iter()
        .filter_map(|s| {
            let model = s.provider_model.as_ref()?;
            Some(ModelSpec {
                provider: s
                    .provider
                    .clone()
                    .unwrap_or_else(|| config.default_provider.clone()),
                model: model.clone(),
                label: s.model.clone(),
            })
        })
        .collect();
    if !from_task.is_empty() {
        return from_task;
    }

    vec![ModelSpec::parse(&config.default_model, &config.default_provider)]
}

fn write_record(output: &Path, stem: &str, record: &SummaryRecord) -> Result<()> {
    let json_path = output.join(format!("{stem}_result.json"));
    let text_path = output.join(format!("{stem}_summary.txt"));

    let json = serde_json::to_string_pretty(record).context("failed to serialize summary")?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("failed to write {}", json_path.display()))?;
    std::fs::write(&text_path, format!("{}\n", record.summary))
        .with_context(|| format!("failed to write {}", text_path.display()))?;

    eprintln!("  Saved: {}", json_path.display());
    Ok(())
}

pub async fn execute(
    task_path: PathBuf,
    models_str: Option<String>,
    parallelism: Option<usize>,
    temperature: Option<f64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut engine_config = config.engine_config();
    if let Some(p) = parallelism {
        anyhow::ensure!(p >= 1, "parallelism must be at least 1");
        engine_config.parallelism = p;
    }
    if let Some(t) = temperature {
        anyhow::ensure!((0.0..=2.0).contains(&t), "temperature must be between 0.0 and 2.0");
        engine_config.temperature = t;
    }
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let task = parser::parse_task(&task_path)?;
    let article_path = task
        .article
        .as_ref()
        .with_context(|| format!("task '{}' names no article to summarize", task.id))?;
    let article = std::fs::read_to_string(article_path)
        .with_context(|| format!("failed to read article: {}", article_path.display()))?;

    let models = resolve_models(models_str.as_deref(), &task, &config);
    anyhow::ensure!(!models.is_empty(), "no models to run");
    let stems = output_stems(&models)?;

    if models.iter().any(|m| m.provider == "groq")
        && std::env::var(GROQ_KEY_ENV).map_or(true, |k| k.is_empty())
    {
        eprintln!("Warning: {GROQ_KEY_ENV} is not set; groq requests rely on sumbench.toml.");
    }

    let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
    for spec in &models {
        if providers.contains_key(&spec.provider) {
            continue;
        }
        let Some(pconfig) = config.providers.get(&spec.provider) else {
            anyhow::bail!(
                "provider '{}' not found in config. Available: {:?}",
                spec.provider,
                config.providers.keys().collect::<Vec<_>>()
            );
        };
        let provider = create_provider(&spec.provider, pconfig)?;
        providers.insert(spec.provider.clone(), Arc::from(provider));
    }

    eprintln!(
        "sumbench v{}: summarizing '{}' with {} model(s)\n",
        env!("CARGO_PKG_VERSION"),
        task.name,
        models.len()
    );

    let engine = SummaryEngine::new(providers, engine_config);
    let run = engine
        .run(&article, &task.constraints, &models, &ConsoleReporter)
        .await?;

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    for record in &run.records {
        let stem = stems
            .get(&record.model)
            .with_context(|| format!("no output name for model '{}'", record.model))?;
        write_record(&output, stem, record)?;
    }

    if run.records.is_empty() {
        anyhow::bail!("every model failed ({} failure(s))", run.failures.len());
    }

    Ok(())
}
