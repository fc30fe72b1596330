//! Summarization engine.
//!
//! Sends one source article to several models concurrently, with bounded
//! parallelism and retries on transient provider errors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::ProviderError;
use crate::metrics::word_count;
use crate::model::{PromptConstraints, SummaryRecord};
use crate::traits::{build_summary_prompt, GenerateRequest, LlmProvider};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the summarization engine.
#[derive(Debug, Clone)]
pub struct SummaryEngineConfig {
    /// Maximum concurrent provider calls.
    pub parallelism: usize,
    /// Temperature for generation.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Initial delay between retries; doubles on each attempt.
    pub retry_delay: Duration,
    /// Optional system prompt override.
    pub system_prompt_override: Option<String>,
}

impl Default for SummaryEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            temperature: 0.0,
            max_tokens: 1024,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            system_prompt_override: None,
        }
    }
}

/// Which model to ask, and the name to report it under.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    /// Provider name (e.g. "groq").
    pub provider: String,
    /// Model identifier (e.g. "llama3-8b-8192").
    pub model: String,
    /// Display name in reports (e.g. "Groq Llama3-8B").
    pub label: String,
}

impl ModelSpec {
    /// Parse `provider/model`, falling back to `default_provider` without a slash.
    pub fn parse(spec: &str, default_provider: &str) -> Self {
        let spec = spec.trim();
        let (provider, model) = match spec.split_once('/') {
            Some((p, m)) => (p.to_string(), m.to_string()),
            None => (default_provider.to_string(), spec.to_string()),
        };
        Self {
            label: model.clone(),
            provider,
            model,
        }
    }
}

/// A model that failed to produce a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFailure {
    pub model: String,
    pub error: String,
}

/// Outcome of a summarization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRun {
    /// Successful summaries, sorted by label.
    pub records: Vec<SummaryRecord>,
    pub failures: Vec<SummaryFailure>,
    pub duration_ms: u64,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_start(&self, label: &str, model: &str);
    fn on_complete(&self, record: &SummaryRecord);
    fn on_error(&self, label: &str, error: &str);
    fn on_finish(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_start(&self, _: &str, _: &str) {}
    fn on_complete(&self, _: &SummaryRecord) {}
    fn on_error(&self, _: &str, _: &str) {}
    fn on_finish(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Runs summarization requests against configured providers.
pub struct SummaryEngine {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    config: SummaryEngineConfig,
}

impl SummaryEngine {
    pub fn new(
        providers: HashMap<String, Arc<dyn LlmProvider>>,
        config: SummaryEngineConfig,
    ) -> Self {
        Self { providers, config }
    }

    /// Summarize `article` with every model in `models`.
    pub async fn run(
        &self,
        article: &str,
        constraints: &PromptConstraints,
        models: &[ModelSpec],
        progress: &dyn ProgressReporter,
    ) -> Result<SummaryRun> {
        anyhow::ensure!(self.config.parallelism >= 1, "parallelism must be at least 1");

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let prompt = build_summary_prompt(article, constraints);

        let mut failures = Vec::new();
        let mut futures = FuturesUnordered::new();

        for spec in models {
            let Some(provider) = self.providers.get(&spec.provider) else {
                tracing::warn!("provider '{}' not found, skipping {}", spec.provider, spec.label);
                failures.push(SummaryFailure {
                    model: spec.label.clone(),
                    error: format!("provider '{}' not configured", spec.provider),
                });
                continue;
            };

            let provider = Arc::clone(provider);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let spec = spec.clone();
            let request = GenerateRequest {
                model: spec.model.clone(),
                prompt: prompt.clone(),
                system_prompt: config.system_prompt_override.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            };

            progress.on_start(&spec.label, &spec.model);

            futures.push(async move {
                let result = async {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    generate_with_retry(provider.as_ref(), &request, &config).await
                }
                .await;
                (spec, result)
            });
        }

        let total = futures.len() + failures.len();
        let mut records = Vec::new();

        while let Some((spec, result)) = futures.next().await {
            match result {
                Ok(response) => {
                    let summary = response.content.trim().to_string();
                    let record = SummaryRecord {
                        model: spec.label.clone(),
                        provider: spec.provider.clone(),
                        word_count: word_count(&summary),
                        summary,
                        token_usage: response.token_usage,
                        latency_ms: response.latency_ms,
                        created_at: chrono::Utc::now(),
                    };
                    progress.on_complete(&record);
                    records.push(record);
                }
                Err(e) => {
                    tracing::error!("summarization failed for {}: {e:#}", spec.label);
                    progress.on_error(&spec.label, &e.to_string());
                    failures.push(SummaryFailure {
                        model: spec.label,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_finish(total, records.len(), failures.len(), elapsed);

        records.sort_by(|a, b| a.model.cmp(&b.model));

        Ok(SummaryRun {
            records,
            failures,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Call the provider, retrying transient errors with exponential backoff.
async fn generate_with_retry(
    provider: &dyn LlmProvider,
    request: &GenerateRequest,
    config: &SummaryEngineConfig,
) -> Result<crate::traits::GenerateResponse> {
    let mut delay = config.retry_delay;
    let mut last_error = None;

    for retry in 0..=config.max_retries {
        if retry > 0 {
            tokio::time::sleep(delay).await;
            delay = delay.saturating_mul(2).min(MAX_RETRY_DELAY);
        }

        match provider.generate(request).await {
            Ok(response) => return Ok(response),
            Err(e) => {
                if let Some(provider_err) = e.downcast_ref::<ProviderError>() {
                    if provider_err.is_permanent() {
                        return Err(e);
                    }
                    if let Some(ms) = provider_err.retry_after_ms() {
                        delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
                    }
                }
                tracing::debug!(retry, "provider {} failed: {e}", provider.name());
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TokenUsage;
    use crate::traits::{GenerateResponse, ModelInfo};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    /// Fails `failures` times with `error`, then succeeds.
    struct FlakyProvider {
        failures: u32,
        error: fn() -> ProviderError,
        calls: AtomicU32,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(failures: u32, error: fn() -> ProviderError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicU32::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err((self.error)().into());
            }
            Ok(GenerateResponse {
                content: format!(" 1. Summary by {}. ", request.model),
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 1,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn fast_config() -> SummaryEngineConfig {
        SummaryEngineConfig {
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn engine_with(provider: Arc<FlakyProvider>, config: SummaryEngineConfig) -> SummaryEngine {
        let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
        providers.insert("flaky".into(), provider);
        SummaryEngine::new(providers, config)
    }

    fn spec(model: &str) -> ModelSpec {
        ModelSpec::parse(&format!("flaky/{model}"), "groq")
    }

    #[test]
    fn model_spec_parse() {
        let s = ModelSpec::parse("groq/llama3-8b-8192", "anthropic");
        assert_eq!(s.provider, "groq");
        assert_eq!(s.model, "llama3-8b-8192");
        assert_eq!(s.label, "llama3-8b-8192");

        let s = ModelSpec::parse(" claude-3-5-sonnet ", "anthropic");
        assert_eq!(s.provider, "anthropic");
        assert_eq!(s.model, "claude-3-5-sonnet");
    }

    #[tokio::test]
    async fn retries_transient_errors() {
        let provider = Arc::new(FlakyProvider::new(2, || ProviderError::Timeout(1)));
        let engine = engine_with(Arc::clone(&provider), fast_config());

        let run = engine
            .run("article", &PromptConstraints::default(), &[spec("m1")], &NoopReporter)
            .await
            .unwrap();

        assert_eq!(run.records.len(), 1);
        assert!(run.failures.is_empty());
        assert_eq!(run.records[0].summary, "1. Summary by m1.");
        assert_eq!(run.records[0].word_count, 4);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let provider = Arc::new(FlakyProvider::new(10, || {
            ProviderError::AuthenticationFailed("bad key".into())
        }));
        let engine = engine_with(Arc::clone(&provider), fast_config());

        let run = engine
            .run("article", &PromptConstraints::default(), &[spec("m1")], &NoopReporter)
            .await
            .unwrap();

        assert!(run.records.is_empty());
        assert_eq!(run.failures.len(), 1);
        assert!(run.failures[0].error.contains("authentication failed"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let provider = Arc::new(FlakyProvider::new(100, || {
            ProviderError::NetworkError("reset".into())
        }));
        let config = SummaryEngineConfig {
            max_retries: 2,
            ..fast_config()
        };
        let engine = engine_with(Arc::clone(&provider), config);

        let run = engine
            .run("article", &PromptConstraints::default(), &[spec("m1")], &NoopReporter)
            .await
            .unwrap();

        assert_eq!(run.failures.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_retry_after_hint() {
        let provider = Arc::new(FlakyProvider::new(1, || ProviderError::RateLimited {
            retry_after_ms: 3_000,
        }));
        let engine = engine_with(Arc::clone(&provider), fast_config());

        let start = tokio::time::Instant::now();
        let run = engine
            .run("article", &PromptConstraints::default(), &[spec("m1")], &NoopReporter)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(run.records.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3_100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_hint_is_capped() {
        let provider = Arc::new(FlakyProvider::new(1, || ProviderError::RateLimited {
            retry_after_ms: u64::MAX,
        }));
        let engine = engine_with(Arc::clone(&provider), fast_config());

        let start = tokio::time::Instant::now();
        let run = engine
            .run("article", &PromptConstraints::default(), &[spec("m1")], &NoopReporter)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(run.records.len(), 1);
        assert!(elapsed >= MAX_RETRY_DELAY, "elapsed {elapsed:?}");
        assert!(elapsed < MAX_RETRY_DELAY + Duration::from_secs(1), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn respects_parallelism() {
        let provider = Arc::new(FlakyProvider::new(0, || ProviderError::Timeout(1)));
        let config = SummaryEngineConfig {
            parallelism: 2,
            ..fast_config()
        };
        let engine = engine_with(Arc::clone(&provider), config);
        let models: Vec<ModelSpec> = (0..6).map(|i| spec(&format!("m{i}"))).collect();

        let run = engine
            .run("article", &PromptConstraints::default(), &models, &NoopReporter)
            .await
            .unwrap();

        assert_eq!(run.records.len(), 6);
        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 2);
        let labels: Vec<&str> = run.records.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(labels, vec!["m0", "m1", "m2", "m3", "m4", "m5"]);
    }

    #[tokio::test]
    async fn unknown_provider_is_reported() {
        let provider = Arc::new(FlakyProvider::new(0, || ProviderError::Timeout(1)));
        let engine = engine_with(provider, fast_config());
        let models = vec![ModelSpec::parse("missing/model", "groq")];

        let run = engine
            .run("article", &PromptConstraints::default(), &models, &NoopReporter)
            .await
            .unwrap();

        assert!(run.records.is_empty());
        assert!(run.failures[0].error.contains("not configured"));
    }
}
