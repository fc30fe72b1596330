//! Core trait definitions for LLM providers.
//!
//! The async trait is implemented by the `sumbench-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{PromptConstraints, TokenUsage};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that produce text from prompts.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "groq").
    fn name(&self) -> &str;

    /// Generate a completion for a prompt.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List known models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate text from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "llama3-8b-8192").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Cost per 1K input tokens in USD.
    pub cost_per_1k_input: f64,
    /// Cost per 1K output tokens in USD.
    pub cost_per_1k_output: f64,
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Default system prompt for summarization.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a precise analyst. Summarize faithfully: do not add facts that are not in the source, keep every figure exactly as written, and use a neutral tone.";

/// Build the user prompt asking for a structured summary of `article`.
pub fn build_summary_prompt(article: &str, constraints: &PromptConstraints) -> String {
    let mut prompt = format!(
        "Summarize the article below in {} to {} words.\n",
        constraints.min_words, constraints.max_words
    );

    if !constraints.structure_markers.is_empty() {
        prompt.push_str(&format!(
            "Structure the summary as {} numbered points ({}), one key idea per point.\n",
            constraints.structure_markers.len(),
            constraints.structure_markers.join(" ")
        ));
    }

    prompt.push_str("Keep names, figures, and dates from the source. Use a neutral tone.\n");
    prompt.push_str("Respond with the summary only.\n\nArticle:\n");
    prompt.push_str(article.trim());
    prompt
}
