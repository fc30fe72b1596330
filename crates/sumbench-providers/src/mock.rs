//! Mock provider for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sumbench_core::model::TokenUsage;
use sumbench_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo};

const DEFAULT_RESPONSE: &str = "1. The source describes its main topic. \
2. It lists supporting figures. 3. It closes with an outlook.";

/// A mock LLM provider that never touches the network.
///
/// Responses are chosen by model identifier first, then by prompt substring,
/// then fall back to a default.
pub struct MockProvider {
    /// Map of model id → response text.
    by_model: HashMap<String, String>,
    /// Map of prompt substring → response text.
    by_prompt: HashMap<String, String>,
    /// Default response if nothing matches.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock with the given prompt-substring → response mappings.
    pub fn new(by_prompt: HashMap<String, String>) -> Self {
        Self {
            by_model: HashMap::new(),
            by_prompt,
            default_response: DEFAULT_RESPONSE.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock that answers per model id.
    pub fn with_model_responses(by_model: HashMap<String, String>) -> Self {
        Self {
            by_model,
            ..Self::new(HashMap::new())
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let content = self
            .by_model
            .get(&request.model)
            .or_else(|| {
                self.by_prompt
                    .iter()
                    .find(|(key, _)| request.prompt.contains(key.as_str()))
                    .map(|(_, v)| v)
            })
            .cloned()
            .unwrap_or_else(|| self.default_response.clone());

        // Rough estimate: four characters per token.
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("1. Short.");
        let response = provider.generate(&request("mock", "anything")).await.unwrap();
        assert_eq!(response.content, "1. Short.");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn model_takes_precedence_over_prompt() {
        let mut by_model = HashMap::new();
        by_model.insert("claude".to_string(), "claude summary".to_string());
        let mut provider = MockProvider::with_model_responses(by_model);
        provider
            .by_prompt
            .insert("market".to_string(), "market summary".to_string());

        let resp = provider.generate(&request("claude", "the market")).await.unwrap();
        assert_eq!(resp.content, "claude summary");

        let resp = provider.generate(&request("other", "the market")).await.unwrap();
        assert_eq!(resp.content, "market summary");

        let resp = provider.generate(&request("other", "unrelated")).await.unwrap();
        assert_eq!(resp.content, DEFAULT_RESPONSE);
        assert_eq!(provider.call_count(), 3);
    }
}
