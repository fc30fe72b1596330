//! Groq API provider (OpenAI-compatible chat completions).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sumbench_core::model::TokenUsage;
use sumbench_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, DEFAULT_SYSTEM_PROMPT,
};

use crate::http::{build_client, check_status, parse_json, send_error, DEFAULT_TIMEOUT};

const DEFAULT_BASE_URL: &str = "https://api.groq.com";

/// Groq provider speaking the OpenAI chat-completions protocol.
pub struct GroqProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Replace the request timeout (120s by default).
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let body = ChatRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/openai/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        let response = check_status(response, &request.model, error_message).await?;
        let api_response: ChatResponse = parse_json(response).await?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let (input_rate, output_rate) = self
            .available_models()
            .iter()
            .find(|m| m.id == request.model)
            .map(|m| (m.cost_per_1k_input, m.cost_per_1k_output))
            .unwrap_or((0.0, 0.0));
        let estimated_cost = (api_response.usage.prompt_tokens as f64 * input_rate
            + api_response.usage.completion_tokens as f64 * output_rate)
            / 1000.0;

        tracing::debug!(latency_ms, tokens = api_response.usage.total_tokens, "groq response");

        Ok(GenerateResponse {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens: api_response.usage.prompt_tokens,
                completion_tokens: api_response.usage.completion_tokens,
                total_tokens: api_response.usage.total_tokens,
                estimated_cost_usd: estimated_cost,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "llama3-8b-8192".into(),
                name: "Llama 3 8B".into(),
                provider: "groq".into(),
                max_context: 8_192,
                cost_per_1k_input: 0.00005,
                cost_per_1k_output: 0.00008,
            },
            ModelInfo {
                id: "llama3-70b-8192".into(),
                name: "Llama 3 70B".into(),
                provider: "groq".into(),
                max_context: 8_192,
                cost_per_1k_input: 0.00059,
                cost_per_1k_output: 0.00079,
            },
            ModelInfo {
                id: "llama-3.1-8b-instant".into(),
                name: "Llama 3.1 8B Instant".into(),
                provider: "groq".into(),
                max_context: 131_072,
                cost_per_1k_input: 0.00005,
                cost_per_1k_output: 0.00008,
            },
        ]
    }
}
