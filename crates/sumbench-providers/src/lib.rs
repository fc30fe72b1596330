//! sumbench-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Groq and Anthropic, plus a mock
//! backend for tests and offline runs.

pub mod anthropic;
pub mod config;
pub mod groq;
mod http;
pub mod mock;

pub use config::{create_provider, load_config, ProviderConfig, SumbenchConfig};
pub use sumbench_core::error::ProviderError;
