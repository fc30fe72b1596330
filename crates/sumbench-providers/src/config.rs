//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sumbench_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::groq::GroqProvider;
use crate::mock::MockProvider;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SUMBENCH_CONFIG";
pub const GROQ_KEY_ENV: &str = "GROQ_API_KEY";
pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Configuration for a single LLM provider.
///
/// Debug output masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Groq {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        /// Request timeout in seconds.
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        /// Request timeout in seconds.
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    Mock {
        #[serde(default)]
        response: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Groq {
                api_key: _,
                base_url,
                timeout_secs,
            } => f
                .debug_struct("Groq")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
                timeout_secs,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            ProviderConfig::Mock { response } => f
                .debug_struct("Mock")
                .field("response", response)
                .finish(),
        }
    }
}

/// Top-level sumbench configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SumbenchConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature; 0.0 keeps comparisons deterministic.
    #[serde(default)]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Max retries on transient provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Base delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Max concurrent summarization requests.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "groq".to_string()
}
fn default_model() -> String {
    "llama3-8b-8192".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./sumbench-results")
}

impl Default for SumbenchConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: 0.0,
            max_tokens: default_max_tokens(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

impl SumbenchConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> sumbench_core::engine::SummaryEngineConfig {
        sumbench_core::engine::SummaryEngineConfig {
            parallelism: self.parallelism.max(1),
            temperature: self.default_temperature,
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
            retry_delay: std::time::Duration::from_millis(self.retry_delay_ms),
            system_prompt_override: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Groq {
            api_key,
            base_url,
            timeout_secs,
        } => ProviderConfig::Groq {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            timeout_secs: *timeout_secs,
        },
        ProviderConfig::Anthropic {
            api_key,
            base_url,
            timeout_secs,
        } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            timeout_secs: *timeout_secs,
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `$SUMBENCH_CONFIG`, if set
/// 2. `sumbench.toml` in the current directory
/// 3. `~/.config/sumbench/config.toml`
///
/// `GROQ_API_KEY` and `ANTHROPIC_API_KEY` override keys from the file.
pub fn load_config() -> Result<SumbenchConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SumbenchConfig> {
    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let config_path = match explicit {
        Some(p) if p.exists() => Some(p),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("sumbench.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config_file(&path)?
        }
        None => SumbenchConfig::default(),
    };

    apply_env_overrides(&mut config);

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<SumbenchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<SumbenchConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_env_overrides(config: &mut SumbenchConfig) {
    if let Ok(key) = std::env::var(GROQ_KEY_ENV) {
        if !key.is_empty() {
            match config.providers.get_mut("groq") {
                Some(ProviderConfig::Groq { api_key, .. }) => *api_key = key,
                _ => {
                    config.providers.insert(
                        "groq".into(),
                        ProviderConfig::Groq {
                            api_key: key,
                            base_url: None,
                            timeout_secs: None,
                        },
                    );
                }
            }
        }
    }

    if let Ok(key) = std::env::var(ANTHROPIC_KEY_ENV) {
        if !key.is_empty() {
            match config.providers.get_mut("anthropic") {
                Some(ProviderConfig::Anthropic { api_key, .. }) => *api_key = key,
                _ => {
                    config.providers.insert(
                        "anthropic".into(),
                        ProviderConfig::Anthropic {
                            api_key: key,
                            base_url: None,
                            timeout_secs: None,
                        },
                    );
                }
            }
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("sumbench"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::Groq {
            api_key,
            base_url,
            timeout_secs,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("provider '{name}' has no API key (set {GROQ_KEY_ENV})");
            }
            let mut provider = GroqProvider::new(api_key, base_url.clone())?;
            if let Some(secs) = timeout_secs {
                provider = provider.with_timeout(Duration::from_secs(*secs))?;
            }
            Ok(Box::new(provider))
        }
        ProviderConfig::Anthropic {
            api_key,
            base_url,
            timeout_secs,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("provider '{name}' has no API key (set {ANTHROPIC_KEY_ENV})");
            }
            let mut provider = AnthropicProvider::new(api_key, base_url.clone())?;
            if let Some(secs) = timeout_secs {
                provider = provider.with_timeout(Duration::from_secs(*secs))?;
            }
            Ok(Box::new(provider))
        }
        ProviderConfig::Mock { response } => Ok(Box::new(match response {
            Some(text) => MockProvider::with_fixed_response(text),
            None => MockProvider::default(),
        })),
    }
}
