//! LLM Provider implementations for Concierge.
//!
//! All providers implement the `concierge_core::Provider` trait.
//! `build_from_config` picks the configured backend.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use concierge_config::AppConfig;
use concierge_core::error::ProviderError;
use concierge_core::provider::Provider;
use std::sync::Arc;

/// Build the default provider from configuration.
///
/// Per-provider settings under `[providers.<name>]` win over the top-level
/// `api_key`. Only local backends may run without a key.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone());

    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .or_else(|| default_base_url(name).map(String::from))
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "unknown provider '{name}': set providers.{name}.api_url"
            ))
        })?;

    let api_key = match api_key {
        Some(key) => key,
        None if is_local(name) => name.to_string(),
        None => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key for '{name}' (set CONCIERGE_API_KEY or OPENAI_API_KEY)"
            )));
        }
    };

    tracing::debug!(provider = name, base_url = %base_url, "Provider configured");
    // The HTTP client never outlives the longest routing bound.
    let timeout_secs = config
        .routing
        .agent_timeout_secs
        .max(config.routing.classify_timeout_secs);
    Ok(Arc::new(
        OpenAiCompatProvider::new(name, base_url, api_key).with_timeout(timeout_secs),
    ))
}

/// Model to use: the provider's own default, or the global one.
pub fn resolve_model(config: &AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "openai" => Some("https://api.openai.com/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "deepseek" => Some("https://api.deepseek.com/v1"),
        "groq" => Some("https://api.groq.com/openai/v1"),
        "together" => Some("https://api.together.xyz/v1"),
        "fireworks" => Some("https://api.fireworks.ai/inference/v1"),
        "vllm" => Some("http://localhost:8000/v1"),
        "llamacpp" | "llama.cpp" => Some("http://localhost:8080/v1"),
        _ => None,
    }
}
