//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory, called once at startup.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct the configured `LlmProvider`.
///
/// `api_key` comes from `LLM_API_KEY` (never TOML). It is not required here:
/// an endpoint that needs one rejects the first request instead.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::default())),
        "openai" | "openai-compatible" => {
            let p = openai_compatible::OpenAiCompatibleProvider::new(&config.openai, api_key)?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
