//! LLM gateway.
//!
//! `LlmProvider` is an enum over concrete backends. Each backend exposes one
//! round-trip: a system prompt and a user prompt in, the first completion's
//! raw text out. No retries: a failed call is reported to the caller as-is.
//!
//! Provider instances are immutable after startup and cheap to clone.

pub mod providers;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("LLM call failed: {0}")]
    Request(String),
}

/// All available provider backends.
///
/// Enum dispatch keeps `generate` a plain `async fn` without trait objects.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// Send both prompts and return the model's raw reply text.
    pub async fn generate(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.generate(system, user).await,
            LlmProvider::Dummy(p) => p.generate(system, user).await,
        }
    }

    /// Short backend name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAiCompatible(_) => "openai",
            LlmProvider::Dummy(_) => "dummy",
        }
    }
}
