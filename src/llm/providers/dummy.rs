//! Offline provider with a scripted reply.
//!
//! Selected with `[llm] default = "dummy"` for local runs without an API key,
//! and used by tests to stand in for the real model. Every call is recorded
//! so callers can assert what was sent, or that nothing was.

use std::sync::{Arc, Mutex};

use crate::llm::ProviderError;

const CANNED_REPLY: &str = r#"Based on the information provided, here is my assessment:
{
  "conditions": [
    { "name": "Common cold", "rank": 1, "confidence": "medium", "rationale": "Offline placeholder answer." }
  ],
  "recommendations": ["Rest", "Stay hydrated", "See a doctor if symptoms worsen"],
  "triage": "Non-urgent: self-care is usually sufficient.",
  "disclaimer": "This information is for educational purposes only and is not a substitute for professional medical advice.",
  "notes": "Generated by the offline dummy provider."
}"#;

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct DummyProvider {
    script: Script,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Default for DummyProvider {
    fn default() -> Self {
        Self::replying(CANNED_REPLY)
    }
}

impl DummyProvider {
    /// Answer every call with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self { script: Script::Reply(text.into()), calls: Arc::default() }
    }

    /// Fail every call with `ProviderError::Request(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { script: Script::Fail(message.into()), calls: Arc::default() }
    }

    /// Calls seen so far, shared across clones.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub async fn generate(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall { system: system.to_string(), user: user.to_string() });
        }
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(message) => Err(ProviderError::Request(message.clone())),
        }
    }
}
