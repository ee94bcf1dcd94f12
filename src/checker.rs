//! Symptom-check pipeline.
//!
//! ```text
//! validate ─► emergency filter ──match──────────────────────┐
//!                    │ no match                              ▼
//!                    └─► LLM generate ─► extract ─► conform ─► persist ─► reply
//! ```
//!
//! Persistence is best-effort: its error travels back in
//! [`CheckOutcome::persist_error`] for the caller to log and never turns a
//! successful check into a failed one.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::emergency;
use crate::extract::{self, ExtractError};
use crate::llm::{LlmProvider, ProviderError};
use crate::models::SymptomQuery;
use crate::prompts::PromptStore;
use crate::store::{ConsultationRecord, ConsultationStore, StoreError};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Please describe your symptoms in detail.")]
    InvalidInput,
    #[error("LLM error: {0}")]
    LlmFailure(#[source] ProviderError),
    #[error("{0}")]
    ParseFailure(#[from] ExtractError),
}

/// A successful check.
#[derive(Debug)]
pub struct CheckOutcome {
    /// Response body for the caller.
    pub body: Value,
    /// `true` when the emergency filter answered and the LLM was skipped.
    pub emergency: bool,
    /// Set when the consultation could not be persisted.
    pub persist_error: Option<StoreError>,
}

/// Request orchestrator. Built once at startup; every field is immutable.
#[derive(Debug, Clone)]
pub struct SymptomChecker {
    prompts: Arc<PromptStore>,
    provider: LlmProvider,
    store: ConsultationStore,
    strict_schema: bool,
}

impl SymptomChecker {
    pub fn new(
        prompts: Arc<PromptStore>,
        provider: LlmProvider,
        store: ConsultationStore,
        strict_schema: bool,
    ) -> Self {
        Self { prompts, provider, store, strict_schema }
    }

    pub async fn check(&self, query: &SymptomQuery) -> Result<CheckOutcome, CheckError> {
        let symptoms = query.valid_symptoms().ok_or(CheckError::InvalidInput)?;

        if emergency::is_emergency(symptoms) {
            info!(
                keywords = ?emergency::matched_keywords(symptoms),
                "emergency keyword detected, skipping LLM"
            );
            // Strings and vectors only: serialisation cannot fail.
            let body = serde_json::to_value(emergency::emergency_response()).unwrap_or_default();
            let persist_error = self.persist(symptoms, &body).await;
            return Ok(CheckOutcome { body, emergency: true, persist_error });
        }

        let user_prompt = self.prompts.render_query(query);
        let raw = self
            .provider
            .generate(self.prompts.system(), &user_prompt)
            .await
            .map_err(|e| {
                warn!(provider = self.provider.name(), error = %e, "LLM call failed");
                CheckError::LlmFailure(e)
            })?;

        let parsed = extract::extract(&raw).and_then(|value| {
            if self.strict_schema { extract::conform(value) } else { Ok(value) }
        });
        let body = parsed.map_err(|e| {
            warn!(error = %e, raw_len = raw.len(), "could not use LLM reply");
            debug!(raw = %raw, "unusable LLM reply");
            CheckError::ParseFailure(e)
        })?;

        let persist_error = self.persist(symptoms, &body).await;
        Ok(CheckOutcome { body, emergency: false, persist_error })
    }

    async fn persist(&self, symptoms: &str, body: &Value) -> Option<StoreError> {
        let record = ConsultationRecord::now(symptoms, body.clone());
        self.store.record_async(record).await.err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use serde_json::json;
    use tempfile::TempDir;

    const REPLY: &str = r#"Here is the result: {"conditions":[{"name":"Tension headache","rank":1,"confidence":"medium"}],"recommendations":["Rest","Hydrate"],"triage":"Non-urgent","disclaimer":"Educational only"}"#;

    fn prompts() -> Arc<PromptStore> {
        Arc::new(PromptStore::from_parts(
            "SYSTEM",
            "Symptoms: {{symptoms}}\nAge: {{age}}\nSex: {{sex}}\nDuration: {{duration}}",
        ))
    }

    fn checker(dummy: &DummyProvider, dir: &TempDir, strict: bool) -> SymptomChecker {
        SymptomChecker::new(
            prompts(),
            LlmProvider::Dummy(dummy.clone()),
            ConsultationStore::new(dir.path().join("c.db")),
            strict,
        )
    }

    fn query(symptoms: &str) -> SymptomQuery {
        SymptomQuery { symptoms: Some(symptoms.into()), ..Default::default() }
    }

    #[tokio::test]
    async fn short_input_is_rejected_before_llm() {
        let dir = TempDir::new().unwrap();
        let dummy = DummyProvider::replying(REPLY);
        let c = checker(&dummy, &dir, true);
        for q in [query("  "), query("ok"), SymptomQuery::default()] {
            assert!(matches!(c.check(&q).await, Err(CheckError::InvalidInput)));
        }
        assert!(dummy.calls().is_empty());
    }

    #[tokio::test]
    async fn emergency_skips_llm() {
        let dir = TempDir::new().unwrap();
        let dummy = DummyProvider::replying(REPLY);
        let c = checker(&dummy, &dir, true);
        let out = c.check(&query("Crushing CHEST PAIN and sweating")).await.unwrap();
        assert!(out.emergency);
        assert_eq!(out.body["conditions"], json!([]));
        assert!(out.body["triage"].as_str().unwrap().starts_with(emergency::EMERGENCY_MARKER));
        assert!(out.persist_error.is_none());
        assert!(dummy.calls().is_empty());
    }

    #[tokio::test]
    async fn normal_path_returns_parsed_object() {
        let dir = TempDir::new().unwrap();
        let dummy = DummyProvider::replying(REPLY);
        let c = checker(&dummy, &dir, true);
        let q = SymptomQuery { age: Some(30), ..query("I have a mild headache") };
        let out = c.check(&q).await.unwrap();

        let expected: Value = serde_json::from_str(&REPLY[REPLY.find('{').unwrap()..]).unwrap();
        assert_eq!(out.body, expected);
        assert!(!out.emergency);

        let calls = dummy.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, "SYSTEM");
        assert!(calls[0].user.contains("I have a mild headache"));
        assert!(calls[0].user.contains("Age: 30"));
        assert!(calls[0].user.contains("Sex: unknown"));
        assert!(calls[0].user.contains("Duration: unknown"));
    }

    #[tokio::test]
    async fn provider_failure_is_llm_failure() {
        let dir = TempDir::new().unwrap();
        let dummy = DummyProvider::failing("HTTP 503: overloaded");
        let err = checker(&dummy, &dir, true).check(&query("dry cough")).await.unwrap_err();
        assert!(matches!(err, CheckError::LlmFailure(_)));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn extraction_failures_stay_distinguishable() {
        let dir = TempDir::new().unwrap();

        let no_json = DummyProvider::replying("Sorry, I cannot answer that.");
        let err = checker(&no_json, &dir, true).check(&query("dry cough")).await.unwrap_err();
        assert!(matches!(err, CheckError::ParseFailure(ExtractError::NoJson)));

        let bad_json = DummyProvider::replying("{ conditions: [] }");
        let err = checker(&bad_json, &dir, true).check(&query("dry cough")).await.unwrap_err();
        assert!(matches!(err, CheckError::ParseFailure(ExtractError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn strict_schema_toggle() {
        let dir = TempDir::new().unwrap();
        let dummy = DummyProvider::replying(r#"{"diagnosis":"flu"}"#);

        let err = checker(&dummy, &dir, true).check(&query("fever")).await.unwrap_err();
        assert!(matches!(err, CheckError::ParseFailure(ExtractError::SchemaMismatch(_))));

        let out = checker(&dummy, &dir, false).check(&query("fever")).await.unwrap();
        assert_eq!(out.body, json!({ "diagnosis": "flu" }));
    }

    #[tokio::test]
    async fn persistence_failure_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocker"), b"x").unwrap();
        let dummy = DummyProvider::replying(REPLY);
        let c = SymptomChecker::new(
            prompts(),
            LlmProvider::Dummy(dummy),
            ConsultationStore::new(dir.path().join("blocker/c.db")),
            true,
        );
        let out = c.check(&query("mild headache")).await.unwrap();
        assert!(out.persist_error.is_some());
        assert_eq!(out.body["triage"], "Non-urgent");
    }
}
