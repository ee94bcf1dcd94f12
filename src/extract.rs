//! Pull the JSON answer out of free-text model output.
//!
//! The model is asked for JSON only but often wraps it in prose. [`extract`]
//! takes the span from the first `{` to the last `}` (across newlines) and
//! parses it. This assumes a single top-level object: stray braces in the
//! surrounding prose widen the span and the parse then fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize as _;
use serde_json::Value;
use thiserror::Error;

use crate::models::SymptomResponse;

static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to parse LLM response as JSON: no JSON object found.")]
    NoJson,
    #[error("LLM returned invalid JSON format: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("LLM response does not match the expected schema: {0}")]
    SchemaMismatch(#[source] serde_json::Error),
}

/// Locate and parse the JSON object embedded in `raw`.
pub fn extract(raw: &str) -> Result<Value, ExtractError> {
    let span = OBJECT_SPAN.find(raw).ok_or(ExtractError::NoJson)?;
    serde_json::from_str(span.as_str()).map_err(ExtractError::InvalidJson)
}

/// Check that `value` has the [`SymptomResponse`] shape.
///
/// Returns `value` untouched on success so the caller sees exactly what the
/// model produced, without defaulted fields filled in.
pub fn conform(value: Value) -> Result<Value, ExtractError> {
    SymptomResponse::deserialize(&value).map_err(ExtractError::SchemaMismatch)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ANSWER: &str = r#"{"conditions":[{"name":"Tension headache","rank":1,"confidence":"medium"}],"recommendations":["Rest","Hydrate"],"triage":"Non-urgent","disclaimer":"Educational only"}"#;

    #[test]
    fn bare_object_parses() {
        let v = extract(ANSWER).unwrap();
        assert_eq!(v["triage"], "Non-urgent");
    }

    #[test]
    fn object_surrounded_by_prose() {
        let raw = format!("Here is the result: {ANSWER}\n\nStay safe!");
        let v = extract(&raw).unwrap();
        assert_eq!(v, serde_json::from_str::<Value>(ANSWER).unwrap());
    }

    #[test]
    fn object_inside_code_fence_spanning_lines() {
        let raw = "```json\n{\n  \"triage\": \"Routine\",\n  \"notes\": \"a {brace} in text\"\n}\n```";
        let v = extract(raw).unwrap();
        assert_eq!(v, json!({ "triage": "Routine", "notes": "a {brace} in text" }));
    }

    #[test]
    fn no_braces_is_no_json() {
        let err = extract("I'm sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, ExtractError::NoJson));
        assert!(matches!(extract("} backwards {").unwrap_err(), ExtractError::NoJson));
    }

    #[test]
    fn malformed_span_is_invalid_json() {
        let err = extract("result: {\"triage\": \"Urgent\",}").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidJson(_)));
    }

    #[test]
    fn stray_brace_in_prose_widens_span() {
        let raw = format!("{ANSWER} (note: braces like }} confuse the heuristic)");
        assert!(matches!(extract(&raw).unwrap_err(), ExtractError::InvalidJson(_)));
    }

    #[test]
    fn no_json_and_invalid_json_messages_differ() {
        let a = extract("nothing here").unwrap_err().to_string();
        let b = extract("{nope}").unwrap_err().to_string();
        assert_ne!(a, b);
        assert!(a.contains("no JSON"));
        assert!(b.contains("invalid JSON"));
    }

    #[test]
    fn conform_keeps_value_unchanged() {
        let v: Value = serde_json::from_str(ANSWER).unwrap();
        let out = conform(v.clone()).unwrap();
        assert_eq!(out, v);
        assert!(out.get("notes").is_none());
    }

    #[test]
    fn conform_rejects_wrong_shape() {
        let err = conform(json!({ "diagnosis": "flu" })).unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch(_)));
        let err = conform(json!({
            "conditions": [{ "name": "Flu", "rank": "first", "confidence": "high" }],
            "recommendations": [], "triage": "Routine", "disclaimer": "x"
        }))
        .unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch(_)));
    }
}
