//! Request and response shapes of the symptom-check API.

use serde::{Deserialize, Serialize};

/// Incoming `POST /api/symptom-check` body.
///
/// `symptoms` is optional at the serde level so that a missing field is
/// reported through the same validation path as a too-short one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SymptomQuery {
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl SymptomQuery {
    /// Minimum trimmed length of an acceptable symptom description.
    pub const MIN_SYMPTOM_CHARS: usize = 3;

    /// The symptom text, if present and long enough to act on.
    pub fn valid_symptoms(&self) -> Option<&str> {
        self.symptoms
            .as_deref()
            .filter(|s| s.trim().chars().count() >= Self::MIN_SYMPTOM_CHARS)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Condition {
    pub name: String,
    pub rank: i64,
    pub confidence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Contract returned to the caller on both the emergency and LLM paths.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SymptomResponse {
    pub conditions: Vec<Condition>,
    pub recommendations: Vec<String>,
    pub triage: String,
    pub disclaimer: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_accepts_missing_optionals() {
        let q: SymptomQuery = serde_json::from_value(json!({ "symptoms": "sore throat" })).unwrap();
        assert_eq!(q.valid_symptoms(), Some("sore throat"));
        assert!(q.age.is_none() && q.sex.is_none() && q.duration.is_none());
    }

    #[test]
    fn short_or_blank_symptoms_are_invalid() {
        for s in ["", "  ", "ab", "  a  "] {
            let q = SymptomQuery { symptoms: Some(s.into()), ..Default::default() };
            assert!(q.valid_symptoms().is_none(), "{s:?} should be rejected");
        }
        assert!(SymptomQuery::default().valid_symptoms().is_none());
    }

    #[test]
    fn three_chars_after_trim_is_enough() {
        let q = SymptomQuery { symptoms: Some("  flu ".into()), ..Default::default() };
        assert_eq!(q.valid_symptoms(), Some("  flu "));
    }

    #[test]
    fn condition_rationale_is_optional() {
        let c: Condition =
            serde_json::from_value(json!({ "name": "Migraine", "rank": 1, "confidence": "low" }))
                .unwrap();
        assert!(c.rationale.is_none());
        assert!(!serde_json::to_string(&c).unwrap().contains("rationale"));
    }
}
