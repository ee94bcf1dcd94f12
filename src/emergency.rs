//! Keyword pre-screen for high-risk symptom descriptions.
//!
//! Plain case-insensitive substring matching, no tokenisation. A match
//! bypasses the LLM entirely and returns [`emergency_response`].

use crate::models::SymptomResponse;

pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "chest pain",
    "severe shortness of breath",
    "fainting",
    "unconscious",
    "severe bleeding",
    "stroke",
    "heart attack",
];

/// Prefix of the triage string on the emergency path.
pub const EMERGENCY_MARKER: &str = "🚨 EMERGENCY";

pub fn is_emergency(text: &str) -> bool {
    let text = text.to_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Keywords found in `text`, in list order.
pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let text = text.to_lowercase();
    EMERGENCY_KEYWORDS
        .iter()
        .copied()
        .filter(|k| text.contains(k))
        .collect()
}

/// The fixed reply for an emergency short-circuit.
pub fn emergency_response() -> SymptomResponse {
    SymptomResponse {
        conditions: Vec::new(),
        recommendations: vec![
            "Call your local emergency number immediately.".to_string(),
            "Avoid physical exertion until help arrives.".to_string(),
        ],
        triage: format!("{EMERGENCY_MARKER}: Possible life-threatening symptoms detected."),
        disclaimer: "This information is for educational purposes only. \
                     Seek professional medical care immediately."
            .to_string(),
        notes: Some("Detected emergency keyword(s) in symptom input.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_matches_in_any_case() {
        for k in EMERGENCY_KEYWORDS {
            assert!(is_emergency(k));
            assert!(is_emergency(&k.to_uppercase()));
            assert!(is_emergency(&format!("since this morning: {k}, also nausea")));
        }
    }

    #[test]
    fn substring_matches_inside_longer_words() {
        assert!(is_emergency("possible heatstroke"));
        assert!(is_emergency("Chest Pains when climbing stairs"));
    }

    #[test]
    fn ordinary_symptoms_do_not_match() {
        assert!(!is_emergency("mild headache and runny nose"));
        assert!(!is_emergency(""));
        assert!(!is_emergency("shortness of breath after running"));
    }

    #[test]
    fn matched_keywords_lists_all_hits() {
        let hits = matched_keywords("STROKE symptoms and chest pain");
        assert_eq!(hits, vec!["chest pain", "stroke"]);
        assert!(matched_keywords("cough").is_empty());
    }

    #[test]
    fn emergency_response_shape() {
        let r = emergency_response();
        assert!(r.conditions.is_empty());
        assert_eq!(r.recommendations.len(), 2);
        assert!(r.triage.starts_with(EMERGENCY_MARKER));
        assert!(r.disclaimer.contains("educational purposes only"));
        assert!(r.notes.is_some());
    }
}
