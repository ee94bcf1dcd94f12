//! Prompt store — LLM instructions loaded once at startup.
//!
//! Two plain-text files under the prompts directory (default
//! `config/prompts/`):
//!
//! ```text
//! system_prompt.txt  — system message, sent verbatim
//! symptom_query.txt  — user message template with {{symptoms}}, {{age}},
//!                      {{sex}} and {{duration}} placeholders
//! ```
//!
//! Both are required: a missing file aborts startup rather than failing the
//! first request.

use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::models::SymptomQuery;

pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const QUERY_TEMPLATE_FILE: &str = "symptom_query.txt";

/// Rendered in place of any optional field the caller left out.
pub const UNKNOWN: &str = "unknown";

/// Immutable prompt texts. Share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PromptStore {
    system: String,
    query_template: String,
}

impl PromptStore {
    /// Read both prompt files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let system = read_prompt(dir, SYSTEM_PROMPT_FILE)?;
        let query_template = read_prompt(dir, QUERY_TEMPLATE_FILE)?;
        tracing::debug!(
            dir = %dir.display(),
            system_len = system.len(),
            "prompts loaded"
        );
        Ok(Self { system, query_template })
    }

    /// Build from in-memory texts.
    pub fn from_parts(system: impl Into<String>, query_template: impl Into<String>) -> Self {
        Self { system: system.into(), query_template: query_template.into() }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Fill the user-message template from `query`.
    pub fn render_query(&self, query: &SymptomQuery) -> String {
        let age = query.age.map(|a| a.to_string());
        let vars = [
            ("symptoms", query.symptoms.as_deref()),
            ("age", age.as_deref()),
            ("sex", query.sex.as_deref()),
            ("duration", query.duration.as_deref()),
        ];

        let mut prompt = self.query_template.clone();
        for (key, value) in vars {
            let value = value.filter(|v| !v.trim().is_empty()).unwrap_or(UNKNOWN);
            prompt = prompt.replace(&format!("{{{{{key}}}}}"), value);
        }
        prompt
    }
}

fn read_prompt(dir: &Path, name: &str) -> Result<String, AppError> {
    let path = dir.join(name);
    let text = fs::read_to_string(&path)
        .map_err(|e| AppError::Prompt(format!("cannot read {}: {e}", path.display())))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Prompt(format!("{} is empty", path.display())));
    }
    Ok(text.to_string())
}
