//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or an explicit `-f` path) relative to the
//! current working directory, then applies env overrides:
//!
//! | Variable            | Overrides                  |
//! |---------------------|----------------------------|
//! | `SYMPTOM_WORK_DIR`  | `service.work_dir`         |
//! | `SYMPTOM_LOG_LEVEL` | `service.log_level`        |
//! | `LLM_API_URL`       | `llm.openai.api_base_url`  |
//! | `SYMPTOM_DB_PATH`   | `store.path`               |
//!
//! `LLM_API_KEY` is only ever read from the environment. Nothing here checks
//! that the endpoint or key are usable; the first LLM call surfaces that.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger::LogFormat;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// OpenAI / OpenAI-compatible endpoint configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Upper bound on completion tokens per request.
    pub max_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM gateway configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider: `"openai"` or `"dummy"`. Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    /// Working directory for persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Socket address for the HTTP listener.
    pub bind: String,
    /// Directory holding `system_prompt.txt` and `symptom_query.txt`.
    pub prompts_dir: PathBuf,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY`. `None` sends no `Authorization` header.
    pub llm_api_key: Option<String>,
    /// Consultation database file (absolute).
    pub store_path: PathBuf,
    /// Validate LLM output against the response shape before returning it.
    pub strict_schema: bool,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    store: RawStore,
    #[serde(default)]
    checker: RawChecker,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_service_name")]
    name: String,
    #[serde(default = "default_work_dir")]
    work_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_format: Option<String>,
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_prompts_dir")]
    prompts_dir: String,
}

impl Default for RawService {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            work_dir: default_work_dir(),
            log_level: default_log_level(),
            log_format: None,
            bind: default_bind(),
            prompts_dir: default_prompts_dir(),
        }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default)]
    temperature: f32,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawStore {
    #[serde(default = "default_store_path")]
    path: String,
}

impl Default for RawStore {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

#[derive(Deserialize)]
struct RawChecker {
    #[serde(default = "default_true")]
    strict_schema: bool,
}

impl Default for RawChecker {
    fn default() -> Self {
        Self { strict_schema: true }
    }
}

fn default_service_name() -> String { "symptom-checker".to_string() }
fn default_work_dir() -> String { "~/.symptom-checker".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_max_tokens() -> u32 { 700 }
fn default_timeout_seconds() -> u64 { 30 }
fn default_store_path() -> String { "consultations.db".to_string() }
fn default_true() -> bool { true }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Env-var overrides, captured once so tests can pass them explicitly
/// instead of mutating the process environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub work_dir: Option<String>,
    pub log_level: Option<String>,
    pub api_url: Option<String>,
    pub db_path: Option<String>,
    pub api_key: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            work_dir: env::var("SYMPTOM_WORK_DIR").ok(),
            log_level: env::var("SYMPTOM_LOG_LEVEL").ok(),
            api_url: env::var("LLM_API_URL").ok().filter(|s| !s.is_empty()),
            db_path: env::var("SYMPTOM_DB_PATH").ok().filter(|s| !s.is_empty()),
            api_key: env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Load config from `config_path`, or `config/default.toml` when it exists,
/// or the built-in defaults otherwise. Env overrides apply in every case.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();
    match config_path {
        Some(path) => load_from(Path::new(path), &overrides),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_from(Path::new(DEFAULT_CONFIG_PATH), &overrides)
        }
        None => resolve(RawConfig::default(), &overrides),
    }
}

/// Load an explicit TOML file and apply `overrides`.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;
    resolve(parsed, overrides)
}

fn resolve(parsed: RawConfig, overrides: &Overrides) -> Result<Config, AppError> {
    let s = parsed.service;

    let work_dir = expand_home(overrides.work_dir.as_deref().unwrap_or(&s.work_dir));
    let log_level = overrides.log_level.clone().unwrap_or(s.log_level);
    let log_format = match s.log_format.as_deref() {
        Some(f) => f
            .parse::<LogFormat>()
            .map_err(|e| AppError::Config(format!("service.log_format: {e}")))?,
        None => LogFormat::default(),
    };

    let store_path = expand_home(overrides.db_path.as_deref().unwrap_or(&parsed.store.path));
    let store_path = if store_path.is_absolute() { store_path } else { work_dir.join(store_path) };

    let openai = parsed.llm.openai;

    Ok(Config {
        service_name: s.name,
        work_dir,
        log_level,
        log_format,
        bind: s.bind,
        prompts_dir: expand_home(&s.prompts_dir),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: overrides.api_url.clone().unwrap_or(openai.api_base_url),
                model: openai.model,
                temperature: openai.temperature,
                max_tokens: openai.max_tokens,
                timeout_seconds: openai.timeout_seconds,
            },
        },
        llm_api_key: overrides.api_key.clone(),
        store_path,
        strict_schema: parsed.checker.strict_schema,
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Offline `Config` for unit tests — dummy LLM, no API key, no network.
#[cfg(test)]
impl Config {
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            service_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            log_format: LogFormat::Text,
            bind: "127.0.0.1:0".into(),
            prompts_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/prompts"),
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    max_tokens: 700,
                    timeout_seconds: 1,
                },
            },
            llm_api_key: None,
            store_path: work_dir.join("consultations.db"),
            strict_schema: true,
        }
    }
}
