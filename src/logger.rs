//! Logging via tracing-subscriber.
//!
//! [`init`] installs the global subscriber once at startup. Output goes to
//! stderr, either as human-readable lines or as one JSON object per event
//! (`service.log_format = "json"`) for log shippers.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Line format of emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(AppError::Logger(format!("unknown log format: '{other}'"))),
        }
    }
}

/// Build the event filter.
///
/// With `prefer_level` the explicit `level` wins (CLI `-v` flags) and
/// `RUST_LOG` is only consulted when `level` does not parse. Otherwise
/// `RUST_LOG` wins and `level` is the fallback.
fn build_filter(level: &str, prefer_level: bool) -> Result<EnvFilter, AppError> {
    if prefer_level {
        return EnvFilter::try_new(level).or_else(|level_err| {
            EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
                ))
            })
        });
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(level: &str, prefer_level: bool, format: LogFormat) -> Result<(), AppError> {
    let filter = build_filter(level, prefer_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}
