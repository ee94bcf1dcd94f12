//! Application-wide error types.
//!
//! `AppError` covers startup and process-level failures. Request-path errors
//! live next to the component that raises them (`ProviderError`,
//! `ExtractError`, `StoreError`, `CheckError`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("server error: {0}")]
    Server(String),
}
