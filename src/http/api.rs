//! Handlers for the symptom-check API.
//!
//! Errors are rendered as `{ "detail": "<message>" }`: 400 for bad input,
//! 500 for LLM and parse failures.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use crate::checker::CheckError;
use crate::models::SymptomQuery;

fn detail(status: StatusCode, msg: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "detail": msg.to_string() }))).into_response()
}

impl IntoResponse for CheckError {
    fn into_response(self) -> Response {
        let status = match self {
            CheckError::InvalidInput => StatusCode::BAD_REQUEST,
            CheckError::LlmFailure(_) | CheckError::ParseFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        detail(status, self)
    }
}

/// GET /
pub(super) async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Symptom checker API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

/// POST /api/symptom-check
pub(super) async fn symptom_check(
    State(state): State<AppState>,
    payload: Result<Json<SymptomQuery>, JsonRejection>,
) -> Response {
    let Json(query) = match payload {
        Ok(q) => q,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected symptom-check body");
            return detail(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.checker.check(&query).await {
        Ok(outcome) => {
            if let Some(e) = &outcome.persist_error {
                warn!(error = %e, "consultation not saved");
            }
            info!(emergency = outcome.emergency, "symptom check answered");
            (StatusCode::OK, Json(outcome.body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
