//! JSON API surface.
//!
//! Thin handlers over the selection orchestrator and the mistake store.
//! The quiz response includes the answer key: the caller is the trusted
//! first-party client, which grades locally and reports outcomes back
//! through `/quiz/answer`.

pub mod mistakes;
pub mod quiz;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

/// Error payload returned by every handler
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub(crate) fn bad_request(message: &str) -> ApiError {
  (
    StatusCode::BAD_REQUEST,
    Json(serde_json::json!({ "error": message })),
  )
}

pub(crate) fn store_unavailable() -> ApiError {
  (
    StatusCode::SERVICE_UNAVAILABLE,
    Json(serde_json::json!({ "error": "mistake store unavailable" })),
  )
}

/// Build the application router
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/quiz/start", post(quiz::start_quiz))
    .route("/quiz/answer", post(quiz::submit_answer))
    .route("/quiz/recent", get(quiz::recent_attempts))
    .route("/review/due", get(mistakes::review_due))
    .route("/mistakes/wrong", get(mistakes::wrong_questions))
    .route("/mistakes/concepts", get(mistakes::concept_mistakes))
    .route("/mistakes/summary", get(mistakes::summary))
    .route("/mistakes/resolve", post(mistakes::resolve))
    .with_state(state)
}
