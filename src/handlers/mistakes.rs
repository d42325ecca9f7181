//! Mistake ledger handlers: review queues, aggregates, resolution.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{
  ChapterMistakeAggregate, ConceptMistakeAggregate, PyqMistakeAggregate, WrongQuestionRecord,
};
use crate::state::{try_lock_store, AppState};

use super::{store_unavailable, ApiError};

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
  pub subject: String,
  pub chapter: String,
}

/// Wrong questions whose spaced-repetition delay has elapsed
pub async fn review_due(
  State(state): State<AppState>,
  Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<WrongQuestionRecord>>, ApiError> {
  let store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  Ok(Json(store.get_mistakes_for_review(
    &query.subject,
    &query.chapter,
    Utc::now(),
  )))
}

#[derive(Debug, Deserialize)]
pub struct WrongQuery {
  pub subject: String,
  pub chapter: String,
  #[serde(default = "default_wrong_limit")]
  pub limit: usize,
}

fn default_wrong_limit() -> usize {
  20
}

/// Unresolved wrong questions, worst first
pub async fn wrong_questions(
  State(state): State<AppState>,
  Query(query): Query<WrongQuery>,
) -> Result<Json<Vec<WrongQuestionRecord>>, ApiError> {
  let store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  Ok(Json(store.get_wrong_questions(
    &query.subject,
    &query.chapter,
    query.limit,
  )))
}

#[derive(Debug, Deserialize)]
pub struct ConceptQuery {
  pub subject: String,
  /// Concept name or substring; empty matches every concept
  #[serde(default)]
  pub q: String,
}

/// Weak-concept aggregates needing review
pub async fn concept_mistakes(
  State(state): State<AppState>,
  Query(query): Query<ConceptQuery>,
) -> Result<Json<Vec<ConceptMistakeAggregate>>, ApiError> {
  let store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  Ok(Json(store.get_concept_mistakes(&query.subject, &query.q)))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
  pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
  pub chapters: Vec<ChapterMistakeAggregate>,
  pub pyq: Vec<PyqMistakeAggregate>,
}

/// Chapter and PYQ mistake summary for a subject
pub async fn summary(
  State(state): State<AppState>,
  Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
  let store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  Ok(Json(SummaryResponse {
    chapters: store.get_chapter_mistakes(&query.subject),
    pyq: store.get_pyq_mistakes(&query.subject),
  }))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
  pub question_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
  pub resolved: bool,
}

/// Explicitly mark a wrong question as resolved
pub async fn resolve(
  State(state): State<AppState>,
  Json(form): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
  let mut store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  Ok(Json(ResolveResponse {
    resolved: store.mark_resolved(&form.question_id),
  }))
}
