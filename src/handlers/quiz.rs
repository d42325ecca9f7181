//! Quiz session handlers: start a session, submit an answer.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{AttemptRecord, Difficulty, PracticeMode, Question, Source};
use crate::selection::SelectionRequest;
use crate::state::{try_lock_store, AppState};

use super::{bad_request, store_unavailable, ApiError};

#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
  pub subject: String,
  pub chapter: String,
  pub count: usize,
  pub mode: String,
  pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
  pub requested: usize,
  pub served: usize,
  pub questions: Vec<Question>,
}

pub async fn start_quiz(
  State(state): State<AppState>,
  Json(form): Json<StartQuizRequest>,
) -> Result<Json<StartQuizResponse>, ApiError> {
  let Some(mode) = PracticeMode::from_str(&form.mode) else {
    return Err(bad_request(&format!("unknown mode '{}'", form.mode)));
  };

  let difficulty = match form.difficulty.as_deref() {
    None => None,
    Some(raw) => match Difficulty::from_str(raw) {
      Some(difficulty) => Some(difficulty),
      None => return Err(bad_request(&format!("unknown difficulty '{}'", raw))),
    },
  };

  if form.count == 0 {
    return Err(bad_request("count must be at least 1"));
  }

  let request = SelectionRequest {
    subject: form.subject,
    chapter: form.chapter,
    count: form.count,
    mode,
    difficulty,
  };

  let questions = state.orchestrator.select(&request).await;
  Ok(Json(StartQuizResponse {
    requested: request.count,
    served: questions.len(),
    questions,
  }))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
  pub question_id: String,
  pub subject: String,
  pub chapter: String,
  pub concept: String,
  pub source: String,
  pub selected_option: usize,
  pub correct_option: usize,
  #[serde(default)]
  pub time_taken_secs: u32,
  pub difficulty: String,
  pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
  pub attempt_id: String,
  pub correct: bool,
  pub mistake_count: u32,
}

pub async fn submit_answer(
  State(state): State<AppState>,
  Json(form): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
  let Some(source) = Source::from_str(&form.source) else {
    return Err(bad_request(&format!("unknown source '{}'", form.source)));
  };
  let Some(difficulty) = Difficulty::from_str(&form.difficulty) else {
    return Err(bad_request(&format!("unknown difficulty '{}'", form.difficulty)));
  };
  let Some(mode) = PracticeMode::from_str(&form.mode) else {
    return Err(bad_request(&format!("unknown mode '{}'", form.mode)));
  };
  if form.selected_option >= crate::config::OPTION_COUNT
    || form.correct_option >= crate::config::OPTION_COUNT
  {
    return Err(bad_request("option index out of range"));
  }

  let record = AttemptRecord::new(
    form.question_id.clone(),
    form.subject,
    form.chapter,
    form.concept,
    source,
    form.selected_option,
    form.correct_option,
    form.time_taken_secs,
    difficulty,
    mode,
  );
  let correct = record.is_correct;

  let mut store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  let attempt_id = store.record_attempt(record);
  let mistake_count = store.mistake_count(&form.question_id);

  Ok(Json(AnswerResponse {
    attempt_id,
    correct,
    mistake_count,
  }))
}

#[derive(Debug, Serialize)]
pub struct RecentAttemptsResponse {
  pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
  #[serde(default = "default_recent_limit")]
  pub limit: usize,
}

fn default_recent_limit() -> usize {
  20
}

/// Most recent attempts, newest first
pub async fn recent_attempts(
  State(state): State<AppState>,
  Query(query): Query<RecentQuery>,
) -> Result<Json<RecentAttemptsResponse>, ApiError> {
  let store = try_lock_store(&state.store).map_err(|_| store_unavailable())?;
  Ok(Json(RecentAttemptsResponse {
    attempts: store.recent_attempts(query.limit).to_vec(),
  }))
}
