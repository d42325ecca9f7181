use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::attempt::AttemptRecord;
use super::question::Source;

/// Aggregate for one distinct question the learner has answered incorrectly.
///
/// Invariant: `mistake_count == attempts.len()`. Records are never deleted;
/// a later correct answer marks them resolved instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrongQuestionRecord {
  pub question_id: String,
  pub subject: String,
  pub chapter: String,
  pub concept: String,
  pub source: Source,
  pub mistake_count: u32,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub first_mistake_at: DateTime<Utc>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_attempted_at: DateTime<Utc>,
  pub attempts: Vec<AttemptRecord>,
  pub is_resolved: bool,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub resolved_at: Option<DateTime<Utc>>,
}

impl WrongQuestionRecord {
  pub fn from_attempt(attempt: AttemptRecord) -> Self {
    Self {
      question_id: attempt.question_id.clone(),
      subject: attempt.subject.clone(),
      chapter: attempt.chapter.clone(),
      concept: attempt.concept.clone(),
      source: attempt.source,
      mistake_count: 1,
      first_mistake_at: attempt.timestamp,
      last_attempted_at: attempt.timestamp,
      attempts: vec![attempt],
      is_resolved: false,
      resolved_at: None,
    }
  }

  pub fn record_mistake(&mut self, attempt: AttemptRecord) {
    self.last_attempted_at = attempt.timestamp;
    self.attempts.push(attempt);
    self.mistake_count = self.attempts.len() as u32;
    // A resolved question missed again needs review again
    self.is_resolved = false;
    self.resolved_at = None;
  }

  pub fn resolve(&mut self, at: DateTime<Utc>) {
    self.is_resolved = true;
    self.resolved_at = Some(at);
  }
}

/// Mistakes grouped by (subject, concept)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptMistakeAggregate {
  pub subject: String,
  pub concept: String,
  pub mistake_count: u32,
  pub questions: BTreeSet<String>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_mistake_at: DateTime<Utc>,
  pub needs_review: bool,
}

/// Mistakes grouped by (subject, chapter), tracking the concepts involved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterMistakeAggregate {
  pub subject: String,
  pub chapter: String,
  pub mistake_count: u32,
  pub questions: BTreeSet<String>,
  pub concepts: BTreeSet<String>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_mistake_at: DateTime<Utc>,
  pub needs_review: bool,
}

/// Incorrect attempts on previously-published exam questions, kept apart
/// from generated content because selection treats them with different
/// priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyqMistakeAggregate {
  pub subject: String,
  pub chapter: String,
  pub mistake_count: u32,
  pub questions: BTreeSet<String>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_mistake_at: DateTime<Utc>,
}

/// The persisted mistake ledger: everything MistakeStore knows, serialized
/// as one JSON value under a single storage key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MistakeLedger {
  pub attempt_history: Vec<AttemptRecord>,
  pub wrong_questions: BTreeMap<String, WrongQuestionRecord>,
  pub concept_mistakes: BTreeMap<String, ConceptMistakeAggregate>,
  pub chapter_mistakes: BTreeMap<String, ChapterMistakeAggregate>,
  pub pyq_mistakes: BTreeMap<String, PyqMistakeAggregate>,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub last_updated: Option<DateTime<Utc>>,
}

/// Key for the per-(subject, x) aggregate maps
pub fn scope_key(subject: &str, inner: &str) -> String {
  format!("{}::{}", subject, inner)
}
