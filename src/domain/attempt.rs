use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::{Difficulty, PracticeMode, Source};

/// One answered question. Created on every submission, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
  pub question_id: String,
  pub subject: String,
  pub chapter: String,
  pub concept: String,
  pub source: Source,
  pub selected_option: usize,
  pub correct_option: usize,
  pub is_correct: bool,
  pub time_taken_secs: u32,
  pub difficulty: Difficulty,
  pub mode: PracticeMode,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

impl AttemptRecord {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    question_id: String,
    subject: String,
    chapter: String,
    concept: String,
    source: Source,
    selected_option: usize,
    correct_option: usize,
    time_taken_secs: u32,
    difficulty: Difficulty,
    mode: PracticeMode,
  ) -> Self {
    Self {
      question_id,
      subject,
      chapter,
      concept,
      source,
      is_correct: selected_option == correct_option,
      selected_option,
      correct_option,
      time_taken_secs,
      difficulty,
      mode,
      timestamp: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn attempt(selected: usize, correct: usize) -> AttemptRecord {
    AttemptRecord::new(
      "q1".to_string(),
      "Physics".to_string(),
      "Electrostatics".to_string(),
      "Coulomb Law".to_string(),
      Source::Pyq,
      selected,
      correct,
      20,
      Difficulty::Medium,
      PracticeMode::Chapter,
    )
  }

  #[test]
  fn test_correctness_derived_from_indices() {
    assert!(attempt(2, 2).is_correct);
    assert!(!attempt(1, 2).is_correct);
  }

  #[test]
  fn test_timestamp_serializes_as_epoch_ms() {
    let a = attempt(0, 0);
    let json = serde_json::to_value(&a).unwrap();
    assert!(json["timestamp"].is_i64());
    let back: AttemptRecord = serde_json::from_value(json).unwrap();
    assert_eq!(
      back.timestamp.timestamp_millis(),
      a.timestamp.timestamp_millis()
    );
  }
}
