use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config;

/// How many times each question has been shown within one
/// (subject, chapter) scope. Durable across sessions; questions that hit
/// the cap are retired from selection until the bank rotates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureCounters {
  counts: BTreeMap<String, u32>,
}

impl ExposureCounters {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn count(&self, question_id: &str) -> u32 {
    self.counts.get(question_id).copied().unwrap_or(0)
  }

  pub fn is_retired(&self, question_id: &str) -> bool {
    self.count(question_id) >= config::EXPOSURE_CAP
  }

  pub fn record_shown(&mut self, question_id: &str) {
    *self.counts.entry(question_id.to_string()).or_insert(0) += 1;
  }

  pub fn len(&self) -> usize {
    self.counts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.counts.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unseen_question_has_zero_count() {
    let counters = ExposureCounters::new();
    assert_eq!(counters.count("q1"), 0);
    assert!(!counters.is_retired("q1"));
  }

  #[test]
  fn test_retires_at_cap() {
    let mut counters = ExposureCounters::new();
    for _ in 0..config::EXPOSURE_CAP {
      assert!(!counters.is_retired("q1"));
      counters.record_shown("q1");
    }
    assert!(counters.is_retired("q1"));
  }

  #[test]
  fn test_json_roundtrip_is_plain_map() {
    let mut counters = ExposureCounters::new();
    counters.record_shown("q1");
    counters.record_shown("q1");

    let json = serde_json::to_string(&counters).unwrap();
    assert_eq!(json, r#"{"q1":2}"#);

    let back: ExposureCounters = serde_json::from_str(&json).unwrap();
    assert_eq!(back.count("q1"), 2);
  }
}
