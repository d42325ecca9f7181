//! MistakeStore: the single source of truth for what the learner has
//! gotten wrong.
//!
//! All aggregates are owned and mutated here; other components receive
//! read-only query results. Persistence is synchronous and best-effort:
//! storage faults degrade to empty state on read and to in-memory-only
//! operation on write, never to an error surfaced to callers.

pub mod exposure;
pub mod schedule;

use chrono::{DateTime, Utc};

use crate::config;
use crate::domain::{
  scope_key, AttemptRecord, ChapterMistakeAggregate, ConceptMistakeAggregate, MistakeLedger,
  PyqMistakeAggregate, Source, WrongQuestionRecord,
};
use crate::storage::{LogOnError, StoragePort};

pub use exposure::ExposureCounters;

/// Storage key for the serialized ledger
const LEDGER_KEY: &str = "cuet_prep::mistake_ledger";

/// Storage key for the exposure counters of one (subject, chapter) scope
fn exposure_key(subject: &str, chapter: &str) -> String {
  format!("cuet_prep::exposure::{}::{}", subject, chapter)
}

pub struct MistakeStore {
  storage: Box<dyn StoragePort>,
  ledger: MistakeLedger,
}

impl MistakeStore {
  /// Load the ledger from storage; a missing key or unreadable blob starts
  /// from an empty ledger.
  pub fn new(storage: Box<dyn StoragePort>) -> Self {
    let ledger = storage
      .get(LEDGER_KEY)
      .log_warn("Failed to read mistake ledger")
      .flatten()
      .and_then(|raw| {
        serde_json::from_str::<MistakeLedger>(&raw).log_warn("Failed to parse mistake ledger")
      })
      .unwrap_or_default();

    Self { storage, ledger }
  }

  /// Record one answered question. Always succeeds; returns the attempt id.
  ///
  /// Incorrect answers update the wrong-question record and every aggregate
  /// in the same pass so the ledger is persisted in a consistent state.
  /// A correct answer to a question with an unresolved wrong record
  /// resolves it.
  pub fn record_attempt(&mut self, record: AttemptRecord) -> String {
    let attempt_id = format!(
      "{}-{}",
      record.timestamp.timestamp_millis(),
      self.ledger.attempt_history.len()
    );

    if record.is_correct {
      self.apply_correct(&record);
    } else {
      self.apply_mistake(record.clone());
    }

    // Most-recent-first, trimmed to the retention cap
    self.ledger.attempt_history.insert(0, record);
    self
      .ledger
      .attempt_history
      .truncate(config::ATTEMPT_HISTORY_CAP);

    self.ledger.last_updated = Some(Utc::now());
    self.persist();
    attempt_id
  }

  fn apply_mistake(&mut self, record: AttemptRecord) {
    let concept_key = scope_key(&record.subject, &record.concept);
    let chapter_key = scope_key(&record.subject, &record.chapter);

    self
      .ledger
      .wrong_questions
      .entry(record.question_id.clone())
      .and_modify(|w| w.record_mistake(record.clone()))
      .or_insert_with(|| WrongQuestionRecord::from_attempt(record.clone()));

    let concept = self
      .ledger
      .concept_mistakes
      .entry(concept_key)
      .or_insert_with(|| ConceptMistakeAggregate {
        subject: record.subject.clone(),
        concept: record.concept.clone(),
        mistake_count: 0,
        questions: Default::default(),
        last_mistake_at: record.timestamp,
        needs_review: true,
      });
    concept.mistake_count += 1;
    concept.questions.insert(record.question_id.clone());
    concept.last_mistake_at = record.timestamp;
    concept.needs_review = true;

    let chapter = self
      .ledger
      .chapter_mistakes
      .entry(chapter_key.clone())
      .or_insert_with(|| ChapterMistakeAggregate {
        subject: record.subject.clone(),
        chapter: record.chapter.clone(),
        mistake_count: 0,
        questions: Default::default(),
        concepts: Default::default(),
        last_mistake_at: record.timestamp,
        needs_review: true,
      });
    chapter.mistake_count += 1;
    chapter.questions.insert(record.question_id.clone());
    chapter.concepts.insert(record.concept.clone());
    chapter.last_mistake_at = record.timestamp;
    chapter.needs_review = true;

    if record.source == Source::Pyq {
      let pyq = self
        .ledger
        .pyq_mistakes
        .entry(chapter_key)
        .or_insert_with(|| PyqMistakeAggregate {
          subject: record.subject.clone(),
          chapter: record.chapter.clone(),
          mistake_count: 0,
          questions: Default::default(),
          last_mistake_at: record.timestamp,
        });
      pyq.mistake_count += 1;
      pyq.questions.insert(record.question_id.clone());
      pyq.last_mistake_at = record.timestamp;
    }
  }

  fn apply_correct(&mut self, record: &AttemptRecord) {
    let resolved = match self.ledger.wrong_questions.get_mut(&record.question_id) {
      Some(wrong) if !wrong.is_resolved => {
        wrong.resolve(record.timestamp);
        true
      }
      _ => false,
    };

    if resolved {
      // The concept/chapter no longer needs review once one of its missed
      // questions is answered correctly
      for aggregate in self.ledger.concept_mistakes.values_mut() {
        if aggregate.questions.contains(&record.question_id) {
          aggregate.needs_review = false;
        }
      }
      for aggregate in self.ledger.chapter_mistakes.values_mut() {
        if aggregate.questions.contains(&record.question_id) {
          aggregate.needs_review = false;
        }
      }
    }
  }

  /// Unresolved wrong questions for a (subject, chapter) scope, worst first
  pub fn get_wrong_questions(
    &self,
    subject: &str,
    chapter: &str,
    limit: usize,
  ) -> Vec<WrongQuestionRecord> {
    let mut records: Vec<WrongQuestionRecord> = self
      .ledger
      .wrong_questions
      .values()
      .filter(|w| !w.is_resolved && w.subject == subject && w.chapter == chapter)
      .cloned()
      .collect();

    records.sort_by(|a, b| {
      b.mistake_count
        .cmp(&a.mistake_count)
        .then(b.last_attempted_at.cmp(&a.last_attempted_at))
    });
    records.truncate(limit);
    records
  }

  /// Concept aggregates needing review, matched exactly or by substring
  pub fn get_concept_mistakes(
    &self,
    subject: &str,
    pattern: &str,
  ) -> Vec<ConceptMistakeAggregate> {
    let needle = pattern.to_lowercase();
    let mut aggregates: Vec<ConceptMistakeAggregate> = self
      .ledger
      .concept_mistakes
      .values()
      .filter(|c| c.needs_review && c.subject == subject)
      .filter(|c| {
        let concept = c.concept.to_lowercase();
        needle.is_empty() || concept == needle || concept.contains(&needle)
      })
      .cloned()
      .collect();

    aggregates.sort_by(|a, b| {
      b.mistake_count
        .cmp(&a.mistake_count)
        .then(b.last_mistake_at.cmp(&a.last_mistake_at))
    });
    aggregates
  }

  /// Wrong questions whose spaced-repetition delay has elapsed at `now`
  pub fn get_mistakes_for_review(
    &self,
    subject: &str,
    chapter: &str,
    now: DateTime<Utc>,
  ) -> Vec<WrongQuestionRecord> {
    self
      .ledger
      .wrong_questions
      .values()
      .filter(|w| !w.is_resolved && w.subject == subject && w.chapter == chapter)
      .filter(|w| schedule::is_due(w.last_attempted_at, w.mistake_count, now))
      .cloned()
      .collect()
  }

  /// Explicitly mark a wrong question resolved. Returns false if unknown.
  pub fn mark_resolved(&mut self, question_id: &str) -> bool {
    let Some(wrong) = self.ledger.wrong_questions.get_mut(question_id) else {
      return false;
    };
    wrong.resolve(Utc::now());
    self.ledger.last_updated = Some(Utc::now());
    self.persist();
    true
  }

  /// How many times a question has been answered incorrectly (0 if never)
  pub fn mistake_count(&self, question_id: &str) -> u32 {
    self
      .ledger
      .wrong_questions
      .get(question_id)
      .map(|w| w.mistake_count)
      .unwrap_or(0)
  }

  /// Chapter-level aggregates for a subject (mistake summary view)
  pub fn get_chapter_mistakes(&self, subject: &str) -> Vec<ChapterMistakeAggregate> {
    let mut aggregates: Vec<ChapterMistakeAggregate> = self
      .ledger
      .chapter_mistakes
      .values()
      .filter(|c| c.subject == subject)
      .cloned()
      .collect();
    aggregates.sort_by(|a, b| b.mistake_count.cmp(&a.mistake_count));
    aggregates
  }

  /// PYQ-specific aggregates for a subject
  pub fn get_pyq_mistakes(&self, subject: &str) -> Vec<PyqMistakeAggregate> {
    let mut aggregates: Vec<PyqMistakeAggregate> = self
      .ledger
      .pyq_mistakes
      .values()
      .filter(|p| p.subject == subject)
      .cloned()
      .collect();
    aggregates.sort_by(|a, b| b.mistake_count.cmp(&a.mistake_count));
    aggregates
  }

  /// Most recent attempts, newest first
  pub fn recent_attempts(&self, limit: usize) -> &[AttemptRecord] {
    let end = limit.min(self.ledger.attempt_history.len());
    &self.ledger.attempt_history[..end]
  }

  /// Exposure counters for one (subject, chapter) scope; degrades to empty
  pub fn load_exposure(&self, subject: &str, chapter: &str) -> ExposureCounters {
    self
      .storage
      .get(&exposure_key(subject, chapter))
      .log_warn("Failed to read exposure counters")
      .flatten()
      .and_then(|raw| {
        serde_json::from_str::<ExposureCounters>(&raw)
          .log_warn("Failed to parse exposure counters")
      })
      .unwrap_or_default()
  }

  /// Persist exposure counters for one scope, best-effort
  pub fn save_exposure(&mut self, subject: &str, chapter: &str, counters: &ExposureCounters) {
    match serde_json::to_string(counters) {
      Ok(raw) => {
        let _ = self
          .storage
          .set(&exposure_key(subject, chapter), &raw)
          .log_warn("Failed to persist exposure counters");
      }
      Err(e) => tracing::warn!("Failed to serialize exposure counters: {}", e),
    }
  }

  fn persist(&mut self) {
    match serde_json::to_string(&self.ledger) {
      Ok(raw) => {
        let _ = self
          .storage
          .set(LEDGER_KEY, &raw)
          .log_warn("Failed to persist mistake ledger");
      }
      Err(e) => tracing::warn!("Failed to serialize mistake ledger: {}", e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, PracticeMode};
  use crate::storage::{MemoryStorage, SqliteStorage};
  use chrono::Duration;

  fn store() -> MistakeStore {
    MistakeStore::new(Box::new(MemoryStorage::new()))
  }

  fn attempt(question_id: &str, correct: bool, source: Source) -> AttemptRecord {
    AttemptRecord::new(
      question_id.to_string(),
      "Physics".to_string(),
      "Electrostatics".to_string(),
      "Coulomb Law".to_string(),
      source,
      if correct { 0 } else { 1 },
      0,
      20,
      Difficulty::Medium,
      PracticeMode::Chapter,
    )
  }

  // record_attempt

  #[test]
  fn test_three_mistakes_one_record() {
    let mut store = store();
    for _ in 0..3 {
      store.record_attempt(attempt("q1", false, Source::Pyq));
    }

    let wrong = store.get_wrong_questions("Physics", "Electrostatics", 10);
    assert_eq!(wrong.len(), 1);
    assert_eq!(wrong[0].mistake_count, 3);
    assert_eq!(wrong[0].attempts.len(), 3);
  }

  #[test]
  fn test_attempt_ids_are_distinct() {
    let mut store = store();
    let a = store.record_attempt(attempt("q1", false, Source::Pyq));
    let b = store.record_attempt(attempt("q2", false, Source::Pyq));
    assert_ne!(a, b);
  }

  #[test]
  fn test_correct_attempt_creates_no_wrong_record() {
    let mut store = store();
    store.record_attempt(attempt("q1", true, Source::Pyq));
    assert!(store.get_wrong_questions("Physics", "Electrostatics", 10).is_empty());
  }

  #[test]
  fn test_correct_answer_resolves_wrong_record() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Pyq));
    store.record_attempt(attempt("q1", true, Source::Pyq));

    assert!(store.get_wrong_questions("Physics", "Electrostatics", 10).is_empty());
    // Resolution also clears the concept review flag
    assert!(store.get_concept_mistakes("Physics", "Coulomb").is_empty());
  }

  #[test]
  fn test_mistake_after_resolution_reopens_record() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Pyq));
    store.record_attempt(attempt("q1", true, Source::Pyq));
    store.record_attempt(attempt("q1", false, Source::Pyq));

    let wrong = store.get_wrong_questions("Physics", "Electrostatics", 10);
    assert_eq!(wrong.len(), 1);
    assert_eq!(wrong[0].mistake_count, 2);
  }

  #[test]
  fn test_pyq_aggregate_only_for_pyq_source() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Template));
    assert!(store.get_pyq_mistakes("Physics").is_empty());

    store.record_attempt(attempt("q2", false, Source::Pyq));
    let pyq = store.get_pyq_mistakes("Physics");
    assert_eq!(pyq.len(), 1);
    assert_eq!(pyq[0].mistake_count, 1);
    assert!(pyq[0].questions.contains("q2"));
    assert!(!pyq[0].questions.contains("q1"));
  }

  #[test]
  fn test_chapter_aggregate_tracks_concepts() {
    let mut store = store();
    let mut a = attempt("q1", false, Source::Pyq);
    a.concept = "Gauss Law".to_string();
    store.record_attempt(a);
    store.record_attempt(attempt("q2", false, Source::Pyq));

    let chapters = store.get_chapter_mistakes("Physics");
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].mistake_count, 2);
    assert!(chapters[0].concepts.contains("Gauss Law"));
    assert!(chapters[0].concepts.contains("Coulomb Law"));
  }

  #[test]
  fn test_history_capped() {
    let mut store = store();
    for i in 0..(config::ATTEMPT_HISTORY_CAP + 25) {
      store.record_attempt(attempt(&format!("q{}", i), true, Source::Template));
    }
    assert_eq!(store.recent_attempts(usize::MAX).len(), config::ATTEMPT_HISTORY_CAP);
  }

  #[test]
  fn test_history_most_recent_first() {
    let mut store = store();
    store.record_attempt(attempt("first", true, Source::Template));
    store.record_attempt(attempt("second", true, Source::Template));
    assert_eq!(store.recent_attempts(1)[0].question_id, "second");
  }

  // Queries

  #[test]
  fn test_wrong_questions_sorted_by_count_then_recency() {
    let mut store = store();
    store.record_attempt(attempt("once", false, Source::Pyq));
    for _ in 0..3 {
      store.record_attempt(attempt("thrice", false, Source::Pyq));
    }
    store.record_attempt(attempt("later", false, Source::Pyq));

    let wrong = store.get_wrong_questions("Physics", "Electrostatics", 10);
    assert_eq!(wrong[0].question_id, "thrice");
    // "later" was recorded after "once"; same count, newer wins
    assert_eq!(wrong[1].question_id, "later");
    assert_eq!(wrong[2].question_id, "once");
  }

  #[test]
  fn test_wrong_questions_respects_limit_and_scope() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Pyq));
    let mut other = attempt("q2", false, Source::Pyq);
    other.chapter = "Optics".to_string();
    store.record_attempt(other);

    let wrong = store.get_wrong_questions("Physics", "Electrostatics", 10);
    assert_eq!(wrong.len(), 1);
    assert_eq!(wrong[0].question_id, "q1");

    let limited = store.get_wrong_questions("Physics", "Electrostatics", 0);
    assert!(limited.is_empty());
  }

  #[test]
  fn test_concept_mistakes_substring_match() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Pyq));

    assert_eq!(store.get_concept_mistakes("Physics", "coulomb").len(), 1);
    assert_eq!(store.get_concept_mistakes("Physics", "Coulomb Law").len(), 1);
    assert!(store.get_concept_mistakes("Physics", "ohm").is_empty());
    assert!(store.get_concept_mistakes("Chemistry", "coulomb").is_empty());
  }

  #[test]
  fn test_review_gating_three_minute_boundary() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Pyq));
    let now = Utc::now();

    // One minute after the mistake: blocked
    assert!(store
      .get_mistakes_for_review("Physics", "Electrostatics", now + Duration::minutes(1))
      .is_empty());
    // Four minutes after: eligible
    assert_eq!(
      store
        .get_mistakes_for_review("Physics", "Electrostatics", now + Duration::minutes(4))
        .len(),
      1
    );
  }

  #[test]
  fn test_mark_resolved() {
    let mut store = store();
    store.record_attempt(attempt("q1", false, Source::Pyq));
    assert!(store.mark_resolved("q1"));
    assert!(!store.mark_resolved("unknown"));
    assert!(store.get_wrong_questions("Physics", "Electrostatics", 10).is_empty());
  }

  // Persistence

  #[test]
  fn test_ledger_survives_reopen() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("store.db");

    {
      let storage = SqliteStorage::open(&path).unwrap();
      let mut store = MistakeStore::new(Box::new(storage));
      store.record_attempt(attempt("q1", false, Source::Pyq));
      store.record_attempt(attempt("q1", false, Source::Pyq));
    }

    let storage = SqliteStorage::open(&path).unwrap();
    let store = MistakeStore::new(Box::new(storage));
    let wrong = store.get_wrong_questions("Physics", "Electrostatics", 10);
    assert_eq!(wrong.len(), 1);
    assert_eq!(wrong[0].mistake_count, 2);
  }

  #[test]
  fn test_corrupt_ledger_degrades_to_empty() {
    let mut storage = MemoryStorage::new();
    storage.set(LEDGER_KEY, "not json").unwrap();
    let store = MistakeStore::new(Box::new(storage));
    assert!(store.get_wrong_questions("Physics", "Electrostatics", 10).is_empty());
  }

  #[test]
  fn test_exposure_roundtrip_per_scope() {
    let mut store = store();
    let mut counters = ExposureCounters::new();
    counters.record_shown("q1");
    store.save_exposure("Physics", "Electrostatics", &counters);

    let loaded = store.load_exposure("Physics", "Electrostatics");
    assert_eq!(loaded.count("q1"), 1);
    // Different chapter key starts empty
    assert!(store.load_exposure("Physics", "Optics").is_empty());
  }
}
