//! Top-level selection policy.
//!
//! One call assembles a full quiz session: five candidate layers run in
//! strict priority order against a call-scoped uniqueness set, an
//! emergency loop guarantees the minimum result size, and a re-balancing
//! pass enforces the mode's mistake/pyq/fresh mixing ratios before the
//! final order and option shuffles. No error escapes `select`; a failing
//! layer is logged and skipped.

use rand::seq::SliceRandom;
use std::sync::{Arc, Mutex};

use crate::config;
use crate::content::{QuestionGenerator, SimilarityIndex};
use crate::domain::{
  ConceptMistakeAggregate, Difficulty, PracticeMode, Question, Source, WrongQuestionRecord,
};
use crate::remote::RemoteGenerator;
use crate::store::{ExposureCounters, MistakeStore};

use super::session::SessionSet;
use super::shuffle::shuffle_options;
use super::variation::VariationEngine;

/// One request for a quiz session
#[derive(Debug, Clone)]
pub struct SelectionRequest {
  pub subject: String,
  pub chapter: String,
  pub count: usize,
  pub mode: PracticeMode,
  pub difficulty: Option<Difficulty>,
}

pub struct SelectionOrchestrator {
  store: Arc<Mutex<MistakeStore>>,
  index: Arc<SimilarityIndex>,
  generator: QuestionGenerator,
  variation: VariationEngine,
  remote: Arc<RemoteGenerator>,
}

impl SelectionOrchestrator {
  pub fn new(
    store: Arc<Mutex<MistakeStore>>,
    index: Arc<SimilarityIndex>,
    remote: Arc<RemoteGenerator>,
  ) -> Self {
    Self {
      store,
      index,
      generator: QuestionGenerator::new(),
      variation: VariationEngine::new(),
      remote,
    }
  }

  /// Assemble a session of up to `count` questions.
  ///
  /// For `count >= 1` the result is never empty and never contains two
  /// questions with the same normalized text. The only degraded outcome is
  /// a list shorter than requested.
  pub async fn select(&self, request: &SelectionRequest) -> Vec<Question> {
    if request.count == 0 {
      return Vec::new();
    }

    let count = request.count;
    let mix = config::mode_mix(request.mode);
    let mistake_budget = (count as f64 * mix.mistake).ceil() as usize;
    let pyq_budget = (count as f64 * mix.pyq).ceil() as usize;

    // Read everything needed from the store up front, then release the
    // lock before any suspension point
    let (wrong, weak_concepts, mut counters) = self.read_store_state(request, mistake_budget);

    let mut session = SessionSet::new();
    let mut picked: Vec<Question> = Vec::new();

    // Layer 1: variants of previously-missed questions
    let target = count.min(mistake_budget);
    self.admit(
      Ok(self.mistake_variants(request, &wrong, &counters)),
      "mistake_variants",
      &mut picked,
      &mut session,
      &counters,
      target,
    );

    // Layers 2 and 3 share the PYQ budget
    let target = count.min(picked.len() + pyq_budget);
    self.admit(
      Ok(self.similar_to_weak_concepts(request, &weak_concepts)),
      "concept_similar",
      &mut picked,
      &mut session,
      &counters,
      target,
    );
    self.admit(
      Ok(self.chapter_pyqs(request)),
      "chapter_pyqs",
      &mut picked,
      &mut session,
      &counters,
      target,
    );

    // Layer 4: fresh questions, remote first with local templates behind it
    if mix.fresh > 0.0 && picked.len() < count {
      let hint = weak_concepts
        .first()
        .map(|c| c.concept.clone())
        .unwrap_or_else(|| request.chapter.clone());
      let remaining = count - picked.len();

      let remote_result = self
        .remote
        .generate(
          &request.subject,
          &request.chapter,
          &hint,
          remaining,
          request.difficulty.unwrap_or(Difficulty::Medium),
        )
        .await
        .map_err(|e| e.to_string());
      self.admit(remote_result, "remote_fresh", &mut picked, &mut session, &counters, count);

      if picked.len() < count {
        self.admit(
          Ok(self.generator.generate_for_concept(
            &request.subject,
            &request.chapter,
            &hint,
            count - picked.len(),
          )),
          "template_fresh",
          &mut picked,
          &mut session,
          &counters,
          count,
        );
      }
    }

    // Layer 5: generator fallback fills any remaining shortfall
    if picked.len() < count {
      self.admit(
        Ok(self.generator.generate(&request.subject, &request.chapter, count - picked.len())),
        "generator_fallback",
        &mut picked,
        &mut session,
        &counters,
        count,
      );
    }

    // Emergency loop: never return fewer than min(count, floor)
    let floor = count.min(config::EMERGENCY_FLOOR);
    let max_attempts = count * config::EMERGENCY_ATTEMPT_MULTIPLIER;
    let mut serial = 0;
    while picked.len() < floor && serial < max_attempts {
      let question =
        self.generator.emergency(&request.subject, &request.chapter, &request.chapter, serial);
      if !counters.is_retired(&question.id) && session.try_admit(&question) {
        picked.push(question);
      }
      serial += 1;
    }

    if session.rejected() > 0 {
      tracing::debug!(
        "Selection for {}/{} rejected {} duplicate candidates",
        request.subject,
        request.chapter,
        session.rejected()
      );
    }

    // Re-balance into the mode's source buckets, then finalize order
    let mut result = rebalance(picked, count, mix);
    result.shuffle(&mut rand::rng());
    for question in &mut result {
      shuffle_options(question);
    }

    // Charge one exposure to everything actually served and persist
    let result = self.variation.filter_overexposed(result, &mut counters);
    if let Ok(mut store) = self.store.lock() {
      store.save_exposure(&request.subject, &request.chapter, &counters);
    }

    tracing::info!(
      "Selected {}/{} questions for {}/{} in {} mode",
      result.len(),
      count,
      request.subject,
      request.chapter,
      request.mode.as_str()
    );
    result
  }

  fn read_store_state(
    &self,
    request: &SelectionRequest,
    mistake_budget: usize,
  ) -> (
    Vec<WrongQuestionRecord>,
    Vec<ConceptMistakeAggregate>,
    ExposureCounters,
  ) {
    match self.store.lock() {
      Ok(store) => (
        store.get_wrong_questions(&request.subject, &request.chapter, mistake_budget.max(1) * 2),
        store.get_concept_mistakes(&request.subject, ""),
        store.load_exposure(&request.subject, &request.chapter),
      ),
      Err(_) => {
        tracing::warn!("Mistake store unavailable; selecting without history");
        (Vec::new(), Vec::new(), ExposureCounters::new())
      }
    }
  }

  /// Admit a layer's candidates: reject duplicates and retired questions,
  /// stop at `target`. A failed layer is logged and skipped.
  fn admit(
    &self,
    layer: Result<Vec<Question>, String>,
    layer_name: &str,
    picked: &mut Vec<Question>,
    session: &mut SessionSet,
    counters: &ExposureCounters,
    target: usize,
  ) {
    let candidates = match layer {
      Ok(candidates) => candidates,
      Err(e) => {
        tracing::warn!("Selection layer '{}' failed: {}", layer_name, e);
        return;
      }
    };

    for question in candidates {
      if picked.len() >= target {
        break;
      }
      if counters.is_retired(&question.id) {
        continue;
      }
      if session.try_admit(&question) {
        picked.push(question);
      }
    }
  }

  /// Layer 1: a varied rendition of each unresolved wrong question.
  ///
  /// Bank questions are varied directly; questions that never lived in the
  /// bank are regenerated from their concept. Variants keep the original
  /// question id so a later correct answer closes the original record.
  fn mistake_variants(
    &self,
    request: &SelectionRequest,
    wrong: &[WrongQuestionRecord],
    counters: &ExposureCounters,
  ) -> Vec<Question> {
    let mut variants = Vec::new();
    for record in wrong {
      let base = match self.index.by_id(&record.question_id) {
        Some(question) => question.clone(),
        None => {
          match self
            .generator
            .generate_for_concept(&request.subject, &request.chapter, &record.concept, 1)
            .pop()
          {
            Some(question) => question,
            None => continue,
          }
        }
      };

      let sessions_seen = counters.count(&record.question_id);
      let mut variant = self.variation.vary(&base, sessions_seen);
      variant.id = record.question_id.clone();
      variants.push(variant);
    }
    variants
  }

  /// Layer 2: published questions similar to the learner's weak concepts
  fn similar_to_weak_concepts(
    &self,
    request: &SelectionRequest,
    weak_concepts: &[ConceptMistakeAggregate],
  ) -> Vec<Question> {
    let mut hits = Vec::new();
    for aggregate in weak_concepts {
      hits.extend(self.index.find_similar(
        &request.subject,
        &request.chapter,
        &aggregate.concept,
        request.count,
      ));
    }
    hits
  }

  /// Layer 3: exact published questions for the chapter, requested
  /// difficulty first
  fn chapter_pyqs(&self, request: &SelectionRequest) -> Vec<Question> {
    let mut questions = self
      .index
      .questions_for_chapter(&request.subject, &request.chapter);
    questions.shuffle(&mut rand::rng());
    if let Some(difficulty) = request.difficulty {
      // Stable sort keeps the shuffled order within each group
      questions.sort_by_key(|q| q.difficulty != difficulty);
    }
    questions
  }
}

/// Categorize by source bucket and take floor(count * ratio) from each,
/// backfilling open slots from whatever remains, in assembly order.
fn rebalance(picked: Vec<Question>, count: usize, mix: config::ModeMix) -> Vec<Question> {
  let take_mistake = (count as f64 * mix.mistake).floor() as usize;
  let take_pyq = (count as f64 * mix.pyq).floor() as usize;
  let take_fresh = (count as f64 * mix.fresh).floor() as usize;

  let mut mistake = Vec::new();
  let mut pyq = Vec::new();
  let mut fresh = Vec::new();
  for question in picked {
    match question.source {
      Source::Variant => mistake.push(question),
      Source::Pyq => pyq.push(question),
      Source::Ai | Source::Template | Source::Fallback => fresh.push(question),
    }
  }

  let mut result = Vec::with_capacity(count);
  let mut leftover = Vec::new();

  for (bucket, take) in [
    (&mut mistake, take_mistake),
    (&mut pyq, take_pyq),
    (&mut fresh, take_fresh),
  ] {
    let take = take.min(bucket.len());
    result.extend(bucket.drain(..take));
    leftover.append(bucket);
  }

  // floor() leaves open slots; fill them from the remaining pool
  for question in leftover {
    if result.len() >= count {
      break;
    }
    result.push(question);
  }

  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::QuestionBank;
  use crate::domain::AttemptRecord;
  use crate::storage::MemoryStorage;
  use crate::testing;
  use std::collections::HashSet;

  fn orchestrator_with(
    bank: QuestionBank,
    remote: RemoteGenerator,
  ) -> (SelectionOrchestrator, Arc<Mutex<MistakeStore>>) {
    let store = Arc::new(Mutex::new(MistakeStore::new(Box::new(MemoryStorage::new()))));
    let index = Arc::new(SimilarityIndex::build(&bank));
    let orchestrator =
      SelectionOrchestrator::new(Arc::clone(&store), index, Arc::new(remote));
    (orchestrator, store)
  }

  fn request(subject: &str, chapter: &str, count: usize, mode: PracticeMode) -> SelectionRequest {
    SelectionRequest {
      subject: subject.to_string(),
      chapter: chapter.to_string(),
      count,
      mode,
      difficulty: None,
    }
  }

  fn wrong_attempt(question_id: &str, subject: &str, chapter: &str, concept: &str) -> AttemptRecord {
    AttemptRecord::new(
      question_id.to_string(),
      subject.to_string(),
      chapter.to_string(),
      concept.to_string(),
      Source::Pyq,
      1,
      0,
      15,
      Difficulty::Medium,
      PracticeMode::Chapter,
    )
  }

  #[tokio::test]
  async fn test_result_is_unique_by_normalized_text() {
    let (orchestrator, _store) =
      orchestrator_with(QuestionBank::seeded(), RemoteGenerator::Disabled);
    let result = orchestrator
      .select(&request("Physics", "Electrostatics", 15, PracticeMode::Daily))
      .await;

    let mut keys = HashSet::new();
    for question in &result {
      assert!(
        keys.insert(question.uniqueness_key()),
        "duplicate question: {}",
        question.text
      );
    }
  }

  #[tokio::test]
  async fn test_never_empty_for_unknown_names() {
    let (orchestrator, _store) =
      orchestrator_with(QuestionBank::seeded(), RemoteGenerator::Disabled);
    let result = orchestrator
      .select(&request("Xenolinguistics", "Dialects of K'tharr", 8, PracticeMode::Daily))
      .await;

    assert_eq!(result.len(), 8);
    for question in &result {
      assert!(crate::validation::validate_question(question).is_ok());
    }
  }

  #[tokio::test]
  async fn test_zero_count_returns_empty() {
    let (orchestrator, _store) =
      orchestrator_with(QuestionBank::seeded(), RemoteGenerator::Disabled);
    let result = orchestrator
      .select(&request("Physics", "Electrostatics", 0, PracticeMode::Daily))
      .await;
    assert!(result.is_empty());
  }

  #[tokio::test]
  async fn test_reaches_floor_even_with_empty_bank() {
    let (orchestrator, _store) =
      orchestrator_with(QuestionBank::from_questions(Vec::new()), RemoteGenerator::Disabled);
    let result = orchestrator
      .select(&request("Physics", "Electrostatics", 50, PracticeMode::Mock))
      .await;
    assert!(result.len() >= config::EMERGENCY_FLOOR.min(50));
  }

  #[tokio::test]
  async fn test_mistake_resurrection() {
    let (orchestrator, store) =
      orchestrator_with(QuestionBank::seeded(), RemoteGenerator::Disabled);

    let seeded_ids: Vec<String> = {
      let bank = QuestionBank::seeded();
      bank
        .questions()
        .iter()
        .filter(|q| q.chapter == "Electrostatics")
        .take(3)
        .map(|q| q.id.clone())
        .collect()
    };
    {
      let mut store = store.lock().unwrap();
      for id in &seeded_ids {
        store.record_attempt(wrong_attempt(id, "Physics", "Electrostatics", "Coulomb Law"));
      }
    }

    let result = orchestrator
      .select(&request("Physics", "Electrostatics", 10, PracticeMode::Chapter))
      .await;

    let resurrected = result
      .iter()
      .any(|q| q.source == Source::Variant && seeded_ids.contains(&q.id));
    assert!(resurrected, "expected a mistake variant among {:?}",
      result.iter().map(|q| (q.id.clone(), q.source)).collect::<Vec<_>>());
  }

  #[tokio::test]
  async fn test_pyq_mode_mixing_floor() {
    let bank = testing::synthetic_pyq_bank("Physics", "Electrostatics", 30);
    let (orchestrator, _store) = orchestrator_with(bank, RemoteGenerator::Disabled);

    let result = orchestrator
      .select(&request("Physics", "Electrostatics", 25, PracticeMode::Pyq))
      .await;

    assert_eq!(result.len(), 25);
    let pyq_count = result.iter().filter(|q| q.source == Source::Pyq).count();
    assert!(pyq_count >= 20, "only {} PYQ-sourced of 25", pyq_count);
  }

  #[tokio::test]
  async fn test_fixed_remote_contributes_fresh_questions() {
    let remote_question = Question::new(
      "ai-fixed".to_string(),
      "Physics".to_string(),
      "Electrostatics".to_string(),
      "Coulomb Law".to_string(),
      "A remote service asks: what mediates the electrostatic interaction?".to_string(),
      vec![
        "The electric field".to_string(),
        "The strong force".to_string(),
        "Gravity".to_string(),
        "Neutrino exchange".to_string(),
      ],
      0,
      "Charges interact through the electric field they set up.".to_string(),
      Source::Ai,
      Difficulty::Medium,
    );
    let (orchestrator, _store) = orchestrator_with(
      QuestionBank::from_questions(Vec::new()),
      RemoteGenerator::Fixed(vec![remote_question]),
    );

    let result = orchestrator
      .select(&request("Physics", "Electrostatics", 10, PracticeMode::Daily))
      .await;
    assert!(result.iter().any(|q| q.source == Source::Ai));
  }

  #[tokio::test]
  async fn test_exposure_retires_overexposed_question() {
    let bank = testing::synthetic_pyq_bank("Physics", "Tiny", 1);
    let only_id = bank.questions()[0].id.clone();
    let (orchestrator, _store) = orchestrator_with(bank, RemoteGenerator::Disabled);
    let req = request("Physics", "Tiny", 1, PracticeMode::Pyq);

    // Served up to the cap, then retired
    let mut servings = 0;
    for _ in 0..config::EXPOSURE_CAP {
      let result = orchestrator.select(&req).await;
      if result.iter().any(|q| q.id == only_id) {
        servings += 1;
      }
    }
    assert_eq!(servings, config::EXPOSURE_CAP as usize);

    let result = orchestrator.select(&req).await;
    assert!(
      !result.iter().any(|q| q.id == only_id),
      "retired question was served again"
    );
    // Still never empty
    assert!(!result.is_empty());
  }

  #[tokio::test]
  async fn test_options_finalized_with_valid_answer_key() {
    let (orchestrator, _store) =
      orchestrator_with(QuestionBank::seeded(), RemoteGenerator::Disabled);
    let result = orchestrator
      .select(&request("Chemistry", "Chemical Bonding", 6, PracticeMode::Chapter))
      .await;

    for question in &result {
      assert_eq!(question.options.len(), config::OPTION_COUNT);
      assert!(question.correct_option < config::OPTION_COUNT);
      assert!(!question.correct_text().is_empty());
    }
  }

  // rebalance

  #[test]
  fn test_rebalance_enforces_bucket_floors() {
    let mix = config::mode_mix(PracticeMode::Pyq);
    let mut picked = Vec::new();
    for i in 0..5 {
      let mut q = testing::plain_question(&format!("m{}", i), "Physics", "C");
      q.source = Source::Variant;
      picked.push(q);
    }
    for i in 0..25 {
      let mut q = testing::plain_question(&format!("p{}", i), "Physics", "C");
      q.source = Source::Pyq;
      picked.push(q);
    }

    let result = rebalance(picked, 25, mix);
    assert_eq!(result.len(), 25);
    let pyq_count = result.iter().filter(|q| q.source == Source::Pyq).count();
    assert!(pyq_count >= 20);
  }

  #[test]
  fn test_rebalance_backfills_short_buckets() {
    let mix = config::mode_mix(PracticeMode::Daily);
    // Only fresh questions available; floors for other buckets go unfilled
    let picked: Vec<Question> = (0..10)
      .map(|i| {
        let mut q = testing::plain_question(&format!("f{}", i), "Physics", "C");
        q.source = Source::Template;
        q
      })
      .collect();

    let result = rebalance(picked, 10, mix);
    assert_eq!(result.len(), 10);
  }
}
