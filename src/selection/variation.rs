//! Variation of previously-missed questions.
//!
//! Repetition fatigue is fought two ways: superficial text substitution so
//! a re-served question reads differently while testing the same concept,
//! and durable exposure counters that retire questions shown too often.
//! Option order is reshuffled only for questions seen across several
//! sessions, always relocating the correct option by value.

use crate::config;
use crate::domain::{Question, Source};
use crate::store::ExposureCounters;

use super::shuffle::shuffle_options;

/// Descriptive metadata: how far a question has drifted from its original
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationLevel {
  Minimal,
  Moderate,
  Significant,
  Maximum,
}

impl VariationLevel {
  pub fn for_sessions(sessions_since_first_seen: u32) -> Self {
    match sessions_since_first_seen {
      0..=1 => Self::Minimal,
      2..=3 => Self::Moderate,
      4..=7 => Self::Significant,
      _ => Self::Maximum,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Minimal => "minimal",
      Self::Moderate => "moderate",
      Self::Significant => "significant",
      Self::Maximum => "maximum",
    }
  }
}

// Substitution tables. Pairs are applied left-to-right on the first match;
// spaced forms avoid clobbering substrings inside other words.

static UNIT_SWAPS: &[(&str, &str)] = &[
  (" cm", " mm"),
  (" km", " m"),
  (" minutes", " seconds"),
  (" hours", " minutes"),
  (" grams", " kilograms"),
];

static COMPOUND_SWAPS: &[(&str, &str)] = &[
  ("H2SO4", "HNO3"),
  ("NaCl", "KCl"),
  ("CH4", "C2H6"),
  ("CO2", "SO2"),
  ("NH3", "PH3"),
];

static CONTEXT_SWAPS: &[(&str, &str)] = &[
  ("a car", "a train"),
  ("a ball", "a stone"),
  ("a wire", "a rod"),
  ("a coin", "a token"),
  ("water", "glycerine"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct VariationEngine;

impl VariationEngine {
  pub fn new() -> Self {
    Self
  }

  /// Produce a superficially different, concept-equivalent variant.
  ///
  /// The text is rewritten by subject-specific substitution; options are
  /// reshuffled (value-preserving) only once the question has been seen
  /// across more than `OPTION_RESHUFFLE_SESSIONS` sessions.
  pub fn vary(&self, question: &Question, sessions_since_first_seen: u32) -> Question {
    let mut varied = question.clone();
    varied.text = vary_text(&question.subject, &question.concept, &question.text);
    varied.source = Source::Variant;

    if sessions_since_first_seen > config::OPTION_RESHUFFLE_SESSIONS {
      shuffle_options(&mut varied);
    }

    varied
  }

  /// Drop questions whose exposure counter reached the cap for this scope,
  /// and charge one exposure to every survivor.
  pub fn filter_overexposed(
    &self,
    questions: Vec<Question>,
    counters: &mut ExposureCounters,
  ) -> Vec<Question> {
    let mut kept = Vec::with_capacity(questions.len());
    for question in questions {
      if counters.is_retired(&question.id) {
        tracing::debug!("Question '{}' retired by exposure cap", question.id);
        continue;
      }
      counters.record_shown(&question.id);
      kept.push(question);
    }
    kept
  }
}

fn vary_text(subject: &str, concept: &str, text: &str) -> String {
  let subject_lower = subject.to_lowercase();
  let concept_lower = concept.to_lowercase();

  if concept_lower.contains("current affairs") || subject_lower == "general test" {
    return apply_first_swap(&bump_years(text), CONTEXT_SWAPS);
  }

  match subject_lower.as_str() {
    "physics" | "mathematics" => {
      let scaled = scale_numbers(text);
      apply_first_swap(&apply_first_swap(&scaled, UNIT_SWAPS), CONTEXT_SWAPS)
    }
    "chemistry" => apply_first_swap(&scale_numbers(text), COMPOUND_SWAPS),
    _ => apply_first_swap(text, CONTEXT_SWAPS),
  }
}

/// Apply the first pair from `swaps` whose left side occurs in the text
fn apply_first_swap(text: &str, swaps: &[(&str, &str)]) -> String {
  for (from, to) in swaps {
    if text.contains(from) {
      return text.replace(from, to);
    }
  }
  text.to_string()
}

/// Double small integer tokens, leaving calendar years alone
fn scale_numbers(text: &str) -> String {
  text
    .split_whitespace()
    .map(|token| {
      let trimmed = token.trim_end_matches(['.', ',', '?', ';', ':']);
      let suffix = &token[trimmed.len()..];
      match trimmed.parse::<i64>() {
        Ok(n) if !(1900..=2099).contains(&n) && n.abs() < 10_000 => {
          format!("{}{}", n * 2, suffix)
        }
        _ => token.to_string(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Advance calendar-year tokens by one
fn bump_years(text: &str) -> String {
  text
    .split_whitespace()
    .map(|token| {
      let trimmed = token.trim_end_matches(['.', ',', '?', ';', ':']);
      let suffix = &token[trimmed.len()..];
      match trimmed.parse::<i64>() {
        Ok(n) if (1900..=2099).contains(&n) => format!("{}{}", n + 1, suffix),
        _ => token.to_string(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}
