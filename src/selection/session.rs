//! Call-scoped uniqueness tracking for one assembled quiz session.

use std::collections::HashSet;

use crate::domain::Question;

/// Set of question keys already admitted into the current session.
///
/// Lives only for one selection call; exposure-based retirement across
/// sessions is handled separately by the durable exposure counters.
#[derive(Debug, Default)]
pub struct SessionSet {
  seen: HashSet<String>,
  rejected: u32,
}

impl SessionSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Admit a question if its normalized key is new. Duplicates are
  /// rejected and counted.
  pub fn try_admit(&mut self, question: &Question) -> bool {
    if self.seen.insert(question.uniqueness_key()) {
      true
    } else {
      self.rejected += 1;
      tracing::debug!("Duplicate question rejected: {}", question.id);
      false
    }
  }

  pub fn contains(&self, question: &Question) -> bool {
    self.seen.contains(&question.uniqueness_key())
  }

  pub fn admitted(&self) -> usize {
    self.seen.len()
  }

  pub fn rejected(&self) -> u32 {
    self.rejected
  }
}
