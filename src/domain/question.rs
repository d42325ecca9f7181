use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "easy" => Some(Self::Easy),
      "medium" => Some(Self::Medium),
      "hard" => Some(Self::Hard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Medium => "medium",
      Self::Hard => "hard",
    }
  }
}

/// Where a question came from. Attempt records carry this so PYQ mistakes
/// can be aggregated separately from generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
  /// Previously-published exam question
  Pyq,
  /// Remote AI generator
  Ai,
  /// Local template
  Template,
  /// Emergency fallback generation
  Fallback,
  /// Variation of a previously-missed question
  Variant,
}

impl Source {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "pyq" => Some(Self::Pyq),
      "ai" => Some(Self::Ai),
      "template" => Some(Self::Template),
      "fallback" => Some(Self::Fallback),
      "variant" => Some(Self::Variant),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pyq => "pyq",
      Self::Ai => "ai",
      Self::Template => "template",
      Self::Fallback => "fallback",
      Self::Variant => "variant",
    }
  }
}

/// Practice mode selects the mistake/pyq/fresh mixing ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
  Daily,
  Chapter,
  Pyq,
  Mock,
}

impl PracticeMode {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "daily" => Some(Self::Daily),
      "chapter" => Some(Self::Chapter),
      "pyq" => Some(Self::Pyq),
      "mock" => Some(Self::Mock),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Daily => "daily",
      Self::Chapter => "chapter",
      Self::Pyq => "pyq",
      Self::Mock => "mock",
    }
  }
}

/// A multiple-choice question with exactly four options.
///
/// Option order is not meaningful until the selection pipeline finalizes it;
/// `correct_option` always indexes into `options` as currently ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub subject: String,
  pub chapter: String,
  pub concept: String,
  pub text: String,
  pub options: Vec<String>,
  pub correct_option: usize,
  pub explanation: String,
  pub source: Source,
  pub difficulty: Difficulty,
  pub is_pyq: bool,
  pub year: Option<u16>,
}

impl Question {
  pub fn new(
    id: String,
    subject: String,
    chapter: String,
    concept: String,
    text: String,
    options: Vec<String>,
    correct_option: usize,
    explanation: String,
    source: Source,
    difficulty: Difficulty,
  ) -> Self {
    Self {
      id,
      subject,
      chapter,
      concept,
      text,
      options,
      correct_option,
      explanation,
      source,
      difficulty,
      is_pyq: source == Source::Pyq,
      year: None,
    }
  }

  /// Text of the currently-correct option
  pub fn correct_text(&self) -> &str {
    self
      .options
      .get(self.correct_option)
      .map(|s| s.as_str())
      .unwrap_or("")
  }

  /// Key identifying this question within one selection call.
  ///
  /// Two questions with the same normalized text in the same
  /// subject/chapter/concept scope are the same question, regardless of id
  /// or option order.
  pub fn uniqueness_key(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(&self.text));
    hasher.update("\x1f");
    hasher.update(self.subject.to_lowercase());
    hasher.update("\x1f");
    hasher.update(self.chapter.to_lowercase());
    hasher.update("\x1f");
    hasher.update(self.concept.to_lowercase());
    hex::encode(hasher.finalize())
  }

  /// Composite key for bank-level dedup: scope plus the first 50 chars of text
  pub fn dedup_key(&self) -> String {
    let prefix: String = self.text.chars().take(50).collect();
    format!("{}::{}::{}", self.subject, self.chapter, prefix)
  }
}

/// Normalize question text for uniqueness hashing: NFC, lowercased,
/// whitespace collapsed.
pub fn normalize_text(text: &str) -> String {
  text
    .nfc()
    .collect::<String>()
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}
