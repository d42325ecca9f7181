//! Test utilities shared across module tests.
//!
//! Provides storage-backed store setup and synthetic question banks,
//! eliminating fixture duplication in test code.

use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::content::QuestionBank;
use crate::domain::{Difficulty, Question, Source};
use crate::storage::SqliteStorage;
use crate::store::MistakeStore;

/// Test environment with a SQLite-backed mistake store in a temp directory.
///
/// The temporary directory is kept alive for the lifetime of the
/// environment, ensuring automatic cleanup when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Store over real SQLite storage
    pub store: Arc<Mutex<MistakeStore>>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let storage =
            SqliteStorage::open(&temp.path().join("store.db")).expect("sqlite storage");
        let store = Arc::new(Mutex::new(MistakeStore::new(Box::new(storage))));
        Self { temp, store }
    }
}

/// A minimal valid question for structural tests
pub fn plain_question(id: &str, subject: &str, chapter: &str) -> Question {
    Question::new(
        id.to_string(),
        subject.to_string(),
        chapter.to_string(),
        "General".to_string(),
        format!("Structured question body for {}", id),
        vec![
            format!("First choice for {}", id),
            format!("Second choice for {}", id),
            format!("Third choice for {}", id),
            format!("Fourth choice for {}", id),
        ],
        0,
        "A short explanation.".to_string(),
        Source::Template,
        Difficulty::Medium,
    )
}

/// A bank of `n` distinct published questions in one chapter, cycling
/// through concepts, years and difficulties.
pub fn synthetic_pyq_bank(subject: &str, chapter: &str, n: usize) -> QuestionBank {
    let concepts = ["Concept Alpha", "Concept Beta", "Concept Gamma"];
    let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    let questions: Vec<Question> = (0..n)
        .map(|i| {
            let mut question = Question::new(
                format!("pyq-syn-{}", i),
                subject.to_string(),
                chapter.to_string(),
                concepts[i % concepts.len()].to_string(),
                format!("Published question number {} on {}?", i, chapter),
                vec![
                    format!("Right answer {}", i),
                    format!("Near miss {}", i),
                    format!("Common confusion {}", i),
                    format!("Unrelated claim {}", i),
                ],
                0,
                format!("Item {} tests {}.", i, concepts[i % concepts.len()]),
                Source::Pyq,
                difficulties[i % difficulties.len()],
            );
            question.year = Some(2020 + (i % 5) as u16);
            question
        })
        .collect();

    QuestionBank::from_questions(questions)
}
