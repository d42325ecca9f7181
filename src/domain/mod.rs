pub mod attempt;
pub mod mistakes;
pub mod question;

pub use attempt::AttemptRecord;
pub use mistakes::{
  scope_key, ChapterMistakeAggregate, ConceptMistakeAggregate, MistakeLedger,
  PyqMistakeAggregate, WrongQuestionRecord,
};
pub use question::{normalize_text, Difficulty, PracticeMode, Question, Source};
