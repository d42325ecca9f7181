//! Question content: the published bank, similarity lookups over it, and
//! local generation.
//!
//! - **bank**: seeded PYQs plus optional JSON extension, read-only after load
//! - **similarity**: concept-similarity index built once from the bank
//! - **templates**: hand-authored skeletons for local generation
//! - **generator**: the never-fail-empty question factory

pub mod bank;
pub mod generator;
pub mod similarity;
pub mod templates;

pub use bank::QuestionBank;
pub use generator::QuestionGenerator;
pub use similarity::SimilarityIndex;
