//! Structural validation for questions entering the selection pipeline.
//!
//! Every question produced by the bank, the templates, the variation
//! engine, or the remote generator passes through here before it can reach
//! a learner. Placeholder option text is a hard rejection: an option that
//! reads "Option A" tests nothing.

use crate::config;
use crate::domain::Question;

// ============================================================================
// Banned phrases
// ============================================================================

/// Phrases that mark an option as placeholder filler rather than content.
/// Matched case-insensitively as substrings.
static BANNED_PHRASES: &[&str] = &[
    "option a",
    "option b",
    "option c",
    "option d",
    "correct answer",
    "incorrect option",
    "placeholder",
    "lorem ipsum",
];

/// Why a question was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFault {
    EmptyText,
    WrongOptionCount(usize),
    EmptyOption(usize),
    CorrectIndexOutOfRange(usize),
    EmptyExplanation,
    BannedPhrase(String),
}

impl std::fmt::Display for QuestionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionFault::EmptyText => write!(f, "question text is empty"),
            QuestionFault::WrongOptionCount(n) => {
                write!(f, "expected {} options, got {}", config::OPTION_COUNT, n)
            }
            QuestionFault::EmptyOption(i) => write!(f, "option {} is empty", i),
            QuestionFault::CorrectIndexOutOfRange(i) => {
                write!(f, "correct option index {} out of range", i)
            }
            QuestionFault::EmptyExplanation => write!(f, "explanation is empty"),
            QuestionFault::BannedPhrase(p) => {
                write!(f, "option contains banned phrase '{}'", p)
            }
        }
    }
}

impl std::error::Error for QuestionFault {}

/// Check a question against the acceptance criteria.
pub fn validate_question(question: &Question) -> Result<(), QuestionFault> {
    if question.text.trim().is_empty() {
        return Err(QuestionFault::EmptyText);
    }

    if question.options.len() != config::OPTION_COUNT {
        return Err(QuestionFault::WrongOptionCount(question.options.len()));
    }

    for (i, option) in question.options.iter().enumerate() {
        if option.trim().is_empty() {
            return Err(QuestionFault::EmptyOption(i));
        }
        if let Some(phrase) = find_banned_phrase(option) {
            return Err(QuestionFault::BannedPhrase(phrase.to_string()));
        }
    }

    if question.correct_option >= config::OPTION_COUNT {
        return Err(QuestionFault::CorrectIndexOutOfRange(question.correct_option));
    }

    if question.explanation.trim().is_empty() {
        return Err(QuestionFault::EmptyExplanation);
    }

    Ok(())
}

/// Returns the first banned phrase found in `text`, if any
pub fn find_banned_phrase(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    BANNED_PHRASES
        .iter()
        .find(|phrase| lowered.contains(*phrase))
        .copied()
}

/// Keep only the questions that pass validation, logging each rejection
pub fn retain_valid(questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| match validate_question(q) {
            Ok(()) => true,
            Err(fault) => {
                tracing::debug!("Rejected question '{}': {}", q.id, fault);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, Source};

    fn valid_question() -> Question {
        Question::new(
            "q1".to_string(),
            "Physics".to_string(),
            "Electrostatics".to_string(),
            "Coulomb Law".to_string(),
            "Two point charges are separated by 2 m. What happens to the force if the distance doubles?".to_string(),
            vec![
                "It becomes one fourth".to_string(),
                "It halves".to_string(),
                "It doubles".to_string(),
                "It quadruples".to_string(),
            ],
            0,
            "Coulomb force follows an inverse-square law in distance.".to_string(),
            Source::Pyq,
            Difficulty::Medium,
        )
    }

    #[test]
    fn test_valid_question_passes() {
        assert!(validate_question(&valid_question()).is_ok());
    }

    #[test]
    fn test_rejects_wrong_option_count() {
        let mut q = valid_question();
        q.options.pop();
        assert_eq!(
            validate_question(&q),
            Err(QuestionFault::WrongOptionCount(3))
        );
    }

    #[test]
    fn test_rejects_out_of_range_correct_index() {
        let mut q = valid_question();
        q.correct_option = 4;
        assert_eq!(
            validate_question(&q),
            Err(QuestionFault::CorrectIndexOutOfRange(4))
        );
    }

    #[test]
    fn test_rejects_empty_explanation() {
        let mut q = valid_question();
        q.explanation = "  ".to_string();
        assert_eq!(validate_question(&q), Err(QuestionFault::EmptyExplanation));
    }

    #[test]
    fn test_rejects_placeholder_options() {
        for bad in ["Option A", "This is the correct answer", "An incorrect option"] {
            let mut q = valid_question();
            q.options[2] = bad.to_string();
            assert!(
                matches!(validate_question(&q), Err(QuestionFault::BannedPhrase(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_banned_phrase_is_case_insensitive() {
        assert_eq!(find_banned_phrase("OPTION A"), Some("option a"));
        assert_eq!(find_banned_phrase("The CORRECT Answer here"), Some("correct answer"));
        assert_eq!(find_banned_phrase("Momentum is conserved"), None);
    }

    #[test]
    fn test_retain_valid_drops_only_bad_items() {
        let mut bad = valid_question();
        bad.options[0] = "Option A".to_string();
        let kept = retain_valid(vec![valid_question(), bad]);
        assert_eq!(kept.len(), 1);
    }
}
