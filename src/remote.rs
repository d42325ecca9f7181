//! Remote question-generation client.
//!
//! The remote service is strictly best-effort: the orchestrator treats any
//! failure here as an empty generation layer and moves on. A deployment
//! without an endpoint configured runs with the client disabled.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::content::generator::content_id;
use crate::domain::{Difficulty, Question, Source};
use crate::validation;

/// Error from the remote generation service
#[derive(Debug)]
pub enum RemoteError {
    Http(String),
    Malformed(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Http(e) => write!(f, "remote generator HTTP error: {}", e),
            RemoteError::Malformed(e) => write!(f, "remote generator malformed response: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    subject: &'a str,
    chapter: &'a str,
    concept_hint: &'a str,
    count: usize,
    difficulty: &'a str,
}

/// One question as the remote service reports it
#[derive(Debug, Deserialize)]
struct RemoteQuestion {
    #[serde(alias = "question")]
    text: String,
    options: Vec<String>,
    correct_option: usize,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    concept: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    questions: Vec<RemoteQuestion>,
}

pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGenerator {
    pub fn new(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, endpoint }
    }
}

/// The remote generator as seen by the orchestrator
pub enum RemoteGenerator {
    /// No endpoint configured; generates nothing
    Disabled,
    /// Live HTTP service
    Http(HttpGenerator),
    /// Canned responses for tests and offline development
    Fixed(Vec<Question>),
}

impl RemoteGenerator {
    pub fn from_endpoint(endpoint: Option<String>) -> Self {
        match endpoint {
            Some(endpoint) => {
                tracing::info!("Remote question generator at {}", endpoint);
                Self::Http(HttpGenerator::new(endpoint))
            }
            None => {
                tracing::info!("Remote question generator disabled");
                Self::Disabled
            }
        }
    }

    /// Ask the remote service for questions. Invalid items are dropped;
    /// callers may receive fewer than `count`, including zero.
    pub async fn generate(
        &self,
        subject: &str,
        chapter: &str,
        concept_hint: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, RemoteError> {
        match self {
            Self::Disabled => Ok(Vec::new()),
            Self::Fixed(questions) => Ok(validation::retain_valid(
                questions.iter().take(count).cloned().collect(),
            )),
            Self::Http(http) => {
                let request = GenerateRequest {
                    subject,
                    chapter,
                    concept_hint,
                    count,
                    difficulty: difficulty.as_str(),
                };

                let response = http
                    .client
                    .post(&http.endpoint)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| RemoteError::Http(e.to_string()))?
                    .error_for_status()
                    .map_err(|e| RemoteError::Http(e.to_string()))?;

                let body: GenerateResponse = response
                    .json()
                    .await
                    .map_err(|e| RemoteError::Malformed(e.to_string()))?;

                let questions = body
                    .questions
                    .into_iter()
                    .map(|rq| into_question(rq, subject, chapter, concept_hint, difficulty))
                    .collect();

                Ok(validation::retain_valid(questions))
            }
        }
    }
}

fn into_question(
    remote: RemoteQuestion,
    subject: &str,
    chapter: &str,
    concept_hint: &str,
    difficulty: Difficulty,
) -> Question {
    let concept = remote
        .concept
        .unwrap_or_else(|| concept_hint.to_string());
    Question::new(
        content_id("ai", subject, chapter, &remote.text),
        subject.to_string(),
        chapter.to_string(),
        concept,
        remote.text,
        remote.options,
        remote.correct_option,
        remote.explanation,
        Source::Ai,
        difficulty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canned_question() -> Question {
        Question::new(
            "ai-1".to_string(),
            "Physics".to_string(),
            "Electrostatics".to_string(),
            "Coulomb Law".to_string(),
            "Which quantity does Coulomb's law relate to separation distance?".to_string(),
            vec![
                "Electrostatic force".to_string(),
                "Magnetic flux".to_string(),
                "Inductance".to_string(),
                "Capacitive reactance".to_string(),
            ],
            0,
            "Coulomb's law gives the force between charges as a function of distance.".to_string(),
            Source::Ai,
            Difficulty::Medium,
        )
    }

    #[tokio::test]
    async fn test_disabled_generates_nothing() {
        let generator = RemoteGenerator::Disabled;
        let questions = generator
            .generate("Physics", "Electrostatics", "Coulomb Law", 5, Difficulty::Medium)
            .await
            .unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_fixed_respects_count_and_validation() {
        let mut invalid = canned_question();
        invalid.options.pop();
        let generator = RemoteGenerator::Fixed(vec![canned_question(), invalid]);

        let questions = generator
            .generate("Physics", "Electrostatics", "Coulomb Law", 5, Difficulty::Medium)
            .await
            .unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_remote_payload_parsing() {
        let json = r#"{
            "questions": [{
                "question": "Which unit measures charge?",
                "options": ["coulomb", "volt", "ampere", "ohm"],
                "correct_option": 0,
                "explanation": "Charge is measured in coulombs."
            }]
        }"#;

        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.questions.len(), 1);

        let question = into_question(
            parsed.questions.into_iter().next().unwrap(),
            "Physics",
            "Electrostatics",
            "Charge",
            Difficulty::Easy,
        );
        assert_eq!(question.source, Source::Ai);
        assert_eq!(question.concept, "Charge");
        assert!(crate::validation::validate_question(&question).is_ok());
    }

    #[test]
    fn test_missing_explanation_rejected_by_validation() {
        let json = r#"{
            "questions": [{
                "text": "Which unit measures charge?",
                "options": ["coulomb", "volt", "ampere", "ohm"],
                "correct_option": 0
            }]
        }"#;

        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let question = into_question(
            parsed.questions.into_iter().next().unwrap(),
            "Physics",
            "Electrostatics",
            "Charge",
            Difficulty::Easy,
        );
        assert!(crate::validation::validate_question(&question).is_err());
    }
}
