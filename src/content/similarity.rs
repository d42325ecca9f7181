//! Concept-similarity lookups over the question bank.
//!
//! The index is built once from the bank and never mutated at runtime.
//! `find_similar` answers "published questions near concept X" with a
//! three-tier fallback: exact concept, related concept (static keyword
//! table), then same chapter regardless of concept.

use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

use crate::domain::{Difficulty, Question};

use super::bank::QuestionBank;

// ============================================================================
// Concept keyword table
// ============================================================================

/// Keywords describing each known concept. Two concepts are related when
/// they share a keyword, or one concept's name appears in the other's
/// keyword list.
static CONCEPT_KEYWORDS: &[(&str, &[&str])] = &[
    ("coulomb law", &["charge", "force", "inverse square", "electrostatics"]),
    ("electric field", &["charge", "field lines", "gauss", "force"]),
    ("gauss law", &["flux", "field lines", "charge enclosed", "electrostatics"]),
    ("electric potential", &["charge", "work", "equipotential", "electrostatics"]),
    ("capacitance", &["charge", "dielectric", "plates", "energy storage"]),
    ("ohm's law", &["current", "resistance", "voltage"]),
    ("kirchhoff laws", &["current", "voltage", "junction", "loop"]),
    ("resistivity", &["resistance", "temperature", "conductor"]),
    ("cells and emf", &["voltage", "internal resistance", "current"]),
    ("refraction", &["light", "lens", "snell", "optics"]),
    ("total internal reflection", &["light", "critical angle", "optics"]),
    ("lens formula", &["lens", "image", "focal length", "optics"]),
    ("dispersion", &["light", "prism", "wavelength", "optics"]),
    ("hybridisation", &["orbital", "bond", "geometry"]),
    ("vsepr theory", &["geometry", "bond", "lone pair"]),
    ("bond order", &["bond", "molecular orbital", "electrons"]),
    ("dipole moment", &["bond", "polarity", "geometry"]),
    ("le chatelier principle", &["equilibrium", "pressure", "temperature"]),
    ("equilibrium constant", &["equilibrium", "temperature", "reaction"]),
    ("ionic equilibrium", &["equilibrium", "ph", "dissociation"]),
    ("differentiation", &["calculus", "slope", "derivative"]),
    ("integration", &["calculus", "area", "antiderivative"]),
    ("limits", &["calculus", "approach", "continuity"]),
    ("current affairs", &["news", "summit", "mission", "awards"]),
    ("awards", &["news", "prize", "current affairs"]),
];

fn keywords_for(concept: &str) -> &'static [&'static str] {
    let needle = concept.to_lowercase();
    CONCEPT_KEYWORDS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

/// Whether two concept names are related per the keyword table
pub fn concepts_related(a: &str, b: &str) -> bool {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    if a_lower == b_lower {
        return true;
    }

    let a_keywords = keywords_for(&a_lower);
    let b_keywords = keywords_for(&b_lower);

    // Shared keyword
    if a_keywords.iter().any(|kw| b_keywords.contains(kw)) {
        return true;
    }

    // One concept's name appears in the other's keyword list
    a_keywords.iter().any(|kw| kw.contains(&b_lower) || b_lower.contains(kw))
        || b_keywords.iter().any(|kw| kw.contains(&a_lower) || a_lower.contains(kw))
}

// ============================================================================
// Index
// ============================================================================

pub struct SimilarityIndex {
    questions: Vec<Question>,
    by_subject: HashMap<String, Vec<usize>>,
    by_concept: HashMap<String, Vec<usize>>,
    by_year: HashMap<u16, Vec<usize>>,
    by_difficulty: HashMap<Difficulty, Vec<usize>>,
}

impl SimilarityIndex {
    /// Build the index from a bank. Called once; the index is read-only.
    pub fn build(bank: &QuestionBank) -> Self {
        let questions: Vec<Question> = bank.questions().to_vec();
        let mut by_subject: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_concept: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_year: HashMap<u16, Vec<usize>> = HashMap::new();
        let mut by_difficulty: HashMap<Difficulty, Vec<usize>> = HashMap::new();

        for (i, question) in questions.iter().enumerate() {
            by_subject
                .entry(question.subject.to_lowercase())
                .or_default()
                .push(i);
            by_concept
                .entry(question.concept.to_lowercase())
                .or_default()
                .push(i);
            if let Some(year) = question.year {
                by_year.entry(year).or_default().push(i);
            }
            by_difficulty.entry(question.difficulty).or_default().push(i);
        }

        Self {
            questions,
            by_subject,
            by_concept,
            by_year,
            by_difficulty,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// All published questions for a (subject, chapter) scope
    pub fn questions_for_chapter(&self, subject: &str, chapter: &str) -> Vec<Question> {
        let chapter_lower = chapter.to_lowercase();
        self.subject_indices(subject)
            .iter()
            .map(|&i| &self.questions[i])
            .filter(|q| q.chapter.to_lowercase() == chapter_lower)
            .cloned()
            .collect()
    }

    /// Published questions of one difficulty within a subject
    pub fn questions_for_difficulty(&self, subject: &str, difficulty: Difficulty) -> Vec<Question> {
        let subject_lower = subject.to_lowercase();
        self.by_difficulty
            .get(&difficulty)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &self.questions[i])
                    .filter(|q| q.subject.to_lowercase() == subject_lower)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Published questions from one exam year
    pub fn questions_for_year(&self, year: u16) -> Vec<Question> {
        self.by_year
            .get(&year)
            .map(|indices| indices.iter().map(|&i| self.questions[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Find published questions similar to `concept` within a subject.
    ///
    /// Three tiers, each uniformly shuffled, deduplicated across tiers by
    /// (subject, chapter, text prefix): exact concept match, related
    /// concept match, then anything from the same chapter.
    pub fn find_similar(
        &self,
        subject: &str,
        chapter: &str,
        concept: &str,
        limit: usize,
    ) -> Vec<Question> {
        if limit == 0 {
            return Vec::new();
        }

        let concept_lower = concept.to_lowercase();
        let subject_indices = self.subject_indices(subject);

        // Tier 1: exact concept match (or bank concept containing the query)
        let exact: Vec<usize> = subject_indices
            .iter()
            .copied()
            .filter(|&i| {
                let c = self.questions[i].concept.to_lowercase();
                c == concept_lower || c.contains(&concept_lower)
            })
            .collect();

        // Tier 2: related concepts per the keyword table
        let related: Vec<usize> = subject_indices
            .iter()
            .copied()
            .filter(|&i| !exact.contains(&i))
            .filter(|&i| concepts_related(&self.questions[i].concept, concept))
            .collect();

        // Tier 3: same chapter regardless of concept
        let chapter_lower = chapter.to_lowercase();
        let same_chapter: Vec<usize> = subject_indices
            .iter()
            .copied()
            .filter(|&i| !exact.contains(&i) && !related.contains(&i))
            .filter(|&i| self.questions[i].chapter.to_lowercase() == chapter_lower)
            .collect();

        let mut rng = rand::rng();
        let mut result = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for tier in [exact, related, same_chapter] {
            let mut tier = tier;
            tier.shuffle(&mut rng);
            for i in tier {
                let question = &self.questions[i];
                if !seen.insert(question.dedup_key()) {
                    continue;
                }
                result.push(question.clone());
                if result.len() >= limit {
                    return result;
                }
            }
        }

        result
    }

    fn subject_indices(&self, subject: &str) -> &[usize] {
        self.by_subject
            .get(&subject.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
