//! The previously-published question bank.
//!
//! Seeded with a built-in set of CUET-style PYQs and optionally extended
//! from a JSON file. The bank is read-only after load; the similarity
//! index is built from it once at startup.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::domain::{Difficulty, Question, Source};
use crate::validation;

/// All published questions known to the system
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// The built-in seed bank
    pub fn seeded() -> Self {
        Self {
            questions: seed_questions(),
        }
    }

    /// Build a bank from explicit questions (tests, custom deployments)
    pub fn from_questions(questions: Vec<Question>) -> Self {
        let mut bank = Self::default();
        bank.merge(questions);
        bank
    }

    /// Seed bank plus an optional extra JSON file. Invalid file entries are
    /// logged and skipped; a missing or unreadable file leaves the seed
    /// bank intact.
    pub fn load(extra_path: Option<&Path>) -> Self {
        let mut bank = Self::seeded();

        if let Some(path) = extra_path {
            match load_bank_file(path) {
                Ok(extra) => {
                    let before = bank.len();
                    bank.merge(extra);
                    tracing::info!(
                        "Loaded {} extra bank questions from {}",
                        bank.len() - before,
                        path.display()
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to load bank file {}: {}", path.display(), e);
                }
            }
        }

        bank
    }

    /// Add questions, dropping invalid entries and duplicates
    fn merge(&mut self, questions: Vec<Question>) {
        for question in validation::retain_valid(questions) {
            let key = question.dedup_key();
            if self.questions.iter().any(|q| q.dedup_key() == key) {
                tracing::debug!("Skipping duplicate bank question '{}'", question.id);
                continue;
            }
            self.questions.push(question);
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn by_id(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Error loading an extra bank file
#[derive(Debug)]
pub enum BankLoadError {
    IoError(String),
    ParseError(String),
}

impl std::fmt::Display for BankLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BankLoadError::IoError(e) => write!(f, "IO error: {}", e),
            BankLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for BankLoadError {}

/// Load questions from a JSON file containing an array of Question objects
fn load_bank_file(path: &Path) -> Result<Vec<Question>, BankLoadError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| BankLoadError::IoError(e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| BankLoadError::ParseError(format!("{}: {}", path.display(), e)))
}

// Helper to build a seeded PYQ with a content-derived id
#[allow(clippy::too_many_arguments)]
fn pyq(
    subject: &str,
    chapter: &str,
    concept: &str,
    year: u16,
    difficulty: Difficulty,
    text: &str,
    options: [&str; 4],
    correct: usize,
    explanation: &str,
) -> Question {
    let mut hasher = Sha256::new();
    hasher.update(subject);
    hasher.update(chapter);
    hasher.update(text);
    let digest = hex::encode(hasher.finalize());

    let mut question = Question::new(
        format!("pyq-{}", &digest[..12]),
        subject.to_string(),
        chapter.to_string(),
        concept.to_string(),
        text.to_string(),
        options.iter().map(|s| s.to_string()).collect(),
        correct,
        explanation.to_string(),
        Source::Pyq,
        difficulty,
    );
    question.year = Some(year);
    question
}

fn seed_questions() -> Vec<Question> {
    use Difficulty::{Easy, Hard, Medium};

    vec![
        // Physics: Electrostatics
        pyq(
            "Physics", "Electrostatics", "Coulomb Law", 2022, Medium,
            "Two point charges of 1 C each are kept 1 m apart in vacuum. The magnitude of the force between them is",
            ["9 x 10^9 N", "1 N", "9 x 10^-9 N", "3 x 10^8 N"],
            0,
            "F = k q1 q2 / r^2 with k = 9 x 10^9 N m^2 C^-2 gives 9 x 10^9 N.",
        ),
        pyq(
            "Physics", "Electrostatics", "Coulomb Law", 2023, Easy,
            "The Coulomb force between two charges acts along",
            ["the line joining the charges", "the perpendicular bisector", "a circular arc", "the direction of motion"],
            0,
            "Electrostatic force between point charges is central, directed along the line joining them.",
        ),
        pyq(
            "Physics", "Electrostatics", "Electric Field", 2021, Medium,
            "The electric field inside a charged hollow spherical conductor is",
            ["zero", "uniform and non-zero", "radially outward", "proportional to distance from centre"],
            0,
            "Charges reside on the surface; by Gauss's law the enclosed charge, and hence the interior field, is zero.",
        ),
        pyq(
            "Physics", "Electrostatics", "Gauss Law", 2022, Hard,
            "A charge q sits at one corner of a cube. The flux through the cube is",
            ["q/(8 epsilon_0)", "q/epsilon_0", "q/(4 epsilon_0)", "zero"],
            0,
            "A corner charge is shared by eight such cubes, so each cube intercepts one eighth of the total flux.",
        ),
        pyq(
            "Physics", "Electrostatics", "Electric Potential", 2023, Medium,
            "The electric potential at the midpoint between equal and opposite charges is",
            ["zero", "positive", "negative", "equal to the field there"],
            0,
            "Potentials from +q and -q cancel at the midpoint, though the field there is non-zero.",
        ),
        pyq(
            "Physics", "Electrostatics", "Capacitance", 2024, Medium,
            "Inserting a dielectric slab between the plates of an isolated charged capacitor",
            ["decreases the potential difference", "increases the charge", "decreases the capacitance", "increases the stored energy"],
            0,
            "With charge fixed, capacitance rises by the dielectric constant, so V = Q/C falls.",
        ),
        // Physics: Current Electricity
        pyq(
            "Physics", "Current Electricity", "Ohm's Law", 2021, Easy,
            "The slope of the V-I graph of an ohmic conductor gives its",
            ["resistance", "conductance", "resistivity", "power"],
            0,
            "V = IR, so the straight-line slope of V against I is R.",
        ),
        pyq(
            "Physics", "Current Electricity", "Kirchhoff Laws", 2022, Medium,
            "Kirchhoff's loop rule follows from the conservation of",
            ["energy", "charge", "current", "resistance"],
            0,
            "The sum of potential changes around a closed loop is zero because electrostatic force is conservative.",
        ),
        pyq(
            "Physics", "Current Electricity", "Resistivity", 2023, Medium,
            "The resistivity of a metallic conductor as temperature rises",
            ["increases", "decreases", "stays constant", "first falls then rises"],
            0,
            "Increased lattice vibrations scatter carriers more often, raising resistivity.",
        ),
        pyq(
            "Physics", "Current Electricity", "Cells and EMF", 2024, Hard,
            "A cell of emf 2 V and internal resistance 1 ohm drives current through a 3 ohm resistor. The terminal voltage is",
            ["1.5 V", "2 V", "0.5 V", "3 V"],
            0,
            "I = 2/4 = 0.5 A, so the terminal voltage is emf minus I r = 2 - 0.5 = 1.5 V.",
        ),
        // Physics: Optics
        pyq(
            "Physics", "Optics", "Refraction", 2021, Easy,
            "A coin at the bottom of a water tank appears raised because of",
            ["refraction", "reflection", "diffraction", "polarisation"],
            0,
            "Light bends away from the normal leaving water, so the apparent depth is less than the real depth.",
        ),
        pyq(
            "Physics", "Optics", "Total Internal Reflection", 2022, Medium,
            "Optical fibres guide light using",
            ["total internal reflection", "refraction through lenses", "interference", "scattering"],
            0,
            "Light strikes the core-cladding boundary beyond the critical angle and reflects repeatedly along the fibre.",
        ),
        pyq(
            "Physics", "Optics", "Lens Formula", 2023, Hard,
            "An object is placed at twice the focal length of a convex lens. The image formed is",
            ["real, inverted, same size", "virtual, erect, magnified", "real, inverted, magnified", "virtual, erect, diminished"],
            0,
            "At u = 2f the image forms at 2f on the other side, inverted and of equal size.",
        ),
        pyq(
            "Physics", "Optics", "Dispersion", 2024, Easy,
            "The splitting of white light into colours by a prism is called",
            ["dispersion", "diffraction", "interference", "polarisation"],
            0,
            "Refractive index varies with wavelength, so the prism deviates each colour differently.",
        ),
        // Chemistry: Chemical Bonding
        pyq(
            "Chemistry", "Chemical Bonding", "Hybridisation", 2021, Medium,
            "The hybridisation of sulphur in SF6 is",
            ["sp3d2", "sp3", "sp3d", "sp2"],
            0,
            "Six bond pairs around sulphur require six equivalent orbitals, sp3d2, in an octahedral arrangement.",
        ),
        pyq(
            "Chemistry", "Chemical Bonding", "VSEPR Theory", 2022, Easy,
            "The geometry of the ammonia molecule is",
            ["trigonal pyramidal", "trigonal planar", "tetrahedral", "bent"],
            0,
            "Three bond pairs and one lone pair on nitrogen give a trigonal pyramidal shape.",
        ),
        pyq(
            "Chemistry", "Chemical Bonding", "Bond Order", 2023, Hard,
            "Among O2, O2+ and O2-, the species with the highest bond order is",
            ["O2+", "O2", "O2-", "all equal"],
            0,
            "Removing an antibonding electron from O2 raises the bond order from 2 to 2.5.",
        ),
        pyq(
            "Chemistry", "Chemical Bonding", "Dipole Moment", 2024, Medium,
            "Carbon dioxide has zero dipole moment because",
            ["its bond dipoles cancel by symmetry", "its bonds are non-polar", "it is an ionic compound", "oxygen is less electronegative than carbon"],
            0,
            "Each C=O bond is polar, but the linear geometry makes the two dipoles cancel exactly.",
        ),
        // Chemistry: Equilibrium
        pyq(
            "Chemistry", "Equilibrium", "Le Chatelier Principle", 2021, Medium,
            "In the Haber process, the yield of ammonia is favoured by",
            ["high pressure and low temperature", "low pressure and high temperature", "high pressure and high temperature", "low pressure and low temperature"],
            0,
            "The forward reaction reduces gas moles and is exothermic, so pressure helps and excess heat hurts.",
        ),
        pyq(
            "Chemistry", "Equilibrium", "Equilibrium Constant", 2022, Easy,
            "For a reaction at equilibrium, the value of K depends on",
            ["temperature", "catalyst", "pressure", "initial concentrations"],
            0,
            "K is a function of temperature alone; other changes shift position, not the constant.",
        ),
        pyq(
            "Chemistry", "Equilibrium", "Ionic Equilibrium", 2023, Medium,
            "The pH of a 10^-3 M HCl solution is",
            ["3", "11", "1", "7"],
            0,
            "A strong acid dissociates fully, so [H+] = 10^-3 and pH = 3.",
        ),
        // Mathematics: Calculus
        pyq(
            "Mathematics", "Calculus", "Differentiation", 2022, Easy,
            "The derivative of sin x with respect to x is",
            ["cos x", "-cos x", "sin x", "-sin x"],
            0,
            "d/dx sin x = cos x.",
        ),
        pyq(
            "Mathematics", "Calculus", "Integration", 2023, Medium,
            "The value of the definite integral of x from 0 to 2 is",
            ["2", "4", "1", "0"],
            0,
            "x^2/2 evaluated from 0 to 2 gives 2.",
        ),
        pyq(
            "Mathematics", "Calculus", "Limits", 2024, Medium,
            "The limit of (sin x)/x as x approaches 0 is",
            ["1", "0", "infinity", "undefined"],
            0,
            "The standard limit (sin x)/x tends to 1 as x tends to 0.",
        ),
        // General Test: Current Affairs
        pyq(
            "General Test", "Current Affairs", "Current Affairs", 2023, Easy,
            "Which Indian mission achieved a soft landing near the Moon's south pole in 2023?",
            ["Chandrayaan-3", "Chandrayaan-2", "Mangalyaan", "Gaganyaan"],
            0,
            "Chandrayaan-3's Vikram lander touched down near the lunar south pole in August 2023.",
        ),
        pyq(
            "General Test", "Current Affairs", "Current Affairs", 2023, Medium,
            "The 2023 G20 leaders' summit under India's presidency adopted the",
            ["New Delhi Leaders' Declaration", "Mumbai Accord", "Bengaluru Communique", "Goa Resolution"],
            0,
            "The summit concluded with the New Delhi Leaders' Declaration adopted by consensus.",
        ),
        pyq(
            "General Test", "Current Affairs", "Awards", 2024, Medium,
            "The Nobel Peace Prize 2023 was awarded to",
            ["Narges Mohammadi", "Maria Ressa", "Ales Bialiatski", "Abiy Ahmed"],
            0,
            "Narges Mohammadi received the 2023 prize for her fight against the oppression of women in Iran.",
        ),
    ]
}
