//! Hand-authored question skeletons.
//!
//! Three tiers, tried in order by the generator: chapter-specific
//! skeletons, concept-keyed realistic skeletons, and the emergency
//! synthesizer that can label any concept name. Skeletons carry the
//! correct answer and distractors separately; option order is decided at
//! generation time by the value-preserving shuffle.

/// A parameterized question skeleton
#[derive(Debug, Clone, Copy)]
pub struct QuestionSkeleton {
    pub concept: &'static str,
    pub text: &'static str,
    pub correct: &'static str,
    pub distractors: [&'static str; 3],
    pub explanation: &'static str,
}

// ============================================================================
// Chapter-specific skeletons
// ============================================================================

static PHYSICS_ELECTROSTATICS: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Coulomb Law",
        text: "Two point charges attract each other with force F. If the distance between them is halved, the new force is",
        correct: "4F",
        distractors: ["2F", "F/2", "F/4"],
        explanation: "Coulomb force varies as the inverse square of separation, so halving the distance quadruples the force.",
    },
    QuestionSkeleton {
        concept: "Electric Field",
        text: "The SI unit of electric field intensity is",
        correct: "newton per coulomb",
        distractors: ["coulomb per newton", "joule per coulomb", "volt coulomb"],
        explanation: "Field intensity is force per unit charge, N/C, equivalently V/m.",
    },
    QuestionSkeleton {
        concept: "Gauss Law",
        text: "The net electric flux through a closed surface enclosing a dipole is",
        correct: "zero",
        distractors: ["q/epsilon_0", "2q/epsilon_0", "infinite"],
        explanation: "A dipole encloses equal and opposite charges, so the enclosed net charge and hence the flux is zero.",
    },
    QuestionSkeleton {
        concept: "Electric Potential",
        text: "The work done in moving a charge along an equipotential surface is",
        correct: "zero",
        distractors: ["positive and constant", "negative and constant", "proportional to path length"],
        explanation: "Potential difference along an equipotential surface is zero, so no work is done against the field.",
    },
];

static PHYSICS_CURRENT_ELECTRICITY: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Ohm's Law",
        text: "A conductor carries 2 A when connected across 10 V. Its resistance is",
        correct: "5 ohm",
        distractors: ["20 ohm", "0.2 ohm", "12 ohm"],
        explanation: "R = V/I = 10/2 = 5 ohm.",
    },
    QuestionSkeleton {
        concept: "Kirchhoff Laws",
        text: "Kirchhoff's junction rule is a statement of the conservation of",
        correct: "charge",
        distractors: ["energy", "momentum", "mass"],
        explanation: "Currents into a junction must balance currents out, which is conservation of charge.",
    },
    QuestionSkeleton {
        concept: "Resistivity",
        text: "When a wire is stretched to double its length at constant volume, its resistance becomes",
        correct: "four times the original",
        distractors: ["twice the original", "half the original", "unchanged"],
        explanation: "Doubling length halves the area at constant volume; R is proportional to l/A, giving a factor of four.",
    },
];

static PHYSICS_OPTICS: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Refraction",
        text: "A ray passes from air into glass. Which quantity remains unchanged?",
        correct: "frequency",
        distractors: ["wavelength", "speed", "direction"],
        explanation: "Frequency is set by the source; speed and wavelength change with the medium.",
    },
    QuestionSkeleton {
        concept: "Total Internal Reflection",
        text: "Total internal reflection can occur only when light travels",
        correct: "from a denser to a rarer medium",
        distractors: [
            "from a rarer to a denser medium",
            "along the normal",
            "through media of equal refractive index",
        ],
        explanation: "Beyond the critical angle in the denser medium, the ray reflects entirely back.",
    },
    QuestionSkeleton {
        concept: "Lens Formula",
        text: "A convex lens of focal length 20 cm forms a real image at 60 cm. The object distance is",
        correct: "30 cm",
        distractors: ["15 cm", "40 cm", "60 cm"],
        explanation: "1/v - 1/u = 1/f with v = 60 and f = 20 gives u = -30, an object 30 cm from the lens.",
    },
];

static CHEMISTRY_CHEMICAL_BONDING: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Hybridisation",
        text: "The hybridisation of carbon in methane is",
        correct: "sp3",
        distractors: ["sp2", "sp", "dsp2"],
        explanation: "Four equivalent sigma bonds in a tetrahedral geometry require sp3 hybridisation.",
    },
    QuestionSkeleton {
        concept: "VSEPR Theory",
        text: "According to VSEPR theory, the shape of the water molecule is",
        correct: "bent",
        distractors: ["linear", "trigonal planar", "tetrahedral"],
        explanation: "Two bond pairs and two lone pairs on oxygen give a bent geometry near 104.5 degrees.",
    },
    QuestionSkeleton {
        concept: "Bond Order",
        text: "The bond order of the nitrogen molecule N2 is",
        correct: "3",
        distractors: ["1", "2", "2.5"],
        explanation: "Molecular orbital filling for N2 leaves six bonding electrons net, bond order 3.",
    },
];

static CHEMISTRY_EQUILIBRIUM: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Le Chatelier Principle",
        text: "For an exothermic equilibrium, raising the temperature shifts the equilibrium",
        correct: "toward the reactants",
        distractors: [
            "toward the products",
            "without any shift",
            "toward whichever side has more moles",
        ],
        explanation: "Added heat favors the endothermic direction, which for an exothermic reaction is the reverse.",
    },
    QuestionSkeleton {
        concept: "Equilibrium Constant",
        text: "Adding a catalyst to a system at equilibrium",
        correct: "leaves the equilibrium constant unchanged",
        distractors: [
            "increases the equilibrium constant",
            "decreases the equilibrium constant",
            "shifts the equilibrium toward products",
        ],
        explanation: "A catalyst speeds both directions equally; K depends only on temperature.",
    },
];

static MATHEMATICS_CALCULUS: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Differentiation",
        text: "The derivative of x^3 with respect to x is",
        correct: "3x^2",
        distractors: ["x^2", "3x", "x^3/3"],
        explanation: "The power rule gives d/dx x^n = n x^(n-1).",
    },
    QuestionSkeleton {
        concept: "Integration",
        text: "The integral of 2x dx equals",
        correct: "x^2 + C",
        distractors: ["2x^2 + C", "x + C", "2 + C"],
        explanation: "An antiderivative of 2x is x^2, plus the constant of integration.",
    },
];

static GENERAL_TEST_CURRENT_AFFAIRS: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Current Affairs",
        text: "The G20 summit hosted by India took place in which city?",
        correct: "New Delhi",
        distractors: ["Mumbai", "Hyderabad", "Jaipur"],
        explanation: "India hosted the 2023 G20 leaders' summit in New Delhi.",
    },
    QuestionSkeleton {
        concept: "Current Affairs",
        text: "Chandrayaan-3 achieved a soft landing near which lunar region?",
        correct: "the south pole",
        distractors: ["the north pole", "the equatorial belt", "the far-side maria"],
        explanation: "The 2023 mission made India the first country to land near the lunar south pole.",
    },
];

/// Chapter-specific skeletons for a (subject, chapter) pair, or empty
pub fn chapter_templates(subject: &str, chapter: &str) -> &'static [QuestionSkeleton] {
    match (
        subject.to_lowercase().as_str(),
        chapter.to_lowercase().as_str(),
    ) {
        ("physics", "electrostatics") => PHYSICS_ELECTROSTATICS,
        ("physics", "current electricity") => PHYSICS_CURRENT_ELECTRICITY,
        ("physics", "optics") => PHYSICS_OPTICS,
        ("chemistry", "chemical bonding") => CHEMISTRY_CHEMICAL_BONDING,
        ("chemistry", "equilibrium") => CHEMISTRY_EQUILIBRIUM,
        ("mathematics", "calculus") => MATHEMATICS_CALCULUS,
        ("general test", "current affairs") => GENERAL_TEST_CURRENT_AFFAIRS,
        _ => &[],
    }
}

// ============================================================================
// Concept-keyed realistic skeletons
// ============================================================================

static CONCEPT_SKELETONS: &[QuestionSkeleton] = &[
    QuestionSkeleton {
        concept: "Coulomb Law",
        text: "Doubling both charges while keeping their separation fixed changes the Coulomb force by a factor of",
        correct: "4",
        distractors: ["2", "8", "1/2"],
        explanation: "Force is proportional to the product of the charges.",
    },
    QuestionSkeleton {
        concept: "Electric Field",
        text: "Electric field lines around an isolated negative charge point",
        correct: "radially inward",
        distractors: ["radially outward", "in closed loops", "tangentially"],
        explanation: "Field lines terminate on negative charges, so they point toward the charge.",
    },
    QuestionSkeleton {
        concept: "Ohm's Law",
        text: "A device whose current-voltage graph is a straight line through the origin is",
        correct: "ohmic",
        distractors: ["non-ohmic", "a semiconductor diode", "a thermistor"],
        explanation: "Constant V/I ratio at fixed temperature is the defining property of an ohmic conductor.",
    },
    QuestionSkeleton {
        concept: "Refraction",
        text: "The refractive index of a medium where light travels at 2 x 10^8 m/s is",
        correct: "1.5",
        distractors: ["0.67", "2.0", "3.0"],
        explanation: "n = c/v = (3 x 10^8)/(2 x 10^8) = 1.5.",
    },
    QuestionSkeleton {
        concept: "Hybridisation",
        text: "The hybridisation of the central atom in a molecule with two sigma bonds and no lone pairs is",
        correct: "sp",
        distractors: ["sp2", "sp3", "sp3d"],
        explanation: "Two electron domains arrange linearly, requiring sp hybridisation.",
    },
    QuestionSkeleton {
        concept: "Le Chatelier Principle",
        text: "Increasing pressure on an equilibrium with fewer moles of gas on the product side shifts it",
        correct: "toward the products",
        distractors: ["toward the reactants", "without any shift", "to a halt"],
        explanation: "The system relieves the stress by favoring the side with fewer gas moles.",
    },
    QuestionSkeleton {
        concept: "Differentiation",
        text: "The slope of the curve y = x^2 at x = 3 is",
        correct: "6",
        distractors: ["3", "9", "12"],
        explanation: "dy/dx = 2x, which evaluates to 6 at x = 3.",
    },
    QuestionSkeleton {
        concept: "Integration",
        text: "The area under y = 1 from x = 0 to x = 5 is",
        correct: "5",
        distractors: ["1", "0", "25"],
        explanation: "The region is a rectangle of height 1 and width 5.",
    },
];

/// Realistic skeleton for a concept, matched exactly or by substring
pub fn concept_template(concept: &str) -> Option<&'static QuestionSkeleton> {
    let needle = concept.to_lowercase();
    CONCEPT_SKELETONS.iter().find(|s| {
        let name = s.concept.to_lowercase();
        name == needle || name.contains(&needle) || needle.contains(&name)
    })
}

// ============================================================================
// Emergency synthesis
// ============================================================================

/// An emergency question, synthesized for any concept name
#[derive(Debug, Clone)]
pub struct EmergencyQuestion {
    pub text: String,
    pub correct: String,
    pub distractors: [String; 3],
    pub explanation: String,
}

static EMERGENCY_PATTERNS: &[&str] = &[
    "Which statement about {concept} is accurate?",
    "In the context of {chapter}, which option best characterizes {concept}?",
    "A revision exercise on {concept}: which of the following holds true?",
];

/// Synthesize a concept-labeled question. Distinct `serial` values yield
/// distinct question text, so bounded retry loops can always make progress.
pub fn emergency_question(chapter: &str, concept: &str, serial: usize) -> EmergencyQuestion {
    let pattern = EMERGENCY_PATTERNS[serial % EMERGENCY_PATTERNS.len()];
    let mut text = pattern
        .replace("{concept}", concept)
        .replace("{chapter}", chapter);
    if serial >= EMERGENCY_PATTERNS.len() {
        text.push_str(&format!(" (set {})", serial / EMERGENCY_PATTERNS.len() + 1));
    }

    EmergencyQuestion {
        text,
        correct: format!(
            "{} behaves as described in the standard treatment of {}",
            concept, chapter
        ),
        distractors: [
            format!("{} applies only under conditions never met in practice", concept),
            format!("{} is unrelated to the rest of {}", concept, chapter),
            format!("{} changes its definition from problem to problem", concept),
        ],
        explanation: format!(
            "Revision item for {}: review the defining statement of this concept in {}.",
            concept, chapter
        ),
    }
}
