//! Built-in header patterns and canonical headings per section type.

use layered_clinical::SectionType;

/// Default header patterns, in vocabulary order.
///
/// Each entry is a regular-expression fragment for a literal heading. Word
/// boundaries and the optional trailing colon are added at compile time.
pub const DEFAULT_PATTERNS: &[(SectionType, &[&str])] = &[
    (
        SectionType::ChiefComplaint,
        &[
            r"chief\s+complaint",
            r"cc:",
            r"c/c:",
            r"presenting\s+complaint",
            r"reason\s+for\s+visit",
        ],
    ),
    (
        SectionType::HistoryPresentIllness,
        &[
            r"history\s+of\s+present\s+illness",
            r"hpi:",
            r"h\.?p\.?i\.?:",
            r"present\s+illness",
            r"history\s+of\s+presenting\s+complaint",
        ],
    ),
    (
        SectionType::PastMedicalHistory,
        &[
            r"past\s+medical\s+history",
            r"pmh:",
            r"p\.?m\.?h\.?:",
            r"medical\s+history",
            r"past\s+history",
            r"previous\s+medical\s+history",
        ],
    ),
    (
        SectionType::Medications,
        &[
            r"medications?",
            r"meds:",
            r"current\s+medications?",
            r"home\s+medications?",
            r"drug\s+list",
            r"prescription\s+medications?",
        ],
    ),
    (
        SectionType::Allergies,
        &[
            r"allergies",
            r"allergy",
            r"drug\s+allergies",
            r"medication\s+allergies",
            r"known\s+allergies",
            r"nka",
            r"nkda",
        ],
    ),
    (
        SectionType::SocialHistory,
        &[
            r"social\s+history",
            r"sh:",
            r"s\.?h\.?:",
            r"social\s+hx",
            r"lifestyle",
        ],
    ),
    (
        SectionType::FamilyHistory,
        &[
            r"family\s+history",
            r"fh:",
            r"f\.?h\.?:",
            r"family\s+hx",
            r"familial\s+history",
        ],
    ),
    (
        SectionType::ReviewOfSystems,
        &[
            r"review\s+of\s+systems?",
            r"ros:",
            r"r\.?o\.?s\.?:",
            r"systems?\s+review",
            r"symptom\s+review",
        ],
    ),
    (
        SectionType::PhysicalExam,
        &[
            r"physical\s+exam(?:ination)?",
            r"pe:",
            r"p\.?e\.?:",
            r"exam(?:ination)?",
            r"physical\s+findings",
            r"objective\s+findings",
        ],
    ),
    (
        SectionType::VitalSigns,
        &[
            r"vital\s+signs?",
            r"vitals?",
            r"vs:",
            r"v\.?s\.?:",
            r"temperature",
            r"blood\s+pressure",
            r"heart\s+rate",
            r"respiratory\s+rate",
        ],
    ),
    (
        SectionType::Laboratory,
        &[
            r"laboratory\s+(?:results?|data|findings?)",
            r"labs?:",
            r"lab\s+(?:results?|data|findings?)",
            r"laboratory\s+studies",
            r"diagnostic\s+tests?",
        ],
    ),
    (
        SectionType::Radiology,
        &[
            r"radiology",
            r"imaging",
            r"x-ray",
            r"ct\s+scan",
            r"mri",
            r"ultrasound",
            r"radiologic\s+studies",
        ],
    ),
    (
        SectionType::Assessment,
        &[
            r"assessment",
            r"impression",
            r"diagnosis",
            r"clinical\s+impression",
            r"diagnostic\s+impression",
        ],
    ),
    (
        SectionType::Plan,
        &[
            r"plan",
            r"treatment\s+plan",
            r"management\s+plan",
            r"therapeutic\s+plan",
            r"recommendations?",
        ],
    ),
    (
        SectionType::AssessmentAndPlan,
        &[
            r"assessment\s+and\s+plan",
            r"a&p:",
            r"a\s*&\s*p:",
            r"impression\s+and\s+plan",
        ],
    ),
    (
        SectionType::DischargeSummary,
        &[
            r"discharge\s+summary",
            r"discharge\s+note",
            r"hospital\s+course",
            r"summary",
        ],
    ),
    (
        SectionType::Procedures,
        &[
            r"procedures?",
            r"surgical\s+procedures?",
            r"interventions?",
            r"operations?",
        ],
    ),
];

/// Headings that count as an exact match for a section type.
pub fn canonical_headings(section_type: SectionType) -> &'static [&'static str] {
    match section_type {
        SectionType::ChiefComplaint => &["chief complaint", "cc"],
        SectionType::HistoryPresentIllness => &["history of present illness", "hpi"],
        SectionType::PastMedicalHistory => &["past medical history", "pmh", "medical history"],
        SectionType::Medications => &["medications", "meds"],
        SectionType::Allergies => &["allergies", "allergy"],
        SectionType::SocialHistory => &["social history", "sh"],
        SectionType::FamilyHistory => &["family history", "fh"],
        SectionType::ReviewOfSystems => &["review of systems", "ros"],
        SectionType::PhysicalExam => &["physical exam", "physical examination", "pe"],
        SectionType::VitalSigns => &["vital signs", "vitals", "vs"],
        SectionType::Laboratory => &["laboratory", "labs", "lab results"],
        SectionType::Radiology => &["radiology", "imaging"],
        SectionType::Assessment => &["assessment", "impression"],
        SectionType::Plan => &["plan"],
        SectionType::AssessmentAndPlan => &["assessment and plan", "a&p"],
        SectionType::DischargeSummary => &[],
        SectionType::Procedures => &["procedures", "procedure"],
    }
}
