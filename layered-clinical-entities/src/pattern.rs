//! Regex-only recognition of medications, doses and vital signs.

use layered_clinical::{Annotation, Document, EntityType, Span, Stage, StageError};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::resolve_overlaps;

pub const MEDICATION_PATTERN_CONFIDENCE: f64 = 0.7;
pub const VITAL_SIGN_PATTERN_CONFIDENCE: f64 = 0.8;

const MEDICATION_PATTERNS: &[&str] = &[
    r"\b\w+(?:cillin|mycin|floxacin|prazole|statin|sartan|pril|olol)\b",
    r"\b(?:mg|mcg|ml|cc|units?)\b",
    r"\b\d+\s*(?:mg|mcg|ml|cc|units?)\b",
];

const VITAL_SIGN_PATTERNS: &[&str] = &[
    r"\b(?:bp|blood pressure)\s*:?\s*\d+/\d+",
    r"\b(?:hr|heart rate)\s*:?\s*\d+",
    r"\b(?:temp|temperature)\s*:?\s*\d+\.?\d*",
    r"\b(?:rr|respiratory rate)\s*:?\s*\d+",
    r"\b(?:o2|oxygen)\s*sat\w*\s*:?\s*\d+%?",
];

struct Pattern {
    source: &'static str,
    regex: Regex,
    entity_type: EntityType,
    confidence: f64,
    vital_sign: bool,
}

fn compile(source: &'static str) -> Regex {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .expect("Invalid entity pattern regex")
}

static PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    let medications = MEDICATION_PATTERNS.iter().map(|&source| Pattern {
        source,
        regex: compile(source),
        entity_type: EntityType::Medication,
        confidence: MEDICATION_PATTERN_CONFIDENCE,
        vital_sign: false,
    });
    let vitals = VITAL_SIGN_PATTERNS.iter().map(|&source| Pattern {
        source,
        regex: compile(source),
        entity_type: EntityType::LabValue,
        confidence: VITAL_SIGN_PATTERN_CONFIDENCE,
        vital_sign: true,
    });
    medications.chain(vitals).collect()
});

/// Lightweight NER for the fast preset: drug-name suffixes ("-statin",
/// "-olol"), dose units and vital-sign readings ("BP 120/80").
///
/// Matches carry the `pattern` that produced them; vital signs are
/// [`EntityType::LabValue`] with `type = "vital_sign"`. Overlapping matches
/// are resolved like any other candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternNer;

impl PatternNer {
    pub fn find(&self, text: &str) -> Vec<Annotation> {
        let mut candidates = Vec::new();
        for pattern in PATTERNS.iter() {
            for m in pattern.regex.find_iter(text) {
                let mut entity = Annotation::named_entity(
                    Span::new(m.start(), m.end()),
                    m.as_str(),
                    pattern.entity_type,
                )
                .with_confidence(pattern.confidence)
                .with_attribute("pattern", pattern.source);
                if pattern.vital_sign {
                    entity = entity.with_attribute("type", "vital_sign");
                }
                candidates.push(entity);
            }
        }
        resolve_overlaps(candidates)
    }
}

impl Stage for PatternNer {
    fn name(&self) -> &str {
        "pattern_ner"
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        Ok(self.find(document.text()))
    }
}
