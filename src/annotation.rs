//! Annotation values and their kind-specific payloads.
//!
//! An [`Annotation`] is immutable once built. Its kind is never stored as a
//! separate field: it is derived from the [`AnnotationPayload`] variant, so a
//! named-entity annotation cannot claim to be a token.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{DocumentError, Span};

/// Open per-annotation attributes, used for stage provenance.
pub type Attributes = BTreeMap<String, Value>;

/// Index of an annotation inside its owning [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub usize);

/// Generates `as_str`, `Display` and `FromStr` for label-backed enums.
macro_rules! labeled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel {
                        vocabulary: stringify!($name),
                        label: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// A label that is not part of a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary} label '{label}'")]
pub struct UnknownLabel {
    pub vocabulary: &'static str,
    pub label: String,
}

/// Discriminant of an annotation, derived from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Token,
    Sentence,
    Section,
    NamedEntity,
    Concept,
    Assertion,
    Relation,
    Temporal,
}

labeled_enum!(AnnotationKind {
    Token => "token",
    Sentence => "sentence",
    Section => "section",
    NamedEntity => "named_entity",
    Concept => "concept",
    Assertion => "assertion",
    Relation => "relation",
    Temporal => "temporal",
});

/// Clinical entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Disorder,
    Medication,
    Procedure,
    Anatomy,
    SignSymptom,
    LabValue,
    Person,
    Organization,
}

labeled_enum!(EntityType {
    Disorder => "disorder",
    Medication => "medication",
    Procedure => "procedure",
    Anatomy => "anatomy",
    SignSymptom => "sign_symptom",
    LabValue => "lab_value",
    Person => "person",
    Organization => "organization",
});

/// Clinical truth-value qualifier of an entity mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionStatus {
    #[default]
    Present,
    Absent,
    Possible,
    Conditional,
    Hypothetical,
    FamilyHistory,
    Historical,
}

labeled_enum!(AssertionStatus {
    Present => "present",
    Absent => "absent",
    Possible => "possible",
    Conditional => "conditional",
    Hypothetical => "hypothetical",
    FamilyHistory => "family_history",
    Historical => "historical",
});

/// The fixed vocabulary of clinical section types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    ChiefComplaint,
    HistoryPresentIllness,
    PastMedicalHistory,
    Medications,
    Allergies,
    SocialHistory,
    FamilyHistory,
    ReviewOfSystems,
    PhysicalExam,
    VitalSigns,
    Laboratory,
    Radiology,
    Assessment,
    Plan,
    AssessmentAndPlan,
    DischargeSummary,
    Procedures,
}

labeled_enum!(SectionType {
    ChiefComplaint => "chief_complaint",
    HistoryPresentIllness => "history_present_illness",
    PastMedicalHistory => "past_medical_history",
    Medications => "medications",
    Allergies => "allergies",
    SocialHistory => "social_history",
    FamilyHistory => "family_history",
    ReviewOfSystems => "review_of_systems",
    PhysicalExam => "physical_exam",
    VitalSigns => "vital_signs",
    Laboratory => "laboratory",
    Radiology => "radiology",
    Assessment => "assessment",
    Plan => "plan",
    AssessmentAndPlan => "assessment_and_plan",
    DischargeSummary => "discharge_summary",
    Procedures => "procedures",
});

/// Direction of a relation between two annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    Forward,
    Backward,
    #[default]
    Bidirectional,
}

labeled_enum!(RelationDirection {
    Forward => "forward",
    Backward => "backward",
    Bidirectional => "bidirectional",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub pos_tag: Option<String>,
    pub lemma: Option<String>,
    pub is_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub section_type: SectionType,
    pub section_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub entity_type: EntityType,
    pub subtype: Option<String>,
    /// Set once the assertion stage has classified the mention.
    pub assertion: Option<AssertionStatus>,
}

impl EntityInfo {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            subtype: None,
            assertion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptInfo {
    pub code: String,
    pub preferred_name: String,
    pub semantic_type: String,
    pub vocabulary: String,
    pub assertion: AssertionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationInfo {
    pub relation_type: String,
    pub arg1: AnnotationId,
    pub arg2: AnnotationId,
    pub direction: RelationDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalInfo {
    pub normalized: Option<String>,
}

/// Kind-specific data carried by an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationPayload {
    Token(TokenInfo),
    Sentence,
    Section(SectionInfo),
    NamedEntity(EntityInfo),
    Concept(ConceptInfo),
    Assertion { status: AssertionStatus },
    Relation(RelationInfo),
    Temporal(TemporalInfo),
}

impl AnnotationPayload {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            AnnotationPayload::Token(_) => AnnotationKind::Token,
            AnnotationPayload::Sentence => AnnotationKind::Sentence,
            AnnotationPayload::Section(_) => AnnotationKind::Section,
            AnnotationPayload::NamedEntity(_) => AnnotationKind::NamedEntity,
            AnnotationPayload::Concept(_) => AnnotationKind::Concept,
            AnnotationPayload::Assertion { .. } => AnnotationKind::Assertion,
            AnnotationPayload::Relation(_) => AnnotationKind::Relation,
            AnnotationPayload::Temporal(_) => AnnotationKind::Temporal,
        }
    }

    /// Payload fields flattened into a JSON map for result serialization.
    pub fn to_fields(&self) -> Map<String, Value> {
        let value = match self {
            AnnotationPayload::Token(info) => json!({
                "pos_tag": info.pos_tag,
                "lemma": info.lemma,
                "is_stop": info.is_stop,
            }),
            AnnotationPayload::Sentence => json!({}),
            AnnotationPayload::Section(info) => json!({
                "section_type": info.section_type.as_str(),
                "section_id": info.section_id,
            }),
            AnnotationPayload::NamedEntity(info) => json!({
                "entity_type": info.entity_type.as_str(),
                "entity_subtype": info.subtype,
                "assertion": info.assertion.map(|a| a.as_str()),
            }),
            AnnotationPayload::Concept(info) => json!({
                "concept_code": info.code,
                "concept_name": info.preferred_name,
                "semantic_type": info.semantic_type,
                "vocabulary": info.vocabulary,
                "assertion": info.assertion.as_str(),
            }),
            AnnotationPayload::Assertion { status } => json!({
                "assertion": status.as_str(),
            }),
            AnnotationPayload::Relation(info) => json!({
                "relation_type": info.relation_type,
                "arg1": info.arg1.0,
                "arg2": info.arg2.0,
                "direction": info.direction.as_str(),
            }),
            AnnotationPayload::Temporal(info) => json!({
                "normalized": info.normalized,
            }),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// A layer of metadata over a span of document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    span: Span,
    text: String,
    confidence: f64,
    payload: AnnotationPayload,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: Attributes,
}

impl Annotation {
    /// Create an annotation with confidence 1.0.
    ///
    /// `text` should be the document text covered by `span`; use
    /// [`Document::slice`](crate::Document::slice) to obtain it.
    pub fn new(span: Span, text: impl Into<String>, payload: AnnotationPayload) -> Self {
        Self {
            span,
            text: text.into(),
            confidence: 1.0,
            payload,
            attributes: Attributes::new(),
        }
    }

    /// Assemble an annotation from an externally declared kind and a payload.
    ///
    /// A declared kind that disagrees with the payload is rejected rather than
    /// corrected.
    pub fn from_parts(
        kind: AnnotationKind,
        span: Span,
        text: impl Into<String>,
        payload: AnnotationPayload,
    ) -> Result<Self, DocumentError> {
        if payload.kind() != kind {
            return Err(DocumentError::KindMismatch {
                declared: kind,
                payload: payload.kind(),
            });
        }
        Ok(Self::new(span, text, payload))
    }

    pub fn token(span: Span, text: impl Into<String>, info: TokenInfo) -> Self {
        Self::new(span, text, AnnotationPayload::Token(info))
    }

    pub fn sentence(span: Span, text: impl Into<String>) -> Self {
        Self::new(span, text, AnnotationPayload::Sentence)
    }

    pub fn section(span: Span, text: impl Into<String>, section_type: SectionType) -> Self {
        Self::new(
            span,
            text,
            AnnotationPayload::Section(SectionInfo {
                section_type,
                section_id: None,
            }),
        )
    }

    pub fn named_entity(span: Span, text: impl Into<String>, entity_type: EntityType) -> Self {
        Self::new(
            span,
            text,
            AnnotationPayload::NamedEntity(EntityInfo::new(entity_type)),
        )
    }

    pub fn concept(span: Span, text: impl Into<String>, info: ConceptInfo) -> Self {
        Self::new(span, text, AnnotationPayload::Concept(info))
    }

    pub fn relation(span: Span, text: impl Into<String>, info: RelationInfo) -> Self {
        Self::new(span, text, AnnotationPayload::Relation(info))
    }

    /// Set the confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn kind(&self) -> AnnotationKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &AnnotationPayload {
        &self.payload
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn as_token(&self) -> Option<&TokenInfo> {
        match &self.payload {
            AnnotationPayload::Token(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&SectionInfo> {
        match &self.payload {
            AnnotationPayload::Section(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityInfo> {
        match &self.payload {
            AnnotationPayload::NamedEntity(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_concept(&self) -> Option<&ConceptInfo> {
        match &self.payload {
            AnnotationPayload::Concept(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&RelationInfo> {
        match &self.payload {
            AnnotationPayload::Relation(info) => Some(info),
            _ => None,
        }
    }

    /// Payload fields merged with the attributes; attributes win on key clashes.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut fields = self.payload.to_fields();
        for (key, value) in &self.attributes {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }

    /// Compact one-line summary used by the annotation display.
    pub fn summary(&self) -> String {
        let detail = match &self.payload {
            AnnotationPayload::Token(info) => match &info.pos_tag {
                Some(pos) => format!("Token({})", pos),
                None => "Token".to_string(),
            },
            AnnotationPayload::Sentence => "Sentence".to_string(),
            AnnotationPayload::Section(info) => format!("Section({})", info.section_type),
            AnnotationPayload::NamedEntity(info) => match info.assertion {
                Some(status) => format!("NamedEntity({}, {})", info.entity_type, status),
                None => format!("NamedEntity({})", info.entity_type),
            },
            AnnotationPayload::Concept(info) => {
                format!("Concept({}, {})", info.code, info.assertion)
            }
            AnnotationPayload::Assertion { status } => format!("Assertion({})", status),
            AnnotationPayload::Relation(info) => format!("Relation({})", info.relation_type),
            AnnotationPayload::Temporal(_) => "Temporal".to_string(),
        };
        format!("{} conf: {:.2}", detail, self.confidence)
    }
}
