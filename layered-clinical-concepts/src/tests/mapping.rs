use layered_clinical::{
    Annotation, AnnotationKind, AnnotationPayload, AssertionStatus, ConceptMappingConfig,
    Document, DocumentDisplay, EntityInfo, EntityType, Span, Stage, StageError,
};

use crate::{ConceptDictionary, ConceptMapping, Strict};

const NOTE: &str = "Patient denies chest pain. Family history of diabetes in mother.";

fn entity(span: Span, entity_type: EntityType, assertion: Option<AssertionStatus>) -> Annotation {
    let info = EntityInfo {
        assertion,
        ..EntityInfo::new(entity_type)
    };
    Annotation::new(span, &NOTE[span.start..span.end], AnnotationPayload::NamedEntity(info))
}

/// Entities as left by the NER and assertion stages.
fn labeled_document() -> Document {
    let mut document = Document::new(NOTE);
    document
        .extend_annotations(vec![
            entity(Span::new(15, 25), EntityType::SignSymptom, None),
            entity(Span::new(45, 53), EntityType::Disorder, None),
            entity(Span::new(57, 63), EntityType::Person, None),
            entity(Span::new(15, 25), EntityType::SignSymptom, Some(AssertionStatus::Absent))
                .with_confidence(0.95),
            entity(Span::new(45, 53), EntityType::Disorder, Some(AssertionStatus::FamilyHistory))
                .with_confidence(0.95),
        ])
        .unwrap();
    document
}

fn initialized(stage: ConceptMapping) -> ConceptMapping {
    let mut stage = stage;
    stage.initialize().unwrap();
    stage
}

fn codes(concepts: &[Annotation]) -> Vec<&str> {
    concepts
        .iter()
        .map(|a| a.as_concept().unwrap().code.as_str())
        .collect()
}

#[test]
fn test_concepts_follow_labeled_entities() {
    let document = labeled_document();
    let concepts = initialized(ConceptMapping::default())
        .annotate(&document)
        .unwrap();

    assert_eq!(codes(&concepts), vec!["C0008031", "C0011847"]);

    let chest_pain = concepts[0].as_concept().unwrap();
    assert_eq!(chest_pain.preferred_name, "Chest Pain");
    assert_eq!(chest_pain.semantic_type, "T184");
    assert_eq!(chest_pain.vocabulary, "UMLS");
    assert_eq!(chest_pain.assertion, AssertionStatus::Absent);
    assert_eq!(
        concepts[1].as_concept().unwrap().assertion,
        AssertionStatus::FamilyHistory
    );

    assert_eq!(concepts[0].span(), Span::new(15, 25));
    assert!((concepts[0].confidence() - 0.95).abs() < 1e-9);
    assert_eq!(
        concepts[0].attribute("original_entity_type").and_then(|v| v.as_str()),
        Some("sign_symptom")
    );
    assert_eq!(
        concepts[0].attribute("matching_term").and_then(|v| v.as_str()),
        Some("Chest Pain")
    );
    assert_eq!(
        concepts[1].attribute("matching_term").and_then(|v| v.as_str()),
        Some("diabetes")
    );
    // the labeled copies, not the originals
    assert_eq!(concepts[0].attribute("source_entity").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(concepts[1].attribute("source_entity").and_then(|v| v.as_u64()), Some(4));
}

#[test]
fn test_unclassified_entities_map_as_present() {
    let mut document = Document::new("Diabetes controlled.");
    document
        .add_annotation(Annotation::named_entity(Span::new(0, 8), "Diabetes", EntityType::Disorder))
        .unwrap();
    let concepts = initialized(ConceptMapping::default())
        .annotate(&document)
        .unwrap();
    assert_eq!(codes(&concepts), vec!["C0011847"]);
    assert_eq!(concepts[0].as_concept().unwrap().assertion, AssertionStatus::Present);

    // "Diabetes" is not spelled that way in the sample terms
    let case_sensitive = initialized(ConceptMapping::new(ConceptMappingConfig {
        case_sensitive: true,
        ..ConceptMappingConfig::default()
    }));
    assert!(case_sensitive.annotate(&document).unwrap().is_empty());
}

#[test]
fn test_strict_semantic_types() {
    let mut document = Document::new("Takes aspirin.");
    document
        .add_annotation(Annotation::named_entity(Span::new(6, 13), "aspirin", EntityType::Disorder))
        .unwrap();

    let permissive = initialized(ConceptMapping::default());
    assert_eq!(codes(&permissive.annotate(&document).unwrap()), vec!["C0004057"]);

    let strict = initialized(ConceptMapping::new(ConceptMappingConfig {
        strict_semantic_types: true,
        ..ConceptMappingConfig::default()
    }));
    assert!(strict.annotate(&document).unwrap().is_empty());

    let overridden = initialized(ConceptMapping::default().with_filter(Strict));
    assert!(overridden.annotate(&document).unwrap().is_empty());
}

#[test]
fn test_custom_dictionary() {
    let dictionary = ConceptDictionary::from_json_str(
        r#"[{"code": "C0020649", "preferred_name": "Hypotension", "semantic_types": ["T047"],
             "synonyms": ["low blood pressure"]}]"#,
        false,
    )
    .unwrap();
    let mut document = Document::new("Low blood pressure overnight.");
    document
        .add_annotation(Annotation::named_entity(
            Span::new(0, 18),
            "Low blood pressure",
            EntityType::Disorder,
        ))
        .unwrap();

    let concepts = initialized(ConceptMapping::default().with_dictionary(dictionary))
        .annotate(&document)
        .unwrap();
    assert_eq!(codes(&concepts), vec!["C0020649"]);
    assert_eq!(
        concepts[0].attribute("matching_term").and_then(|v| v.as_str()),
        Some("low blood pressure")
    );
}

#[test]
fn test_configuration_errors() {
    let mut stage = ConceptMapping::new(ConceptMappingConfig {
        max_results: 0,
        ..ConceptMappingConfig::default()
    });
    assert!(matches!(stage.initialize(), Err(StageError::Config(_))));

    let uninitialized = ConceptMapping::default();
    assert!(matches!(
        uninitialized.annotate(&labeled_document()),
        Err(StageError::Failed(_))
    ));
}

#[test]
fn test_display() {
    let mut document = labeled_document();
    let concepts = initialized(ConceptMapping::default())
        .annotate(&document)
        .unwrap();
    document.extend_annotations(concepts).unwrap();

    let display = DocumentDisplay::new(&document).with(AnnotationKind::Concept);
    insta::assert_snapshot!(display.to_string(), @r###"
    Patient denies chest pain. Family history of diabetes in mother.
                   ╰────────╯Concept(C0008031, absent) conf: 0.95
                                                 ╰──────╯Concept(C0011847, family_history) conf: 0.95
    "###);
}
