use layered_clinical::{
    AnnotationKind, AssertionStatus, ConceptMappingConfig, DocumentDisplay, EntityType,
    PipelineConfig, SectionType,
};

use crate::{basic, fast, standard};

const NOTE: &str = "Patient denies chest pain. Family history of diabetes in mother.";

#[test]
fn test_standard_stage_order() {
    let pipeline = standard(PipelineConfig::default());
    assert_eq!(
        pipeline.stage_names(),
        vec![
            "sentence_segmenter",
            "tokenizer",
            "section_detector",
            "clinical_ner",
            "assertion",
            "concept_mapping",
        ]
    );
}

#[test]
fn test_negated_and_family_history_mentions() {
    let mut pipeline = standard(PipelineConfig::default());
    let result = pipeline.process_text(NOTE, Some("note-1")).unwrap();
    assert!(!result.has_errors(), "{:?}", result.error_messages());

    let document = &result.document;
    assert_eq!(document.count_of(AnnotationKind::Sentence), 2);
    assert_eq!(document.count_of(AnnotationKind::Token), 10);
    assert!(document
        .sections()
        .any(|(_, info)| info.section_type == SectionType::FamilyHistory));

    let classified: Vec<(&str, EntityType, AssertionStatus)> = document
        .named_entities()
        .filter_map(|(a, info)| info.assertion.map(|status| (a.text(), info.entity_type, status)))
        .collect();
    assert_eq!(
        classified,
        vec![
            ("chest pain", EntityType::Disorder, AssertionStatus::Absent),
            ("diabetes", EntityType::Disorder, AssertionStatus::FamilyHistory),
        ]
    );

    let concepts: Vec<(&str, AssertionStatus)> = document
        .annotations_of(AnnotationKind::Concept)
        .filter_map(|a| a.as_concept())
        .map(|c| (c.code.as_str(), c.assertion))
        .collect();
    assert_eq!(
        concepts,
        vec![
            ("C0008031", AssertionStatus::Absent),
            ("C0011847", AssertionStatus::FamilyHistory),
        ]
    );
}

#[test]
fn test_same_text_same_annotations() {
    let mut pipeline = standard(PipelineConfig::default());
    let first = pipeline.process_text(NOTE, None).unwrap();
    let second = pipeline.process_text(NOTE, None).unwrap();
    assert_eq!(first.document.annotations(), second.document.annotations());
}

#[test]
fn test_batch_assigns_document_ids() {
    let mut pipeline = basic(PipelineConfig::default());
    let results = pipeline
        .process_batch(vec!["Patient has asthma.", "No fever."])
        .unwrap();
    let ids: Vec<Option<&str>> = results.iter().map(|r| r.document.doc_id()).collect();
    assert_eq!(ids, vec![Some("doc_0"), Some("doc_1")]);
    assert_eq!(results[0].document.named_entities().count(), 1);
}

#[test]
fn test_fast_pipeline_maps_pattern_entities() {
    let mut pipeline = fast();
    assert_eq!(
        pipeline.stage_names(),
        vec!["sentence_segmenter", "tokenizer", "pattern_ner", "concept_mapping"]
    );
    assert!(!pipeline.config().concept_mapping.use_approximate_matching);

    let result = pipeline
        .process_text("Started lisinopril 10 mg daily. BP: 120/80, HR 72.", None)
        .unwrap();
    assert!(!result.has_errors());
    assert_eq!(result.document.named_entities().count(), 4);

    let codes: Vec<&str> = result
        .document
        .annotations_of(AnnotationKind::Concept)
        .filter_map(|a| a.as_concept())
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(codes, vec!["C0065374"]);
}

#[test]
fn test_basic_pipeline_has_no_assertions() {
    let mut pipeline = basic(PipelineConfig::default());
    assert_eq!(
        pipeline.stage_names(),
        vec!["sentence_segmenter", "tokenizer", "clinical_ner"]
    );
    let result = pipeline.process_text(NOTE, None).unwrap();
    assert!(result
        .document
        .named_entities()
        .all(|(_, info)| info.assertion.is_none()));
    assert_eq!(result.document.count_of(AnnotationKind::Concept), 0);
}

#[test]
fn test_bad_stage_configuration_is_recorded() {
    let config = PipelineConfig {
        concept_mapping: ConceptMappingConfig {
            min_similarity: 2.0,
            ..ConceptMappingConfig::default()
        },
        ..PipelineConfig::default()
    };
    let mut pipeline = standard(config);
    let result = pipeline.process_text(NOTE, None).unwrap();

    let messages = result.error_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("concept_mapping: invalid configuration"));
    // earlier stages still annotated the document
    assert_eq!(result.document.named_entities().count(), 4);
}

#[test]
fn test_json_record() {
    let mut pipeline = standard(PipelineConfig::default());
    let result = pipeline.process_text(NOTE, Some("note-1")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(json["document_id"], "note-1");
    assert_eq!(json["text"], NOTE);
    assert!(json["processing_time"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["errors"], serde_json::json!([]));

    let concept = json["annotations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["type"] == "concept")
        .unwrap();
    assert_eq!(concept["start"], 15);
    assert_eq!(concept["end"], 25);
    assert_eq!(concept["metadata"]["concept_code"], "C0008031");
    assert_eq!(concept["metadata"]["assertion"], "absent");
    assert_eq!(concept["metadata"]["matching_term"], "Chest Pain");
    assert_eq!(concept["metadata"]["original_entity_type"], "disorder");
}

#[test]
fn test_display() {
    let mut pipeline = standard(PipelineConfig::default());
    let result = pipeline.process_text(NOTE, None).unwrap();

    let display = DocumentDisplay::new(&result.document)
        .with(AnnotationKind::NamedEntity)
        .with(AnnotationKind::Concept);
    insta::assert_snapshot!(display.to_string(), @r###"
    Patient denies chest pain. Family history of diabetes in mother.
                   ╰────────╯NamedEntity(disorder) conf: 0.85
                                                 ╰──────╯NamedEntity(disorder) conf: 0.85
                   ╰────────╯NamedEntity(disorder, absent) conf: 0.81
                                                 ╰──────╯NamedEntity(disorder, family_history) conf: 0.81
                   ╰────────╯Concept(C0008031, absent) conf: 0.95
                                                 ╰──────╯Concept(C0011847, family_history) conf: 0.95
    "###);
}
