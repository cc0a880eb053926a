use layered_clinical::{AnnotationKind, Document, DocumentDisplay, EntityType, Span, Stage};

use crate::PatternNer;

const NOTE: &str = "Started lisinopril 10 mg daily. BP: 120/80, HR 72.";

#[test]
fn test_dose_wins_over_bare_unit() {
    let found = PatternNer.find(NOTE);
    let spans: Vec<(Span, EntityType)> = found
        .iter()
        .map(|a| (a.span(), a.as_entity().unwrap().entity_type))
        .collect();
    assert_eq!(
        spans,
        vec![
            (Span::new(8, 18), EntityType::Medication),
            (Span::new(19, 24), EntityType::Medication),
            (Span::new(32, 42), EntityType::LabValue),
            (Span::new(44, 49), EntityType::LabValue),
        ]
    );
}

#[test]
fn test_vital_signs_are_tagged() {
    let found = PatternNer.find("Temperature: 38.5 and O2 sat 95%");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].text(), "Temperature: 38.5");
    assert_eq!(found[1].text(), "O2 sat 95%");
    for vital in &found {
        assert_eq!(vital.attribute("type").and_then(|v| v.as_str()), Some("vital_sign"));
        assert!(vital.attribute("pattern").is_some());
    }
}

#[test]
fn test_no_matches() {
    assert!(PatternNer.find("Patient resting comfortably.").is_empty());
}

#[test]
fn test_display() {
    let mut document = Document::new(NOTE);
    let entities = PatternNer.annotate(&document).unwrap();
    document.extend_annotations(entities).unwrap();

    let display = DocumentDisplay::new(&document).with(AnnotationKind::NamedEntity);
    insta::assert_snapshot!(display.to_string(), @r###"
    Started lisinopril 10 mg daily. BP: 120/80, HR 72.
            ╰────────╯NamedEntity(medication) conf: 0.70
                       ╰───╯NamedEntity(medication) conf: 0.70
                                    ╰────────╯NamedEntity(lab_value) conf: 0.80
                                                ╰───╯NamedEntity(lab_value) conf: 0.80
    "###);
}
