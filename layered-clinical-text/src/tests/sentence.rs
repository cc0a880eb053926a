use layered_clinical::{
    AnnotationKind, Document, DocumentDisplay, Pipeline, PrecomputedTagger,
    SentenceSegmenterConfig, Span, Stage, TaggedSpan,
};

use crate::ClinicalSentenceSegmenter;

fn sentences(text: &str) -> Vec<&str> {
    ClinicalSentenceSegmenter::default()
        .segment(text)
        .into_iter()
        .map(|span| &text[span.start..span.end])
        .collect()
}

#[test]
fn test_splits_on_terminal_punctuation() {
    let text = "Patient denies chest pain. Family history of diabetes in mother.";
    let spans = ClinicalSentenceSegmenter::default().segment(text);
    assert_eq!(spans, vec![Span::new(0, 26), Span::new(27, 64)]);
}

#[test]
fn test_clinical_abbreviations_do_not_split() {
    assert_eq!(
        sentences("Seen by Dr. Smith today. Metoprolol 25 mg b.i.d. was started."),
        vec!["Seen by Dr. Smith today.", "Metoprolol 25 mg b.i.d. was started."]
    );
}

#[test]
fn test_number_on_both_sides_does_not_split() {
    assert_eq!(
        sentences("Dose increased to 2. 5 mg daily."),
        vec!["Dose increased to 2. 5 mg daily."]
    );
}

#[test]
fn test_trailing_text_without_punctuation_is_a_sentence() {
    assert_eq!(sentences("Really?! Yes. No acute distress"), vec!["Really?!", "Yes.", "No acute distress"]);
    assert!(sentences("   ").is_empty());
    assert!(sentences("").is_empty());
}

#[test]
fn test_spans_are_trimmed() {
    let text = "  Vitals stable.\nPlan: discharge.  ";
    let spans = ClinicalSentenceSegmenter::default().segment(text);
    assert_eq!(spans, vec![Span::new(2, 16), Span::new(17, 33)]);
}

#[test]
fn test_sentence_display() {
    let mut pipeline = Pipeline::default().add_stage(ClinicalSentenceSegmenter::default());
    let result = pipeline.process_text("Pt stable. Denies pain.", None).unwrap();

    let display = DocumentDisplay::new(&result.document).with(AnnotationKind::Sentence);
    insta::assert_snapshot!(display.to_string(), @r###"
    Pt stable. Denies pain.
    ╰────────╯Sentence conf: 0.85
               ╰──────────╯Sentence conf: 0.85
    "###);
}

#[test]
fn test_external_backend_uses_tagger_spans() {
    let tagger = PrecomputedTagger::new(
        "replay",
        vec![TaggedSpan::new(Span::new(0, 10), "SENT", 0.95)],
    );
    let mut stage = ClinicalSentenceSegmenter::new(SentenceSegmenterConfig {
        backend: "model".to_string(),
    })
    .with_tagger(tagger);
    stage.initialize().unwrap();

    let annotations = stage.annotate(&Document::new("Pt stable. Denies pain.")).unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].text(), "Pt stable.");
    assert_eq!(annotations[0].confidence(), 0.95);
}

#[test]
fn test_missing_external_backend_falls_back_to_rules() {
    let mut stage = ClinicalSentenceSegmenter::new(SentenceSegmenterConfig {
        backend: "model".to_string(),
    });
    stage.initialize().unwrap();

    let annotations = stage.annotate(&Document::new("Pt stable. Denies pain.")).unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[1].confidence(), 0.85);
}
