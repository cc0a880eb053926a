use layered_clinical::{
    Document, PrecomputedTagger, Span, SpanTagger, Stage, StageError, TaggedSpan, TokenizerConfig,
};

use crate::{is_stop_word, ClinicalTokenizer};

fn token_texts(text: &str) -> Vec<String> {
    ClinicalTokenizer::default()
        .tokenize(text)
        .iter()
        .map(|t| t.text().to_string())
        .collect()
}

#[test]
fn test_clinical_patterns_stay_whole() {
    assert_eq!(
        token_texts("BP 120/80 and 40mg of the drug, temp 98.6"),
        vec!["BP", "120/80", "and", "40mg", "of", "the", "drug", "temp", "98.6"]
    );
    assert_eq!(
        token_texts("SpO2 95% on room air"),
        vec!["SpO2", "95%", "on", "room", "air"]
    );
    assert_eq!(token_texts("pain 10-20 minutes"), vec!["pain", "10-20", "minutes"]);
}

#[test]
fn test_clinical_tokens_are_marked() {
    let tokens = ClinicalTokenizer::default().tokenize("BP 120/80");
    assert_eq!(tokens[0].confidence(), 0.8);
    assert_eq!(tokens[0].attribute("clinical_pattern"), None);

    assert_eq!(tokens[1].span(), Span::new(3, 9));
    assert_eq!(tokens[1].confidence(), 0.9);
    assert_eq!(
        tokens[1].attribute("clinical_pattern").and_then(|v| v.as_bool()),
        Some(true)
    );
}

#[test]
fn test_stop_words_and_lemmas() {
    let tokens = ClinicalTokenizer::default().tokenize("The Patient");
    let the = tokens[0].as_token().unwrap();
    assert!(the.is_stop);
    assert_eq!(the.lemma.as_deref(), Some("the"));
    assert!(!tokens[1].as_token().unwrap().is_stop);
    assert!(is_stop_word("WITHOUT"));

    let bare = ClinicalTokenizer::new(TokenizerConfig {
        include_lemma: false,
        ..TokenizerConfig::default()
    });
    assert_eq!(bare.tokenize("Patient")[0].as_token().unwrap().lemma, None);
}

#[test]
fn test_external_backend_labels_become_pos_tags() {
    let tagger = PrecomputedTagger::new(
        "replay",
        vec![
            TaggedSpan::new(Span::new(3, 9), "CD", 0.97),
            TaggedSpan::new(Span::new(0, 2), "NNP", 0.99),
        ],
    );
    let mut stage = ClinicalTokenizer::new(TokenizerConfig {
        backend: "model".to_string(),
        ..TokenizerConfig::default()
    })
    .with_tagger(tagger);
    stage.initialize().unwrap();

    let tokens = stage.annotate(&Document::new("BP 120/80")).unwrap();
    let tags: Vec<Option<&str>> = tokens
        .iter()
        .map(|t| t.as_token().unwrap().pos_tag.as_deref())
        .collect();
    assert_eq!(tags, vec![Some("NNP"), Some("CD")]);
    assert_eq!(tokens[1].confidence(), 0.97);
}

#[test]
fn test_external_backend_without_pos() {
    let tagger = PrecomputedTagger::new("replay", vec![TaggedSpan::new(Span::new(0, 2), "NNP", 0.99)]);
    let stage = ClinicalTokenizer::new(TokenizerConfig {
        backend: "model".to_string(),
        include_pos: false,
        include_lemma: false,
    })
    .with_tagger(tagger);

    let tokens = stage.annotate(&Document::new("BP 120/80")).unwrap();
    assert_eq!(tokens[0].as_token().unwrap().pos_tag, None);
}

struct MisalignedTagger;

impl SpanTagger for MisalignedTagger {
    fn name(&self) -> &str {
        "misaligned"
    }

    fn tag(&self, _text: &str) -> Result<Vec<TaggedSpan>, StageError> {
        Ok(vec![TaggedSpan::new(Span::new(1, 3), "X", 0.5)])
    }
}

#[test]
fn test_invalid_tagger_span_is_a_stage_error() {
    let stage = ClinicalTokenizer::new(TokenizerConfig {
        backend: "model".to_string(),
        ..TokenizerConfig::default()
    })
    .with_tagger(MisalignedTagger);

    // byte 1 falls inside 'é'
    assert!(matches!(
        stage.annotate(&Document::new("été")),
        Err(StageError::Collaborator { .. })
    ));
}
