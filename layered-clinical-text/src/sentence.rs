//! Sentence segmentation.
//!
//! The rule backend splits after runs of `.`, `!` or `?` followed by
//! whitespace or the end of the text. Splits are suppressed when the last
//! word is a clinical abbreviation (e.g. "b.i.d.", "Dr.") or when a number
//! continues on the other side of the punctuation.

use std::collections::HashSet;

use layered_clinical::{
    Annotation, Document, SentenceSegmenterConfig, Span, SpanTagger, Stage, StageError,
    RULE_BACKEND,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::trimmed_span;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("Invalid sentence end regex"));

const CLINICAL_ABBREVIATIONS: &[&str] = &[
    "Dr.", "Mr.", "Mrs.", "Ms.", "Prof.", "vs.", "etc.", "Inc.", "Ltd.",
    "mg.", "mcg.", "ml.", "cc.", "cm.", "mm.", "kg.", "lb.", "oz.",
    "b.i.d.", "t.i.d.", "q.i.d.", "p.r.n.", "p.o.", "i.v.", "i.m.",
    "pt.", "pts.", "dx.", "hx.", "tx.", "sx.", "rx.", "fx.", "bx.",
    "c/o", "s/p", "w/o", "w/", "pt", "pts", "dx", "hx", "tx", "sx",
    "No.", "yr.", "yrs.", "mo.", "mos.", "wk.", "wks.", "d.", "hr.", "hrs.",
    "min.", "mins.", "sec.", "secs.", "temp.", "resp.", "b.p.", "h.r.",
    "Pt.", "Pts.", "Dx.", "Hx.", "Tx.", "Sx.", "Rx.", "Fx.", "Bx.",
];

/// Confidence of rule-based sentence spans.
pub const RULE_SENTENCE_CONFIDENCE: f64 = 0.85;

pub struct ClinicalSentenceSegmenter {
    config: SentenceSegmenterConfig,
    /// Matched case-sensitively against the last whitespace-separated word.
    abbreviations: HashSet<String>,
    tagger: Option<Box<dyn SpanTagger>>,
}

impl ClinicalSentenceSegmenter {
    pub fn new(config: SentenceSegmenterConfig) -> Self {
        ClinicalSentenceSegmenter {
            config,
            abbreviations: CLINICAL_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
            tagger: None,
        }
    }

    /// Attach the external segmenter used when `backend` is not `"rule"`.
    pub fn with_tagger(mut self, tagger: impl SpanTagger + 'static) -> Self {
        self.tagger = Some(Box::new(tagger));
        self
    }

    pub fn with_custom_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        for abbrev in abbreviations {
            self.abbreviations.insert(abbrev.to_string());
        }
        self
    }

    fn external(&self) -> Option<&dyn SpanTagger> {
        if self.config.backend == RULE_BACKEND {
            return None;
        }
        self.tagger.as_deref()
    }

    fn is_abbreviation(&self, candidate: &str) -> bool {
        candidate
            .split_whitespace()
            .last()
            .map_or(false, |word| self.abbreviations.contains(word))
    }

    /// A number on both sides of the punctuation, as in "1. 5".
    fn splits_number(candidate: &str, rest: &str) -> bool {
        let before = candidate.trim_end_matches(&['.', '!', '?'][..]);
        before.ends_with(|c: char| c.is_ascii_digit())
            && rest.starts_with(|c: char| c.is_ascii_digit())
    }

    /// Trimmed sentence spans over `text`, in order.
    pub fn segment(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start = 0;

        for m in SENTENCE_END.find_iter(text) {
            let punct_end = m.start() + m.as_str().trim_end().len();
            let candidate = &text[start..punct_end];
            let rest = &text[m.end()..];

            if self.is_abbreviation(candidate) || Self::splits_number(candidate, rest) {
                continue;
            }

            spans.extend(trimmed_span(text, start, punct_end));
            start = m.end();
        }

        spans.extend(trimmed_span(text, start, text.len()));
        spans
    }
}

impl Default for ClinicalSentenceSegmenter {
    fn default() -> Self {
        Self::new(SentenceSegmenterConfig::default())
    }
}

impl Stage for ClinicalSentenceSegmenter {
    fn name(&self) -> &str {
        "sentence_segmenter"
    }

    fn initialize(&mut self) -> Result<(), StageError> {
        if self.config.backend == RULE_BACKEND {
            return Ok(());
        }
        match self.tagger.as_mut() {
            Some(tagger) => tagger.load(),
            None => {
                tracing::warn!(
                    backend = %self.config.backend,
                    "No sentence segmenter attached for backend, using rule-based segmentation"
                );
                Ok(())
            }
        }
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        let text = document.text();

        if let Some(tagger) = self.external() {
            return tagger
                .tag(text)?
                .into_iter()
                .map(|tagged| -> Result<Annotation, StageError> {
                    let slice = document.slice(tagged.span).ok_or_else(|| {
                        StageError::collaborator(
                            tagger.name(),
                            format!("sentence span {} is not valid for this text", tagged.span),
                        )
                    })?;
                    Ok(Annotation::sentence(tagged.span, slice).with_confidence(tagged.confidence))
                })
                .collect();
        }

        Ok(self
            .segment(text)
            .into_iter()
            .map(|span| {
                Annotation::sentence(span, &text[span.start..span.end])
                    .with_confidence(RULE_SENTENCE_CONFIDENCE)
            })
            .collect())
    }
}
