//! Clinical tokenization.
//!
//! Measurements, ratios, doses and ranges ("2.5", "120/80", "40mg", "10-20")
//! are kept whole. Everything else is split into Unicode words.

use std::collections::HashSet;

use layered_clinical::{
    Annotation, Document, Span, SpanTagger, Stage, StageError, TokenInfo, TokenizerConfig,
    RULE_BACKEND,
};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static CLINICAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b\d+\.\d+\b",
        r"\b\d+/\d+\b",
        r"\b\d+mg\b",
        r"\b\d+mcg\b",
        r"\b\d+ml\b",
        r"\b\d+cc\b",
        r"\b\d+%",
        r"\b\d+-\d+\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid clinical token regex"))
    .collect()
});

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had",
        "has", "have", "he", "her", "his", "in", "is", "it", "its", "of", "on", "or", "she",
        "that", "the", "their", "there", "they", "this", "to", "was", "were", "which", "while",
        "with", "without",
    ]
    .into_iter()
    .collect()
});

pub const CLINICAL_TOKEN_CONFIDENCE: f64 = 0.9;
pub const WORD_TOKEN_CONFIDENCE: f64 = 0.8;

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word.to_lowercase().as_str())
}

/// Non-overlapping clinical pattern matches, leftmost first, longest on ties.
fn clinical_spans(text: &str) -> Vec<Span> {
    let mut candidates: Vec<Span> = CLINICAL_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text).map(|m| Span::new(m.start(), m.end())))
        .collect();
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut accepted: Vec<Span> = Vec::new();
    for span in candidates {
        if !accepted.iter().any(|kept| kept.overlaps(&span)) {
            accepted.push(span);
        }
    }
    accepted
}

pub struct ClinicalTokenizer {
    config: TokenizerConfig,
    tagger: Option<Box<dyn SpanTagger>>,
}

impl ClinicalTokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        ClinicalTokenizer {
            config,
            tagger: None,
        }
    }

    /// Attach the external tokenizer used when `backend` is not `"rule"`.
    /// Its labels become part-of-speech tags when `include_pos` is set.
    pub fn with_tagger(mut self, tagger: impl SpanTagger + 'static) -> Self {
        self.tagger = Some(Box::new(tagger));
        self
    }

    fn external(&self) -> Option<&dyn SpanTagger> {
        if self.config.backend == RULE_BACKEND {
            return None;
        }
        self.tagger.as_deref()
    }

    /// The rule backend has no morphology; the lemma is the lowercased word.
    fn lemma(&self, word: &str) -> Option<String> {
        if self.config.include_lemma {
            Some(word.to_lowercase())
        } else {
            None
        }
    }

    /// Rule-based tokens over `text`, sorted by start offset.
    pub fn tokenize(&self, text: &str) -> Vec<Annotation> {
        let clinical = clinical_spans(text);

        let mut tokens: Vec<Annotation> = clinical
            .iter()
            .map(|span| {
                let token_text = &text[span.start..span.end];
                Annotation::token(
                    *span,
                    token_text,
                    TokenInfo {
                        pos_tag: None,
                        lemma: None,
                        is_stop: false,
                    },
                )
                .with_confidence(CLINICAL_TOKEN_CONFIDENCE)
                .with_attribute("clinical_pattern", true)
            })
            .collect();

        for (start, word) in text.unicode_word_indices() {
            let span = Span::new(start, start + word.len());
            if clinical.iter().any(|c| c.overlaps(&span)) {
                continue;
            }
            tokens.push(
                Annotation::token(
                    span,
                    word,
                    TokenInfo {
                        pos_tag: None,
                        lemma: self.lemma(word),
                        is_stop: is_stop_word(word),
                    },
                )
                .with_confidence(WORD_TOKEN_CONFIDENCE),
            );
        }

        tokens.sort_by_key(|token| token.start());
        tokens
    }
}

impl Default for ClinicalTokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

impl Stage for ClinicalTokenizer {
    fn name(&self) -> &str {
        "tokenizer"
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
                    "No tokenizer attached for backend, using rule-based tokenization"
                );
                Ok(())
            }
        }
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        let tagger = match self.external() {
            Some(tagger) => tagger,
            None => return Ok(self.tokenize(document.text())),
        };

        let mut tokens = Vec::new();
        for tagged in tagger.tag(document.text())? {
            let slice = document.slice(tagged.span).ok_or_else(|| {
                StageError::collaborator(
                    tagger.name(),
                    format!("token span {} is not valid for this text", tagged.span),
                )
            })?;
            if slice.trim().is_empty() {
                continue;
            }
            let info = TokenInfo {
                pos_tag: if self.config.include_pos {
                    Some(tagged.label.clone())
                } else {
                    None
                },
                lemma: self.lemma(slice),
                is_stop: is_stop_word(slice),
            };
            tokens.push(Annotation::token(tagged.span, slice, info).with_confidence(tagged.confidence));
        }
        tokens.sort_by_key(|token| token.start());
        Ok(tokens)
    }
}
