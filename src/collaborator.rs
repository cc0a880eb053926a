//! External tagging backends.
//!
//! Machine-learned tokenizers, segmenters and entity taggers are not part of
//! this crate. The rule-based stages accept any [`SpanTagger`] in their place
//! and treat its output as candidate spans.

use serde::{Deserialize, Serialize};

use crate::{Span, StageError};

/// A labeled span proposed by a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub span: Span,
    pub label: String,
    pub confidence: f64,
}

impl TaggedSpan {
    pub fn new(span: Span, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            span,
            label: label.into(),
            confidence,
        }
    }
}

pub trait SpanTagger: Send + Sync {
    fn name(&self) -> &str;

    /// Load models or other resources. Called from the owning stage's
    /// `initialize`.
    fn load(&mut self) -> Result<(), StageError> {
        Ok(())
    }

    fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, StageError>;
}

/// Replays spans computed ahead of time, e.g. model output stored next to
/// the documents.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedTagger {
    name: String,
    spans: Vec<TaggedSpan>,
}

impl PrecomputedTagger {
    pub fn new(name: impl Into<String>, spans: Vec<TaggedSpan>) -> Self {
        Self {
            name: name.into(),
            spans,
        }
    }
}

impl SpanTagger for PrecomputedTagger {
    fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored spans that fit inside `text`.
    fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, StageError> {
        Ok(self
            .spans
            .iter()
            .filter(|tagged| text.get(tagged.span.start..tagged.span.end).is_some())
            .cloned()
            .collect())
    }
}
