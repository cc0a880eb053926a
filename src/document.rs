//! The document model shared by every stage.
//!
//! A [`Document`] owns its source text and an append-only sequence of
//! annotations. Stages never mutate it directly: they return annotations and
//! the [`Pipeline`](crate::Pipeline) appends them in stage order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Annotation, AnnotationId, AnnotationKind, AnnotationPayload, DocumentError, EntityInfo, SectionInfo, Span};

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    text: String,
    doc_id: Option<String>,
    metadata: BTreeMap<String, Value>,
    annotations: Vec<Annotation>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("doc_id", &self.doc_id)
            .field("text_len", &self.text.len())
            .field("annotation_count", &self.annotations.len())
            .finish()
    }
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            doc_id: None,
            metadata: BTreeMap::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id.0)
    }

    /// The text covered by `span`, or `None` if the span is out of bounds or
    /// splits a character.
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.text.get(span.start..span.end)
    }

    /// Check that `annotation` could be appended without breaking invariants.
    pub fn validate(&self, annotation: &Annotation) -> Result<(), DocumentError> {
        self.validate_at(annotation, self.annotations.len())
    }

    fn validate_at(&self, annotation: &Annotation, available: usize) -> Result<(), DocumentError> {
        let span = annotation.span();
        if span.end > self.text.len() {
            return Err(DocumentError::SpanOutOfBounds {
                span,
                text_len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(span.start) || !self.text.is_char_boundary(span.end) {
            return Err(DocumentError::NotCharBoundary { span });
        }
        if let Some(relation) = annotation.as_relation() {
            for target in [relation.arg1, relation.arg2] {
                if target.0 >= available {
                    return Err(DocumentError::DanglingRelation { target, available });
                }
            }
        }
        Ok(())
    }

    /// Append one annotation, returning its id.
    pub fn add_annotation(&mut self, annotation: Annotation) -> Result<AnnotationId, DocumentError> {
        self.validate(&annotation)?;
        let id = AnnotationId(self.annotations.len());
        self.annotations.push(annotation);
        Ok(id)
    }

    /// Append a batch atomically: either every annotation is valid and all are
    /// appended, or nothing changes.
    ///
    /// Relations inside the batch may refer to annotations earlier in the same
    /// batch.
    pub fn extend_annotations(&mut self, annotations: Vec<Annotation>) -> Result<(), DocumentError> {
        let base = self.annotations.len();
        for (offset, annotation) in annotations.iter().enumerate() {
            self.validate_at(annotation, base + offset)?;
        }
        self.annotations.extend(annotations);
        Ok(())
    }

    /// All annotations of one kind, in insertion order.
    pub fn annotations_of(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter().filter(move |a| a.kind() == kind)
    }

    /// Like [`annotations_of`](Self::annotations_of), paired with each id.
    pub fn indexed_annotations_of(
        &self,
        kind: AnnotationKind,
    ) -> impl Iterator<Item = (AnnotationId, &Annotation)> + '_ {
        self.annotations
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.kind() == kind)
            .map(|(idx, a)| (AnnotationId(idx), a))
    }

    /// All annotations whose span strictly overlaps `span`.
    pub fn annotations_in_span(&self, span: Span) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter().filter(move |a| a.span().overlaps(&span))
    }

    pub fn named_entities(&self) -> impl Iterator<Item = (&Annotation, &EntityInfo)> + '_ {
        self.annotations.iter().filter_map(|a| match a.payload() {
            AnnotationPayload::NamedEntity(info) => Some((a, info)),
            _ => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = (&Annotation, &SectionInfo)> + '_ {
        self.annotations.iter().filter_map(|a| match a.payload() {
            AnnotationPayload::Section(info) => Some((a, info)),
            _ => None,
        })
    }

    pub fn count_of(&self, kind: AnnotationKind) -> usize {
        self.annotations_of(kind).count()
    }
}
