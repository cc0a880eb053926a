use std::collections::HashMap;
use std::sync::Arc;

use layered_clinical::{
    Annotation, AnnotationId, AnnotationKind, AssertionStatus, ConceptInfo, ConceptMappingConfig,
    Document, Span, Stage, StageError,
};

use crate::{sample_concepts, ConceptDictionary, ConceptMatcher, SemanticTypeFilter};

/// Links named entities to terminology concepts.
///
/// Each entity span is matched once, through its most recent named entity
/// annotation, so an assertion-labeled copy lends its status to the concept.
pub struct ConceptMapping {
    config: ConceptMappingConfig,
    dictionary: Option<Arc<ConceptDictionary>>,
    filter: Option<Box<dyn SemanticTypeFilter>>,
    matcher: Option<ConceptMatcher>,
}

impl ConceptMapping {
    pub fn new(config: ConceptMappingConfig) -> Self {
        ConceptMapping {
            config,
            dictionary: None,
            filter: None,
            matcher: None,
        }
    }

    /// Match against `dictionary` instead of the built-in sample.
    pub fn with_dictionary(mut self, dictionary: impl Into<Arc<ConceptDictionary>>) -> Self {
        self.dictionary = Some(dictionary.into());
        self
    }

    /// Override the semantic type strategy chosen by `strict_semantic_types`.
    pub fn with_filter(mut self, filter: impl SemanticTypeFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn dictionary(&self) -> Arc<ConceptDictionary> {
        match &self.dictionary {
            Some(dictionary) => Arc::clone(dictionary),
            None if self.config.case_sensitive => {
                Arc::new(ConceptDictionary::from_concepts(sample_concepts(), true))
            }
            None => ConceptDictionary::builtin(),
        }
    }
}

impl Default for ConceptMapping {
    fn default() -> Self {
        Self::new(ConceptMappingConfig::default())
    }
}

/// The latest named entity annotation per span, ordered by the first
/// appearance of the span.
fn latest_entities(document: &Document) -> Vec<(AnnotationId, &Annotation)> {
    let mut latest: Vec<(AnnotationId, &Annotation)> = Vec::new();
    let mut slots: HashMap<Span, usize> = HashMap::new();
    for (id, entity) in document.indexed_annotations_of(AnnotationKind::NamedEntity) {
        match slots.get(&entity.span()) {
            Some(&slot) => latest[slot] = (id, entity),
            None => {
                slots.insert(entity.span(), latest.len());
                latest.push((id, entity));
            }
        }
    }
    latest
}

impl Stage for ConceptMapping {
    fn name(&self) -> &str {
        "concept_mapping"
    }

    fn initialize(&mut self) -> Result<(), StageError> {
        let mut matcher = ConceptMatcher::new(self.dictionary(), &self.config)?;
        if let Some(filter) = self.filter.take() {
            matcher = matcher.with_boxed_filter(filter);
        }
        tracing::debug!(
            concepts = matcher.dictionary().len(),
            filter = matcher.filter_name(),
            "Loaded concept dictionary"
        );
        self.matcher = Some(matcher);
        Ok(())
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        let matcher = self
            .matcher
            .as_ref()
            .ok_or_else(|| StageError::failed("concept mapping used before initialize"))?;

        let mut concepts = Vec::new();
        for (id, entity) in latest_entities(document) {
            let info = match entity.as_entity() {
                Some(info) => info,
                None => continue,
            };
            for found in matcher.find(entity.text(), info.entity_type) {
                let concept = ConceptInfo {
                    code: found.concept.code.clone(),
                    preferred_name: found.concept.preferred_name.clone(),
                    semantic_type: found.concept.semantic_type_label(),
                    vocabulary: found.concept.vocabulary.clone(),
                    assertion: info.assertion.unwrap_or(AssertionStatus::Present),
                };
                concepts.push(
                    Annotation::concept(entity.span(), entity.text(), concept)
                        .with_confidence(found.confidence)
                        .with_attribute("original_entity_type", info.entity_type.as_str())
                        .with_attribute("matching_term", found.term)
                        .with_attribute("source_entity", id.0),
                );
            }
        }
        tracing::debug!(concepts = concepts.len(), "Mapped entities to concepts");
        Ok(concepts)
    }
}
