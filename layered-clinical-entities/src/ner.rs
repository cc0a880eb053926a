use std::sync::Arc;

use layered_clinical::{Annotation, Document, NerConfig, SpanTagger, Stage, StageError};

use crate::{model_entities, resolve_overlaps, EntityDictionary};

/// Named entity recognition from a term dictionary and, optionally, an
/// external model. Candidates from both sources are merged with
/// [`resolve_overlaps`].
pub struct ClinicalNer {
    config: NerConfig,
    dictionary: Arc<EntityDictionary>,
    tagger: Option<Box<dyn SpanTagger>>,
}

impl ClinicalNer {
    pub fn new(config: NerConfig) -> Self {
        ClinicalNer {
            config,
            dictionary: EntityDictionary::builtin(),
            tagger: None,
        }
    }

    pub fn with_dictionary(mut self, dictionary: impl Into<Arc<EntityDictionary>>) -> Self {
        self.dictionary = dictionary.into();
        self
    }

    /// Attach the model consulted when `use_model` is set.
    pub fn with_tagger(mut self, tagger: impl SpanTagger + 'static) -> Self {
        self.tagger = Some(Box::new(tagger));
        self
    }

    pub fn dictionary(&self) -> &EntityDictionary {
        &self.dictionary
    }

    fn model(&self) -> Option<&dyn SpanTagger> {
        if !self.config.use_model {
            return None;
        }
        self.tagger.as_deref()
    }
}

impl Default for ClinicalNer {
    fn default() -> Self {
        Self::new(NerConfig::default())
    }
}

impl Stage for ClinicalNer {
    fn name(&self) -> &str {
        "clinical_ner"
    }

    fn initialize(&mut self) -> Result<(), StageError> {
        if !self.config.use_model {
            return Ok(());
        }
        match self.tagger.as_mut() {
            Some(tagger) => tagger.load(),
            None => {
                tracing::debug!("No entity model attached, using dictionary matching only");
                Ok(())
            }
        }
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        let mut candidates = Vec::new();

        if let Some(tagger) = self.model() {
            candidates.extend(model_entities(tagger, document)?);
        }
        if self.config.use_rules {
            candidates.extend(self.dictionary.find(document.text()));
        }

        let total = candidates.len();
        let entities = resolve_overlaps(candidates);
        tracing::debug!(candidates = total, kept = entities.len(), "Resolved entity overlaps");
        Ok(entities)
    }
}
