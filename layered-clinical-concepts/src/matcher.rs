//! Exact and approximate concept lookup.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use layered_clinical::{ConceptMappingConfig, EntityType, StageError};

use crate::{Concept, ConceptDictionary};

pub const EXACT_MATCH_CONFIDENCE: f64 = 0.95;
/// Scales Jaccard similarity into a match confidence.
pub const APPROXIMATE_MATCH_FACTOR: f64 = 0.9;

/// Semantic types that fit an entity type.
pub fn compatible_semantic_types(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Disorder => &["T047", "T048", "T049", "T050", "T184"],
        EntityType::Medication => &["T109", "T121", "T125", "T116"],
        EntityType::Procedure => &["T060", "T061"],
        EntityType::Anatomy => &["T023", "T024", "T025", "T026", "T029", "T030"],
        EntityType::SignSymptom => &["T184", "T033"],
        EntityType::LabValue => &["T033", "T034", "T059"],
        EntityType::Person | EntityType::Organization => &[],
    }
}

/// Decides whether a concept may be proposed for an entity type.
pub trait SemanticTypeFilter: Send + Sync {
    fn name(&self) -> &str;

    fn is_compatible(&self, entity_type: EntityType, concept: &Concept) -> bool;
}

/// Accepts every concept. A semantic type mismatch is left to the consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl SemanticTypeFilter for Permissive {
    fn name(&self) -> &str {
        "permissive"
    }

    fn is_compatible(&self, _entity_type: EntityType, _concept: &Concept) -> bool {
        true
    }
}

/// Accepts a concept only if one of its semantic types is listed by
/// [`compatible_semantic_types`] for the entity type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl SemanticTypeFilter for Strict {
    fn name(&self) -> &str {
        "strict"
    }

    fn is_compatible(&self, entity_type: EntityType, concept: &Concept) -> bool {
        let allowed = compatible_semantic_types(entity_type);
        concept
            .semantic_types
            .iter()
            .any(|t| allowed.contains(&t.as_str()))
    }
}

/// Jaccard similarity of the whitespace separated word sets. Two empty
/// strings are identical.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a: BTreeSet<&str> = a.split_whitespace().collect();
    let b: BTreeSet<&str> = b.split_whitespace().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConceptMatch<'d> {
    pub concept: &'d Concept,
    /// The dictionary term (as written in the concept) that matched.
    pub term: &'d str,
    pub confidence: f64,
}

/// Matches entity text against a [`ConceptDictionary`].
pub struct ConceptMatcher {
    dictionary: Arc<ConceptDictionary>,
    filter: Box<dyn SemanticTypeFilter>,
    approximate: bool,
    min_similarity: f64,
    max_results: usize,
}

impl ConceptMatcher {
    pub fn new(dictionary: Arc<ConceptDictionary>, config: &ConceptMappingConfig) -> Result<Self, StageError> {
        config.validate()?;
        let filter: Box<dyn SemanticTypeFilter> = if config.strict_semantic_types {
            Box::new(Strict)
        } else {
            Box::new(Permissive)
        };
        Ok(ConceptMatcher {
            dictionary,
            filter,
            approximate: config.use_approximate_matching,
            min_similarity: config.min_similarity,
            max_results: config.max_results,
        })
    }

    pub fn with_filter(self, filter: impl SemanticTypeFilter + 'static) -> Self {
        self.with_boxed_filter(Box::new(filter))
    }

    pub fn with_boxed_filter(mut self, filter: Box<dyn SemanticTypeFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn dictionary(&self) -> &ConceptDictionary {
        &self.dictionary
    }

    pub fn filter_name(&self) -> &str {
        self.filter.name()
    }

    /// Concepts for an entity mention, best first.
    ///
    /// Exact term matches win outright. Otherwise, if enabled, every term
    /// with enough word overlap is scored. Each concept appears at most once.
    pub fn find(&self, text: &str, entity_type: EntityType) -> Vec<ConceptMatch<'_>> {
        let dictionary = self.dictionary.as_ref();
        let key = dictionary.key(text);

        let mut matches: Vec<ConceptMatch<'_>> = dictionary
            .lookup(&key)
            .filter(|concept| self.filter.is_compatible(entity_type, concept))
            .map(|concept| ConceptMatch {
                concept,
                term: dictionary.matching_term(concept, &key),
                confidence: EXACT_MATCH_CONFIDENCE,
            })
            .collect();

        if matches.is_empty() && self.approximate {
            for (term, concept) in dictionary.entries() {
                let similarity = jaccard_similarity(&key, term);
                if similarity < self.min_similarity {
                    continue;
                }
                if !self.filter.is_compatible(entity_type, concept) {
                    continue;
                }
                matches.push(ConceptMatch {
                    concept,
                    term: dictionary.matching_term(concept, term),
                    confidence: similarity * APPROXIMATE_MATCH_FACTOR,
                });
            }
        }

        // stable: equal scores keep dictionary order
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut seen = HashSet::new();
        matches.retain(|m| seen.insert(m.concept.code.as_str()));
        matches.truncate(self.max_results);
        matches
    }
}

impl ConceptDictionary {
    /// Concepts with a term containing, or contained in, `query`; scored by
    /// word overlap and deduplicated by code.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<ConceptMatch<'_>> {
        let key = self.key(query);
        let mut matches: Vec<ConceptMatch<'_>> = self
            .entries()
            .filter(|(term, _)| term.contains(key.as_str()) || key.contains(term))
            .map(|(term, concept)| ConceptMatch {
                concept,
                term: self.matching_term(concept, term),
                confidence: jaccard_similarity(&key, term),
            })
            .collect();

        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut seen = HashSet::new();
        matches.retain(|m| seen.insert(m.concept.code.as_str()));
        matches.truncate(max_results);
        matches
    }
}
