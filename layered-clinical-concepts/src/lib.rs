#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Terminology concept mapping for layered-clinical.
//!
//! Named entities are looked up in a [`ConceptDictionary`] by exact term
//! first and, failing that, by word overlap with every known term.
//!
//! - [`ConceptDictionary`] - concepts indexed by preferred name and synonyms, built in or loaded from JSON
//! - [`ConceptMatcher`] - exact and approximate lookup with a pluggable [`SemanticTypeFilter`]
//! - [`ConceptMapping`] - the pipeline stage
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical_concepts::{ConceptDictionary, ConceptMapping};
//!
//! let dictionary = ConceptDictionary::load(Path::new("concepts.json"), false)?;
//! let mut pipeline = Pipeline::default()
//!     .add_stage(ClinicalNer::default())
//!     .add_stage(ConceptMapping::default().with_dictionary(dictionary));
//! ```

mod dictionary;
mod matcher;
mod stage;

pub use dictionary::{sample_concepts, Concept, ConceptDictionary};
pub use matcher::{
    compatible_semantic_types, jaccard_similarity, ConceptMatch, ConceptMatcher, Permissive,
    SemanticTypeFilter, Strict, APPROXIMATE_MATCH_FACTOR, EXACT_MATCH_CONFIDENCE,
};
pub use stage::ConceptMapping;
