#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Clinical named entity recognition for layered-clinical.
//!
//! ## Stages
//!
//! - [`ClinicalNer`] - dictionary matching plus an optional external model
//! - [`PatternNer`] - regex-only medications, doses and vital signs
//!
//! Both produce overlapping candidates and reduce them with
//! [`resolve_overlaps`], which keeps the most confident of any conflicting
//! spans.
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical::{EntityType, Pipeline};
//! use layered_clinical_entities::{ClinicalNer, EntityDictionary};
//!
//! let dictionary = EntityDictionary::from_terms([(EntityType::SignSymptom, "chest pain")])?;
//! let mut pipeline = Pipeline::default().add_stage(ClinicalNer::default().with_dictionary(dictionary));
//! let result = pipeline.process_text("Patient denies chest pain.", None)?;
//! assert_eq!(result.document.named_entities().count(), 1);
//! ```

mod dictionary;
mod model;
mod ner;
mod pattern;
mod resolver;

pub use dictionary::{EntityDictionary, DEFAULT_TERMS, RULE_CONFIDENCE};
pub use model::{map_model_label, model_entities};
pub use ner::ClinicalNer;
pub use pattern::{PatternNer, MEDICATION_PATTERN_CONFIDENCE, VITAL_SIGN_PATTERN_CONFIDENCE};
pub use resolver::resolve_overlaps;

#[cfg(test)]
mod tests {
    mod ner;
    mod pattern;
}
