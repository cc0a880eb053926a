#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Assertion status for clinical entities, in the style of ConText.
//!
//! A cue ("denies", "family history of", "was ruled out") qualifies the
//! entities within a few words of it, in the direction it points. The
//! nearest applicable cue decides the entity's
//! [`AssertionStatus`](layered_clinical::AssertionStatus); without one the
//! entity is present.
//!
//! - [`CueSet`] - ordered cue vocabulary indexed by first word
//! - [`apply_context`] - the classification as a plain function over text and entities
//! - [`ClinicalAssertion`] - the pipeline stage, with optional sentence or section scoping
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical_context::{apply_context, CueSet};
//!
//! let labeled = apply_context(document.text(), document.annotations(), &CueSet::clinical());
//! ```

mod cues;
mod engine;
mod stage;

pub use cues::{ContextCue, CueCategory, CueDirection, CueSet};
pub use engine::{
    apply_context, apply_context_within, assess, words, Assessment, CueMatch, Word,
    ASSERTION_CONFIDENCE_FACTOR,
};
pub use stage::{ClinicalAssertion, ScopeBoundary};

#[cfg(test)]
mod tests {
    mod assertion;
}
