#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Clinical note section detection for layered-clinical.
//!
//! [`ClinicalSectionDetector`] finds headers such as "Chief Complaint:",
//! "HPI:" or "Assessment and Plan" and turns each into a section that runs
//! until the next header. Sections carry `header_text`, `header_span` and
//! `content` attributes.
//!
//! The header table ([`DEFAULT_PATTERNS`]) covers every
//! [`SectionType`](layered_clinical::SectionType); `custom_patterns` in the
//! configuration replace the table entry for the types they name.
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical::{Pipeline, SectionType};
//! use layered_clinical_sections::{section_content, ClinicalSectionDetector};
//!
//! let mut pipeline = Pipeline::default().add_stage(ClinicalSectionDetector::default());
//! let result = pipeline.process_text("CC: chest pain\nPlan: ECG", None)?;
//! assert_eq!(section_content(&result.document, SectionType::Plan), Some("ECG"));
//! ```

mod detector;
mod patterns;

pub use detector::{
    header_confidence, section_content, sections_by_type, ClinicalSectionDetector,
    DetectedSection, SectionHeader, SectionMatcher, BASE_CONFIDENCE,
};
pub use patterns::{canonical_headings, DEFAULT_PATTERNS};

#[cfg(test)]
mod tests {
    mod detector;
}
