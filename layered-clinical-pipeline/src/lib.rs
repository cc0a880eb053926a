#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Ready-made clinical annotation pipelines.
//!
//! - [`standard`] - every stage, configured from one [`PipelineConfig`](layered_clinical::PipelineConfig)
//! - [`fast`] - regex entities and exact concept lookup
//! - [`basic`] - sentences, tokens and dictionary entities
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical::PipelineConfig;
//!
//! let mut pipeline = layered_clinical_pipeline::standard(PipelineConfig::default());
//! let result = pipeline.process_text("Patient denies chest pain.", Some("note-1"))?;
//! println!("{}", result.to_json_pretty()?);
//! ```

mod presets;

pub use presets::{basic, fast, standard};
