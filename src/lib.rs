//! Layered annotation of clinical narrative text.
//!
//! A [`Document`] holds the source text and an append-only list of
//! [`Annotation`]s. A [`Pipeline`] runs [`Stage`]s over it in order; each
//! stage reads what earlier stages produced and returns new layers.
//!
//! ## Data model
//!
//! - [`Span`] - `[start, end)` byte interval with strict overlap
//! - [`Annotation`] - span, text, confidence, typed [`AnnotationPayload`] and provenance attributes
//! - [`Document`] - text plus annotations, with invariant checks on append
//! - [`ProcessingResult`] - the annotated document, elapsed time, config and recorded failures
//!
//! ## Stages
//!
//! The stages themselves live in the plugin crates:
//!
//! - `layered-clinical-text` - sentence segmentation and tokenization
//! - `layered-clinical-sections` - section boundary detection
//! - `layered-clinical-entities` - dictionary, pattern and model NER with overlap resolution
//! - `layered-clinical-context` - negation, uncertainty and experiencer assertion
//! - `layered-clinical-concepts` - mapping entities onto terminology concepts
//! - `layered-clinical-pipeline` - preset pipelines
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical::{Pipeline, PipelineConfig};
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default()).add_stage(MyStage::new());
//! let result = pipeline.process_text("Patient denies chest pain.", Some("note-1"))?;
//! println!("{}", result.to_json_pretty()?);
//! ```

mod annotation;
mod collaborator;
mod config;
mod display;
mod document;
mod error;
mod pipeline;
mod result;
mod span;
mod stage;

pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, AnnotationPayload, AssertionStatus, Attributes,
    ConceptInfo, EntityInfo, EntityType, RelationDirection, RelationInfo, SectionInfo,
    SectionType, TemporalInfo, TokenInfo, UnknownLabel,
};
pub use collaborator::{PrecomputedTagger, SpanTagger, TaggedSpan};
pub use config::{
    AssertionConfig, ConceptMappingConfig, CueConfig, NerConfig, PipelineConfig,
    SectionDetectorConfig, SentenceSegmenterConfig, TokenizerConfig, RULE_BACKEND,
};
pub use display::DocumentDisplay;
pub use document::Document;
pub use error::{ConfigError, DocumentError, PipelineError, StageError};
pub use pipeline::Pipeline;
pub use result::{AnnotationRecord, ProcessingResult, ResultRecord, StageFailure};
pub use span::Span;
pub use stage::Stage;
