//! Error types for documents, stages, configuration and the pipeline.

use thiserror::Error;

use crate::{AnnotationId, AnnotationKind, Document, Span};

/// Violations of the document/annotation invariants.
///
/// These indicate a defective stage, not bad input, and are never recorded as
/// soft failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("span {span} lies outside the document text (length {text_len})")]
    SpanOutOfBounds { span: Span, text_len: usize },

    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },

    #[error("relation refers to annotation {target:?}, but the document only has {available}")]
    DanglingRelation { target: AnnotationId, available: usize },

    #[error("declared kind '{declared}' does not match payload kind '{payload}'")]
    KindMismatch {
        declared: AnnotationKind,
        payload: AnnotationKind,
    },
}

/// Failure reported by a single stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// Invalid option values, surfaced at initialization.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An external collaborator (model backend, tagger) failed.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: String,
        message: String,
    },

    /// The stage could not annotate the document.
    #[error("{0}")]
    Failed(String),
}

impl StageError {
    pub fn config(message: impl Into<String>) -> Self {
        StageError::Config(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        StageError::Failed(message.into())
    }

    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        StageError::Collaborator {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

/// Errors loading a [`PipelineConfig`](crate::PipelineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("unsupported config format for {path} (expected .json, .toml or .ron)")]
    UnsupportedFormat { path: String },
}

/// Fatal pipeline errors. Soft stage failures are recorded in the
/// [`ProcessingResult`](crate::ProcessingResult) instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage failed while `fail_on_error` was set. `partial` holds the
    /// document with every annotation committed before the failure.
    #[error("{stage}: {source}")]
    Aborted {
        stage: String,
        #[source]
        source: StageError,
        partial: Box<Document>,
    },

    /// A stage produced an annotation that violates the document invariants.
    /// None of that stage's output is in `partial`; earlier stages' is.
    #[error("{stage} produced an invalid annotation: {source}")]
    InvalidAnnotation {
        stage: String,
        #[source]
        source: DocumentError,
        partial: Box<Document>,
    },

    /// Eager initialization failed.
    #[error("failed to initialize {stage}: {source}")]
    Initialization {
        stage: String,
        #[source]
        source: StageError,
    },
}
