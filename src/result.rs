//! Pipeline output and its JSON form.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Annotation, Document, PipelineConfig, StageError};

/// A stage failure that was recorded instead of stopping the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    pub stage: String,
    pub error: StageError,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

/// Outcome of processing one document.
///
/// Collects stage failures without halting processing; the annotations of
/// every stage that succeeded are in `document`.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub document: Document,
    /// Wall-clock time across all stages.
    pub elapsed: Duration,
    pub config: PipelineConfig,
    pub errors: Vec<StageFailure>,
}

impl ProcessingResult {
    pub fn new(document: Document, config: PipelineConfig) -> Self {
        Self {
            document,
            elapsed: Duration::ZERO,
            config,
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn add_error(&mut self, stage: impl Into<String>, error: StageError) {
        self.errors.push(StageFailure {
            stage: stage.into(),
            error,
        });
    }

    /// Errors formatted as `"<stage-name>: <message>"`, in the order they occurred.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn to_record(&self) -> ResultRecord {
        ResultRecord {
            document_id: self.document.doc_id().map(str::to_string),
            text: self.document.text().to_string(),
            processing_time: self.elapsed.as_secs_f64(),
            annotations: self
                .document
                .annotations()
                .iter()
                .map(AnnotationRecord::from)
                .collect(),
            errors: self.error_messages(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_record())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_record())
    }
}

/// Serialized form of a [`ProcessingResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub document_id: Option<String>,
    pub text: String,
    /// Seconds.
    pub processing_time: f64,
    pub annotations: Vec<AnnotationRecord>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: f64,
    pub metadata: Map<String, Value>,
}

impl From<&Annotation> for AnnotationRecord {
    fn from(annotation: &Annotation) -> Self {
        Self {
            start: annotation.start(),
            end: annotation.end(),
            text: annotation.text().to_string(),
            kind: annotation.kind().as_str().to_string(),
            confidence: annotation.confidence(),
            metadata: annotation.metadata(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityType, Span};

    fn result() -> ProcessingResult {
        let mut document = Document::new("Patient has diabetes.").with_id("note-7");
        document
            .add_annotation(
                Annotation::named_entity(Span::new(12, 20), "diabetes", EntityType::Disorder)
                    .with_confidence(0.85)
                    .with_attribute("method", "rule"),
            )
            .unwrap();

        let mut result = ProcessingResult::new(document, PipelineConfig::default());
        result.elapsed = Duration::from_millis(250);
        result
    }

    #[test]
    fn test_error_messages_are_prefixed_with_stage_name() {
        let mut result = result();
        assert!(!result.has_errors());
        result.add_error("ner", StageError::failed("model unavailable"));
        assert_eq!(result.error_messages(), vec!["ner: model unavailable".to_string()]);
    }

    #[test]
    fn test_record_layout() {
        let record = result().to_record();
        assert_eq!(record.document_id.as_deref(), Some("note-7"));
        assert_eq!(record.processing_time, 0.25);

        let value: Value = serde_json::from_str(&result().to_json().unwrap()).unwrap();
        let annotation = &value["annotations"][0];
        assert_eq!(annotation["start"], 12);
        assert_eq!(annotation["end"], 20);
        assert_eq!(annotation["type"], "named_entity");
        assert_eq!(annotation["confidence"], 0.85);
        assert_eq!(annotation["metadata"]["entity_type"], "disorder");
        assert_eq!(annotation["metadata"]["method"], "rule");
        assert_eq!(value["errors"], serde_json::json!([]));
    }
}
