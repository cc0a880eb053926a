//! The orchestrator that runs stages over a document in order.

use std::time::Instant;

use crate::{
    Annotation, Document, PipelineConfig, PipelineError, ProcessingResult, Stage, StageError,
};

enum InitState {
    Pending,
    Ready,
    /// Never retried; reported again for every document.
    Failed(StageError),
}

struct StageSlot {
    stage: Box<dyn Stage>,
    state: InitState,
}

impl StageSlot {
    fn new(stage: Box<dyn Stage>) -> Self {
        Self {
            stage,
            state: InitState::Pending,
        }
    }

    fn ensure_initialized(&mut self) -> Result<(), StageError> {
        if let InitState::Pending = self.state {
            self.state = match self.stage.initialize() {
                Ok(()) => {
                    tracing::debug!(stage = self.stage.name(), "Stage initialized");
                    InitState::Ready
                }
                Err(error) => InitState::Failed(error),
            };
        }

        match &self.state {
            InitState::Failed(error) => Err(error.clone()),
            _ => Ok(()),
        }
    }

    fn run(&mut self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        self.ensure_initialized()?;
        let view = self.stage.preprocess(document);
        let annotations = self.stage.annotate(&view)?;
        self.stage.postprocess(&view, annotations)
    }
}

/// An ordered sequence of stages plus the configuration they were built from.
///
/// Each stage sees the annotations of every stage before it. A failing stage
/// is recorded in the [`ProcessingResult`] and the remaining stages still
/// run, unless [`PipelineConfig::fail_on_error`] is set.
///
/// Stages initialize lazily on the first document; call
/// [`initialize`](Self::initialize) to surface configuration errors up front.
pub struct Pipeline {
    stages: Vec<StageSlot>,
    config: PipelineConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("fail_on_error", &self.config.fail_on_error)
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Append a stage, builder style.
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.push_stage(Box::new(stage));
        self
    }

    pub fn push_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(StageSlot::new(stage));
    }

    /// Remove the first stage named `name`.
    pub fn remove_stage(&mut self, name: &str) -> Option<Box<dyn Stage>> {
        let idx = self.stages.iter().position(|slot| slot.stage.name() == name)?;
        Some(self.stages.remove(idx).stage)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|slot| slot.stage.name()).collect()
    }

    pub fn stage(&self, name: &str) -> Option<&dyn Stage> {
        self.stages
            .iter()
            .find(|slot| slot.stage.name() == name)
            .map(|slot| slot.stage.as_ref())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Initialize every stage now, returning the first failure.
    pub fn initialize(&mut self) -> Result<(), PipelineError> {
        for slot in &mut self.stages {
            slot.ensure_initialized()
                .map_err(|source| PipelineError::Initialization {
                    stage: slot.stage.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn process_text(
        &mut self,
        text: &str,
        doc_id: Option<&str>,
    ) -> Result<ProcessingResult, PipelineError> {
        let mut document = Document::new(text);
        if let Some(doc_id) = doc_id {
            document = document.with_id(doc_id);
        }
        self.process(document)
    }

    /// Run every stage over `document`.
    ///
    /// Returns [`PipelineError::Aborted`] with the partially annotated
    /// document when a stage fails under `fail_on_error`, and
    /// [`PipelineError::InvalidAnnotation`] whenever a stage returns an
    /// annotation that breaks the document invariants. In the latter case
    /// none of that stage's annotations are appended.
    pub fn process(&mut self, document: Document) -> Result<ProcessingResult, PipelineError> {
        let started = Instant::now();
        let mut result = ProcessingResult::new(document, self.config.clone());

        for slot in &mut self.stages {
            let stage_started = Instant::now();
            let name = slot.stage.name().to_string();

            match slot.run(&result.document) {
                Ok(annotations) => {
                    let count = annotations.len();
                    if let Err(source) = result.document.extend_annotations(annotations) {
                        return Err(PipelineError::InvalidAnnotation {
                            stage: name,
                            source,
                            partial: Box::new(result.document),
                        });
                    }
                    tracing::debug!(
                        stage = %name,
                        annotations = count,
                        elapsed_us = stage_started.elapsed().as_micros() as u64,
                        "Stage completed"
                    );
                }
                Err(error) => {
                    tracing::warn!(stage = %name, error = %error, "Stage failed");
                    if self.config.fail_on_error {
                        return Err(PipelineError::Aborted {
                            stage: name,
                            source: error,
                            partial: Box::new(result.document),
                        });
                    }
                    result.add_error(name, error);
                }
            }
        }

        result.elapsed = started.elapsed();
        Ok(result)
    }

    /// Process several texts, assigning ids `doc_0`, `doc_1`, ...
    pub fn process_batch<I, S>(&mut self, texts: I) -> Result<Vec<ProcessingResult>, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(idx, text)| self.process(Document::new(text).with_id(format!("doc_{}", idx))))
            .collect()
    }
}
