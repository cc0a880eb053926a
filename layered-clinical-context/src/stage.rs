use std::str::FromStr;
use std::sync::Arc;

use layered_clinical::{
    Annotation, AnnotationKind, AssertionConfig, Document, Span, Stage, StageError,
};

use crate::{apply_context_within, CueSet};

/// Which earlier annotations limit how far a cue reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeBoundary {
    #[default]
    None,
    Sentence,
    Section,
}

impl ScopeBoundary {
    fn kind(&self) -> Option<AnnotationKind> {
        match self {
            ScopeBoundary::None => None,
            ScopeBoundary::Sentence => Some(AnnotationKind::Sentence),
            ScopeBoundary::Section => Some(AnnotationKind::Section),
        }
    }
}

impl FromStr for ScopeBoundary {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ScopeBoundary::None),
            "sentence" => Ok(ScopeBoundary::Sentence),
            "section" => Ok(ScopeBoundary::Section),
            other => Err(StageError::config(format!("unknown scope boundary '{}'", other))),
        }
    }
}

/// Assigns an assertion status to every unclassified named entity.
///
/// Emits a labeled copy of each entity; the originals stay in the document.
pub struct ClinicalAssertion {
    config: AssertionConfig,
    cues: Option<Arc<CueSet>>,
    boundary: ScopeBoundary,
}

impl ClinicalAssertion {
    pub fn new(config: AssertionConfig) -> Self {
        ClinicalAssertion {
            config,
            cues: None,
            boundary: ScopeBoundary::None,
        }
    }

    /// Use `cues` instead of the built-in set and `custom_cues`.
    pub fn with_cues(mut self, cues: impl Into<Arc<CueSet>>) -> Self {
        self.cues = Some(cues.into());
        self
    }

    fn cues(&self) -> Result<Arc<CueSet>, StageError> {
        match &self.cues {
            Some(cues) => Ok(Arc::clone(cues)),
            None => Ok(Arc::new(CueSet::from_config(&self.config)?)),
        }
    }

    fn scopes(&self, document: &Document) -> Vec<Span> {
        match self.boundary.kind() {
            Some(kind) => document.annotations_of(kind).map(Annotation::span).collect(),
            None => Vec::new(),
        }
    }
}

impl Default for ClinicalAssertion {
    fn default() -> Self {
        Self::new(AssertionConfig::default())
    }
}

impl Stage for ClinicalAssertion {
    fn name(&self) -> &str {
        "assertion"
    }

    fn initialize(&mut self) -> Result<(), StageError> {
        self.boundary = self.config.scope_boundary.parse()?;
        let cues = self.cues()?;
        tracing::debug!(cues = cues.len(), boundary = ?self.boundary, "Loaded context cues");
        self.cues = Some(cues);
        Ok(())
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        let cues = self.cues()?;
        let scopes = self.scopes(document);
        Ok(apply_context_within(
            document.text(),
            document.annotations(),
            &cues,
            &scopes,
        ))
    }
}
