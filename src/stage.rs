//! The stage contract run by the [`Pipeline`](crate::Pipeline).

use std::borrow::Cow;

use crate::{Annotation, Document, StageError};

/// One analysis step over a [`Document`].
///
/// Stages read the annotations committed by earlier stages and return new
/// ones; the pipeline appends them. A stage never mutates the document.
///
/// `initialize` is called at most once, lazily before the first document,
/// unless the pipeline was initialized eagerly.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    /// Validate options and load resources.
    fn initialize(&mut self) -> Result<(), StageError> {
        Ok(())
    }

    /// The document view handed to [`annotate`](Self::annotate).
    fn preprocess<'d>(&self, document: &'d Document) -> Cow<'d, Document> {
        Cow::Borrowed(document)
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError>;

    fn postprocess(
        &self,
        _document: &Document,
        annotations: Vec<Annotation>,
    ) -> Result<Vec<Annotation>, StageError> {
        Ok(annotations)
    }
}
