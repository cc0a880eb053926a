#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Sentence segmentation and tokenization stages for layered-clinical.
//!
//! - [`ClinicalSentenceSegmenter`] - sentence spans aware of clinical abbreviations
//! - [`ClinicalTokenizer`] - word tokens with measurements and doses kept whole
//!
//! Both stages run rule-based by default. Setting `backend` to anything other
//! than `"rule"` and attaching a [`SpanTagger`](layered_clinical::SpanTagger)
//! hands the work to an external model instead.
//!
//! ## Example
//!
//! ```ignore
//! use layered_clinical::Pipeline;
//! use layered_clinical_text::{ClinicalSentenceSegmenter, ClinicalTokenizer};
//!
//! let mut pipeline = Pipeline::default()
//!     .add_stage(ClinicalSentenceSegmenter::default())
//!     .add_stage(ClinicalTokenizer::default());
//! let result = pipeline.process_text("BP 120/80. Pt denies pain.", None)?;
//! ```

mod sentence;
mod tokenizer;

pub use sentence::{ClinicalSentenceSegmenter, RULE_SENTENCE_CONFIDENCE};
pub use tokenizer::{
    is_stop_word, ClinicalTokenizer, CLINICAL_TOKEN_CONFIDENCE, WORD_TOKEN_CONFIDENCE,
};

use layered_clinical::Span;

/// `[start, end)` with surrounding whitespace removed, or `None` if nothing is left.
fn trimmed_span(text: &str, start: usize, end: usize) -> Option<Span> {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let leading = slice.len() - slice.trim_start().len();
    Some(Span::new(start + leading, start + leading + trimmed.len()))
}

#[cfg(test)]
mod tests {
    mod sentence;
    mod tokenizer;
}
