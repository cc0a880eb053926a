use std::collections::BTreeMap;

use layered_clinical::{
    Annotation, Document, SectionDetectorConfig, SectionType, Span, Stage, StageError,
};
use regex::{Regex, RegexBuilder};
use serde_json::json;

use crate::patterns::{canonical_headings, DEFAULT_PATTERNS};

pub const BASE_CONFIDENCE: f64 = 0.85;

/// Confidence of a header match.
///
/// Canonical headings ("Chief Complaint", "HPI") score highest. Otherwise a
/// colon and a short abbreviation each add a little.
pub fn header_confidence(matched: &str, section_type: SectionType) -> f64 {
    let lowered = matched.to_lowercase();
    let clean = lowered.trim().trim_end_matches(':').trim();

    if canonical_headings(section_type).iter().any(|h| *h == clean) {
        return f64::min(0.98, BASE_CONFIDENCE + 0.10);
    }

    let mut confidence = BASE_CONFIDENCE;
    if matched.contains(':') {
        confidence += 0.05;
    }
    if clean.chars().count() <= 3 {
        confidence += 0.05;
    }
    confidence.min(0.95)
}

/// Wrap a header fragment with word boundaries and an optional colon.
///
/// The closing boundary is only added when the fragment ends on a word
/// character, so `cc:` still matches "CC: fever".
fn header_regex(fragment: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    let tail = fragment.trim_end_matches(|c: char| matches!(c, '?' | ')' | '*' | '+'));
    let ends_on_word = tail
        .chars()
        .last()
        .map_or(false, |c| c.is_alphanumeric() || c == '_');

    let pattern = if ends_on_word {
        format!(r"\b(?:{})\b\s*:?\s*", fragment)
    } else {
        format!(r"\b(?:{})\s*:?\s*", fragment)
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
}

/// A header occurrence found in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionHeader {
    pub section_type: SectionType,
    /// The header including trailing colon and whitespace.
    pub span: Span,
    pub confidence: f64,
}

/// A section running from its header to the next header or the end of text.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedSection {
    pub section_type: SectionType,
    pub span: Span,
    pub header: Span,
    /// Body text with surrounding whitespace removed. Empty when the next
    /// header starts before this one ends.
    pub content: Span,
    pub confidence: f64,
}

/// Compiled header patterns for every section type.
#[derive(Debug, Clone)]
pub struct SectionMatcher {
    patterns: Vec<(SectionType, Vec<Regex>)>,
}

impl SectionMatcher {
    /// Compile a pattern table. Ties between headers at the same offset are
    /// resolved in table order.
    pub fn new(table: &[(SectionType, Vec<String>)], case_sensitive: bool) -> Result<Self, StageError> {
        let mut patterns = Vec::with_capacity(table.len());
        for (section_type, fragments) in table {
            let mut compiled = Vec::with_capacity(fragments.len());
            for fragment in fragments {
                let regex = header_regex(fragment, case_sensitive).map_err(|e| {
                    StageError::config(format!(
                        "invalid header pattern '{}' for {}: {}",
                        fragment, section_type, e
                    ))
                })?;
                compiled.push(regex);
            }
            patterns.push((*section_type, compiled));
        }
        Ok(SectionMatcher { patterns })
    }

    /// The built-in table with `custom_patterns` replacing the defaults of
    /// each section type they name.
    pub fn from_config(config: &SectionDetectorConfig) -> Result<Self, StageError> {
        let mut table: Vec<(SectionType, Vec<String>)> = DEFAULT_PATTERNS
            .iter()
            .map(|(section_type, fragments)| {
                (*section_type, fragments.iter().map(|f| f.to_string()).collect())
            })
            .collect();

        for (label, fragments) in &config.custom_patterns {
            let section_type: SectionType = label
                .parse()
                .map_err(|e| StageError::config(format!("custom section pattern: {}", e)))?;
            match table.iter_mut().find(|(t, _)| *t == section_type) {
                Some((_, existing)) => *existing = fragments.clone(),
                None => table.push((section_type, fragments.clone())),
            }
        }

        Self::new(&table, config.case_sensitive)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.iter().map(|(_, p)| p.len()).sum()
    }

    /// Every header match, sorted by start offset.
    pub fn find_headers(&self, text: &str) -> Vec<SectionHeader> {
        let mut headers = Vec::new();
        for (section_type, regexes) in &self.patterns {
            for regex in regexes {
                for m in regex.find_iter(text) {
                    headers.push(SectionHeader {
                        section_type: *section_type,
                        span: Span::new(m.start(), m.end()),
                        confidence: header_confidence(m.as_str(), *section_type),
                    });
                }
            }
        }
        // stable: equal starts keep discovery order
        headers.sort_by_key(|h| h.span.start);
        headers
    }

    /// Partition the text from the first header onwards into sections.
    pub fn detect(&self, text: &str) -> Vec<DetectedSection> {
        let headers = self.find_headers(text);

        headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let end = headers
                    .get(idx + 1)
                    .map_or(text.len(), |next| next.span.start);

                DetectedSection {
                    section_type: header.section_type,
                    span: Span::new(header.span.start, end),
                    header: header.span,
                    content: trimmed(text, header.span.end, end),
                    confidence: header.confidence,
                }
            })
            .collect()
    }
}

/// Trimmed `[start, end)`, or an empty span at `end` when `start > end`.
fn trimmed(text: &str, start: usize, end: usize) -> Span {
    if start >= end {
        return Span::new(end, end);
    }
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let kept = slice.trim().len();
    Span::new(start + leading, start + leading + kept)
}

/// Detects clinical note sections ("Chief Complaint:", "HPI:", "Plan:").
///
/// Patterns are compiled during `initialize`, where unknown section labels
/// and malformed patterns are reported.
pub struct ClinicalSectionDetector {
    config: SectionDetectorConfig,
    matcher: Option<SectionMatcher>,
}

impl ClinicalSectionDetector {
    pub fn new(config: SectionDetectorConfig) -> Self {
        ClinicalSectionDetector {
            config,
            matcher: None,
        }
    }

    pub fn detect(&self, text: &str) -> Result<Vec<DetectedSection>, StageError> {
        match &self.matcher {
            Some(matcher) => Ok(matcher.detect(text)),
            None => Ok(SectionMatcher::from_config(&self.config)?.detect(text)),
        }
    }
}

impl Default for ClinicalSectionDetector {
    fn default() -> Self {
        Self::new(SectionDetectorConfig::default())
    }
}

impl Stage for ClinicalSectionDetector {
    fn name(&self) -> &str {
        "section_detector"
    }

    fn initialize(&mut self) -> Result<(), StageError> {
        let matcher = SectionMatcher::from_config(&self.config)?;
        tracing::debug!(patterns = matcher.pattern_count(), "Compiled section patterns");
        self.matcher = Some(matcher);
        Ok(())
    }

    fn annotate(&self, document: &Document) -> Result<Vec<Annotation>, StageError> {
        let text = document.text();

        Ok(self
            .detect(text)?
            .into_iter()
            .map(|section| {
                let slice = |span: Span| &text[span.start..span.end];
                Annotation::section(section.span, slice(section.span), section.section_type)
                    .with_confidence(section.confidence)
                    .with_attribute("header_text", slice(section.header).trim())
                    .with_attribute(
                        "header_span",
                        json!({ "start": section.header.start, "end": section.header.end }),
                    )
                    .with_attribute("content", slice(section.content))
            })
            .collect())
    }
}

/// Body text of the first section of `section_type` in an annotated document.
pub fn section_content(document: &Document, section_type: SectionType) -> Option<&str> {
    document
        .sections()
        .find(|(_, info)| info.section_type == section_type)
        .map(|(annotation, _)| {
            annotation
                .attribute("content")
                .and_then(|c| c.as_str())
                .unwrap_or_default()
        })
}

/// Body text per section type; repeated sections are joined by a blank line.
pub fn sections_by_type(document: &Document) -> BTreeMap<SectionType, String> {
    let mut by_type: BTreeMap<SectionType, String> = BTreeMap::new();
    for (annotation, info) in document.sections() {
        let content = annotation
            .attribute("content")
            .and_then(|c| c.as_str())
            .unwrap_or_default();
        by_type
            .entry(info.section_type)
            .and_modify(|existing| {
                existing.push_str("\n\n");
                existing.push_str(content);
            })
            .or_insert_with(|| content.to_string());
    }
    by_type
}
