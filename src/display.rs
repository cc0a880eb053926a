use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::{AnnotationId, AnnotationKind, Document};

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ..., AZ, BA, ...
/// Similar to Excel column naming.
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

struct IncludedAnnotation {
    id: AnnotationId,
    summary: String,
    /// `(role, target)` arrows drawn under relation annotations.
    arrows: Vec<(&'static str, AnnotationId)>,
}

/// Renders a document's text with its annotations underlined beneath it.
///
/// ```text
/// Pain in left arm.
/// ╰──╯[A] NamedEntity(sign_symptom) conf: 1.00
///         ╰──────╯[B] NamedEntity(anatomy) conf: 1.00
/// ╰──────────────╯Relation(located_in) conf: 1.00
///   └─arg1─>[A]
///   └─arg2─>[B]
/// ```
///
/// Line breaks and tabs in the text are drawn as spaces so that every
/// annotation lines up with the single text row.
pub struct DocumentDisplay<'a> {
    document: &'a Document,
    included: Vec<IncludedAnnotation>,
}

impl<'a> std::fmt::Display for DocumentDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opening_line: String = self
            .document
            .text()
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .collect();
        f.write_str(&opening_line)?;

        let column = |offset: usize| {
            opening_line
                .get(..offset)
                .map(UnicodeWidthStr::width)
                .unwrap_or(0)
        };

        let labels = self.build_span_labels();

        for included in &self.included {
            let annotation = match self.document.get(included.id) {
                Some(annotation) => annotation,
                None => continue,
            };

            f.write_char('\n')?;

            let start_char_idx = column(annotation.start());
            let end_char_idx = column(annotation.end());
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_char_idx.saturating_sub(start_char_idx) > 1 {
                f.write_char('╯')?;
            }

            if let Some(label) = labels.get(&included.id) {
                write!(f, "{} ", label)?;
            }

            f.write_str(&included.summary)?;

            for (role, target) in &included.arrows {
                f.write_char('\n')?;
                for _ in 0..start_char_idx + 2 {
                    f.write_char(' ')?;
                }
                let target_str = match labels.get(target) {
                    Some(label) => label.clone(),
                    None => format!("[#{}]", target.0),
                };
                write!(f, "└─{}─>{}", role, target_str)?;
            }
        }

        Ok(())
    }
}

impl<'a> DocumentDisplay<'a> {
    pub fn new(document: &'a Document) -> Self {
        DocumentDisplay {
            document,
            included: Vec::new(),
        }
    }

    /// Labels like "[A]", "[B]" for included annotations that relations point at.
    fn build_span_labels(&self) -> HashMap<AnnotationId, String> {
        let included_ids: HashSet<AnnotationId> = self.included.iter().map(|i| i.id).collect();

        let mut targets: Vec<AnnotationId> = self
            .included
            .iter()
            .flat_map(|i| i.arrows.iter().map(|(_, target)| *target))
            .filter(|target| included_ids.contains(target))
            .collect();
        targets.sort();
        targets.dedup();

        targets
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, format!("[{}]", index_to_base26_label(i))))
            .collect()
    }

    /// Include every annotation of `kind`, in document order.
    pub fn include(&mut self, kind: AnnotationKind) {
        for (id, annotation) in self.document.indexed_annotations_of(kind) {
            let arrows = match annotation.as_relation() {
                Some(relation) => vec![("arg1", relation.arg1), ("arg2", relation.arg2)],
                None => Vec::new(),
            };
            self.included.push(IncludedAnnotation {
                id,
                summary: annotation.summary(),
                arrows,
            });
        }
    }

    /// Takes self
    pub fn with(mut self, kind: AnnotationKind) -> Self {
        self.include(kind);
        self
    }
}
