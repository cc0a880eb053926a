//! Cue matching and nearest-cue assertion.

use layered_clinical::{Annotation, AnnotationPayload, AssertionStatus, EntityInfo, Span};
use unicode_segmentation::UnicodeSegmentation;

use crate::{ContextCue, CueDirection, CueSet};

/// Confidence factor applied to entities whose assertion was inferred.
pub const ASSERTION_CONFIDENCE_FACTOR: f64 = 0.95;

/// A case-folded word and its byte span in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub span: Span,
}

pub fn words(text: &str) -> Vec<Word> {
    text.unicode_word_indices()
        .map(|(start, word)| Word {
            text: word.to_lowercase(),
            span: Span::new(start, start + word.len()),
        })
        .collect()
}

/// A cue occurrence, as an inclusive word index range.
#[derive(Debug, Clone, PartialEq)]
pub struct CueMatch<'c> {
    pub cue: &'c ContextCue,
    pub first_word: usize,
    pub last_word: usize,
    pub span: Span,
}

impl CueSet {
    /// Every cue occurrence, by start word then cue order.
    pub fn find_matches(&self, words: &[Word]) -> Vec<CueMatch<'_>> {
        let mut matches = Vec::new();
        for (idx, word) in words.iter().enumerate() {
            for cue in self.starting_with(&word.text) {
                let len = cue.words().len();
                let candidate = match words.get(idx..idx + len) {
                    Some(candidate) => candidate,
                    None => continue,
                };
                let matched = candidate
                    .iter()
                    .zip(cue.words())
                    .all(|(word, cue_word)| word.text == *cue_word);
                if matched {
                    matches.push(CueMatch {
                        cue,
                        first_word: idx,
                        last_word: idx + len - 1,
                        span: Span::new(word.span.start, candidate[len - 1].span.end),
                    });
                }
            }
        }
        matches
    }
}

/// Word distance from a cue to an entity spanning `first..=last`, if the
/// cue's direction allows it at all.
fn distance(cue: &CueMatch<'_>, first: usize, last: usize) -> Option<usize> {
    let before = cue.last_word < first;
    let after = cue.first_word > last;
    match cue.cue.direction {
        CueDirection::Forward if before => Some(first - cue.last_word),
        CueDirection::Backward if after => Some(cue.first_word - last),
        CueDirection::Bidirectional if before => Some(first - cue.last_word),
        CueDirection::Bidirectional if after => Some(cue.first_word - last),
        CueDirection::Bidirectional => Some(0),
        _ => None,
    }
}

/// Outcome of classifying one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment<'c> {
    pub status: AssertionStatus,
    /// The nearest applicable cue, if any.
    pub cue: Option<&'c ContextCue>,
}

/// Classify the entity at `entity` from the cue occurrences around it.
///
/// The nearest applicable cue decides. Equally near cues are decided by
/// their order in `matches`, so the earlier-starting cue wins.
pub fn assess<'c>(words: &[Word], entity: Span, matches: &[CueMatch<'c>]) -> Assessment<'c> {
    let mut covered = words
        .iter()
        .enumerate()
        .filter(|(_, word)| word.span.overlaps(&entity))
        .map(|(idx, _)| idx);
    let first = match covered.next() {
        Some(first) => first,
        None => {
            return Assessment {
                status: AssertionStatus::Present,
                cue: None,
            }
        }
    };
    let last = covered.last().unwrap_or(first);

    let mut nearest: Option<(usize, &'c ContextCue)> = None;
    for cue_match in matches {
        let distance = match distance(cue_match, first, last) {
            Some(distance) if distance <= cue_match.cue.max_distance => distance,
            _ => continue,
        };
        let closer = match nearest {
            Some((best, _)) => distance < best,
            None => true,
        };
        if closer {
            nearest = Some((distance, cue_match.cue));
        }
    }

    match nearest {
        Some((_, cue)) => Assessment {
            status: cue.category.assertion(),
            cue: Some(cue),
        },
        None => Assessment {
            status: AssertionStatus::Present,
            cue: None,
        },
    }
}

/// Copy of `entity` carrying `assessment`, with discounted confidence.
pub(crate) fn labeled(entity: &Annotation, info: &EntityInfo, assessment: &Assessment<'_>) -> Annotation {
    let payload = AnnotationPayload::NamedEntity(EntityInfo {
        assertion: Some(assessment.status),
        ..info.clone()
    });
    let mut labeled = Annotation::new(entity.span(), entity.text(), payload)
        .with_confidence(entity.confidence() * ASSERTION_CONFIDENCE_FACTOR)
        .with_attributes(entity.attributes().clone())
        .with_attribute("assertion", assessment.status.as_str())
        .with_attribute("context_applied", true);
    if let Some(cue) = assessment.cue {
        labeled = labeled.with_attribute("assertion_cue", cue.literal());
    }
    labeled
}

/// Label every named entity in `entities` that has no assertion yet.
///
/// Other annotations and already classified entities are skipped, so the
/// output may be shorter than the input.
pub fn apply_context(text: &str, entities: &[Annotation], cues: &CueSet) -> Vec<Annotation> {
    apply_context_within(text, entities, cues, &[])
}

/// Like [`apply_context`], but an entity inside one of `scopes` only sees
/// cues inside that same scope. Entities outside every scope see all cues.
pub fn apply_context_within(
    text: &str,
    entities: &[Annotation],
    cues: &CueSet,
    scopes: &[Span],
) -> Vec<Annotation> {
    let words = words(text);
    let matches = cues.find_matches(&words);

    entities
        .iter()
        .filter_map(|entity| {
            let info = entity.as_entity().filter(|info| info.assertion.is_none())?;
            let span = entity.span();
            let assessment = match scopes.iter().find(|scope| scope.contains(&span)) {
                Some(scope) => {
                    let local: Vec<CueMatch<'_>> = matches
                        .iter()
                        .filter(|m| scope.contains(&m.span))
                        .cloned()
                        .collect();
                    assess(&words, span, &local)
                }
                None => assess(&words, span, &matches),
            };
            Some(labeled(entity, info, &assessment))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CueCategory;

    fn cue_set(cues: &[(&str, CueCategory, CueDirection, usize)]) -> CueSet {
        let mut set = CueSet::new();
        for (literal, category, direction, scope) in cues {
            set.push(ContextCue::new(literal, *category, *direction, *scope));
        }
        set
    }

    fn status_of(text: &str, entity: &str, cues: &CueSet) -> AssertionStatus {
        let start = text.find(entity).unwrap();
        let words = words(text);
        let matches = cues.find_matches(&words);
        assess(&words, Span::new(start, start + entity.len()), &matches).status
    }

    #[test]
    fn test_words_keep_original_offsets() {
        let found = words("Pt DENIES fever.");
        let texts: Vec<&str> = found.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["pt", "denies", "fever"]);
        assert_eq!(found[1].span, Span::new(3, 9));
    }

    #[test]
    fn test_multi_word_cue_requires_every_word() {
        let cues = cue_set(&[("no evidence of", CueCategory::Negation, CueDirection::Forward, 6)]);
        let matches = cues.find_matches(&words("no evidence of pneumonia"));
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].first_word, matches[0].last_word), (0, 2));
        assert_eq!(matches[0].span, Span::new(0, 14));

        assert!(cues.find_matches(&words("no new evidence")).is_empty());
        assert!(cues.find_matches(&words("no evidence")).is_empty());
    }

    #[test]
    fn test_nearest_cue_wins() {
        // denies at word 8, possible at word 9, chest pain from word 10
        let text = "one two three four five six seven eight denies possible chest pain";
        let cues = cue_set(&[
            ("denies", CueCategory::Negation, CueDirection::Forward, 6),
            ("possible", CueCategory::Uncertainty, CueDirection::Forward, 6),
        ]);
        assert_eq!(status_of(text, "chest pain", &cues), AssertionStatus::Possible);
    }

    #[test]
    fn test_equal_distance_goes_to_earlier_cue() {
        let text = "past fh diabetes";
        let cues = cue_set(&[
            ("fh", CueCategory::FamilyHistory, CueDirection::Forward, 5),
            ("past fh", CueCategory::Historical, CueDirection::Forward, 5),
        ]);
        // both end at word 1, "past fh" starts first
        assert_eq!(status_of(text, "diabetes", &cues), AssertionStatus::Historical);
    }

    #[test]
    fn test_direction_and_scope() {
        let cues = cue_set(&[
            ("denies", CueCategory::Negation, CueDirection::Forward, 2),
            ("was ruled out", CueCategory::Negation, CueDirection::Backward, 3),
        ]);
        assert_eq!(status_of("fever denies", "fever", &cues), AssertionStatus::Present);
        assert_eq!(status_of("denies a b fever", "fever", &cues), AssertionStatus::Present);
        assert_eq!(status_of("denies a fever", "fever", &cues), AssertionStatus::Absent);
        assert_eq!(
            status_of("pneumonia was ruled out", "pneumonia", &cues),
            AssertionStatus::Absent
        );
        assert_eq!(
            status_of("was ruled out pneumonia", "pneumonia", &cues),
            AssertionStatus::Present
        );
    }

    #[test]
    fn test_bidirectional_cue_inside_entity() {
        let cues = cue_set(&[("pending", CueCategory::Conditional, CueDirection::Bidirectional, 0)]);
        assert_eq!(
            status_of("biopsy pending review", "biopsy pending", &cues),
            AssertionStatus::Conditional
        );
        assert_eq!(status_of("biopsy pending", "biopsy", &cues), AssertionStatus::Present);
    }

    #[test]
    fn test_no_cue_is_present() {
        assert_eq!(
            status_of("Patient reports chest pain.", "chest pain", &CueSet::clinical()),
            AssertionStatus::Present
        );
    }
}
