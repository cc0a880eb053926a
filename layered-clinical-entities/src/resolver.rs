//! Greedy overlap resolution for entity candidates.

use std::cmp::Ordering;

use layered_clinical::Annotation;

/// Most confident first, then leftmost, then longest, then entity type.
/// Candidates still tied (same span and type, different provenance) are
/// ordered by their serialized form, so only identical candidates compare
/// equal and the input order never matters.
fn priority(a: &Annotation, b: &Annotation) -> Ordering {
    b.confidence()
        .total_cmp(&a.confidence())
        .then_with(|| a.start().cmp(&b.start()))
        .then_with(|| b.end().cmp(&a.end()))
        .then_with(|| {
            let a_type = a.as_entity().map(|e| e.entity_type);
            let b_type = b.as_entity().map(|e| e.entity_type);
            a_type.cmp(&b_type)
        })
        .then_with(|| canonical(a).cmp(&canonical(b)))
}

fn canonical(annotation: &Annotation) -> String {
    serde_json::to_string(annotation).unwrap_or_default()
}

/// Keep a subset of `candidates` in which no two spans strictly overlap.
///
/// Candidates are visited by priority and accepted unless they overlap one
/// already accepted, so a confident short match beats a longer, weaker one.
/// Touching spans (`[0,5)` and `[5,9)`) both survive. The result is in
/// document order.
pub fn resolve_overlaps(mut candidates: Vec<Annotation>) -> Vec<Annotation> {
    candidates.sort_by(priority);

    let mut accepted: Vec<Annotation> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|kept| kept.span().overlaps(&candidate.span()));
        if !overlaps {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|a| (a.start(), a.end()));
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_clinical::{EntityType, Span};

    fn entity(start: usize, end: usize, confidence: f64, entity_type: EntityType) -> Annotation {
        Annotation::named_entity(Span::new(start, end), "x".repeat(end - start), entity_type)
            .with_confidence(confidence)
    }

    #[test]
    fn test_confident_candidate_beats_earlier_overlap() {
        let kept = resolve_overlaps(vec![
            entity(0, 8, 0.7, EntityType::Disorder),
            entity(2, 10, 0.9, EntityType::Disorder),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].span(), Span::new(2, 10));
    }

    #[test]
    fn test_touching_spans_both_kept() {
        let kept = resolve_overlaps(vec![
            entity(5, 9, 0.9, EntityType::Anatomy),
            entity(0, 5, 0.8, EntityType::Disorder),
        ]);
        let spans: Vec<Span> = kept.iter().map(|a| a.span()).collect();
        assert_eq!(spans, vec![Span::new(0, 5), Span::new(5, 9)]);
    }

    #[test]
    fn test_equal_confidence_prefers_leftmost_then_longest() {
        let kept = resolve_overlaps(vec![
            entity(0, 5, 0.85, EntityType::Anatomy),
            entity(0, 10, 0.85, EntityType::Disorder),
            entity(0, 3, 0.9, EntityType::SignSymptom),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].span(), Span::new(0, 3));

        let kept = resolve_overlaps(vec![
            entity(3, 12, 0.85, EntityType::Procedure),
            entity(0, 5, 0.85, EntityType::Anatomy),
            entity(0, 10, 0.85, EntityType::SignSymptom),
            entity(0, 10, 0.85, EntityType::Disorder),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].span(), Span::new(0, 10));
        assert_eq!(kept[0].as_entity().unwrap().entity_type, EntityType::Disorder);
    }

    #[test]
    fn test_output_never_overlaps_and_ignores_input_order() {
        let candidates = vec![
            entity(0, 4, 0.6, EntityType::Disorder),
            entity(3, 7, 0.9, EntityType::Medication),
            entity(6, 12, 0.8, EntityType::Procedure),
            entity(12, 14, 0.5, EntityType::Anatomy),
            entity(1, 2, 0.99, EntityType::LabValue),
            entity(3, 7, 0.9, EntityType::Anatomy),
        ];

        let forward = resolve_overlaps(candidates.clone());
        let mut reversed_input = candidates;
        reversed_input.reverse();
        let backward = resolve_overlaps(reversed_input);
        assert_eq!(forward, backward);

        let spans: Vec<Span> = forward.iter().map(|a| a.span()).collect();
        assert_eq!(
            spans,
            vec![Span::new(1, 2), Span::new(3, 7), Span::new(12, 14)]
        );
        for (i, a) in forward.iter().enumerate() {
            for b in &forward[i + 1..] {
                assert!(!a.span().overlaps(&b.span()));
            }
        }
    }

    #[test]
    fn test_provenance_tie_ignores_input_order() {
        let model = entity(0, 5, 0.85, EntityType::SignSymptom).with_attribute("method", "model");
        let rule = entity(0, 5, 0.85, EntityType::SignSymptom).with_attribute("method", "rule");

        let model_first = resolve_overlaps(vec![model.clone(), rule.clone()]);
        let rule_first = resolve_overlaps(vec![rule, model]);
        assert_eq!(model_first, rule_first);
        assert_eq!(model_first.len(), 1);
        assert_eq!(
            model_first[0].attribute("method").and_then(|v| v.as_str()),
            Some("model")
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(Vec::new()).is_empty());
    }
}
