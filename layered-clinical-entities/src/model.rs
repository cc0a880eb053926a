use layered_clinical::{Annotation, Document, EntityType, SpanTagger, StageError};

/// Entity type for a model label. Covers general-domain, biomedical and
/// clinical label sets; anything else is dropped.
pub fn map_model_label(label: &str) -> Option<EntityType> {
    match label {
        "PERSON" => Some(EntityType::Person),
        "ORG" => Some(EntityType::Organization),
        "DISEASE" | "Disease" | "DISORDER" => Some(EntityType::Disorder),
        "CHEMICAL" | "Chemical" | "MEDICATION" => Some(EntityType::Medication),
        "PROCEDURE" => Some(EntityType::Procedure),
        "ANATOMY" => Some(EntityType::Anatomy),
        _ => None,
    }
}

/// Entity candidates from an external tagger.
///
/// A span that does not fit the document text is a collaborator failure.
pub fn model_entities(
    tagger: &dyn SpanTagger,
    document: &Document,
) -> Result<Vec<Annotation>, StageError> {
    let mut entities = Vec::new();
    for tagged in tagger.tag(document.text())? {
        let slice = document.slice(tagged.span).ok_or_else(|| {
            StageError::collaborator(
                tagger.name(),
                format!("entity span {} is not valid for this text", tagged.span),
            )
        })?;
        let entity_type = match map_model_label(&tagged.label) {
            Some(entity_type) => entity_type,
            None => continue,
        };
        entities.push(
            Annotation::named_entity(tagged.span, slice, entity_type)
                .with_confidence(tagged.confidence)
                .with_attribute("model_label", tagged.label.as_str())
                .with_attribute("method", "model"),
        );
    }
    Ok(entities)
}
