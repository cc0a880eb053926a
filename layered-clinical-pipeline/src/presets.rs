use layered_clinical::{ConceptMappingConfig, NerConfig, Pipeline, PipelineConfig, TokenizerConfig};
use layered_clinical_concepts::ConceptMapping;
use layered_clinical_context::ClinicalAssertion;
use layered_clinical_entities::{ClinicalNer, PatternNer};
use layered_clinical_sections::ClinicalSectionDetector;
use layered_clinical_text::{ClinicalSentenceSegmenter, ClinicalTokenizer};

/// Sentences, tokens, sections, entities, assertion status and concepts.
pub fn standard(config: PipelineConfig) -> Pipeline {
    tracing::debug!("Building standard clinical pipeline");
    Pipeline::new(config.clone())
        .add_stage(ClinicalSentenceSegmenter::new(config.sentence_segmenter))
        .add_stage(ClinicalTokenizer::new(config.tokenizer))
        .add_stage(ClinicalSectionDetector::new(config.section_detector))
        .add_stage(ClinicalNer::new(config.ner))
        .add_stage(ClinicalAssertion::new(config.assertion))
        .add_stage(ConceptMapping::new(config.concept_mapping))
}

/// Rule-based stages only: regex entities and exact concept lookup against
/// the built-in dictionary.
pub fn fast() -> Pipeline {
    let config = PipelineConfig {
        tokenizer: TokenizerConfig {
            include_pos: false,
            include_lemma: false,
            ..TokenizerConfig::default()
        },
        concept_mapping: ConceptMappingConfig {
            use_approximate_matching: false,
            ..ConceptMappingConfig::default()
        },
        ..PipelineConfig::default()
    };

    Pipeline::new(config.clone())
        .add_stage(ClinicalSentenceSegmenter::default())
        .add_stage(ClinicalTokenizer::new(config.tokenizer))
        .add_stage(PatternNer)
        .add_stage(ConceptMapping::new(config.concept_mapping))
}

/// Sentences, tokens and dictionary entities.
pub fn basic(config: PipelineConfig) -> Pipeline {
    Pipeline::new(config.clone())
        .add_stage(ClinicalSentenceSegmenter::new(config.sentence_segmenter))
        .add_stage(ClinicalTokenizer::new(config.tokenizer))
        .add_stage(ClinicalNer::new(NerConfig {
            use_rules: true,
            use_model: false,
        }))
}
