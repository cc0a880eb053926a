//! Pipeline configuration.
//!
//! One typed section per stage, resolved once when the pipeline is built.
//! Unknown keys are ignored and missing keys fall back to the defaults below.
//! Range checks happen in each stage's `initialize`, so a bad value surfaces
//! as a configuration error for that stage.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, StageError};

/// Name of the built-in rule-based backend.
pub const RULE_BACKEND: &str = "rule";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stop at the first stage failure instead of recording it.
    pub fail_on_error: bool,
    pub sentence_segmenter: SentenceSegmenterConfig,
    pub tokenizer: TokenizerConfig,
    pub section_detector: SectionDetectorConfig,
    pub ner: NerConfig,
    pub assertion: AssertionConfig,
    pub concept_mapping: ConceptMappingConfig,
}

impl PipelineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Load a config file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            Some("ron") => Self::from_ron_str(&content),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }
}

fn rule_backend() -> String {
    RULE_BACKEND.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceSegmenterConfig {
    /// `"rule"` or the name of an external segmenter.
    pub backend: String,
}

impl Default for SentenceSegmenterConfig {
    fn default() -> Self {
        Self {
            backend: rule_backend(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub backend: String,
    pub include_pos: bool,
    pub include_lemma: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            backend: rule_backend(),
            include_pos: true,
            include_lemma: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionDetectorConfig {
    pub case_sensitive: bool,
    /// Section type label → header patterns, merged over the built-in table.
    pub custom_patterns: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    pub use_rules: bool,
    pub use_model: bool,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            use_rules: true,
            use_model: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertionConfig {
    /// Upper bound applied to every cue's own scope, in words.
    pub max_scope: usize,
    pub custom_cues: Vec<CueConfig>,
    /// `"none"`, `"sentence"` or `"section"`.
    pub scope_boundary: String,
}

impl Default for AssertionConfig {
    fn default() -> Self {
        Self {
            max_scope: 10,
            custom_cues: Vec::new(),
            scope_boundary: "none".to_string(),
        }
    }
}

fn default_cue_direction() -> String {
    "bidirectional".to_string()
}

fn default_cue_distance() -> usize {
    10
}

/// A user-supplied context cue, validated by the assertion stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueConfig {
    pub literal: String,
    pub category: String,
    #[serde(default = "default_cue_direction")]
    pub direction: String,
    #[serde(default = "default_cue_distance")]
    pub max_distance: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptMappingConfig {
    pub use_approximate_matching: bool,
    pub min_similarity: f64,
    pub case_sensitive: bool,
    /// Top-K concepts kept per entity.
    pub max_results: usize,
    /// Reject concepts whose semantic types do not fit the entity type.
    pub strict_semantic_types: bool,
}

impl Default for ConceptMappingConfig {
    fn default() -> Self {
        Self {
            use_approximate_matching: true,
            min_similarity: 0.8,
            case_sensitive: false,
            max_results: 3,
            strict_semantic_types: false,
        }
    }
}

impl ConceptMappingConfig {
    pub fn validate(&self) -> Result<(), StageError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(StageError::config(format!(
                "min_similarity must be within [0, 1], got {}",
                self.min_similarity
            )));
        }
        if self.max_results == 0 {
            return Err(StageError::config("max_results must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(!config.fail_on_error);
        assert_eq!(config.sentence_segmenter.backend, "rule");
        assert!(config.tokenizer.include_pos);
        assert!(config.ner.use_rules);
        assert_eq!(config.assertion.max_scope, 10);
        assert_eq!(config.concept_mapping.min_similarity, 0.8);
        assert_eq!(config.concept_mapping.max_results, 3);
    }

    #[test]
    fn test_json_unknown_keys_ignored_and_missing_keys_defaulted() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "tokenizer": {"include_pos": false, "colour": "blue"},
                "ner": {"use_model": false},
                "assertion": {
                    "custom_cues": [{"literal": "no sign of", "category": "negation"}]
                },
                "something_else": 42
            }"#,
        )
        .unwrap();

        assert!(!config.tokenizer.include_pos);
        assert!(config.tokenizer.include_lemma);
        assert!(!config.ner.use_model);
        assert!(config.ner.use_rules);

        let cue = &config.assertion.custom_cues[0];
        assert_eq!(cue.direction, "bidirectional");
        assert_eq!(cue.max_distance, 10);
    }

    #[test]
    fn test_toml_config() {
        let config = PipelineConfig::from_toml_str(
            r#"
            fail_on_error = true

            [concept_mapping]
            use_approximate_matching = false
            min_similarity = 0.5

            [section_detector.custom_patterns]
            plan = ["next\\s+steps"]
            "#,
        )
        .unwrap();

        assert!(config.fail_on_error);
        assert!(!config.concept_mapping.use_approximate_matching);
        assert_eq!(config.concept_mapping.min_similarity, 0.5);
        assert_eq!(
            config.section_detector.custom_patterns["plan"],
            vec!["next\\s+steps".to_string()]
        );
    }

    #[test]
    fn test_ron_config() {
        let config =
            PipelineConfig::from_ron_str("(fail_on_error: true, ner: (use_model: false))").unwrap();
        assert!(config.fail_on_error);
        assert!(!config.ner.use_model);
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"fail_on_error": true}}"#).unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert!(config.fail_on_error);

        let other = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            PipelineConfig::load(other.path()),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_concept_mapping_validation() {
        let mut config = ConceptMappingConfig::default();
        assert!(config.validate().is_ok());

        config.min_similarity = 1.2;
        assert!(matches!(config.validate(), Err(StageError::Config(_))));

        config.min_similarity = 0.5;
        config.max_results = 0;
        assert!(config.validate().is_err());
    }
}
