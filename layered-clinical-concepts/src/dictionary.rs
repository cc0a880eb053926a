//! Concept dictionaries keyed by term.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use layered_clinical::ConfigError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

fn default_vocabulary() -> String {
    "UMLS".to_string()
}

/// A terminology concept and the terms that name it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub preferred_name: String,
    pub semantic_types: Vec<String>,
    #[serde(default = "default_vocabulary")]
    pub vocabulary: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl Concept {
    pub fn new(code: &str, preferred_name: &str, semantic_types: &[&str]) -> Self {
        Concept {
            code: code.to_string(),
            preferred_name: preferred_name.to_string(),
            semantic_types: semantic_types.iter().map(|t| t.to_string()).collect(),
            vocabulary: default_vocabulary(),
            synonyms: Vec::new(),
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: &str) -> Self {
        self.vocabulary = vocabulary.to_string();
        self
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Preferred name followed by synonyms.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.preferred_name.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }

    /// Semantic types as a single comma separated label.
    pub fn semantic_type_label(&self) -> String {
        self.semantic_types.join(", ")
    }
}

/// A small built-in sample of common clinical concepts.
pub fn sample_concepts() -> Vec<Concept> {
    vec![
        Concept::new("C0011847", "Diabetes Mellitus", &["T047"])
            .with_synonyms(&["diabetes", "diabetes mellitus", "dm"]),
        Concept::new("C0020538", "Hypertensive disease", &["T047"])
            .with_synonyms(&["hypertension", "high blood pressure", "htn"]),
        Concept::new("C0003873", "Rheumatoid Arthritis", &["T047"])
            .with_synonyms(&["rheumatoid arthritis", "ra"]),
        Concept::new("C0004096", "Asthma", &["T047"]).with_synonyms(&["asthma", "bronchial asthma"]),
        Concept::new("C0011570", "Mental Depression", &["T048"])
            .with_synonyms(&["depression", "major depression", "clinical depression"]),
        Concept::new("C0028754", "Obesity", &["T047"]).with_synonyms(&["obesity", "obese"]),
        Concept::new("C0002895", "Anemia", &["T047"]).with_synonyms(&["anemia", "anaemia"]),
        Concept::new("C0025598", "Metformin", &["T109", "T121"])
            .with_vocabulary("RxNorm")
            .with_synonyms(&["metformin", "glucophage"]),
        Concept::new("C0021641", "Insulin", &["T116", "T121", "T125"])
            .with_vocabulary("RxNorm")
            .with_synonyms(&["insulin"]),
        Concept::new("C0065374", "Lisinopril", &["T109", "T121"])
            .with_vocabulary("RxNorm")
            .with_synonyms(&["lisinopril", "prinivil", "zestril"]),
        Concept::new("C0004057", "Aspirin", &["T109", "T121"])
            .with_vocabulary("RxNorm")
            .with_synonyms(&["aspirin", "acetylsalicylic acid", "asa"]),
        Concept::new("C0004454", "Atorvastatin", &["T109", "T121"])
            .with_vocabulary("RxNorm")
            .with_synonyms(&["atorvastatin", "lipitor"]),
        Concept::new("C0009378", "Colonoscopy", &["T060"])
            .with_synonyms(&["colonoscopy", "colonic endoscopy"]),
        Concept::new("C0003968", "Appendectomy", &["T061"])
            .with_synonyms(&["appendectomy", "appendicectomy"]),
        Concept::new("C0007430", "Cardiac Catheterization", &["T060"])
            .with_synonyms(&["cardiac catheterization", "heart catheterization"]),
        Concept::new("C0018787", "Heart", &["T023"]).with_synonyms(&["heart", "cardiac"]),
        Concept::new("C0024109", "Lung", &["T023"]).with_synonyms(&["lung", "lungs", "pulmonary"]),
        Concept::new("C0023884", "Liver", &["T023"]).with_synonyms(&["liver", "hepatic"]),
        Concept::new("C0022646", "Kidney", &["T023"])
            .with_synonyms(&["kidney", "kidneys", "renal"]),
        Concept::new("C0013404", "Dyspnea", &["T184"])
            .with_synonyms(&["dyspnea", "shortness of breath", "sob", "difficulty breathing"]),
        Concept::new("C0008031", "Chest Pain", &["T184"])
            .with_synonyms(&["chest pain", "chest discomfort"]),
        Concept::new("C0015967", "Fever", &["T184"]).with_synonyms(&["fever", "pyrexia", "febrile"]),
        Concept::new("C0027497", "Nausea", &["T184"])
            .with_synonyms(&["nausea", "nauseated", "sick to stomach"]),
    ]
}

static BUILTIN: Lazy<Arc<ConceptDictionary>> =
    Lazy::new(|| Arc::new(ConceptDictionary::from_concepts(sample_concepts(), false)));

/// Concepts indexed by their preferred names and synonyms.
///
/// Terms are case-folded unless the dictionary is case-sensitive. Term order
/// follows insertion, which keeps equally scored matches stable.
#[derive(Debug, Clone, Default)]
pub struct ConceptDictionary {
    concepts: Vec<Concept>,
    /// `(term key, concept indices)` in first-seen order.
    terms: Vec<(String, Vec<usize>)>,
    by_term: HashMap<String, usize>,
    case_sensitive: bool,
}

impl ConceptDictionary {
    pub fn new(case_sensitive: bool) -> Self {
        ConceptDictionary {
            case_sensitive,
            ..Self::default()
        }
    }

    /// The shared case-insensitive sample dictionary.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_concepts(concepts: impl IntoIterator<Item = Concept>, case_sensitive: bool) -> Self {
        let mut dictionary = Self::new(case_sensitive);
        for concept in concepts {
            dictionary.insert(concept);
        }
        dictionary
    }

    /// Parse a JSON array of concepts.
    pub fn from_json_str(json: &str, case_sensitive: bool) -> Result<Self, ConfigError> {
        let concepts: Vec<Concept> = serde_json::from_str(json)?;
        Ok(Self::from_concepts(concepts, case_sensitive))
    }

    pub fn load(path: &Path, case_sensitive: bool) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content, case_sensitive)
    }

    pub fn insert(&mut self, concept: Concept) {
        let idx = self.concepts.len();
        let keys: Vec<String> = concept.terms().map(|term| self.key(term)).collect();
        for key in keys {
            match self.by_term.get(&key) {
                Some(&slot) => {
                    let entries = &mut self.terms[slot].1;
                    if !entries.contains(&idx) {
                        entries.push(idx);
                    }
                }
                None => {
                    self.by_term.insert(key.clone(), self.terms.len());
                    self.terms.push((key, vec![idx]));
                }
            }
        }
        self.concepts.push(concept);
    }

    /// The lookup key for `text`.
    pub fn key(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// The concept with `code`, if any.
    pub fn concept(&self, code: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.code == code)
    }

    /// Concepts named exactly by `key`.
    pub fn lookup(&self, key: &str) -> impl Iterator<Item = &Concept> + '_ {
        self.by_term
            .get(key)
            .into_iter()
            .flat_map(move |&slot| self.terms[slot].1.iter())
            .map(move |&idx| &self.concepts[idx])
    }

    /// Every `(term key, concept)` pair, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Concept)> + '_ {
        self.terms.iter().flat_map(move |(key, indices)| {
            indices
                .iter()
                .map(move |&idx| (key.as_str(), &self.concepts[idx]))
        })
    }

    /// The term of `concept` that `key` names, falling back to the preferred
    /// name.
    pub fn matching_term<'c>(&self, concept: &'c Concept, key: &str) -> &'c str {
        concept
            .terms()
            .find(|term| self.key(term) == key)
            .unwrap_or(concept.preferred_name.as_str())
    }
}
