//! Dictionary-based entity recognition.

use std::sync::Arc;

use layered_clinical::{Annotation, EntityType, Span, StageError};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Confidence of a dictionary match.
pub const RULE_CONFIDENCE: f64 = 0.85;

const DISORDERS: &[&str] = &[
    "diabetes", "diabetes mellitus", "hypertension", "high blood pressure",
    "hyperlipidemia", "obesity", "depression", "anxiety", "asthma",
    "copd", "chronic obstructive pulmonary disease", "pneumonia",
    "myocardial infarction", "heart attack", "stroke", "cva",
    "cerebrovascular accident", "atrial fibrillation", "heart failure",
    "congestive heart failure", "chf", "angina", "chest pain",
    "shortness of breath", "dyspnea", "chronic kidney disease",
    "ckd", "renal failure", "kidney failure", "cirrhosis",
    "hepatitis", "gastroesophageal reflux", "gerd", "peptic ulcer",
    "inflammatory bowel disease", "ibd", "crohn's disease",
    "ulcerative colitis", "rheumatoid arthritis", "osteoarthritis",
    "osteoporosis", "fracture", "cancer", "carcinoma", "tumor",
    "neoplasm", "malignancy", "leukemia", "lymphoma", "melanoma",
    "alzheimer's disease", "dementia", "parkinson's disease",
    "multiple sclerosis", "epilepsy", "seizure", "migraine",
    "headache", "back pain", "arthritis", "fibromyalgia",
];

const MEDICATIONS: &[&str] = &[
    "metformin", "insulin", "lisinopril", "atorvastatin", "simvastatin",
    "amlodipine", "hydrochlorothiazide", "hctz", "losartan", "aspirin",
    "warfarin", "clopidogrel", "plavix", "omeprazole", "pantoprazole",
    "albuterol", "fluticasone", "prednisone", "ibuprofen", "acetaminophen",
    "tylenol", "morphine", "oxycodone", "hydrocodone", "tramadol",
    "gabapentin", "pregabalin", "sertraline", "citalopram", "escitalopram",
    "fluoxetine", "prozac", "zoloft", "lexapro", "trazodone",
    "alprazolam", "xanax", "lorazepam", "ativan", "clonazepam",
    "klonopin", "levothyroxine", "synthroid", "metoprolol", "carvedilol",
    "furosemide", "lasix", "spironolactone", "digoxin", "amiodarone",
    "diltiazem", "verapamil", "nitroglycerin", "isosorbide", "sildenafil",
    "viagra", "tadalafil", "cialis", "finasteride", "tamsulosin",
    "doxazosin", "terazosin", "ciprofloxacin", "levofloxacin",
    "amoxicillin", "azithromycin", "clarithromycin", "doxycycline",
    "cephalexin", "trimethoprim", "sulfamethoxazole", "bactrim",
];

const PROCEDURES: &[&str] = &[
    "appendectomy", "cholecystectomy", "colonoscopy", "endoscopy",
    "bronchoscopy", "cystoscopy", "arthroscopy", "laparoscopy",
    "thoracotomy", "craniotomy", "mastectomy", "hysterectomy",
    "prostatectomy", "nephrectomy", "splenectomy", "thyroidectomy",
    "tonsillectomy", "adenoidectomy", "cataract surgery",
    "coronary angioplasty", "cardiac catheterization", "pacemaker",
    "defibrillator", "stent", "bypass surgery", "cabg",
    "valve replacement", "transplant", "dialysis", "hemodialysis",
    "peritoneal dialysis", "chemotherapy", "radiation therapy",
    "surgery", "operation", "biopsy", "incision", "excision",
    "resection", "repair", "reconstruction", "implantation",
    "insertion", "removal", "drainage", "suture", "stapling",
];

const ANATOMY: &[&str] = &[
    "heart", "lung", "lungs", "liver", "kidney", "kidneys", "brain",
    "head", "neck", "chest", "abdomen", "pelvis", "back", "spine",
    "arm", "arms", "leg", "legs", "hand", "hands", "foot", "feet",
    "eye", "eyes", "ear", "ears", "nose", "mouth", "throat",
    "stomach", "intestine", "colon", "rectum", "bladder", "prostate",
    "uterus", "ovary", "ovaries", "breast", "breasts", "skin",
    "muscle", "muscles", "bone", "bones", "joint", "joints",
    "artery", "arteries", "vein", "veins", "blood vessel",
    "coronary artery", "aorta", "pulmonary artery", "carotid artery",
    "femoral artery", "renal artery", "hepatic artery", "splenic artery",
];

const SIGNS_AND_SYMPTOMS: &[&str] = &[
    "fever", "pain", "nausea", "vomiting", "diarrhea", "constipation",
    "fatigue", "weakness", "dizziness", "headache", "cough",
    "shortness of breath", "dyspnea", "chest pain", "abdominal pain",
    "back pain", "joint pain", "muscle pain", "sore throat",
    "runny nose", "congestion", "sneezing", "rash", "itching",
    "swelling", "edema", "bruising", "bleeding", "weight loss",
    "weight gain", "loss of appetite", "increased appetite",
    "night sweats", "chills", "hot flashes", "palpitations",
    "irregular heartbeat", "high blood pressure", "low blood pressure",
    "rapid heart rate", "slow heart rate", "difficulty breathing",
    "wheezing", "hoarseness", "difficulty swallowing", "heartburn",
    "acid reflux", "bloating", "gas", "cramping", "urgency",
    "frequency", "burning", "numbness", "tingling", "stiffness",
];

/// The built-in term lists, per entity type.
pub const DEFAULT_TERMS: &[(EntityType, &[&str])] = &[
    (EntityType::Disorder, DISORDERS),
    (EntityType::Medication, MEDICATIONS),
    (EntityType::Procedure, PROCEDURES),
    (EntityType::Anatomy, ANATOMY),
    (EntityType::SignSymptom, SIGNS_AND_SYMPTOMS),
];

static BUILTIN: Lazy<Arc<EntityDictionary>> = Lazy::new(|| {
    let mut dictionary = EntityDictionary::new();
    for (entity_type, terms) in DEFAULT_TERMS {
        for term in *terms {
            dictionary
                .insert(*entity_type, term)
                .expect("Invalid dictionary term regex");
        }
    }
    Arc::new(dictionary)
});

#[derive(Debug, Clone)]
struct Entry {
    entity_type: EntityType,
    term: String,
    regex: Regex,
}

/// Case-insensitive term lists for rule-based NER.
///
/// A term matches only when the characters on either side are not
/// alphanumeric, so "arm" does not fire inside "pharmacy". The same term may
/// be listed under several entity types; every listing produces a candidate.
#[derive(Debug, Clone, Default)]
pub struct EntityDictionary {
    entries: Vec<Entry>,
}

impl EntityDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared built-in dictionary.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_terms<'a>(
        terms: impl IntoIterator<Item = (EntityType, &'a str)>,
    ) -> Result<Self, StageError> {
        let mut dictionary = Self::new();
        for (entity_type, term) in terms {
            dictionary.insert(entity_type, term)?;
        }
        Ok(dictionary)
    }

    /// Add a term. Blank terms are ignored.
    pub fn insert(&mut self, entity_type: EntityType, term: &str) -> Result<(), StageError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }
        let regex = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .map_err(|e| StageError::config(format!("dictionary term '{}': {}", term, e)))?;
        self.entries.push(Entry {
            entity_type,
            term: term.to_string(),
            regex,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn terms(&self, entity_type: EntityType) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.entity_type == entity_type)
            .map(|e| e.term.as_str())
    }

    /// Candidate entities for every term occurrence, possibly overlapping.
    pub fn find(&self, text: &str) -> Vec<Annotation> {
        let mut found = Vec::new();
        for entry in &self.entries {
            for m in entry.regex.find_iter(text) {
                if !on_word_edges(text, m.start(), m.end()) {
                    continue;
                }
                found.push(
                    Annotation::named_entity(
                        Span::new(m.start(), m.end()),
                        m.as_str(),
                        entry.entity_type,
                    )
                    .with_confidence(RULE_CONFIDENCE)
                    .with_attribute("matched_term", entry.term.as_str())
                    .with_attribute("method", "rule"),
                );
            }
        }
        found
    }
}

fn on_word_edges(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
}
