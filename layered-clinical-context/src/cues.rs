//! Context cue vocabulary.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use layered_clinical::{AssertionConfig, AssertionStatus, CueConfig, StageError};
use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

/// What a cue says about the entities in its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueCategory {
    Negation,
    Uncertainty,
    FamilyHistory,
    Historical,
    Hypothetical,
    Conditional,
}

impl CueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueCategory::Negation => "negation",
            CueCategory::Uncertainty => "uncertainty",
            CueCategory::FamilyHistory => "family_history",
            CueCategory::Historical => "historical",
            CueCategory::Hypothetical => "hypothetical",
            CueCategory::Conditional => "conditional",
        }
    }

    pub fn assertion(&self) -> AssertionStatus {
        match self {
            CueCategory::Negation => AssertionStatus::Absent,
            CueCategory::Uncertainty => AssertionStatus::Possible,
            CueCategory::FamilyHistory => AssertionStatus::FamilyHistory,
            CueCategory::Historical => AssertionStatus::Historical,
            CueCategory::Hypothetical => AssertionStatus::Hypothetical,
            CueCategory::Conditional => AssertionStatus::Conditional,
        }
    }
}

impl fmt::Display for CueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CueCategory {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negation" => Ok(CueCategory::Negation),
            "uncertainty" => Ok(CueCategory::Uncertainty),
            "family_history" => Ok(CueCategory::FamilyHistory),
            "historical" => Ok(CueCategory::Historical),
            "hypothetical" => Ok(CueCategory::Hypothetical),
            "conditional" => Ok(CueCategory::Conditional),
            other => Err(StageError::config(format!("unknown cue category '{}'", other))),
        }
    }
}

/// Where a cue must sit relative to the entity it qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueDirection {
    /// The cue precedes the entity ("denies chest pain").
    Forward,
    /// The cue follows the entity ("pneumonia was ruled out").
    Backward,
    Bidirectional,
}

impl FromStr for CueDirection {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(CueDirection::Forward),
            "backward" => Ok(CueDirection::Backward),
            "bidirectional" => Ok(CueDirection::Bidirectional),
            other => Err(StageError::config(format!("unknown cue direction '{}'", other))),
        }
    }
}

/// Case-folded words of `text`, split the same way document text is.
pub(crate) fn fold_words(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextCue {
    literal: String,
    words: Vec<String>,
    pub category: CueCategory,
    pub direction: CueDirection,
    /// Scope in words.
    pub max_distance: usize,
}

impl ContextCue {
    pub fn new(
        literal: &str,
        category: CueCategory,
        direction: CueDirection,
        max_distance: usize,
    ) -> Self {
        let literal = literal.trim().to_lowercase();
        ContextCue {
            words: fold_words(&literal),
            literal,
            category,
            direction,
            max_distance,
        }
    }

    pub fn from_config(config: &CueConfig) -> Result<Self, StageError> {
        Ok(Self::new(
            &config.literal,
            config.category.parse()?,
            config.direction.parse()?,
            config.max_distance,
        ))
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

const NEGATION: &[&str] = &[
    "no", "not", "denies", "denied", "negative", "negative for",
    "without", "absent", "free of", "ruled out", "rules out",
    "no evidence of", "no signs of", "no symptoms of",
    "unremarkable", "within normal limits", "wnl",
    "non-contributory", "non-significant", "insignificant",
    "never", "none", "neither", "nor", "nothing",
    "refuses", "declines", "declined", "unable to", "cannot",
    "fails to", "failed to", "no complaints of", "no history of",
    "no known", "nk", "nka", "nkda",
];

const TRAILING_NEGATION: &[&str] = &[
    "is ruled out", "was ruled out", "are ruled out", "were ruled out",
    "is negative", "was negative", "are negative", "were negative",
    "is absent", "was absent", "are absent", "were absent",
    "is unlikely", "was unlikely", "are unlikely", "were unlikely",
];

const UNCERTAINTY: &[&str] = &[
    "possible", "possibly", "probable", "probably", "likely",
    "may be", "might be", "could be", "suggest", "suggests",
    "suggestive of", "consistent with", "compatible with",
    "suspicious for", "suspect", "suspected", "questionable",
    "unclear", "uncertain", "undetermined", "rule out",
    "consider", "considering", "differential", "appears",
    "seems", "looks like", "impression of",
];

const FAMILY_HISTORY: &[&str] = &[
    "family history", "family hx", "fh", "familial", "hereditary",
    "mother", "father", "parent", "parents", "sibling", "sister",
    "brother", "grandmother", "grandfather", "grandparent",
    "grandparents", "aunt", "uncle", "cousin", "maternal",
    "paternal", "runs in family", "family history of",
];

const HISTORICAL: &[&str] = &[
    "history of", "hx of", "h/o", "past", "previous", "prior",
    "previously", "former", "old", "remote", "distant",
    "years ago", "months ago", "weeks ago", "days ago",
    "in the past", "historically", "chronic", "longstanding",
    "long-standing", "since", "status post", "s/p",
];

const HYPOTHETICAL: &[&str] = &[
    "if", "when", "unless", "should", "would", "could",
    "in case of", "in the event of", "prophylaxis",
    "prophylactic", "preventive", "prevention", "to prevent",
    "avoid", "risk of", "risk for", "predisposed to",
];

/// Built-in cue groups: `(literals, category, direction, scope)`.
const DEFAULT_CUES: &[(&[&str], CueCategory, CueDirection, usize)] = &[
    (NEGATION, CueCategory::Negation, CueDirection::Forward, 6),
    (TRAILING_NEGATION, CueCategory::Negation, CueDirection::Backward, 3),
    (UNCERTAINTY, CueCategory::Uncertainty, CueDirection::Forward, 5),
    (FAMILY_HISTORY, CueCategory::FamilyHistory, CueDirection::Forward, 8),
    (HISTORICAL, CueCategory::Historical, CueDirection::Forward, 6),
    (HYPOTHETICAL, CueCategory::Hypothetical, CueDirection::Forward, 5),
];

static CLINICAL: Lazy<Arc<CueSet>> = Lazy::new(|| {
    let mut cues = CueSet::new();
    for (literals, category, direction, scope) in DEFAULT_CUES {
        for literal in *literals {
            cues.push(ContextCue::new(literal, *category, *direction, *scope));
        }
    }
    Arc::new(cues)
});

/// An ordered cue list indexed by first word.
///
/// Order matters: when two cues start at the same word and lie at the same
/// distance from an entity, the one inserted first wins.
#[derive(Debug, Clone, Default)]
pub struct CueSet {
    cues: Vec<ContextCue>,
    by_first_word: HashMap<String, Vec<usize>>,
}

impl CueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared built-in clinical cue set.
    pub fn clinical() -> Arc<Self> {
        Arc::clone(&CLINICAL)
    }

    /// Built-in cues followed by `custom_cues`, every scope capped at
    /// `max_scope`.
    pub fn from_config(config: &AssertionConfig) -> Result<Self, StageError> {
        let mut cues = CueSet::clinical().as_ref().clone();
        for custom in &config.custom_cues {
            let cue = ContextCue::from_config(custom)?;
            if cue.words.is_empty() {
                return Err(StageError::config(format!(
                    "cue literal '{}' contains no words",
                    custom.literal
                )));
            }
            cues.push(cue);
        }
        cues.cap_scope(config.max_scope);
        Ok(cues)
    }

    /// Add a cue. Cues without words can never match and are skipped.
    pub fn push(&mut self, cue: ContextCue) {
        let first = match cue.words.first() {
            Some(first) => first.clone(),
            None => return,
        };
        self.by_first_word
            .entry(first)
            .or_default()
            .push(self.cues.len());
        self.cues.push(cue);
    }

    pub fn cap_scope(&mut self, max_scope: usize) {
        for cue in &mut self.cues {
            cue.max_distance = cue.max_distance.min(max_scope);
        }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextCue> + '_ {
        self.cues.iter()
    }

    /// Cues whose first word is `word`, in insertion order.
    pub(crate) fn starting_with(&self, word: &str) -> impl Iterator<Item = &ContextCue> + '_ {
        self.by_first_word
            .get(word)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.cues[idx])
    }
}
