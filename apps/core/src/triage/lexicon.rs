//! Lexicon tables.
//!
//! A lexicon maps a class name to an ordered keyword list and a weight. Three
//! tables ship by default: the category lexicon used by the keyword classifier,
//! the evidence lexicon reported as urgency evidence, and the weighted severity
//! lexicon consumed by the priority scorer.
//!
//! Declaration order is part of the contract: it breaks classifier ties and
//! fixes the order of `urgency_*` tags.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::AppError;

/// (class, keywords, weight)
type StaticEntry = (&'static str, &'static [&'static str], f64);

/// Category keywords, in tie-break order.
const CATEGORY_TABLE: &[StaticEntry] = &[
    (
        "question",
        &["how", "what", "when", "where", "why", "who", "can", "could", "would", "should", "?"],
        1.0,
    ),
    (
        "complaint",
        &[
            "complaint", "unhappy", "disappointed", "frustrated", "angry", "terrible", "worst",
            "awful", "horrible", "bad",
        ],
        1.0,
    ),
    (
        "compliment",
        &[
            "great", "excellent", "awesome", "amazing", "love", "thank", "thanks", "appreciate",
            "good job",
        ],
        1.0,
    ),
    (
        "bug_report",
        &[
            "bug", "error", "broken", "not working", "issue", "problem", "crash", "failed",
            "failure",
        ],
        1.0,
    ),
    (
        "feature_request",
        &["feature", "add", "suggestion", "wish", "would like", "could you", "please add"],
        1.0,
    ),
    (
        "request",
        &["request", "need", "want", "require", "looking for", "interested in"],
        1.0,
    ),
    (
        "support_request",
        &["help", "support", "assist", "guidance", "trouble", "difficulty"],
        1.0,
    ),
    (
        "purchase_inquiry",
        &["price", "cost", "buy", "purchase", "order", "payment", "shipping", "delivery"],
        1.0,
    ),
    (
        "feedback",
        &["feedback", "opinion", "thought", "suggest", "improve", "better"],
        1.0,
    ),
];

/// Classes reported as urgency evidence and turned into `urgency_*` tags.
const EVIDENCE_TABLE: &[StaticEntry] = &[
    (
        "critical",
        &["urgent", "critical", "emergency", "asap", "immediately", "now", "crisis"],
        1.0,
    ),
    (
        "high",
        &["important", "soon", "quickly", "priority", "needed", "required"],
        1.0,
    ),
    (
        "negative",
        &["broken", "error", "bug", "issue", "problem", "failed", "not working", "down"],
        1.0,
    ),
    (
        "positive",
        &["thank", "great", "excellent", "awesome", "love", "amazing"],
        1.0,
    ),
    (
        "question",
        &["how", "what", "when", "where", "why", "who", "can", "could", "would"],
        1.0,
    ),
    (
        "complaint",
        &["complaint", "unhappy", "disappointed", "frustrated", "angry", "terrible", "worst"],
        1.0,
    ),
    (
        "compliment",
        &["compliment", "praise", "appreciate", "happy", "satisfied", "pleased"],
        1.0,
    ),
];

/// Weighted severity classes feeding the urgency sub-score.
const SEVERITY_TABLE: &[StaticEntry] = &[
    (
        "critical",
        &[
            "urgent", "critical", "emergency", "asap", "immediately", "now", "crisis", "down",
            "broken", "not working",
        ],
        0.5,
    ),
    (
        "high",
        &["important", "soon", "quickly", "priority", "needed", "required", "issue", "problem"],
        0.3,
    ),
    (
        "negative",
        &["angry", "frustrated", "disappointed", "terrible", "worst", "awful", "unacceptable"],
        0.2,
    ),
];

fn default_weight() -> f64 {
    1.0
}

/// One class of a lexicon table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub class_name: String,
    pub keywords: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl LexiconEntry {
    pub fn new(class_name: impl Into<String>, keywords: Vec<String>, weight: f64) -> Self {
        Self {
            class_name: class_name.into(),
            keywords,
            weight,
        }
    }

    /// Keywords found as substrings of `text_lower`, in lexicon order.
    ///
    /// The caller lowercases once; every stored keyword is compared lowercased.
    pub fn matches<'a>(&'a self, text_lower: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(move |kw| text_lower.contains(&kw.to_lowercase()))
    }

    pub fn match_count(&self, text_lower: &str) -> usize {
        self.matches(text_lower).count()
    }

    /// Fraction of this class's keywords present in the text, in `[0, 1]`.
    pub fn match_fraction(&self, text_lower: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }
        self.match_count(text_lower) as f64 / self.keywords.len() as f64
    }
}

/// Ordered table of lexicon entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Build a lexicon, rejecting tables that break the entry invariants.
    pub fn new(entries: Vec<LexiconEntry>) -> Result<Self, AppError> {
        let lexicon = Self { entries };
        lexicon.validate("lexicon")?;
        Ok(lexicon)
    }

    fn from_static(table: &[StaticEntry]) -> Self {
        let entries = table
            .iter()
            .map(|(class, keywords, weight)| {
                LexiconEntry::new(
                    *class,
                    keywords.iter().map(|k| k.to_string()).collect(),
                    *weight,
                )
            })
            .collect();
        Self { entries }
    }

    pub fn default_categories() -> Self {
        Self::from_static(CATEGORY_TABLE)
    }

    pub fn default_evidence() -> Self {
        Self::from_static(EVIDENCE_TABLE)
    }

    pub fn default_severity() -> Self {
        Self::from_static(SEVERITY_TABLE)
    }

    /// Check: non-empty table, unique class names, non-empty keyword lists
    /// without blank keywords, weights in `(0, 1]`.
    pub fn validate(&self, table_name: &str) -> Result<(), AppError> {
        if self.entries.is_empty() {
            return Err(AppError::Config(format!("{table_name}: table is empty")));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.class_name.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "{table_name}: class name must not be blank"
                )));
            }
            if !seen.insert(entry.class_name.as_str()) {
                return Err(AppError::Config(format!(
                    "{table_name}: duplicate class '{}'",
                    entry.class_name
                )));
            }
            if entry.keywords.is_empty() {
                return Err(AppError::Config(format!(
                    "{table_name}: class '{}' has no keywords",
                    entry.class_name
                )));
            }
            if entry.keywords.iter().any(|k| k.is_empty()) {
                return Err(AppError::Config(format!(
                    "{table_name}: class '{}' contains an empty keyword",
                    entry.class_name
                )));
            }
            if !(entry.weight > 0.0 && entry.weight <= 1.0) {
                return Err(AppError::Config(format!(
                    "{table_name}: class '{}' weight {} outside (0, 1]",
                    entry.class_name, entry.weight
                )));
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LexiconEntry> {
        self.entries.iter()
    }

    pub fn get(&self, class_name: &str) -> Option<&LexiconEntry> {
        self.entries.iter().find(|e| e.class_name == class_name)
    }

    pub fn class_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.class_name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a LexiconEntry;
    type IntoIter = std::slice::Iter<'a, LexiconEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
