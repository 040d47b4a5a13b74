//! Keyword category classification.
//!
//! Deterministic fallback used when no zero-shot model is available. Each
//! category scores the fraction of its keywords present in the text; the best
//! score wins and the first declared category wins ties.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use super::lexicon::Lexicon;

/// Category reported for blank text.
pub const DEFAULT_CATEGORY: &str = "question";

/// Intent reported for categories missing from the intent table.
pub const DEFAULT_INTENT: &str = "general";

/// (category, intent)
const INTENT_TABLE: &[(&str, &str)] = &[
    ("question", "information_seeking"),
    ("request", "action_request"),
    ("complaint", "issue_reporting"),
    ("compliment", "positive_feedback"),
    ("bug_report", "technical_issue"),
    ("feature_request", "product_improvement"),
    ("support_request", "help_needed"),
    ("purchase_inquiry", "sales_interest"),
    ("feedback", "general_feedback"),
];

/// Default category → intent table.
pub fn default_intents() -> HashMap<String, String> {
    INTENT_TABLE
        .iter()
        .map(|(category, intent)| (category.to_string(), intent.to_string()))
        .collect()
}

/// Per-category scores in the order the classifier produced them: lexicon
/// declaration order for keywords, the model's ranking for zero-shot.
///
/// Serializes as a JSON object that keeps that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScores {
    entries: Vec<(String, f64)>,
}

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a score. A label seen before keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, score: f64) {
        let label = label.into();
        match self.entries.iter_mut().find(|(name, _)| *name == label) {
            Some((_, existing)) => *existing = score,
            None => self.entries.push((label, score)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, score)| score)
    }

    pub fn contains_key(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &f64> {
        self.entries.iter().map(|(_, score)| score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for CategoryScores {
    type Output = f64;

    fn index(&self, label: &str) -> &f64 {
        match self.get(label) {
            Some(score) => score,
            None => panic!("no score for category '{}'", label),
        }
    }
}

impl FromIterator<(String, f64)> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut scores = CategoryScores::new();
        for (label, score) in iter {
            scores.insert(label, score);
        }
        scores
    }
}

impl Serialize for CategoryScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, score) in &self.entries {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = CategoryScores;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category label to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut scores = CategoryScores::new();
                while let Some((label, score)) = access.next_entry::<String, f64>()? {
                    scores.insert(label, score);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// Label, confidence and per-label scores from any category classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    pub scores: CategoryScores,
}

impl ClassificationResult {
    /// Result for blank text: default category, no confidence, no scores.
    pub fn empty() -> Self {
        Self {
            label: DEFAULT_CATEGORY.to_string(),
            confidence: 0.0,
            scores: CategoryScores::new(),
        }
    }
}

/// Keyword-fraction classifier over the category lexicon
#[derive(Debug, Clone)]
pub struct KeywordCategoryClassifier {
    lexicon: Lexicon,
    intents: HashMap<String, String>,
}

impl Default for KeywordCategoryClassifier {
    fn default() -> Self {
        Self::new(Lexicon::default_categories(), default_intents())
    }
}

impl KeywordCategoryClassifier {
    pub fn new(lexicon: Lexicon, intents: HashMap<String, String>) -> Self {
        Self { lexicon, intents }
    }

    /// Category labels in declaration order.
    pub fn categories(&self) -> Vec<String> {
        self.lexicon.class_names()
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Classify text.
    ///
    /// `confidence = min(best * 2, 1)`: keyword fractions rarely approach 1, so
    /// the best fraction is doubled rather than treated as a probability.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        if text.trim().is_empty() {
            return ClassificationResult::empty();
        }

        let text_lower = text.to_lowercase();
        let mut scores = CategoryScores::new();
        let mut best_label: Option<&str> = None;
        let mut best_score = 0.0_f64;

        for entry in &self.lexicon {
            let score = entry.match_fraction(&text_lower);
            scores.insert(entry.class_name.clone(), score);

            // Strict comparison: earlier categories keep ties.
            if score > best_score {
                best_score = score;
                best_label = Some(entry.class_name.as_str());
            }
        }

        let label = best_label
            .or_else(|| self.lexicon.entries().first().map(|e| e.class_name.as_str()))
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        ClassificationResult {
            label,
            confidence: (best_score * 2.0).min(1.0),
            scores,
        }
    }

    /// Map a category to its intent; unknown categories map to `general`.
    pub fn intent_for(&self, category: &str) -> String {
        self.intents
            .get(category)
            .cloned()
            .unwrap_or_else(|| DEFAULT_INTENT.to_string())
    }

    /// Classify, then map the winning category to an intent.
    pub fn get_intent(&self, text: &str) -> String {
        let result = self.classify(text);
        self.intent_for(&result.label)
    }
}
