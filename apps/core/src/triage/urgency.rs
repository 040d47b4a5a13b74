//! Urgency evidence detection.
//!
//! Reports which evidence-lexicon classes fire on a text and which of their
//! keywords matched. Evidence is reported next to the priority score; it does
//! not feed it.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::lexicon::Lexicon;

/// Matched keywords per class, kept in lexicon declaration order.
///
/// Serializes as a JSON object whose key order follows the lexicon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrgencyEvidence {
    classes: Vec<(String, Vec<String>)>,
}

impl UrgencyEvidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a class. Classes without matches are ignored.
    pub fn push(&mut self, class_name: impl Into<String>, matches: Vec<String>) {
        if matches.is_empty() {
            return;
        }
        self.classes.push((class_name.into(), matches));
    }

    pub fn get(&self, class_name: &str) -> Option<&[String]> {
        self.classes
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, kws)| kws.as_slice())
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.get(class_name).is_some()
    }

    /// Classes with at least one match, in declaration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.classes
            .iter()
            .map(|(name, kws)| (name.as_str(), kws.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Serialize for UrgencyEvidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len()))?;
        for (name, keywords) in &self.classes {
            map.serialize_entry(name, keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UrgencyEvidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EvidenceVisitor;

        impl<'de> Visitor<'de> for EvidenceVisitor {
            type Value = UrgencyEvidence;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of class name to matched keywords")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut evidence = UrgencyEvidence::new();
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    evidence.push(name, keywords);
                }
                Ok(evidence)
            }
        }

        deserializer.deserialize_map(EvidenceVisitor)
    }
}

/// Detects evidence-lexicon classes in text.
#[derive(Debug, Clone)]
pub struct UrgencyDetector {
    lexicon: Lexicon,
}

impl Default for UrgencyDetector {
    fn default() -> Self {
        Self::new(Lexicon::default_evidence())
    }
}

impl UrgencyDetector {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Case-insensitive substring detection. Keywords are reported in the
    /// lexicon's spelling, not the input's.
    pub fn detect(&self, text: &str) -> UrgencyEvidence {
        let text_lower = text.to_lowercase();
        let mut evidence = UrgencyEvidence::new();

        for entry in &self.lexicon {
            let matches: Vec<String> = entry.matches(&text_lower).map(str::to_string).collect();
            evidence.push(entry.class_name.clone(), matches);
        }

        evidence
    }
}
