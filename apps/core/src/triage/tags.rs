//! Tag synthesis.

use std::collections::HashSet;

use super::priority::PriorityTier;
use super::sentiment::SentimentLabel;
use super::urgency::UrgencyEvidence;

/// Signals a tag list is built from.
#[derive(Debug, Clone, Copy)]
pub struct TagInputs<'a> {
    pub category: &'a str,
    pub sentiment: SentimentLabel,
    pub tier: PriorityTier,
    pub evidence: &'a UrgencyEvidence,
    pub intent: &'a str,
    pub is_vip: bool,
    pub is_urgent: bool,
}

/// Turns a fused verdict into ordered tag strings.
///
/// Order is fixed: category, `sentiment_*`, `priority_*`, `intent_*`, one
/// `urgency_*` per evidence class, then `vip` and `urgent`. Consumers compare
/// whole lists, so the order is part of the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagSynthesizer;

impl TagSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, inputs: &TagInputs<'_>) -> Vec<String> {
        let mut candidates = Vec::with_capacity(6 + inputs.evidence.len());
        candidates.push(inputs.category.to_string());
        candidates.push(format!(
            "sentiment_{}",
            inputs.sentiment.as_str().to_lowercase()
        ));
        candidates.push(format!("priority_{}", inputs.tier.as_str().to_lowercase()));
        candidates.push(format!("intent_{}", inputs.intent));
        candidates.extend(
            inputs
                .evidence
                .class_names()
                .map(|class| format!("urgency_{class}")),
        );
        if inputs.is_vip {
            candidates.push("vip".to_string());
        }
        if inputs.is_urgent {
            candidates.push("urgent".to_string());
        }

        let mut seen = HashSet::with_capacity(candidates.len());
        candidates.retain(|tag| seen.insert(tag.clone()));
        candidates
    }
}
