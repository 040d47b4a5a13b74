//! Priority scoring.
//!
//! The priority score is the plain sum of six independently bounded signals
//! (VIP, urgency keywords, sentiment, category, channel, length) capped at 1.0.
//! There is no renormalisation: one strong signal is allowed to saturate the
//! score on its own. The score maps onto four tiers through fixed thresholds.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use validator::Validate;

use super::lexicon::Lexicon;
use super::normalizer::TextNormalizer;
use super::sentiment::SentimentLabel;
use crate::error::AppError;

/// (category, weight)
const CATEGORY_WEIGHTS: &[(&str, f64)] = &[
    ("bug_report", 0.3),
    ("complaint", 0.25),
    ("support_request", 0.2),
    ("question", 0.1),
    ("compliment", 0.0),
    ("feedback", 0.05),
    ("feature_request", 0.1),
    ("purchase_inquiry", 0.15),
    ("request", 0.15),
];

/// (channel, weight). Real-time and public channels weigh more.
const CHANNEL_WEIGHTS: &[(&str, f64)] = &[
    ("WEBSITE_CHAT", 0.2),
    ("EMAIL", 0.1),
    ("TWITTER", 0.15),
    ("FACEBOOK", 0.1),
    ("INSTAGRAM", 0.1),
    ("LINKEDIN", 0.1),
    ("DISCORD", 0.15),
    ("SLACK", 0.15),
    ("TEAMS", 0.15),
    ("WHATSAPP", 0.15),
];

/// Discrete priority tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PriorityTier {
    /// Tiers from highest to lowest.
    pub const ALL: [PriorityTier; 4] = [
        PriorityTier::Critical,
        PriorityTier::High,
        PriorityTier::Medium,
        PriorityTier::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "CRITICAL",
            PriorityTier::High => "HIGH",
            PriorityTier::Medium => "MEDIUM",
            PriorityTier::Low => "LOW",
        }
    }
}

/// Lower bounds of the three upper tiers. `LOW` starts at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TierThresholds {
    #[validate(range(min = 0.0, max = 1.0))]
    pub critical: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub high: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            critical: 0.85,
            high: 0.65,
            medium: 0.35,
        }
    }
}

impl TierThresholds {
    /// Range-check every bound and require `critical >= high >= medium`.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if !(self.critical >= self.high && self.high >= self.medium) {
            return Err(AppError::Config(format!(
                "tier thresholds must satisfy critical >= high >= medium (got {} / {} / {})",
                self.critical, self.high, self.medium
            )));
        }
        Ok(())
    }

    /// Highest tier whose bound the score meets.
    pub fn tier_for(&self, score: f64) -> PriorityTier {
        if score >= self.critical {
            PriorityTier::Critical
        } else if score >= self.high {
            PriorityTier::High
        } else if score >= self.medium {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    /// Urgency follows the HIGH bound regardless of the resolved tier.
    pub fn is_urgent(&self, score: f64) -> bool {
        score >= self.high
    }

    pub fn bound(&self, tier: PriorityTier) -> f64 {
        match tier {
            PriorityTier::Critical => self.critical,
            PriorityTier::High => self.high,
            PriorityTier::Medium => self.medium,
            PriorityTier::Low => 0.0,
        }
    }
}

fn default_category_weights() -> HashMap<String, f64> {
    CATEGORY_WEIGHTS
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn default_channel_weights() -> HashMap<String, f64> {
    CHANNEL_WEIGHTS
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

/// Additive signal weights and lookup tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScoringWeights {
    /// Flat boost for VIP senders
    #[validate(range(min = 0.0, max = 1.0))]
    pub vip_boost: f64,
    /// Multiplied by the sentiment confidence when the label is NEGATIVE
    #[validate(range(min = 0.0, max = 1.0))]
    pub negative_sentiment_weight: f64,
    /// Added for very short or very long messages
    #[validate(range(min = 0.0, max = 1.0))]
    pub length_boost: f64,
    /// Fewer words than this counts as "very short"
    pub short_message_words: usize,
    /// More words than this counts as "very long"
    pub long_message_words: usize,
    pub category_weights: HashMap<String, f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub default_category_weight: f64,
    /// Keyed by exact channel name (`EMAIL`, `WEBSITE_CHAT`, ...)
    pub channel_weights: HashMap<String, f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub default_channel_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vip_boost: 0.3,
            negative_sentiment_weight: 0.2,
            length_boost: 0.05,
            short_message_words: 5,
            long_message_words: 200,
            category_weights: default_category_weights(),
            default_category_weight: 0.1,
            channel_weights: default_channel_weights(),
            default_channel_weight: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;

        let tables = [
            ("category_weights", &self.category_weights),
            ("channel_weights", &self.channel_weights),
        ];
        for (table, weights) in tables {
            if let Some((key, value)) = weights.iter().find(|(_, v)| !(0.0..=1.0).contains(*v)) {
                return Err(AppError::Config(format!(
                    "{table}: weight for '{key}' is {value}, expected [0, 1]"
                )));
            }
        }

        if self.short_message_words > self.long_message_words {
            return Err(AppError::Config(format!(
                "short_message_words ({}) exceeds long_message_words ({})",
                self.short_message_words, self.long_message_words
            )));
        }
        Ok(())
    }
}

/// Privileged senders. E-mails match case-insensitively, sender ids exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VipDirectory {
    emails: HashSet<String>,
    sender_ids: HashSet<String>,
}

impl VipDirectory {
    pub fn new<E, I>(emails: E, sender_ids: I) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            sender_ids: sender_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_vip(&self, sender_email: Option<&str>, sender_id: Option<&str>) -> bool {
        if let Some(email) = sender_email.filter(|e| !e.is_empty()) {
            if self.emails.contains(&email.to_lowercase()) {
                return true;
            }
        }
        if let Some(id) = sender_id.filter(|id| !id.is_empty()) {
            if self.sender_ids.contains(id) {
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.emails.len() + self.sender_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.sender_ids.is_empty()
    }
}

/// Inputs to one priority computation.
#[derive(Debug, Clone, Copy)]
pub struct PrioritySignals<'a> {
    pub text: &'a str,
    pub sentiment: SentimentLabel,
    pub sentiment_confidence: f64,
    pub category: &'a str,
    pub sender_email: Option<&'a str>,
    pub sender_id: Option<&'a str>,
    pub channel_type: Option<&'a str>,
    /// Explicit VIP status; looked up in the directory when `None`
    pub vip_override: Option<bool>,
}

impl<'a> PrioritySignals<'a> {
    /// Neutral sentiment, default category, no sender, no channel.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            sentiment: SentimentLabel::Neutral,
            sentiment_confidence: 0.0,
            category: super::category::DEFAULT_CATEGORY,
            sender_email: None,
            sender_id: None,
            channel_type: None,
            vip_override: None,
        }
    }
}

/// Per-signal contributions, in summation order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub vip: f64,
    pub urgency: f64,
    pub sentiment: f64,
    pub category: f64,
    pub channel: f64,
    pub length: f64,
}

impl ScoreBreakdown {
    /// Sum in declaration order, capped to `[0, 1]`.
    pub fn total(&self) -> f64 {
        let sum = self.vip + self.urgency + self.sentiment + self.category + self.channel + self.length;
        sum.clamp(0.0, 1.0)
    }
}

/// Final priority decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityVerdict {
    pub tier: PriorityTier,
    pub score: f64,
    pub is_urgent: bool,
}

impl PriorityVerdict {
    /// Verdict used for blank input.
    pub fn default_medium() -> Self {
        Self {
            tier: PriorityTier::Medium,
            score: 0.5,
            is_urgent: false,
        }
    }
}

/// Priority scoring and tier classification
#[derive(Debug, Clone)]
pub struct PriorityScorer {
    vip: VipDirectory,
    severity: Lexicon,
    weights: ScoringWeights,
    thresholds: TierThresholds,
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self::new(
            VipDirectory::default(),
            Lexicon::default_severity(),
            ScoringWeights::default(),
            TierThresholds::default(),
        )
    }
}

impl PriorityScorer {
    pub fn new(
        vip: VipDirectory,
        severity: Lexicon,
        weights: ScoringWeights,
        thresholds: TierThresholds,
    ) -> Self {
        Self {
            vip,
            severity,
            weights,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    pub fn check_vip_status(&self, sender_email: Option<&str>, sender_id: Option<&str>) -> bool {
        self.vip.is_vip(sender_email, sender_id)
    }

    /// `Σ min(matches / |keywords|, 1) * weight` over the severity classes, capped at 1.
    pub fn score_urgency_keywords(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        let total: f64 = self
            .severity
            .iter()
            .map(|entry| entry.match_fraction(&text_lower).min(1.0) * entry.weight)
            .sum();
        total.min(1.0)
    }

    /// Only negative sentiment raises priority.
    pub fn score_sentiment(&self, sentiment: SentimentLabel, confidence: f64) -> f64 {
        match sentiment {
            SentimentLabel::Negative => {
                self.weights.negative_sentiment_weight * confidence.clamp(0.0, 1.0)
            }
            SentimentLabel::Positive | SentimentLabel::Neutral => 0.0,
        }
    }

    pub fn score_category(&self, category: &str) -> f64 {
        self.weights
            .category_weights
            .get(category)
            .copied()
            .unwrap_or(self.weights.default_category_weight)
    }

    pub fn score_channel(&self, channel_type: Option<&str>) -> f64 {
        channel_type
            .filter(|c| !c.is_empty())
            .and_then(|c| self.weights.channel_weights.get(c).copied())
            .unwrap_or(self.weights.default_channel_weight)
    }

    /// Very short and very long messages both get the same small boost.
    pub fn score_length(&self, text: &str) -> f64 {
        let words = TextNormalizer::word_count(text);
        if words < self.weights.short_message_words || words > self.weights.long_message_words {
            self.weights.length_boost
        } else {
            0.0
        }
    }

    pub fn breakdown(&self, signals: &PrioritySignals<'_>) -> ScoreBreakdown {
        let is_vip = signals
            .vip_override
            .unwrap_or_else(|| self.check_vip_status(signals.sender_email, signals.sender_id));

        ScoreBreakdown {
            vip: if is_vip { self.weights.vip_boost } else { 0.0 },
            urgency: self.score_urgency_keywords(signals.text),
            sentiment: self.score_sentiment(signals.sentiment, signals.sentiment_confidence),
            category: self.score_category(signals.category),
            channel: self.score_channel(signals.channel_type),
            length: self.score_length(signals.text),
        }
    }

    pub fn calculate_priority_score(&self, signals: &PrioritySignals<'_>) -> f64 {
        self.breakdown(signals).total()
    }

    pub fn determine_priority(&self, score: f64) -> PriorityTier {
        self.thresholds.tier_for(score)
    }

    pub fn classify_priority(&self, signals: &PrioritySignals<'_>) -> PriorityVerdict {
        let score = self.calculate_priority_score(signals);
        PriorityVerdict {
            tier: self.determine_priority(score),
            score,
            is_urgent: self.thresholds.is_urgent(score),
        }
    }
}
