//! Verdict - input and output structures of the triage engine.

use serde::{Deserialize, Serialize};

use super::category::{CategoryScores, ClassificationResult, DEFAULT_INTENT};
use super::priority::{PriorityTier, PriorityVerdict};
use super::sentiment::{SentimentLabel, SentimentResult};
use super::urgency::UrgencyEvidence;

/// One customer message as received from a channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    /// Message body, possibly blank
    pub text: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Free-form channel name (`EMAIL`, `TWITTER`, ...)
    #[serde(default)]
    pub channel_type: Option<String>,
}

impl RawQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_sender_email(mut self, email: impl Into<String>) -> Self {
        self.sender_email = Some(email.into());
        self
    }

    pub fn with_sender_id(mut self, id: impl Into<String>) -> Self {
        self.sender_id = Some(id.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel_type = Some(channel.into());
        self
    }

    /// True when the body holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Subject and body joined by a space; the body alone without a subject.
    pub fn full_text(&self) -> String {
        match self.subject.as_deref().filter(|s| !s.is_empty()) {
            Some(subject) => format!("{subject} {}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Complete triage verdict for one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub category: ClassificationResult,
    pub sentiment: SentimentResult,
    pub intent: String,
    pub priority: PriorityVerdict,
    pub is_vip: bool,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub urgency_keywords: UrgencyEvidence,
}

impl AnalysisVerdict {
    /// Verdict for blank input.
    ///
    /// Blank messages land in MEDIUM with score 0.5 rather than LOW.
    pub fn default_for_blank() -> Self {
        Self {
            category: ClassificationResult::empty(),
            sentiment: SentimentResult::neutral(),
            intent: DEFAULT_INTENT.to_string(),
            priority: PriorityVerdict::default_medium(),
            is_vip: false,
            tags: vec![],
            keywords: vec![],
            urgency_keywords: UrgencyEvidence::new(),
        }
    }

    pub fn tier(&self) -> PriorityTier {
        self.priority.tier
    }

    pub fn is_urgent(&self) -> bool {
        self.priority.is_urgent
    }
}

/// Sentiment probabilities as exposed over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Flat wire form of [`AnalysisVerdict`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub category: String,
    pub category_confidence: f64,
    pub category_scores: CategoryScores,
    pub sentiment: SentimentLabel,
    pub sentiment_confidence: f64,
    pub sentiment_scores: SentimentScores,
    pub intent: String,
    pub priority: PriorityTier,
    pub priority_score: f64,
    pub is_urgent: bool,
    pub is_vip: bool,
    pub auto_tags: Vec<String>,
    pub keywords: Vec<String>,
    pub urgency_keywords: UrgencyEvidence,
}

impl From<AnalysisVerdict> for AnalysisResponse {
    fn from(verdict: AnalysisVerdict) -> Self {
        Self {
            category: verdict.category.label,
            category_confidence: verdict.category.confidence,
            category_scores: verdict.category.scores,
            sentiment: verdict.sentiment.label,
            sentiment_confidence: verdict.sentiment.confidence,
            sentiment_scores: SentimentScores {
                positive: verdict.sentiment.positive,
                neutral: verdict.sentiment.neutral,
                negative: verdict.sentiment.negative,
            },
            intent: verdict.intent,
            priority: verdict.priority.tier,
            priority_score: verdict.priority.score,
            is_urgent: verdict.priority.is_urgent,
            is_vip: verdict.is_vip,
            auto_tags: verdict.tags,
            keywords: verdict.keywords,
            urgency_keywords: verdict.urgency_keywords,
        }
    }
}
