//! Rule-based sentiment analysis.
//!
//! The fallback used whenever no external sentiment model is configured or
//! the configured one fails. Scores come from VADER (full valence lexicon,
//! boosters, negation, capitalisation, "but" clauses and punctuation
//! emphasis); this module maps them onto [`SentimentResult`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound polarity at or beyond which a text is labelled positive/negative.
pub const POLARITY_THRESHOLD: f64 = 0.05;

static VADER: LazyLock<SentimentIntensityAnalyzer<'static>> =
    LazyLock::new(SentimentIntensityAnalyzer::new);

/// Sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }

    /// Label a compound polarity: `<= -0.05` negative, `>= 0.05` positive.
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POLARITY_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -POLARITY_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Parse a model label (`POSITIVE`, `negative`, `LABEL_0`..`LABEL_2`).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_2" => Some(SentimentLabel::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(SentimentLabel::Negative),
            "NEUTRAL" | "NEU" | "LABEL_1" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

/// Sentiment verdict for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    /// Confidence in `label`, `[0, 1]`
    pub confidence: f64,
}

impl SentimentResult {
    /// Verdict used for blank input.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            positive: 0.0,
            neutral: 1.0,
            negative: 0.0,
            confidence: 0.0,
        }
    }
}

/// Raw polarity breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub compound: f64,
}

/// Lexicon and rule based sentiment analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    /// Classify text. Blank input is neutral with zero confidence.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::neutral();
        }

        let scores = self.polarity_scores(text);
        SentimentResult {
            label: SentimentLabel::from_compound(scores.compound),
            positive: scores.positive,
            neutral: scores.neutral,
            negative: scores.negative,
            confidence: scores.compound.abs(),
        }
    }

    /// VADER polarity, rounded the way the reference analyzer reports it.
    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        let scores = VADER.polarity_scores(text);
        let score = |key: &str| scores.get(key).copied().unwrap_or(0.0);

        PolarityScores {
            positive: round_to(score("pos"), 3),
            neutral: round_to(score("neu"), 3),
            negative: round_to(score("neg"), 3),
            compound: round_to(score("compound"), 4),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
