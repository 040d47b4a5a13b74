//! # Triage Module
//!
//! Deterministic scoring and tagging engine for inbound customer messages.
//! Produces category, sentiment, intent, priority and tags without requiring
//! any ML model; external models plug in through the capability traits.
//!
//! ## Components
//! - `normalizer`: Text cleaning and tokenization
//! - `lexicon`: Keyword tables (categories, evidence, severity)
//! - `keywords`: Frequency-ranked keyword extraction
//! - `urgency`: Urgency evidence detection
//! - `category`: Keyword category classifier and intent table
//! - `sentiment`: Lexicon and rule based sentiment analyzer
//! - `priority`: Multi-factor priority scoring and tiers
//! - `tags`: Tag synthesis
//! - `capability`: Traits for external sentiment and zero-shot models
//! - `remote`: HTTP clients implementing the capability traits
//! - `verdict`: Input and output structures
//! - `tagger`: Main orchestrator

pub mod capability;
pub mod category;
pub mod keywords;
pub mod lexicon;
pub mod normalizer;
pub mod priority;
pub mod remote;
pub mod sentiment;
pub mod tagger;
pub mod tags;
pub mod urgency;
pub mod verdict;

// Re-export main types for convenience
pub use capability::{SentimentModel, ZeroShotClassifier};
pub use category::{CategoryScores, ClassificationResult, KeywordCategoryClassifier};
pub use keywords::{KeywordExtractor, KeywordResult};
pub use lexicon::{Lexicon, LexiconEntry};
pub use normalizer::{NormalizerOptions, TextNormalizer, TokenizerKind};
pub use priority::{
    PriorityScorer, PrioritySignals, PriorityTier, PriorityVerdict, ScoringWeights,
    TierThresholds, VipDirectory,
};
pub use remote::{RemoteModelClient, RemoteSentimentModel, RemoteZeroShotClassifier};
pub use sentiment::{LexiconSentiment, SentimentLabel, SentimentResult};
pub use tagger::AutoTagger;
pub use tags::{TagInputs, TagSynthesizer};
pub use urgency::{UrgencyDetector, UrgencyEvidence};
pub use verdict::{AnalysisResponse, AnalysisVerdict, RawQuery};
