//! AutoTagger - main orchestrator of the triage engine.
//!
//! Runs one message through normalization, keyword and evidence extraction,
//! sentiment, category, priority and tag synthesis.
//!
//! Sentiment and category each have two tiers:
//! 1. An optional external model, bounded by a timeout
//! 2. The built-in lexicon analyzer or keyword classifier, used when no model
//!    is configured or when the model fails

use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::capability::{SentimentModel, ZeroShotClassifier};
use super::category::{ClassificationResult, KeywordCategoryClassifier};
use super::keywords::KeywordExtractor;
use super::normalizer::TextNormalizer;
use super::priority::{PriorityScorer, PrioritySignals, TierThresholds, VipDirectory};
use super::sentiment::{LexiconSentiment, SentimentResult};
use super::tags::{TagInputs, TagSynthesizer};
use super::urgency::UrgencyDetector;
use super::verdict::{AnalysisVerdict, RawQuery};
use crate::config::TriageConfig;
use crate::error::AppError;

/// First `max_chars` characters of `text`.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Triage engine. Immutable after construction; share it behind an `Arc`.
pub struct AutoTagger {
    normalizer: TextNormalizer,
    keyword_extractor: KeywordExtractor,
    urgency_detector: UrgencyDetector,
    lexicon_sentiment: LexiconSentiment,
    category_classifier: KeywordCategoryClassifier,
    priority_scorer: PriorityScorer,
    tag_synthesizer: TagSynthesizer,
    sentiment_model: Option<Arc<dyn SentimentModel>>,
    zero_shot: Option<Arc<dyn ZeroShotClassifier>>,
    max_keywords: usize,
    collaborator_max_chars: usize,
    collaborator_timeout: Duration,
}

impl AutoTagger {
    /// Build an engine with built-in analyzers only.
    pub fn new(config: TriageConfig) -> Result<Self, AppError> {
        config.check()?;

        let normalizer = TextNormalizer::with_options(config.normalizer.clone());
        let vip = VipDirectory::new(&config.vip_emails, config.vip_sender_ids.iter().cloned());

        info!(
            "Triage engine ready: {} categories, {} VIP entries",
            config.categories.len(),
            vip.len()
        );

        Ok(Self {
            keyword_extractor: KeywordExtractor::new(normalizer.clone(), config.max_keywords),
            normalizer,
            urgency_detector: UrgencyDetector::new(config.evidence),
            lexicon_sentiment: LexiconSentiment::new(),
            category_classifier: KeywordCategoryClassifier::new(config.categories, config.intents),
            priority_scorer: PriorityScorer::new(
                vip,
                config.severity,
                config.weights,
                config.thresholds,
            ),
            tag_synthesizer: TagSynthesizer::new(),
            sentiment_model: None,
            zero_shot: None,
            max_keywords: config.max_keywords,
            collaborator_max_chars: config.collaborator_max_chars,
            collaborator_timeout: Duration::from_millis(config.collaborator_timeout_ms),
        })
    }

    /// Use an external sentiment model ahead of the lexicon analyzer.
    pub fn with_sentiment_model(mut self, model: Arc<dyn SentimentModel>) -> Self {
        info!("External sentiment model attached");
        self.sentiment_model = Some(model);
        self
    }

    /// Use an external zero-shot classifier ahead of the keyword classifier.
    pub fn with_zero_shot(mut self, classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        info!("External zero-shot classifier attached");
        self.zero_shot = Some(classifier);
        self
    }

    /// Category labels in declaration order.
    pub fn categories(&self) -> Vec<String> {
        self.category_classifier.categories()
    }

    pub fn thresholds(&self) -> &TierThresholds {
        self.priority_scorer.thresholds()
    }

    /// Analyze one message. Never fails: blank text yields the default verdict
    /// and collaborator failures fall back to the built-in analyzers.
    pub async fn analyze(&self, query: &RawQuery) -> AnalysisVerdict {
        if query.is_blank() {
            debug!("Blank message, returning default verdict");
            return AnalysisVerdict::default_for_blank();
        }

        let cleaned = self.normalizer.normalize(&query.full_text());

        let keywords = self
            .keyword_extractor
            .extract_keywords(&cleaned, Some(self.max_keywords));
        let urgency_keywords = self.urgency_detector.detect(&cleaned);

        let sentiment = self.sentiment(&cleaned).await;
        let category = self.category(&cleaned).await;
        let intent = self.category_classifier.intent_for(&category.label);

        let priority = self.priority_scorer.classify_priority(&PrioritySignals {
            text: &cleaned,
            sentiment: sentiment.label,
            sentiment_confidence: sentiment.confidence,
            category: &category.label,
            sender_email: query.sender_email.as_deref(),
            sender_id: query.sender_id.as_deref(),
            channel_type: query.channel_type.as_deref(),
            vip_override: None,
        });

        let is_vip = self
            .priority_scorer
            .check_vip_status(query.sender_email.as_deref(), query.sender_id.as_deref());

        let tags = self.tag_synthesizer.synthesize(&TagInputs {
            category: &category.label,
            sentiment: sentiment.label,
            tier: priority.tier,
            evidence: &urgency_keywords,
            intent: &intent,
            is_vip,
            is_urgent: priority.is_urgent,
        });

        debug!(
            category = %category.label,
            sentiment = %sentiment.label,
            tier = %priority.tier,
            score = priority.score,
            "Message analyzed"
        );

        AnalysisVerdict {
            category,
            sentiment,
            intent,
            priority,
            is_vip,
            tags,
            keywords,
            urgency_keywords,
        }
    }

    /// Analyze messages concurrently. Result `i` belongs to query `i`.
    pub async fn analyze_batch(&self, queries: &[RawQuery]) -> Vec<AnalysisVerdict> {
        join_all(queries.iter().map(|query| self.analyze(query))).await
    }

    /// Run a collaborator call under the timeout. A panic inside the
    /// collaborator is reported as an error like any other failure.
    async fn call_collaborator<T, F>(&self, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let guarded = AssertUnwindSafe(call).catch_unwind();
        match timeout(self.collaborator_timeout, guarded).await? {
            Ok(result) => result,
            Err(payload) => Err(AppError::Collaborator(format!(
                "collaborator panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    async fn sentiment(&self, text: &str) -> SentimentResult {
        if let Some(model) = self.sentiment_model.as_ref().filter(|_| !text.is_empty()) {
            let excerpt = truncate_chars(text, self.collaborator_max_chars);
            let answer = self
                .call_collaborator(model.analyze_sentiment(excerpt))
                .await
                .and_then(check_sentiment);
            match answer {
                Ok(result) => return result,
                Err(e) => log_fallback("Sentiment model", "lexicon analyzer", &e),
            }
        }
        self.lexicon_sentiment.analyze(text)
    }

    async fn category(&self, text: &str) -> ClassificationResult {
        if let Some(classifier) = self.zero_shot.as_ref().filter(|_| !text.is_empty()) {
            let excerpt = truncate_chars(text, self.collaborator_max_chars);
            let labels = self.categories();
            let answer = self
                .call_collaborator(classifier.classify_zero_shot(excerpt, &labels))
                .await
                .and_then(|result| check_classification(result, &labels));
            match answer {
                Ok(result) => return result,
                Err(e) => log_fallback("Zero-shot classifier", "keywords", &e),
            }
        }
        self.category_classifier.classify(text)
    }
}

/// Outages and bad answers are expected and logged as warnings; anything else
/// a collaborator returns points at a bug in that collaborator.
fn log_fallback(collaborator: &str, fallback: &str, err: &AppError) {
    if err.is_collaborator_failure() {
        warn!("{} unavailable, using {}: {}", collaborator, fallback, err);
    } else {
        error!("{} failed unexpectedly, using {}: {}", collaborator, fallback, err);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn check_sentiment(result: SentimentResult) -> Result<SentimentResult, AppError> {
    let values = [result.confidence, result.positive, result.neutral, result.negative];
    if values.iter().all(|v| is_probability(*v)) {
        Ok(result)
    } else {
        Err(AppError::Collaborator(format!(
            "sentiment scores outside [0, 1]: {:?}",
            values
        )))
    }
}

fn check_classification(
    result: ClassificationResult,
    labels: &[String],
) -> Result<ClassificationResult, AppError> {
    if !labels.contains(&result.label) {
        return Err(AppError::Collaborator(format!(
            "classifier returned unknown category '{}'",
            result.label
        )));
    }
    if !is_probability(result.confidence) {
        return Err(AppError::Collaborator(format!(
            "classifier confidence {} outside [0, 1]",
            result.confidence
        )));
    }
    Ok(result)
}
