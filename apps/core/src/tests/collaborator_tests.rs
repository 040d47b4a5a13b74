//! Collaborator Tests
//!
//! Behavior of the `AutoTagger` when external sentiment and zero-shot models
//! are attached: answers are used when healthy and replaced by the built-in
//! analyzers on failure, timeout or nonsense.

use crate::config::TriageConfig;
use crate::error::AppError;
use crate::triage::{
    AutoTagger, CategoryScores, ClassificationResult, RawQuery, SentimentLabel, SentimentModel,
    SentimentResult, ZeroShotClassifier,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

// ============================================================================
// Mock Collaborators for Testing
// ============================================================================

/// Mock sentiment model that returns a fixed answer
pub struct MockSentimentModel {
    pub result: SentimentResult,
    pub delay_ms: u64,
    pub should_fail: bool,
    pub should_panic: bool,
    pub calls: AtomicUsize,
    pub last_input: Mutex<Option<String>>,
}

impl MockSentimentModel {
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        let mut result = SentimentResult {
            label,
            positive: 0.0,
            neutral: 0.0,
            negative: 0.0,
            confidence,
        };
        match label {
            SentimentLabel::Positive => result.positive = confidence,
            SentimentLabel::Neutral => result.neutral = confidence,
            SentimentLabel::Negative => result.negative = confidence,
        }
        Self {
            result,
            delay_ms: 0,
            should_fail: false,
            should_panic: false,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new(SentimentLabel::Neutral, 0.0)
        }
    }

    pub fn panicking() -> Self {
        Self {
            should_panic: true,
            ..Self::new(SentimentLabel::Negative, 1.0)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentModel for MockSentimentModel {
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(text.to_string());

        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if self.should_panic {
            panic!("model crashed during inference");
        }

        if self.should_fail {
            Err(AppError::Collaborator("Mock failure".to_string()))
        } else {
            Ok(self.result.clone())
        }
    }
}

/// Sentiment model with a bug: returns an internal error instead of an answer
pub struct BrokenSentimentModel;

#[async_trait]
impl SentimentModel for BrokenSentimentModel {
    async fn analyze_sentiment(&self, _text: &str) -> Result<SentimentResult, AppError> {
        Err(AppError::Internal("tokenizer state corrupted".to_string()))
    }
}

/// Mock zero-shot classifier that always picks the same label
pub struct MockZeroShot {
    pub label: String,
    pub confidence: f64,
    pub should_fail: bool,
    pub should_panic: bool,
    pub calls: AtomicUsize,
}

impl MockZeroShot {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            should_fail: false,
            should_panic: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("question", 0.0)
        }
    }

    pub fn panicking() -> Self {
        Self {
            should_panic: true,
            ..Self::new("complaint", 1.0)
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for MockZeroShot {
    async fn classify_zero_shot(
        &self,
        _text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassificationResult, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.should_panic {
            panic!("classifier index out of bounds");
        }

        if self.should_fail {
            return Err(AppError::Http("connection refused".to_string()));
        }

        let scores: CategoryScores = candidate_labels
            .iter()
            .map(|l| {
                let score = if *l == self.label { self.confidence } else { 0.0 };
                (l.clone(), score)
            })
            .collect();
        Ok(ClassificationResult {
            label: self.label.clone(),
            confidence: self.confidence,
            scores,
        })
    }
}

fn config_with_timeout(ms: u64) -> TriageConfig {
    TriageConfig {
        collaborator_timeout_ms: ms,
        ..Default::default()
    }
}

fn builtin() -> AutoTagger {
    AutoTagger::new(TriageConfig::default()).unwrap()
}

// ============================================================================
// Sentiment Model Tests
// ============================================================================

#[cfg(test)]
mod sentiment_model_tests {
    use super::*;

    #[tokio::test]
    async fn test_model_answer_is_used() {
        let model = Arc::new(MockSentimentModel::new(SentimentLabel::Negative, 0.9));
        let tagger = builtin().with_sentiment_model(model.clone());

        let verdict = tagger.analyze(&RawQuery::new("Thanks, great service!")).await;

        assert_eq!(model.call_count(), 1);
        assert_eq!(verdict.sentiment.label, SentimentLabel::Negative);
        assert_eq!(verdict.sentiment.confidence, 0.9);
        assert!(verdict.tags.contains(&"sentiment_negative".to_string()));

        // Built-in verdict plus 0.2 * 0.9 for negative sentiment
        let baseline = builtin().analyze(&RawQuery::new("Thanks, great service!")).await;
        assert!((verdict.priority.score - (baseline.priority.score + 0.18)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failing_model_falls_back() {
        let model = Arc::new(MockSentimentModel::failing());
        let tagger = builtin().with_sentiment_model(model.clone());
        let query = RawQuery::new("This is terrible, I am so disappointed");

        let verdict = tagger.analyze(&query).await;

        assert_eq!(model.call_count(), 1);
        assert_eq!(verdict, builtin().analyze(&query).await);
        assert_eq!(verdict.sentiment.label, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_panicking_model_falls_back() {
        let model = Arc::new(MockSentimentModel::panicking());
        let tagger = builtin().with_sentiment_model(model.clone());
        let query = RawQuery::new("thanks, great service!");

        let verdict = tagger.analyze(&query).await;

        assert_eq!(model.call_count(), 1);
        assert_eq!(verdict, builtin().analyze(&query).await);
        assert_eq!(verdict.sentiment.label, SentimentLabel::Positive);

        // The engine stays usable after a collaborator panic
        let again = tagger.analyze(&query).await;
        assert_eq!(model.call_count(), 2);
        assert_eq!(again, verdict);
    }

    #[tokio::test]
    async fn test_internal_model_error_falls_back() {
        let tagger = builtin().with_sentiment_model(Arc::new(BrokenSentimentModel));
        let query = RawQuery::new("the product arrived damaged");

        let verdict = tagger.analyze(&query).await;

        assert_eq!(verdict, builtin().analyze(&query).await);
        assert_eq!(verdict.sentiment.label, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let model = Arc::new(
            MockSentimentModel::new(SentimentLabel::Negative, 1.0).with_delay(1_000),
        );
        let tagger = AutoTagger::new(config_with_timeout(50))
            .unwrap()
            .with_sentiment_model(model.clone());
        let query = RawQuery::new("Thanks, great service!");

        let verdict = tagger.analyze(&query).await;

        assert_eq!(model.call_count(), 1);
        assert_eq!(verdict.sentiment.label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_out_of_range_answer_rejected() {
        let model = Arc::new(MockSentimentModel::new(SentimentLabel::Negative, 7.5));
        let tagger = builtin().with_sentiment_model(model);

        let verdict = tagger.analyze(&RawQuery::new("Thanks, great service!")).await;
        assert_eq!(verdict.sentiment.label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_input_truncated_to_512_chars() {
        let model = Arc::new(MockSentimentModel::new(SentimentLabel::Neutral, 0.5));
        let tagger = builtin().with_sentiment_model(model.clone());

        let long_text = "déjà vu ".repeat(200);
        tagger.analyze(&RawQuery::new(long_text)).await;

        let seen = model.last_input.lock().unwrap().clone().unwrap();
        assert_eq!(seen.chars().count(), 512);
    }

    #[tokio::test]
    async fn test_model_not_called_for_blank_text() {
        let model = Arc::new(MockSentimentModel::new(SentimentLabel::Negative, 1.0));
        let tagger = builtin().with_sentiment_model(model.clone());

        tagger.analyze(&RawQuery::new("  ")).await;
        tagger.analyze(&RawQuery::new("https://example.com/status")).await;

        assert_eq!(model.call_count(), 0);
    }
}

// ============================================================================
// Zero-Shot Classifier Tests
// ============================================================================

#[cfg(test)]
mod zero_shot_tests {
    use super::*;

    #[tokio::test]
    async fn test_classifier_answer_is_used() {
        let classifier = Arc::new(MockZeroShot::new("complaint", 0.8));
        let tagger = builtin().with_zero_shot(classifier.clone());

        let verdict = tagger.analyze(&RawQuery::new("Where is my parcel")).await;

        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(verdict.category.label, "complaint");
        assert_eq!(verdict.category.confidence, 0.8);
        assert_eq!(verdict.category.scores.len(), 9);
        assert_eq!(verdict.intent, "issue_reporting");
        assert_eq!(verdict.tags[0], "complaint");
    }

    #[tokio::test]
    async fn test_failing_classifier_falls_back() {
        let tagger = builtin().with_zero_shot(Arc::new(MockZeroShot::failing()));
        let query = RawQuery::new("The app keeps crashing with an error");

        let verdict = tagger.analyze(&query).await;

        assert_eq!(verdict, builtin().analyze(&query).await);
        assert_eq!(verdict.category.label, "bug_report");
    }

    #[tokio::test]
    async fn test_panicking_classifier_falls_back() {
        let classifier = Arc::new(MockZeroShot::panicking());
        let tagger = builtin().with_zero_shot(classifier.clone());
        let query = RawQuery::new("The app keeps crashing with an error");

        let results = tagger.analyze_batch(&[query.clone(), query.clone()]).await;

        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
        for verdict in results {
            assert_eq!(verdict.category.label, "bug_report");
            assert_eq!(verdict, builtin().analyze(&query).await);
        }
    }

    #[tokio::test]
    async fn test_unknown_label_falls_back() {
        let tagger = builtin().with_zero_shot(Arc::new(MockZeroShot::new("weather", 0.99)));
        let query = RawQuery::new("thanks, great job");

        let verdict = tagger.analyze(&query).await;
        assert_eq!(verdict.category.label, "compliment");
    }

    #[tokio::test]
    async fn test_both_collaborators_in_batch() {
        let sentiment = Arc::new(MockSentimentModel::new(SentimentLabel::Negative, 1.0));
        let classifier = Arc::new(MockZeroShot::new("bug_report", 0.9));
        let tagger = builtin()
            .with_sentiment_model(sentiment.clone())
            .with_zero_shot(classifier.clone());

        let batch = vec![
            RawQuery::new("checkout broken").with_channel("WEBSITE_CHAT"),
            RawQuery::new(""),
            RawQuery::new("cannot log in").with_channel("EMAIL"),
        ];
        let results = tagger.analyze_batch(&batch).await;

        assert_eq!(sentiment.call_count(), 2);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
        assert_eq!(results[0].category.label, "bug_report");
        assert_eq!(results[1].category.label, "question");
        assert_eq!(results[2].category.label, "bug_report");
        assert!(results[0].priority.score > results[2].priority.score);
    }
}
