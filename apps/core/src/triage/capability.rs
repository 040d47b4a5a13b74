use async_trait::async_trait;

use super::category::{CategoryScores, ClassificationResult, KeywordCategoryClassifier};
use super::sentiment::{LexiconSentiment, SentimentResult};
use crate::error::AppError;

/// Defines the public interface for a sentiment model.
///
/// Implementations may be local or remote. A failing model never fails an
/// analysis; the engine falls back to [`LexiconSentiment`].
#[async_trait]
pub trait SentimentModel: Send + Sync + 'static {
    /// Classifies the sentiment of already-normalized text.
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult, AppError>;
}

/// Defines the public interface for a zero-shot category classifier.
///
/// The classifier chooses one of `candidate_labels`; scores are reported for
/// every candidate it evaluated.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync + 'static {
    async fn classify_zero_shot(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassificationResult, AppError>;
}

#[async_trait]
impl SentimentModel for LexiconSentiment {
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult, AppError> {
        Ok(self.analyze(text))
    }
}

#[async_trait]
impl ZeroShotClassifier for KeywordCategoryClassifier {
    /// Keyword classification restricted to the candidate labels. Candidates
    /// unknown to the lexicon score 0.
    async fn classify_zero_shot(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassificationResult, AppError> {
        if candidate_labels.is_empty() {
            return Err(AppError::Validation(
                "zero-shot classification needs at least one candidate label".to_string(),
            ));
        }

        let full = self.classify(text);
        let mut scores = CategoryScores::new();
        let mut best: Option<(&str, f64)> = None;

        for label in candidate_labels {
            let score = full.scores.get(label).copied().unwrap_or(0.0);
            scores.insert(label.clone(), score);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((label.as_str(), score));
            }
        }

        let (label, best_score) = best.unwrap_or((candidate_labels[0].as_str(), 0.0));
        Ok(ClassificationResult {
            label: label.to_string(),
            confidence: (best_score * 2.0).min(1.0),
            scores,
        })
    }
}
