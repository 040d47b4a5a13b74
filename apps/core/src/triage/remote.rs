//! HTTP-backed model collaborators.
//!
//! Both clients talk to an inference service exposing `POST /sentiment` and
//! `POST /zero-shot`. Any failure is returned as an error; the orchestrator
//! decides whether to fall back.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use super::capability::{SentimentModel, ZeroShotClassifier};
use super::category::{CategoryScores, ClassificationResult};
use super::sentiment::{SentimentLabel, SentimentResult};
use crate::error::AppError;

const SENTIMENT_ENDPOINT: &str = "sentiment";
const ZERO_SHOT_ENDPOINT: &str = "zero-shot";

/// Shared HTTP plumbing for the remote models.
#[derive(Debug, Clone)]
pub struct RemoteModelClient {
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RemoteModelClient {
    pub fn new(
        base_url: Url,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<T, AppError> {
        let url = self.base_url.join(endpoint)?;
        debug!(%url, "Calling remote model");

        let mut request = self.client.post(url.clone()).json(payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let res = request.send().await.map_err(|e| {
            error!(%url, "Remote model request failed: {}", e);
            AppError::from(e)
        })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Collaborator(format!(
                "{} responded with status {}: {}",
                endpoint, status, body
            )));
        }

        res.json::<T>()
            .await
            .map_err(|e| AppError::Collaborator(format!("malformed {} response: {}", endpoint, e)))
    }
}

/// `Url::join` replaces the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Pipelines answer either one list per input or a single flat list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SentimentPayload {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl SentimentPayload {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            SentimentPayload::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            SentimentPayload::Flat(scores) => scores,
        }
    }
}

fn sentiment_from_scores(scores: Vec<LabelScore>) -> Result<SentimentResult, AppError> {
    let mut result = SentimentResult {
        label: SentimentLabel::Neutral,
        positive: 0.0,
        neutral: 0.0,
        negative: 0.0,
        confidence: 0.0,
    };
    let mut best: Option<f64> = None;

    for LabelScore { label, score } in scores {
        let Some(parsed) = SentimentLabel::parse(&label) else {
            debug!("Ignoring unknown sentiment label '{}'", label);
            continue;
        };
        match parsed {
            SentimentLabel::Positive => result.positive = score,
            SentimentLabel::Neutral => result.neutral = score,
            SentimentLabel::Negative => result.negative = score,
        }
        if best.map_or(true, |b| score > b) {
            best = Some(score);
            result.label = parsed;
            result.confidence = score;
        }
    }

    match best {
        Some(_) => Ok(result),
        None => Err(AppError::Collaborator(
            "sentiment response carried no recognizable label".to_string(),
        )),
    }
}

/// Sentiment model served over HTTP
#[derive(Debug, Clone)]
pub struct RemoteSentimentModel {
    client: RemoteModelClient,
}

impl RemoteSentimentModel {
    pub fn new(client: RemoteModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SentimentModel for RemoteSentimentModel {
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult, AppError> {
        let payload = serde_json::json!({ "inputs": text });
        let answer: SentimentPayload = self.client.post_json(SENTIMENT_ENDPOINT, &payload).await?;
        sentiment_from_scores(answer.into_scores())
    }
}

#[derive(Debug, Deserialize)]
struct ZeroShotPayload {
    labels: Vec<String>,
    scores: Vec<f64>,
}

impl ZeroShotPayload {
    fn into_classification(self, candidates: &[String]) -> Result<ClassificationResult, AppError> {
        if self.labels.is_empty() || self.labels.len() != self.scores.len() {
            return Err(AppError::Collaborator(format!(
                "zero-shot response has {} labels and {} scores",
                self.labels.len(),
                self.scores.len()
            )));
        }

        let mut scores = CategoryScores::new();
        let mut best: Option<(String, f64)> = None;
        for (label, score) in self.labels.into_iter().zip(self.scores) {
            if !candidates.contains(&label) {
                return Err(AppError::Collaborator(format!(
                    "zero-shot response names unknown label '{}'",
                    label
                )));
            }
            if best.as_ref().map_or(true, |(_, s)| score > *s) {
                best = Some((label.clone(), score));
            }
            scores.insert(label, score);
        }

        let (label, confidence) = best.ok_or_else(|| {
            AppError::Internal("zero-shot response lost its labels".to_string())
        })?;
        Ok(ClassificationResult {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            scores,
        })
    }
}

/// Zero-shot category classifier served over HTTP
#[derive(Debug, Clone)]
pub struct RemoteZeroShotClassifier {
    client: RemoteModelClient,
}

impl RemoteZeroShotClassifier {
    pub fn new(client: RemoteModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ZeroShotClassifier for RemoteZeroShotClassifier {
    async fn classify_zero_shot(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassificationResult, AppError> {
        let payload = serde_json::json!({
            "inputs": text,
            "parameters": { "candidate_labels": candidate_labels },
        });
        let answer: ZeroShotPayload = self.client.post_json(ZERO_SHOT_ENDPOINT, &payload).await?;
        answer.into_classification(candidate_labels)
    }
}
