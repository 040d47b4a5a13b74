//! HTTP surface of the triage service.
//!
//! - `GET  /` and `GET /health`: service status
//! - `POST /analyze`: analyze one message
//! - `POST /analyze/batch`: analyze a list of messages
//! - `GET  /categories`: category labels in declaration order
//! - `GET  /priority-levels`: tiers and their lower bounds

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{ServiceSettings, TriageConfig};
use crate::error::AppError;
use crate::triage::{
    AnalysisResponse, AutoTagger, PriorityTier, RawQuery, RemoteModelClient,
    RemoteSentimentModel, RemoteZeroShotClassifier,
};

pub const SERVICE_NAME: &str = "query-tracking-ml-service";

/// Upper bound on messages per batch request.
pub const MAX_BATCH_SIZE: usize = 1000;

type SharedTagger = Arc<AutoTagger>;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<AnalysisResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriorityLevelsResponse {
    pub priority_levels: Vec<PriorityTier>,
    pub thresholds: BTreeMap<PriorityTier, f64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// Attach the remote models the settings ask for.
///
/// Model flags without `ML_SERVICE_URL` leave the built-in analyzers in charge.
pub fn build_tagger(
    config: TriageConfig,
    settings: &ServiceSettings,
) -> Result<AutoTagger, AppError> {
    let timeout = config.collaborator_timeout();
    let mut tagger = AutoTagger::new(config)?;

    let wants_models = settings.use_zero_shot || settings.use_transformer_sentiment;
    match &settings.ml_service_url {
        Some(url) if wants_models => {
            let client =
                RemoteModelClient::new(url.clone(), settings.ml_service_token.clone(), timeout)?;
            if settings.use_transformer_sentiment {
                tagger = tagger
                    .with_sentiment_model(Arc::new(RemoteSentimentModel::new(client.clone())));
            }
            if settings.use_zero_shot {
                tagger = tagger.with_zero_shot(Arc::new(RemoteZeroShotClassifier::new(client)));
            }
            info!("Remote models enabled at {}", url);
        }
        None if wants_models => {
            info!("No ML_SERVICE_URL configured, using built-in analyzers");
        }
        _ => {}
    }

    Ok(tagger)
}

pub fn router(tagger: SharedTagger) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/analyze/batch", post(analyze_batch))
        .route("/categories", get(categories))
        .route("/priority-levels", get(priority_levels))
        .layer(middleware::from_fn(request_span))
        .layer(CorsLayer::permissive())
        .with_state(tagger)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, tagger: SharedTagger) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Triage service listening on {}", addr);
    }
    axum::serve(listener, router(tagger)).await?;
    Ok(())
}

async fn request_span(req: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    next.run(req).instrument(span).await
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn analyze(
    State(tagger): State<SharedTagger>,
    Json(query): Json<RawQuery>,
) -> Json<AnalysisResponse> {
    let verdict = tagger.analyze(&query).await;
    Json(verdict.into())
}

async fn analyze_batch(
    State(tagger): State<SharedTagger>,
    Json(queries): Json<Vec<RawQuery>>,
) -> Result<Json<BatchResponse>, AppError> {
    if queries.len() > MAX_BATCH_SIZE {
        return Err(AppError::Validation(format!(
            "batch of {} messages exceeds the limit of {}",
            queries.len(),
            MAX_BATCH_SIZE
        )));
    }

    let results: Vec<AnalysisResponse> = tagger
        .analyze_batch(&queries)
        .await
        .into_iter()
        .map(AnalysisResponse::from)
        .collect();

    Ok(Json(BatchResponse {
        count: results.len(),
        results,
    }))
}

async fn categories(State(tagger): State<SharedTagger>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: tagger.categories(),
    })
}

async fn priority_levels(State(tagger): State<SharedTagger>) -> Json<PriorityLevelsResponse> {
    let thresholds = tagger.thresholds();
    Json(PriorityLevelsResponse {
        priority_levels: PriorityTier::ALL.to_vec(),
        thresholds: PriorityTier::ALL
            .iter()
            .map(|tier| (*tier, thresholds.bound(*tier)))
            .collect(),
    })
}
