//! HTTP server exposing batch analysis.
//!
//! This module provides an HTTP server that:
//! - Accepts a user's post batch via POST /analyze
//! - Runs it through the analyzer against that user's baseline
//! - Returns the rhythm report
//!
//! # Architecture
//!
//! ```text
//! client ──→ POST /analyze ──→ rhythm-agent ──→ report
//!                                   ↓
//!                      [baselines/<user_id>.json]
//! ```
//!
//! Requests for the same user are serialized on that user's baseline lock.

use crate::baseline::{validate_user_id, BaselineError, BaselineRegistry};
use crate::classifier::LexiconClassifier;
use crate::core::{AnalysisError, Analyzer, Report, SentimentClassifier, DEFAULT_MAX_TWEETS};
use crate::ingest::{parse_timezone, Batch, RawPost};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Directory holding per-user baselines
    pub state_dir: PathBuf,
    /// Posts classified per batch
    pub max_tweets: usize,
    /// Timezone for posts without an offset, when the request names none
    pub default_timezone: Option<Tz>,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(port: u16, state_dir: PathBuf) -> Self {
        Self {
            port,
            state_dir,
            max_tweets: DEFAULT_MAX_TWEETS,
            default_timezone: None,
        }
    }
}

/// Classifier shared across request handlers
pub type SharedClassifier = dyn SentimentClassifier + Send + Sync;

/// Shared server state
pub struct ServerState {
    analyzer: Analyzer<SharedClassifier>,
    baselines: BaselineRegistry,
    default_timezone: Option<Tz>,
}

impl ServerState {
    /// Create new server state using the built-in classifier
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_classifier(config, Box::new(LexiconClassifier::new()))
    }

    /// Create new server state with a specific classifier
    pub fn with_classifier(config: &ServerConfig, classifier: Box<SharedClassifier>) -> Self {
        Self {
            analyzer: Analyzer::new(classifier, config.max_tweets),
            baselines: BaselineRegistry::new(&config.state_dir),
            default_timezone: config.default_timezone,
        }
    }
}

/// Batch submitted for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: String,
    #[serde(default)]
    pub posts: Vec<RawPost>,
    /// IANA timezone for posts without an offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

fn analysis_error(e: AnalysisError) -> ApiError {
    match e {
        AnalysisError::Baseline(e) => baseline_error(e),
        AnalysisError::Classifier(e) => {
            tracing::error!("Classifier failed: {}", e);
            api_error(StatusCode::BAD_GATEWAY, "CLASSIFIER_ERROR", e.to_string())
        }
    }
}

fn baseline_error(e: BaselineError) -> ApiError {
    tracing::error!("Baseline unavailable: {}", e);
    api_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "BASELINE_UNAVAILABLE",
        e.to_string(),
    )
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /analyze
///
/// Converts the posts into a batch, analyzes it and updates the user's
/// baseline. Posts with unreadable timestamps are dropped; a non-empty
/// request where every post is dropped is rejected.
async fn analyze(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Report>, ApiError> {
    if !validate_user_id(&request.user_id) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_USER",
            format!("Invalid user id: {:?}", request.user_id),
        ));
    }

    let timezone = match request.timezone.as_deref() {
        Some(name) => Some(
            parse_timezone(name)
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_BATCH", e.to_string()))?,
        ),
        None => state.default_timezone,
    };

    let batch = Batch::from_posts(&request.posts, timezone);
    if batch.is_empty() && !request.posts.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_BATCH",
            format!("None of the {} posts had a readable timestamp", request.posts.len()),
        ));
    }

    let worker_state = Arc::clone(&state);
    let user_id = request.user_id.clone();
    let report = tokio::task::spawn_blocking(move || {
        worker_state.baselines.with_store(&user_id, |store| {
            worker_state.analyzer.analyze(&batch.events, store)
        })
    })
    .await
    .map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            format!("Analysis task failed: {e}"),
        )
    })?
    .map_err(analysis_error)?;

    tracing::info!(user = %request.user_id, "Report produced");

    Ok(Json(report))
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config));
    serve(config.port, state).await
}

/// Run the HTTP server with prepared state
pub async fn serve(
    port: u16,
    state: Arc<ServerState>,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Rhythm agent server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
