//! HTTP surface: the UI page and the JSON prediction endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::analyzer::{Sentiment, SentimentAnalyzer, SentimentResult};

pub mod ui;

/// Shared, read-only state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    analyzer: Arc<SentimentAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: SentimentAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Body of the prediction endpoints.
///
/// Accepts `{"text": "..."}` as well as the `{"data": ["..."]}` shape used by
/// Gradio clients. A missing text is treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

impl PredictRequest {
    pub fn text(&self) -> &str {
        if let Some(text) = &self.text {
            return text;
        }
        self.data
            .as_ref()
            .and_then(|data| data.first())
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub sentiment: Sentiment,
    pub data: Vec<Sentiment>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: SentimentResult,
    pub sentiment_display: String,
    pub confidence_display: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

/// Runs the synchronous analysis on the blocking pool
async fn run_analysis(analyzer: Arc<SentimentAnalyzer>, text: String) -> SentimentResult {
    tokio::task::spawn_blocking(move || analyzer.analyze(&text))
        .await
        .unwrap_or_else(|e| {
            log::warn!("Analysis task failed, reporting neutral: {}", e);
            SentimentResult::neutral()
        })
}

async fn index() -> Result<Html<String>, StatusCode> {
    ui::render_page().map(Html).map_err(|e| {
        log::error!("Failed to render page: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Json<PredictResponse> {
    let result = run_analysis(Arc::clone(&state.analyzer), request.text().to_string()).await;
    log::debug!("predict -> {}", result.sentiment);
    Json(PredictResponse {
        sentiment: result.sentiment,
        data: vec![result.sentiment],
    })
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Json<AnalyzeResponse> {
    let text = request.text();
    if text.trim().is_empty() {
        return Json(AnalyzeResponse {
            result: SentimentResult::neutral(),
            sentiment_display: ui::EMPTY_INPUT_MESSAGE.to_string(),
            confidence_display: "0%".to_string(),
        });
    }

    let result = run_analysis(Arc::clone(&state.analyzer), text.to_string()).await;
    Json(AnalyzeResponse {
        sentiment_display: ui::sentiment_display(result.sentiment).to_string(),
        confidence_display: ui::confidence_display(&result),
        result,
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.analyzer.model_name().to_string(),
    })
}

/// Builds the application router
pub fn router(analyzer: SentimentAnalyzer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/predict", post(predict))
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(AppState::new(analyzer))
}

/// Binds `addr` and serves until Ctrl-C
pub async fn serve(addr: SocketAddr, analyzer: SentimentAnalyzer) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(analyzer))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
