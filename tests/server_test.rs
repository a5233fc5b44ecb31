use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chat_sentiment::server::{self, AnalyzeResponse, HealthResponse, PredictResponse};
use chat_sentiment::{
    ClassifierError, LabelScore, LexiconModel, Sentiment, SentimentAnalyzer, SentimentModel,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

struct BrokenModel;

impl SentimentModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn scores(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        Err(ClassifierError::ModelError("Failed to run model".into()))
    }
}

struct LabelledModel;

impl SentimentModel for LabelledModel {
    fn name(&self) -> &str {
        "labelled"
    }

    fn scores(&self, _text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        Ok(vec![
            LabelScore::new("Negative", 0.05),
            LabelScore::new("Neutral", 0.1),
            LabelScore::new("Positive", 0.8512),
        ])
    }
}

fn lexicon_app() -> Router {
    server::router(SentimentAnalyzer::new(LexiconModel::new()))
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_predict_returns_label() {
    let response = lexicon_app()
        .oneshot(json_post("/api/predict", r#"{"text": "This is terrible, I hate it."}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PredictResponse = read_json(response).await;
    assert_eq!(body.sentiment, Sentiment::Negative);
    assert_eq!(body.data, vec![Sentiment::Negative]);
}

#[tokio::test]
async fn test_predict_accepts_gradio_shape() {
    let response = lexicon_app()
        .oneshot(json_post("/api/predict", r#"{"data": ["Merhaba, bugün harika bir gün!"]}"#))
        .await
        .unwrap();
    let body: PredictResponse = read_json(response).await;
    assert_eq!(body.sentiment, Sentiment::Positive);
}

#[tokio::test]
async fn test_predict_empty_text_is_neutral() {
    let response = lexicon_app()
        .oneshot(json_post("/api/predict", r#"{"text": "   "}"#))
        .await
        .unwrap();
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["sentiment"], "neutral");
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let response = lexicon_app()
        .oneshot(json_post("/api/predict", "{not json"))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_model_failure_is_neutral_over_http() {
    let app = server::router(SentimentAnalyzer::new(BrokenModel));
    let response = app
        .oneshot(json_post("/api/analyze", r#"{"text": "I love this app!"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: AnalyzeResponse = read_json(response).await;
    assert_eq!(body.result.sentiment, Sentiment::Neutral);
    assert_eq!(body.result.confidence, 0.0);
    assert_eq!(body.result.original_label, None);
    assert_eq!(body.confidence_display, "0.0%");
}

#[tokio::test]
async fn test_analyze_reports_display_fields() {
    let app = server::router(SentimentAnalyzer::new(LabelledModel));
    let response = app
        .oneshot(json_post("/api/analyze", r#"{"text": "I love this app! It's amazing!"}"#))
        .await
        .unwrap();

    let body: AnalyzeResponse = read_json(response).await;
    assert_eq!(body.result.sentiment, Sentiment::Positive);
    assert_eq!(body.result.confidence, 0.851);
    assert_eq!(body.result.original_label.as_deref(), Some("Positive"));
    assert_eq!(body.sentiment_display, "😊 Positive");
    assert_eq!(body.confidence_display, "85.1%");
}

#[tokio::test]
async fn test_analyze_blank_input_prompts_for_text() {
    let response = lexicon_app()
        .oneshot(json_post("/api/analyze", r#"{"text": ""}"#))
        .await
        .unwrap();
    let body: AnalyzeResponse = read_json(response).await;
    assert_eq!(body.sentiment_display, "Please enter some text");
    assert_eq!(body.confidence_display, "0%");
}

#[tokio::test]
async fn test_index_serves_ui() {
    let response = lexicon_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Chat Sentiment Analysis API"));
    assert!(page.contains("id=\"confidence\""));
}

#[tokio::test]
async fn test_health_names_model() {
    let response = lexicon_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body: HealthResponse = read_json(response).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.model, "lexicon");
}
