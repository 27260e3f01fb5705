use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use stock_insight_api::{
    background::price_cache::PriceCache,
    clients::finnhub::FinnhubClient,
    config::AppConfig,
    routes::{
        analysis::{PeersResponse, RiskResponse},
        register_routes,
    },
    state::AppState,
};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

//
// ----------- Global Setup -----------
//

static INIT: Lazy<()> = Lazy::new(|| {
    dotenvy::dotenv().ok();
});

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
const OPENAI_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    ticker: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentBody {
    sentiment: String,
    prompt: String,
    model_type: String,
    news_links: Vec<serde_json::Value>,
}

//
// ----------- Test Helpers -----------
//

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        finnhub_api_key: "dummy-key".to_string(),
        finnhub_base_url: base_url.to_string(),
        gemini_api_key: Some("gemini-key".to_string()),
        gemini_base_url: base_url.to_string(),
        gemini_model: "gemini-2.0-flash".to_string(),
        openai_api_key: None,
        openai_base_url: base_url.to_string(),
        openai_model: "gpt-4".to_string(),
        app_server_port: 8080,
        watchlist: vec!["AAPL".to_string()],
        refresh_interval_seconds: 600,
        snapshot_path: std::env::temp_dir()
            .join("analysis_routes_unused.json")
            .to_string_lossy()
            .into_owned(),
        upstream_timeout_seconds: 2,
        news_lookback_days: 7,
    }
}

fn app_for(config: AppConfig) -> Router {
    let price_cache = PriceCache::new(&config, FinnhubClient::new(&config));
    register_routes(AppState::new(config, price_cache))
}

async fn post(app: Router, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
    let request = match body {
        Some(json) => Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.oneshot(request).await.expect("Should receive a response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    (status, bytes.to_vec())
}

fn parse<T: serde::de::DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).expect("should parse JSON")
}

/// Mounts profile, news and quote responses for AAPL.
async fn setup_provider(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/stock/profile2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Apple Inc",
            "ticker": "AAPL",
            "finnhubIndustry": "Technology",
            "marketCapitalization": 2800000.0,
            "exchange": "NASDAQ",
            "country": "US"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/company-news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "headline": "Apple unveils new chip",
                "summary": "Faster and cooler.",
                "url": "https://news.example/chip",
                "datetime": 1700000000
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "c": 190.0, "pc": 188.0 })),
        )
        .mount(server)
        .await;
}

async fn mount_gemini_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "gemini-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
        })))
        .mount(server)
        .await;
}

//
// ----------- Sentiment -----------
//

#[tokio::test]
async fn sentiment_defaults_to_gemini_and_returns_news_links() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    mount_gemini_reply(&server, "  Sentiment is broadly positive.  ").await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/sentiment", None).await;

    assert_eq!(status, StatusCode::OK);
    let sentiment: SentimentBody = parse(&body);
    assert_eq!(sentiment.sentiment, "Sentiment is broadly positive.");
    assert_eq!(sentiment.model_type, "gemini");
    assert!(sentiment.prompt.contains("Apple Inc (AAPL)"));
    assert!(sentiment.prompt.contains("Apple unveils new chip"));
    assert_eq!(sentiment.news_links.len(), 1);
    assert_eq!(sentiment.news_links[0]["url"], "https://news.example/chip");
}

#[tokio::test]
async fn sentiment_with_gpt4_uses_request_token() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(header("authorization", "Bearer sk-request"))
        .and(body_string_contains("\"model\":\"gpt-4\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": "Cautiously optimistic." } } ]
        })))
        .mount(&server)
        .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(
        app,
        "/api/stock/AAPL/sentiment",
        Some(serde_json::json!({ "modelType": "gpt-4", "openAIToken": "sk-request" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sentiment: SentimentBody = parse(&body);
    assert_eq!(sentiment.sentiment, "Cautiously optimistic.");
    assert_eq!(sentiment.model_type, "gpt-4");
}

#[tokio::test]
async fn sentiment_with_gpt4_without_token_returns_400() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(
        app,
        "/api/stock/AAPL/sentiment",
        Some(serde_json::json!({ "modelType": "gpt-4" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "OpenAI API token is required for GPT-4");
    assert_eq!(error.ticker, "AAPL");
}

#[tokio::test]
async fn sentiment_with_rejected_openai_token_returns_401() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(
        app,
        "/api/stock/AAPL/sentiment",
        Some(serde_json::json!({ "modelType": "gpt-4", "openAIToken": "sk-bad" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Invalid OpenAI API token");
}

#[tokio::test]
async fn sentiment_with_rejected_gemini_key_returns_401() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "API_KEY_INVALID",
                    "domain": "googleapis.com"
                }]
            }
        })))
        .mount(&server)
        .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/sentiment", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Invalid Gemini API key");
    assert_eq!(error.ticker, "AAPL");
}

#[tokio::test]
async fn sentiment_with_gemini_bad_request_returns_500() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "Invalid JSON payload", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/sentiment", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Failed to analyze market sentiment");
}

#[tokio::test]
async fn sentiment_with_invalid_json_body_returns_400() {
    let _ = *INIT;
    let app = app_for(test_config("http://127.0.0.1:9"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/stock/AAPL/sentiment")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{modelType"))
        .unwrap();
    let response = app.oneshot(request).await.expect("Should receive a response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

//
// ----------- Risk -----------
//

#[tokio::test]
async fn risk_parses_score_and_explanation() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    mount_gemini_reply(
        &server,
        "RISK_SCORE: 42\nEXPLANATION: Stable sector, low volatility.",
    )
    .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/risk", None).await;

    assert_eq!(status, StatusCode::OK);
    let risk: RiskResponse = parse(&body);
    assert_eq!(risk.risk_score, 42);
    assert_eq!(risk.explanation, "Stable sector, low volatility.");
    assert!(risk.prompt.contains("Current Price: 190"));
    assert!(risk.prompt.contains("RISK_SCORE:"));
}

#[tokio::test]
async fn risk_without_score_marker_returns_500() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    mount_gemini_reply(&server, "This stock looks moderately risky to me.").await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/risk", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Failed to analyze investment risk");
    assert_eq!(error.ticker, "AAPL");
}

#[tokio::test]
async fn risk_llm_timeout_returns_500() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "candidates": [] }))
                .set_delay(std::time::Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/risk", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Failed to analyze investment risk");
}

//
// ----------- Peers -----------
//

#[tokio::test]
async fn peers_strips_code_fence() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    mount_gemini_reply(
        &server,
        "```json\n[{\"ticker\":\"MSFT\",\"name\":\"Microsoft\"}]\n```",
    )
    .await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/peers", None).await;

    assert_eq!(status, StatusCode::OK);
    let peers: PeersResponse = parse(&body);
    assert_eq!(peers.peers.len(), 1);
    assert_eq!(peers.peers[0].ticker, "MSFT");
    assert_eq!(peers.peers[0].name, "Microsoft");
}

#[tokio::test]
async fn peers_prose_reply_returns_500() {
    let _ = *INIT;
    let server = MockServer::start().await;
    setup_provider(&server).await;
    mount_gemini_reply(&server, "Apple competes with Microsoft and Google.").await;

    let app = app_for(test_config(&server.uri()));
    let (status, body) = post(app, "/api/stock/AAPL/peers", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "Failed to fetch peer companies");
    assert_eq!(error.ticker, "AAPL");
}
