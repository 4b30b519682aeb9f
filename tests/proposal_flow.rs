//! End-to-end proposal generation tests.
//!
//! Drives the full HTTP stack against a mock Gemini API: request in,
//! classification, fallback across candidates, PDF out.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use lopdf::Document;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proposalgen::config::{AppConfig, GeminiConfig, RetryConfig};
use proposalgen::core::llm::GeminiClient;
use proposalgen::core::prompt::SECTION_HEADINGS;
use proposalgen::core::proposal::ProposalService;
use proposalgen::server::router;

fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        gemini: GeminiConfig {
            base_url: server.uri(),
            candidate_models: vec![
                "models/gemini-1.5-flash".to_string(),
                "models/gemini-1.5-pro".to_string(),
            ],
            ..GeminiConfig::default()
        },
        retry: RetryConfig {
            base_delay_ms: 1,
            max_delay_ms: 2,
            total_budget_ms: 5_000,
            ..RetryConfig::default()
        },
        ..AppConfig::default()
    }
}

fn app_for(server: &MockServer) -> axum::Router {
    let config = test_config(server);
    let client = Arc::new(GeminiClient::new(
        "AIzaTestKey".to_string(),
        config.gemini.clone(),
    ));
    router(Arc::new(ProposalService::new(client, config)))
}

fn proposal_body() -> serde_json::Value {
    let text = SECTION_HEADINGS
        .iter()
        .map(|h| format!("{h}\nDetailed section content goes here.\n"))
        .collect::<Vec<_>>()
        .join("\n");
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

async fn post_report(app: axum::Router) -> axum::response::Response {
    app.oneshot(
        Request::post("/generate-proposal?report_text=Solar%20feasibility%20study")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn extract_all_text(bytes: &[u8]) -> String {
    let doc = Document::load_mem(bytes).expect("response should be a loadable PDF");
    let pages = doc.get_pages().len() as u32;
    (1..=pages)
        .map(|p| doc.extract_text(&[p]).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn report_text_yields_pdf_with_ordered_sections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proposal_body()))
        .mount(&server)
        .await;

    let response = post_report(app_for(&server)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=funding_proposal.pdf"
    );

    let pdf = read_body(response).await;
    let text = extract_all_text(&pdf);
    let positions: Vec<usize> = SECTION_HEADINGS
        .iter()
        .map(|h| text.find(h).unwrap_or_else(|| panic!("missing heading {h}")))
        .collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "section headings out of order"
    );
}

#[tokio::test]
async fn rate_limited_model_is_retried_then_abandoned_for_fallback() {
    let server = MockServer::start().await;
    // Preferred model stays rate limited through all its attempts.
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proposal_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = post_report(app_for(&server)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let pdf = read_body(response).await;
    assert!(pdf.starts_with(b"%PDF"));
    server.verify().await;
}

#[tokio::test]
async fn unknown_model_is_skipped_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(proposal_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = post_report(app_for(&server)).await;
    assert_eq!(response.status(), StatusCode::OK);
    server.verify().await;
}

#[tokio::test]
async fn exhausting_every_candidate_returns_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let response = post_report(app_for(&server)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json: serde_json::Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(json["error"]["type"], "exhaustion_error");
}

#[tokio::test]
async fn invalid_api_key_fails_fast_with_diagnostic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let response = post_report(app_for(&server)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json: serde_json::Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(json["error"]["type"], "fatal_backend_error");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("API key not valid"));
    server.verify().await;
}
