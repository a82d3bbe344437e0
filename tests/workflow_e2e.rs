//! End-to-end scenarios with the model service simulated by wiremock.
//!
//! These tests verify:
//! 1. The threshold and reply-presence gates resolve without any model call
//! 2. Classification drives the terminal status through the real adapter
//! 3. The clarification sub-flow parses and validates hiring manager details
//! 4. The HTTP boundary returns the contracted status codes and never leaks
//!    the missing-field diagnostics

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use approval_gateway::api::{self, AppState};
use approval_gateway::config::{AzureOpenAiConfig, Config};
use approval_gateway::llm::classifier::LlmReplyClassifier;
use approval_gateway::llm::extractor::LlmDetailExtractor;
use approval_gateway::llm::ChatClient;
use approval_gateway::models::approval::{FinalStatus, RequestContext, ServiceLineChange};
use approval_gateway::workflow::Orchestrator;

const DEPLOYMENT: &str = "gpt-4o";
const CHAT_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";

fn azure_config(uri: &str) -> AzureOpenAiConfig {
    AzureOpenAiConfig {
        endpoint: uri.to_string(),
        api_key: "test-key".into(),
        deployment: DEPLOYMENT.into(),
        api_version: "2024-02-01".into(),
    }
}

fn orchestrator(uri: &str) -> Orchestrator {
    let chat = ChatClient::new(Some(azure_config(uri)), 5).unwrap();
    Orchestrator::new(
        Arc::new(LlmReplyClassifier::new(chat.clone())),
        Arc::new(LlmDetailExtractor::new(chat)),
    )
}

/// A chat-completions body whose assistant message is `content`.
fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    }))
}

fn context(threshold: i64, reply: &str) -> RequestContext {
    RequestContext {
        service_line: "Data Migration".into(),
        threshold,
        context_document: "Subject: Approval required for Data Migration".into(),
        reply: reply.into(),
    }
}

// ── Orchestrator scenarios ───────────────────────────────────

#[tokio::test]
async fn scenario_auto_approved_below_threshold() {
    let server = MockServer::start().await;

    let outcome = orchestrator(&server.uri()).evaluate(context(20, "")).await;

    assert_eq!(outcome.status, FinalStatus::AutoApproved);
    assert_eq!(outcome.detail, "Threshold was not exceeded.");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_approval_reply_is_approved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("api-key", "test-key"))
        .respond_with(completion("approve"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate(context(50, "Approved, please proceed"))
        .await;

    assert_eq!(outcome.status, FinalStatus::Approved);
}

#[tokio::test]
async fn scenario_blank_reply_rejected_without_model_call() {
    let server = MockServer::start().await;

    let outcome = orchestrator(&server.uri()).evaluate(context(50, "")).await;

    assert_eq!(outcome.status, FinalStatus::Rejected);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_question_reply_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion("reject"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate(context(50, "what is this for?"))
        .await;

    assert_eq!(outcome.status, FinalStatus::Rejected);
}

#[tokio::test]
async fn clarify_token_suspends_for_clarification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion("clarify"))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate(context(50, "who is the hiring manager here?"))
        .await;

    assert_eq!(outcome.status, FinalStatus::Clarification);
    assert_eq!(outcome.detail, "Clarification required from hiring manager.");
}

#[tokio::test]
async fn model_commentary_fails_safe_to_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion("I think this looks fine, approve it!"))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate(context(50, "go ahead"))
        .await;

    assert_eq!(outcome.status, FinalStatus::Rejected);
}

#[tokio::test]
async fn model_service_failure_resolves_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate(context(50, "go ahead"))
        .await;

    assert_eq!(outcome.status, FinalStatus::Error);
}

#[tokio::test]
async fn malformed_model_body_resolves_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate(context(50, "go ahead"))
        .await;

    assert_eq!(outcome.status, FinalStatus::Error);
}

#[tokio::test]
async fn scenario_clarification_with_complete_details_approves() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion(
            "Name: Jane Doe\nYears of Experience: 5\nSL to SL change: Ops to Finance",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate_clarification(
            context(50, "what is this for?"),
            "Name: Jane Doe\nYears of Experience: 5\nSL to SL change: Ops to Finance",
        )
        .await;

    assert_eq!(outcome.status, FinalStatus::Approved);
    let details = outcome.extracted.expect("details attached");
    assert_eq!(details.full_name, "Jane Doe");
    assert_eq!(details.years_of_experience, 5);
    assert_eq!(
        details.service_line_change,
        ServiceLineChange {
            from: "Ops".into(),
            to: "Finance".into(),
        }
    );
}

#[tokio::test]
async fn scenario_clarification_missing_years_rejects_generically() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion("Name: Jane Doe\nSL to SL change: Ops to Finance"))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server.uri())
        .evaluate_clarification(context(50, "what is this for?"), "Jane Doe, Ops to Finance")
        .await;

    assert_eq!(outcome.status, FinalStatus::Rejected);
    assert_eq!(outcome.detail, "Missing or invalid hiring manager details.");
    assert!(!outcome.detail.contains("years"));
    assert!(outcome.extracted.is_none());
}

// ── HTTP boundary ────────────────────────────────────────────

async fn spawn_app(uri: &str) -> String {
    let cfg = Config {
        port: 0,
        azure: Some(azure_config(uri)),
        llm_timeout_secs: 5,
    };
    let chat = ChatClient::new(cfg.azure.clone(), cfg.llm_timeout_secs).unwrap();
    let engine = Orchestrator::new(
        Arc::new(LlmReplyClassifier::new(chat.clone())),
        Arc::new(LlmDetailExtractor::new(chat)),
    );
    let state = Arc::new(AppState {
        engine,
        config: cfg,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_auto_approval_uses_wire_spelling() {
    let server = MockServer::start().await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/process-approval"))
        .json(&json!({
            "service_line": "Minor Update",
            "threshold": 20,
            "approval_email": "",
            "user_reply": ""
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Auto-Approved");
}

#[tokio::test]
async fn http_missing_reply_without_email_is_invalid_request() {
    let server = MockServer::start().await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/process-approval"))
        .json(&json!({
            "service_line": "Cloud Setup",
            "threshold": 50,
            "approval_email": "",
            "user_reply": ""
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_blank_reply_with_email_resolves_rejected() {
    let server = MockServer::start().await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/process-approval"))
        .json(&json!({
            "service_line": "Cloud Setup",
            "threshold": 50,
            "approval_email": "Subject: Approval required",
            "user_reply": "   "
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Rejected");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_classification_failure_is_500_with_generic_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/process-approval"))
        .json(&json!({
            "service_line": "Cloud Setup",
            "threshold": 50,
            "approval_email": "Subject: Approval required",
            "user_reply": "go ahead"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Error");
    assert_eq!(body["detail"], "Processing error in the approval workflow.");
}

#[tokio::test]
async fn http_clarification_complete_returns_extracted_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion(
            "Name: Jane Doe\nYears of Experience: 5\nSL to SL change: Ops to Finance",
        ))
        .mount(&server)
        .await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/process-clarification"))
        .json(&json!({
            "service_line": "Data Migration",
            "threshold": 50,
            "approval_email": "Subject: Approval required",
            "user_reply": "what is this for?",
            "hiring_manager_reply": "Name: Jane Doe\nYears of Experience: 5\nSL to SL change: Ops to Finance"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Approved");
    assert_eq!(body["extracted_data"]["full_name"], "Jane Doe");
    assert_eq!(body["extracted_data"]["years_of_experience"], 5);
    assert_eq!(body["extracted_data"]["service_line_change"]["from"], "Ops");
    assert_eq!(body["extracted_data"]["service_line_change"]["to"], "Finance");
}

#[tokio::test]
async fn http_clarification_incomplete_is_400_without_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(completion("Name: Jane Doe\nSL to SL change: Ops to Finance"))
        .mount(&server)
        .await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/process-clarification"))
        .json(&json!({
            "service_line": "Data Migration",
            "threshold": 50,
            "approval_email": "Subject: Approval required",
            "user_reply": "what is this for?",
            "hiring_manager_reply": "It's Jane, she moved from Ops to Finance"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let text = resp.text().await.unwrap();
    let body: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["status"], "Rejected");
    assert_eq!(body["detail"], "Missing or invalid hiring manager details.");
    // The diagnostic field list is log-only.
    assert!(!text.contains("years_of_experience"));
    assert!(!text.contains("full_name"));
}

#[tokio::test]
async fn http_health_probe() {
    let server = MockServer::start().await;
    let base = spawn_app(&server.uri()).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}
