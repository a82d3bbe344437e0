use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::AppState;
use crate::errors::AppError;
use crate::models::approval::{FinalStatus, ManagerDetails, RequestContext};
use crate::workflow::Outcome;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub service_line: String,
    pub threshold: i64,
    /// The approval email shown to the reviewer when threshold > 30.
    #[serde(default)]
    pub approval_email: String,
    #[serde(default)]
    pub user_reply: String,
}

#[derive(Debug, Deserialize)]
pub struct ClarificationRequest {
    pub service_line: String,
    pub threshold: i64,
    #[serde(default)]
    pub approval_email: String,
    #[serde(default)]
    pub user_reply: String,
    pub hiring_manager_reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub status: FinalStatus,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ManagerDetails>,
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /health — liveness probe. Also reports whether the model client has
/// credentials, since a misconfigured deployment fails closed rather than
/// failing startup.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_configured": state.config.azure.is_some(),
    }))
}

/// POST /process-approval
///
/// Threshold ≤ 30 auto-approves without touching the model service;
/// above that, the reviewer's reply is classified and resolved.
pub async fn process_approval(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApprovalRequest>,
) -> Result<(StatusCode, Json<ApprovalResponse>), AppError> {
    if req.service_line.trim().is_empty() {
        return Err(AppError::InvalidRequest {
            reason: "service_line must not be empty".into(),
        });
    }

    // A reply can only exist once an approval email has been generated;
    // neither being present above the threshold means the submission is
    // structurally incomplete, not a mere non-approval.
    if req.threshold > 30
        && req.user_reply.trim().is_empty()
        && req.approval_email.trim().is_empty()
    {
        return Err(AppError::InvalidRequest {
            reason: "user_reply is required when threshold > 30".into(),
        });
    }

    let outcome = state
        .engine
        .evaluate(RequestContext {
            service_line: req.service_line,
            threshold: req.threshold,
            context_document: req.approval_email,
            reply: req.user_reply,
        })
        .await;

    Ok(respond(outcome))
}

/// POST /process-clarification
///
/// Follow-up call after a `Clarification` resolution: parses the hiring
/// manager's reply into structured fields. Incomplete details come back as a
/// 400 with a fixed message; the field list stays in the logs.
pub async fn process_clarification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClarificationRequest>,
) -> Result<(StatusCode, Json<ApprovalResponse>), AppError> {
    if req.service_line.trim().is_empty() {
        return Err(AppError::InvalidRequest {
            reason: "service_line must not be empty".into(),
        });
    }

    let outcome = state
        .engine
        .evaluate_clarification(
            RequestContext {
                service_line: req.service_line,
                threshold: req.threshold,
                context_document: req.approval_email,
                reply: req.user_reply,
            },
            &req.hiring_manager_reply,
        )
        .await;

    // Incomplete details reject the clarification with a 400; the generic
    // detail is all the caller gets.
    let code = match outcome.status {
        FinalStatus::Approved => StatusCode::OK,
        FinalStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    Ok((code, into_response(outcome)))
}

/// Map a workflow outcome onto the wire: a classification `Error` is a
/// processing failure (500), everything else resolved normally (200).
fn respond(outcome: Outcome) -> (StatusCode, Json<ApprovalResponse>) {
    let code = match outcome.status {
        FinalStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (code, into_response(outcome))
}

fn into_response(outcome: Outcome) -> Json<ApprovalResponse> {
    Json(ApprovalResponse {
        status: outcome.status,
        detail: outcome.detail,
        extracted_data: outcome.extracted,
    })
}
