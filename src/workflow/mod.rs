//! The approval decision orchestrator.
//!
//! A deterministic forward pass over one request: threshold gate → reply
//! presence gate → classification → status resolution, with a separate
//! clarification pass for the follow-up call. No state survives between
//! invocations; the clarification sub-flow is reached by a *new* invocation
//! carrying the original context plus the hiring manager's reply.
//!
//! Adapter failures never surface here as errors: the classifier absorbs
//! them into [`ReplyLabel::Failed`] and the extractor into an incomplete
//! extraction, both of which the resolution table maps to a terminal status.

use std::sync::Arc;

use crate::llm::classifier::ReplyClassifier;
use crate::llm::extractor::DetailExtractor;
use crate::models::approval::{
    Extraction, FinalStatus, ManagerDetails, ReplyLabel, RequestContext,
};

/// Where a pass currently is. Transitions only move forward; there is no
/// path back to `Classifying`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Classifying,
    Resolved,
    AwaitingClarification,
    Extracting,
    Terminal,
}

impl Phase {
    /// Legal forward transitions of the machine.
    pub fn can_follow(self, prev: Phase) -> bool {
        use Phase::*;
        matches!(
            (prev, self),
            (Start, Classifying)
                | (Start, Resolved)      // threshold or missing-reply gate
                | (Start, Extracting)    // clarification pass
                | (Classifying, Resolved)
                | (Resolved, AwaitingClarification)
                | (Resolved, Terminal)
                | (AwaitingClarification, Extracting)
                | (Extracting, Terminal)
        )
    }
}

/// Working record for one invocation. Each step sets exactly the field it
/// owns; nothing is ever reverted.
#[derive(Debug)]
pub struct WorkflowState {
    pub context: RequestContext,
    pub classification: Option<ReplyLabel>,
    pub final_status: Option<FinalStatus>,
    pub extracted: Option<ManagerDetails>,
    phase: Phase,
}

impl WorkflowState {
    fn new(context: RequestContext) -> Self {
        Self {
            context,
            classification: None,
            final_status: None,
            extracted: None,
            phase: Phase::Start,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            next.can_follow(self.phase),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }

    fn record_classification(&mut self, label: ReplyLabel) {
        debug_assert!(self.classification.is_none(), "classification set twice");
        self.classification = Some(label);
    }

    fn resolve(&mut self, status: FinalStatus) {
        debug_assert!(self.final_status.is_none(), "final status set twice");
        self.final_status = Some(status);
    }
}

/// What the boundary reads back: the terminal status, a short human-readable
/// detail string, and (on a completed clarification) the extracted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: FinalStatus,
    pub detail: String,
    pub extracted: Option<ManagerDetails>,
}

impl Outcome {
    fn new(status: FinalStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            extracted: None,
        }
    }
}

/// Total mapping from classification label to terminal status. No default
/// arm: adding a label forces a decision here.
pub fn resolve_status(label: ReplyLabel) -> FinalStatus {
    match label {
        ReplyLabel::Approved => FinalStatus::Approved,
        ReplyLabel::Rejected => FinalStatus::Rejected,
        ReplyLabel::NeedsClarification => FinalStatus::Clarification,
        ReplyLabel::Failed => FinalStatus::Error,
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    classifier: Arc<dyn ReplyClassifier>,
    extractor: Arc<dyn DetailExtractor>,
}

impl Orchestrator {
    pub fn new(classifier: Arc<dyn ReplyClassifier>, extractor: Arc<dyn DetailExtractor>) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    /// Initial submission pass.
    pub async fn evaluate(&self, context: RequestContext) -> Outcome {
        let mut state = WorkflowState::new(context);

        // Threshold gate: pure, synchronous, no adapter call.
        if state.context.threshold <= 30 {
            state.advance(Phase::Resolved);
            state.resolve(FinalStatus::AutoApproved);
            state.advance(Phase::Terminal);
            tracing::info!(
                service_line = %state.context.service_line,
                threshold = state.context.threshold,
                "auto-approved below threshold"
            );
            return Outcome::new(FinalStatus::AutoApproved, "Threshold was not exceeded.");
        }

        // Reply presence gate: a missing reply is a non-approval, not an
        // error. The structurally-broken variant (no approval email was
        // ever generated) is rejected at the boundary before we get here.
        if state.context.reply.trim().is_empty() {
            state.advance(Phase::Resolved);
            state.resolve(FinalStatus::Rejected);
            state.advance(Phase::Terminal);
            tracing::info!(
                service_line = %state.context.service_line,
                "rejected: no reply above threshold"
            );
            return Outcome::new(FinalStatus::Rejected, "No reply was provided.");
        }

        state.advance(Phase::Classifying);
        let label = self
            .classifier
            .classify(&state.context.context_document, &state.context.reply)
            .await;
        state.record_classification(label);

        state.advance(Phase::Resolved);
        let status = resolve_status(label);
        state.resolve(status);

        let detail = match label {
            ReplyLabel::Approved => "Reply classified as approval.",
            ReplyLabel::Rejected => "Reply classified as rejection.",
            ReplyLabel::NeedsClarification => "Clarification required from hiring manager.",
            ReplyLabel::Failed => "Processing error in the approval workflow.",
        };
        let outcome = Outcome::new(status, detail);

        if status == FinalStatus::Clarification {
            // Suspension point: the follow-up arrives as a new invocation.
            state.advance(Phase::AwaitingClarification);
        } else {
            state.advance(Phase::Terminal);
        }

        tracing::info!(
            service_line = %state.context.service_line,
            ?label,
            ?status,
            "reply classified"
        );
        outcome
    }

    /// Clarification pass: a fresh invocation carrying the original context
    /// plus the hiring manager's free-text reply.
    pub async fn evaluate_clarification(
        &self,
        context: RequestContext,
        manager_reply: &str,
    ) -> Outcome {
        let mut state = WorkflowState::new(context);
        state.advance(Phase::Extracting);

        match self.extractor.extract(manager_reply).await {
            Extraction::Complete(details) => {
                state.resolve(FinalStatus::Approved);
                state.extracted = Some(details.clone());
                state.advance(Phase::Terminal);
                tracing::info!(
                    service_line = %state.context.service_line,
                    "hiring manager details extracted"
                );
                Outcome {
                    status: FinalStatus::Approved,
                    detail: "Hiring manager details extracted and approved.".into(),
                    extracted: Some(details),
                }
            }
            Extraction::Incomplete { missing } => {
                // Diagnostic only: the caller gets the generic message, the
                // field list stays in the logs.
                tracing::warn!(
                    service_line = %state.context.service_line,
                    ?missing,
                    "hiring manager details incomplete"
                );
                state.resolve(FinalStatus::Rejected);
                state.advance(Phase::Terminal);
                Outcome::new(
                    FinalStatus::Rejected,
                    "Missing or invalid hiring manager details.",
                )
            }
        }
    }
}
