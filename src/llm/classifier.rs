//! Reply classification adapter.
//!
//! Maps a reviewer's free-text reply (together with the approval email it
//! answers) to a [`ReplyLabel`]. The model is constrained to answer with a
//! single token; anything it returns that is not an exact known token is
//! treated as a rejection, never as an approval.

use async_trait::async_trait;

use crate::llm::ChatClient;
use crate::models::approval::ReplyLabel;

const SYSTEM_PROMPT: &str = "You are an assistant that analyzes email replies to \
approval requests. You are given the approval email that was sent and the reply \
that came back. Respond with only the single word 'approve' if the reply clearly \
approves the request, 'reject' if it rejects the request, and 'clarify' if it asks \
a question or needs more information before a decision can be made.";

/// Seam for the orchestrator: production uses [`LlmReplyClassifier`], tests
/// substitute counting doubles.
#[async_trait]
pub trait ReplyClassifier: Send + Sync {
    async fn classify(&self, context_document: &str, reply: &str) -> ReplyLabel;
}

pub struct LlmReplyClassifier {
    chat: ChatClient,
}

impl LlmReplyClassifier {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ReplyClassifier for LlmReplyClassifier {
    async fn classify(&self, context_document: &str, reply: &str) -> ReplyLabel {
        // Determinable without a model call, and empty input makes the model
        // behave unpredictably anyway.
        if reply.trim().is_empty() {
            return ReplyLabel::Rejected;
        }

        let user = format!(
            "Here is the approval email that was sent:\n\n{context_document}\n\n\
             Here is the reply:\n\n{reply}"
        );

        match self.chat.complete(SYSTEM_PROMPT, &user).await {
            Ok(raw) => normalize_label(&raw),
            Err(e) => {
                tracing::warn!("reply classification failed: {e}");
                ReplyLabel::Failed
            }
        }
    }
}

/// Normalize the model's answer to a label. Case-insensitive on the trimmed
/// token; any unrecognized answer (commentary, empty, garbage) maps to the
/// fail-safe negative, `Rejected`.
pub(crate) fn normalize_label(raw: &str) -> ReplyLabel {
    match raw.trim().to_lowercase().as_str() {
        "approve" => ReplyLabel::Approved,
        "clarify" => ReplyLabel::NeedsClarification,
        _ => ReplyLabel::Rejected,
    }
}
