use serde::{Deserialize, Serialize};

/// Immutable inputs for one pass through the approval workflow.
///
/// Created per incoming call and owned by that invocation; nothing here
/// outlives the request that carried it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub service_line: String,
    pub threshold: i64,
    /// The approval email that was shown to the reviewer (empty when the
    /// threshold gate made one unnecessary).
    pub context_document: String,
    /// The reviewer's free-text reply. May be empty.
    pub reply: String,
}

/// Outcome of classifying a reviewer's reply.
///
/// Closed set on purpose: status resolution matches on it exhaustively, so a
/// new label can't be added without the compiler pointing at every consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyLabel {
    Approved,
    Rejected,
    NeedsClarification,
    /// The classification call itself failed (unconfigured client, transport
    /// error, timeout). Absorbed into a label instead of propagating.
    Failed,
}

/// Terminal status of an approval request. The only value the boundary
/// treats as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalStatus {
    #[serde(rename = "Auto-Approved")]
    AutoApproved,
    Approved,
    Rejected,
    Clarification,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLineChange {
    pub from: String,
    pub to: String,
}

/// The structured fields parsed out of a hiring manager's clarification
/// reply, once every field has validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerDetails {
    pub full_name: String,
    pub years_of_experience: u32,
    pub service_line_change: ServiceLineChange,
}

/// Result of the extraction adapter. `Incomplete` names every field that was
/// missing or failed validation. The list is for logging only and never goes
/// back to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Complete(ManagerDetails),
    Incomplete { missing: Vec<&'static str> },
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        matches!(self, Extraction::Complete(_))
    }
}
