//! Hiring manager detail extraction adapter.
//!
//! One model call asks for the three required fields in a fixed line layout;
//! everything after that is local, deterministic validation. A failed call
//! and a malformed answer look the same to the orchestrator: an incomplete
//! extraction naming the fields that did not validate.

use async_trait::async_trait;

use crate::llm::ChatClient;
use crate::models::approval::{Extraction, ManagerDetails, ServiceLineChange};

pub const FIELD_FULL_NAME: &str = "full_name";
pub const FIELD_YEARS_OF_EXPERIENCE: &str = "years_of_experience";
pub const FIELD_SERVICE_LINE_CHANGE: &str = "service_line_change";

const SYSTEM_PROMPT: &str = "You extract hiring manager details from an email \
reply. Respond with exactly three lines and nothing else, in this layout:\n\
Name: <full name>\n\
Years of Experience: <number>\n\
SL to SL change: <from service line> to <to service line>\n\
If a detail is not present in the reply, leave that line's value empty.";

/// Seam for the orchestrator's clarification sub-flow.
#[async_trait]
pub trait DetailExtractor: Send + Sync {
    async fn extract(&self, free_text: &str) -> Extraction;
}

pub struct LlmDetailExtractor {
    chat: ChatClient,
}

impl LlmDetailExtractor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl DetailExtractor for LlmDetailExtractor {
    async fn extract(&self, free_text: &str) -> Extraction {
        if free_text.trim().is_empty() {
            return all_missing();
        }

        let user = format!("Here is the hiring manager's reply:\n\n{free_text}");

        match self.chat.complete(SYSTEM_PROMPT, &user).await {
            Ok(raw) => parse_details(&raw),
            Err(e) => {
                tracing::warn!("detail extraction failed: {e}");
                all_missing()
            }
        }
    }
}

fn all_missing() -> Extraction {
    Extraction::Incomplete {
        missing: vec![
            FIELD_FULL_NAME,
            FIELD_YEARS_OF_EXPERIENCE,
            FIELD_SERVICE_LINE_CHANGE,
        ],
    }
}

/// Parse the fixed three-line layout. Every required field must be present
/// and individually valid: name non-empty, years a non-negative integer,
/// both halves of the change pair non-empty. Pure local validation; never
/// makes a second model call.
pub(crate) fn parse_details(text: &str) -> Extraction {
    let mut full_name: Option<String> = None;
    let mut years: Option<u32> = None;
    let mut change: Option<ServiceLineChange> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = strip_prefix_ci(line, "name:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                full_name = Some(rest.to_string());
            }
        } else if let Some(rest) = strip_prefix_ci(line, "years of experience:") {
            years = rest.trim().parse::<u32>().ok();
        } else if let Some(rest) = strip_prefix_ci(line, "sl to sl change:") {
            change = parse_change(rest);
        }
    }

    let mut missing = Vec::new();
    if full_name.is_none() {
        missing.push(FIELD_FULL_NAME);
    }
    if years.is_none() {
        missing.push(FIELD_YEARS_OF_EXPERIENCE);
    }
    if change.is_none() {
        missing.push(FIELD_SERVICE_LINE_CHANGE);
    }
    if !missing.is_empty() {
        return Extraction::Incomplete { missing };
    }

    Extraction::Complete(ManagerDetails {
        full_name: full_name.unwrap(),
        years_of_experience: years.unwrap(),
        service_line_change: change.unwrap(),
    })
}

/// Case-insensitive prefix strip. ASCII prefixes only, so the byte-length
/// slice is always on a char boundary for matching input.
fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

fn parse_change(rest: &str) -> Option<ServiceLineChange> {
    let (from, to) = rest.trim().split_once(" to ")?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some(ServiceLineChange {
        from: from.to_string(),
        to: to.to_string(),
    })
}
