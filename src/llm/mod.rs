//! Adapters around the external natural-language model service.
//!
//! [`ChatClient`] is a thin wrapper over the Azure OpenAI chat-completions
//! REST API. The [`classifier`] and [`extractor`] adapters built on top of
//! it own all failure absorption: nothing in this module ever propagates a
//! transport or parse error past the adapter boundary.
//!
//! # Security
//! The API key is read from the environment at startup and lives only inside
//! the client; raw model responses are logged at debug level and never
//! forwarded to end users.

pub mod classifier;
pub mod extractor;

use std::time::Duration;

use serde_json::Value;

use crate::config::AzureOpenAiConfig;

/// Shared handle to the model service. Cheap to clone; read-only after
/// construction, so one instance is safely shared by every in-flight
/// invocation.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    azure: Option<AzureOpenAiConfig>,
}

impl ChatClient {
    /// Build the client once at startup. A missing `azure` config puts the
    /// client in a permanently-failed mode: construction still succeeds and
    /// every call returns an error string for the adapters to absorb.
    pub fn new(azure: Option<AzureOpenAiConfig>, timeout_secs: u64) -> anyhow::Result<Self> {
        if azure.is_none() {
            tracing::warn!("model client starting unconfigured; all model calls will fail closed");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, azure })
    }

    pub fn is_configured(&self) -> bool {
        self.azure.is_some()
    }

    /// POST {endpoint}/openai/deployments/{deployment}/chat/completions
    ///
    /// Sends one system + one user message with temperature 0 and returns the
    /// assistant message content. Errors are strings for the caller to log
    /// and map to its own failed outcome.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, String> {
        let azure = self
            .azure
            .as_ref()
            .ok_or_else(|| "model client not configured".to_string())?;

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            azure.endpoint.trim_end_matches('/'),
            azure.deployment,
            azure.api_version
        );

        let resp = self
            .client
            .post(&url)
            .header("api-key", &azure.api_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user}
                ],
                "temperature": 0
            }))
            .send()
            .await
            .map_err(|e| format!("model request error: {e}"))?;

        let status = resp.status();
        let raw: Value = resp
            .json()
            .await
            .map_err(|e| format!("model json parse error: {e}"))?;

        if !status.is_success() {
            return Err(format!("model HTTP {status}: {raw}"));
        }

        tracing::debug!(response = %raw, "model call succeeded");

        raw.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|a| a.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| "model response missing message content".to_string())
    }
}
