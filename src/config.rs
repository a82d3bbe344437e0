use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Azure OpenAI settings. `None` when any required variable is missing:
    /// the service still starts, but every model call fails closed.
    pub azure: Option<AzureOpenAiConfig>,
    /// Wall-clock budget in seconds for a single model call.
    /// Set via APPROVAL_LLM_TIMEOUT_SECS. Default: 30.
    pub llm_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let azure = match (
        std::env::var("AZURE_OPENAI_ENDPOINT"),
        std::env::var("AZURE_OPENAI_API_KEY"),
        std::env::var("AZURE_OPENAI_CHAT_DEPLOYMENT_NAME"),
        std::env::var("AZURE_OPENAI_API_VERSION"),
    ) {
        (Ok(endpoint), Ok(api_key), Ok(deployment), Ok(api_version)) => Some(AzureOpenAiConfig {
            endpoint,
            api_key,
            deployment,
            api_version,
        }),
        _ => {
            eprintln!(
                "⚠️  Azure OpenAI is not fully configured (AZURE_OPENAI_ENDPOINT, \
                 AZURE_OPENAI_API_KEY, AZURE_OPENAI_CHAT_DEPLOYMENT_NAME, \
                 AZURE_OPENAI_API_VERSION). Classification and extraction will fail closed."
            );
            None
        }
    };

    Ok(Config {
        port: std::env::var("APPROVAL_PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .unwrap_or(8000),
        azure,
        llm_timeout_secs: std::env::var("APPROVAL_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
    })
}
