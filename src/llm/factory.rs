//! Backend selection and client factory
//!
//! Picks an LLM provider from explicit configuration. Anthropic wins when
//! both credentials are present and no backend was forced.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use super::anthropic::AnthropicClient;
use super::client::LlmClient;
use super::openai::OpenAiClient;
use crate::config::LlmConfig;

/// LLM backend provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentBackend {
    /// Anthropic Claude (default)
    #[default]
    Anthropic,
    /// OpenAI GPT
    OpenAi,
}

impl AgentBackend {
    /// Create from AGENT_BACKEND environment variable
    ///
    /// Valid values: "anthropic", "claude", "openai", "gpt"
    /// Defaults to Anthropic if not set
    pub fn from_env() -> std::result::Result<Self, String> {
        let value = std::env::var("AGENT_BACKEND").unwrap_or_else(|_| "anthropic".to_string());
        value.parse()
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            AgentBackend::Anthropic => "Anthropic",
            AgentBackend::OpenAi => "OpenAI",
        }
    }
}

impl FromStr for AgentBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(AgentBackend::Anthropic),
            "openai" | "gpt" => Ok(AgentBackend::OpenAi),
            other => Err(format!(
                "Unknown AGENT_BACKEND '{}'. Valid values: anthropic, claude, openai, gpt",
                other
            )),
        }
    }
}

impl std::fmt::Display for AgentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build the configured LLM client
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match config.backend {
        AgentBackend::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| anyhow!("Anthropic backend selected but ANTHROPIC_API_KEY missing"))?;
            Arc::new(AnthropicClient::new(
                api_key,
                config.model.as_deref(),
                config.timeout,
            )?)
        }
        AgentBackend::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow!("OpenAI backend selected but OPENAI_API_KEY missing"))?;
            Arc::new(OpenAiClient::new(
                api_key,
                config.model.as_deref(),
                config.timeout,
            )?)
        }
    };

    info!(
        provider = client.provider_name(),
        model = client.model_name(),
        "reasoning-service client ready"
    );
    Ok(client)
}
