//! Explicit configuration for the research pipeline
//!
//! Every component receives its configuration at construction. Nothing in
//! the library reads environment variables in deep call chains; the
//! `from_env` constructors exist for the CLI entry point only.

use std::time::Duration;

use crate::error::ResearchError;
use crate::llm::AgentBackend;

/// Top-level configuration handed to [`crate::pipeline::ResearchAgentBuilder`]
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub llm: LlmConfig,
    pub api: ApiConfig,
    /// Cap on candidates sent to the ranking step
    pub max_ranked_candidates: usize,
    /// Cap on relaxation steps before a no-matches outcome
    pub max_relaxation_depth: usize,
    /// Page size for the fallback's broad population call
    pub fallback_population_limit: u32,
}

/// Reasoning-service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: AgentBackend,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Model override; each client has its own default
    pub model: Option<String>,
    /// Hard request timeout so a hung reasoning call surfaces as an error
    pub timeout: Duration,
}

/// Data-API (PokeAPI) configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Maximum in-flight endpoint calls
    pub max_in_flight: usize,
    /// Attempts per call before yielding an empty candidate set
    pub retry_attempts: u32,
    /// Minimum spacing between consecutive requests
    pub rate_limit_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            max_in_flight: 5,
            retry_attempts: 3,
            rate_limit_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: AgentBackend::default(),
            anthropic_api_key: None,
            openai_api_key: None,
            model: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            api: ApiConfig::default(),
            max_ranked_candidates: 12,
            max_relaxation_depth: 4,
            fallback_population_limit: 151,
        }
    }
}

impl LlmConfig {
    /// Read provider keys and backend selection from the environment
    pub fn from_env() -> Result<Self, ResearchError> {
        let backend = AgentBackend::from_env().map_err(ResearchError::Config)?;
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        if anthropic_api_key.is_none() && openai_api_key.is_none() {
            return Err(ResearchError::Config(
                "No LLM credentials: set ANTHROPIC_API_KEY or OPENAI_API_KEY".to_string(),
            ));
        }

        Ok(Self {
            backend,
            anthropic_api_key,
            openai_api_key,
            model: std::env::var("AGENT_MODEL").ok(),
            ..Self::default()
        })
    }
}

impl ResearchConfig {
    /// Build a complete configuration from the environment (CLI use only)
    pub fn from_env() -> Result<Self, ResearchError> {
        Ok(Self {
            llm: LlmConfig::from_env()?,
            ..Self::default()
        })
    }
}
