//! LLM client trait
//!
//! Unified interface for the reasoning-service providers (Anthropic,
//! OpenAI). Responses are treated as untrusted input everywhere: callers
//! run them through strict parsers with documented fallbacks.

use anyhow::Result;
use async_trait::async_trait;

/// Unified LLM client interface
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM with system + user prompts, return raw text response
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Call the LLM expecting JSON response
    /// - For OpenAI: uses response_format json_object mode
    /// - For Anthropic: adds JSON instruction to system prompt
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}

/// Strip ```json ... ``` fences a model may wrap around its output
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();

    let inner = if let Some(rest) = text.strip_prefix("```json") {
        rest
    } else if let Some(rest) = text.strip_prefix("```") {
        rest
    } else {
        return text;
    };

    inner.strip_suffix("```").unwrap_or(inner).trim()
}
