//! Reasoning-service boundary
//!
//! Unified client interface over the supported LLM providers. The rest of
//! the pipeline only sees `Arc<dyn LlmClient>`, which keeps the extraction
//! and ranking components testable with scripted clients.

pub mod anthropic;
pub mod client;
pub mod factory;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use client::{strip_code_fences, LlmClient};
pub use factory::{create_llm_client, AgentBackend};
pub use openai::OpenAiClient;
