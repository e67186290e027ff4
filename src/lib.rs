//! Deep-research agent for natural-language Pokemon questions
//!
//! Classifies a free-text query into an intent plus a set of facets,
//! maps the facets onto PokeAPI resource families, fetches the matching
//! candidate sets concurrently, merges them with intent-dependent set
//! algebra (intersection or union, minus exclusions), and hands the
//! survivors to an LLM for ranking and explanation.
//!
//! ## Architecture
//!
//! ```text
//! Query → FacetExtractor → EndpointMapper → ApiGateway (parallel fetch)
//!       → merge (+ FallbackProcessor when empty) → Ranker → ResearchReport
//! ```
//!
//! ## Backend Selection
//!
//! Set `AGENT_BACKEND` environment variable:
//! - `anthropic` (default): Anthropic Claude API
//! - `openai`: OpenAI API

// Core error handling
pub mod error;

// Explicit configuration passed into each component at construction
pub mod config;

// LLM client abstraction (reasoning-service boundary)
pub mod llm;

// Query analysis: facet extraction and endpoint mapping
pub mod analysis;

// PokeAPI access: rate-limited client and concurrent gateway
pub mod api;

// Candidate-set algebra
pub mod merge;

// Relaxation strategies for queries that yield nothing
pub mod fallback;

// LLM-backed ranking and explanation
pub mod ranking;

// Finished result bundle handed to the report sink
pub mod report;

// Pipeline orchestration
pub mod pipeline;

// Re-exports for convenience
pub use analysis::extractor::{Extraction, FacetExtractor};
pub use analysis::intent::{CombinationRule, Facet, FacetAttribute, Intent};
pub use analysis::mapper::{EndpointCall, EndpointMapper, MappedCall, ResourceFamily};
pub use api::gateway::{ApiGateway, CandidateSource};
pub use api::types::CandidateSet;
pub use config::{ApiConfig, LlmConfig, ResearchConfig};
pub use error::{ExtractionError, FetchError, RankingError, ResearchError};
pub use fallback::{FallbackOutcome, FallbackProcessor};
pub use llm::{create_llm_client, AgentBackend, LlmClient};
pub use merge::{merge, merge_with_rule, FacetResult, MergedCandidates};
pub use pipeline::{ResearchAgent, ResearchAgentBuilder};
pub use ranking::{RankedEntry, RankedResult, Ranker};
pub use report::{ResearchReport, ResearchStatus};
