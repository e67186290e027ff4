//! Error taxonomy for the research pipeline
//!
//! Most failure modes here are recovered inside the pipeline rather than
//! surfaced: extraction failures defer to the fallback processor, per-call
//! fetch failures degrade to empty candidate sets, and ranking failures
//! degrade to an unranked passthrough. Only configuration problems and
//! report-sink I/O bubble out of [`ResearchError`].

use thiserror::Error;

/// Umbrella error for the few genuinely fatal conditions
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasoning-service failure during facet extraction
///
/// Recovered by defaulting to an empty facet set and the general-question
/// intent, which routes the query to the fallback processor.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Reasoning service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("Unparseable extraction output: {reason}")]
    Unparseable { reason: String },
}

/// Reasoning-service failure during the final ranking step
///
/// Recovered by presenting the merged candidates in stable order with no
/// explanations.
#[derive(Error, Debug)]
pub enum RankingError {
    #[error("Reasoning service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("Unparseable ranking output: {reason}")]
    Unparseable { reason: String },

    #[error("Ranking response contained no usable entries")]
    Empty,
}

/// Per-call failure inside the API gateway
///
/// Never crosses the pipeline boundary: the gateway converts each of these
/// into an empty candidate set for the affected call, after retrying the
/// transient classes with backoff.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Rate limited after {attempts} attempts: {url}")]
    RateLimited { url: String, attempts: u32 },

    #[error("Request to {url} failed after {attempts} attempts: {message}")]
    Transport {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Transient failures are worth retrying with backoff; the rest are
    /// terminal for the call.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::RateLimited { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::NotFound { .. } | FetchError::Decode { .. } => false,
        }
    }
}
