//! Pipeline orchestration
//!
//! Single control flow per query: extract facets, map them to endpoint
//! calls, fetch concurrently, merge, relax through the fallback processor
//! when a stage comes up empty, then rank. Produces the finished
//! [`ResearchReport`] bundle for the report sink.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::analysis::extractor::FacetExtractor;
use crate::analysis::mapper::{EndpointCall, EndpointMapper};
use crate::api::gateway::{ApiGateway, CandidateSource};
use crate::api::types::CandidateSet;
use crate::config::ResearchConfig;
use crate::error::ResearchError;
use crate::fallback::{FallbackOutcome, FallbackProcessor};
use crate::llm::{create_llm_client, LlmClient};
use crate::merge::{merge, FacetResult, MergedCandidates};
use crate::ranking::{RankedResult, Ranker};
use crate::report::{ResearchReport, ResearchStatus};

/// Deep-research agent: the full query pipeline behind one entry point
pub struct ResearchAgent {
    llm: Arc<dyn LlmClient>,
    extractor: FacetExtractor,
    source: Arc<dyn CandidateSource>,
    fallback: FallbackProcessor,
    ranker: Ranker,
    max_ranked_candidates: usize,
}

impl ResearchAgent {
    /// Build with real collaborators from configuration
    pub fn from_config(config: ResearchConfig) -> Result<Self, ResearchError> {
        ResearchAgentBuilder::new(config).build()
    }

    /// Run the pipeline for one query
    pub async fn run(&self, query: &str) -> Result<ResearchReport, ResearchError> {
        let started_at = Utc::now();
        let timer = Instant::now();

        // Phase 1: facet extraction (degrades internally, never fails)
        let extraction = self.extractor.extract(query).await;

        // Phase 2: endpoint mapping (pure)
        let mapped = EndpointMapper::map(extraction.intent, &extraction.facets);

        let mut calls_made: Vec<EndpointCall> = Vec::new();
        let mut fallback_applied = false;

        // Phase 3+4: fetch and merge, with fallback on either empty stage
        let merged = if mapped.is_empty() {
            fallback_applied = true;
            match self.fallback.recover_zero_calls(self.source.as_ref()).await {
                FallbackOutcome::Recovered {
                    merged,
                    extra_calls,
                } => {
                    calls_made.extend(extra_calls);
                    Some(merged)
                }
                FallbackOutcome::NoMatches => None,
            }
        } else {
            let calls: Vec<EndpointCall> = mapped.iter().map(|m| m.call.clone()).collect();
            let sets = self.source.fetch(&calls).await;
            calls_made.extend(calls);

            let results: Vec<FacetResult> = mapped
                .into_iter()
                .zip(sets)
                .map(|(m, candidates)| FacetResult {
                    facet: m.facet,
                    call: m.call,
                    candidates,
                })
                .collect();

            let merged = merge(extraction.intent, &results);
            if merged.is_empty() {
                fallback_applied = true;
                match self
                    .fallback
                    .recover_zero_candidates(extraction.intent, &results, self.source.as_ref())
                    .await
                {
                    FallbackOutcome::Recovered {
                        merged,
                        extra_calls,
                    } => {
                        calls_made.extend(extra_calls);
                        Some(merged)
                    }
                    FallbackOutcome::NoMatches => None,
                }
            } else {
                Some(merged)
            }
        };

        let Some(merged) = merged else {
            info!(query, "research finished without matches");
            return Ok(ResearchReport {
                query: query.to_string(),
                intent: extraction.intent,
                facets: extraction.facets,
                calls_made,
                merged: MergedCandidates::from_population(CandidateSet::new()),
                ranked: RankedResult::default(),
                status: ResearchStatus::NoMatches,
                fallback_applied,
                started_at,
                duration_ms: timer.elapsed().as_millis() as u64,
            });
        };

        // Phase 5: enrich the shortlist so ranking sees real attributes
        let shortlist: Vec<String> = merged
            .candidates
            .sorted_names()
            .into_iter()
            .take(self.max_ranked_candidates)
            .collect();
        let details = self.source.fetch_details(&shortlist).await;

        // Phase 6: rank, degrading to a stable passthrough on failure
        let (ranked, status) = match self.ranker.rank(query, &merged, &details).await {
            Ok(ranked) => (ranked, ResearchStatus::Ranked),
            Err(e) => {
                warn!(error = %e, "ranking failed, presenting unranked candidates");
                (
                    self.ranker.unranked_passthrough(&merged),
                    ResearchStatus::Unranked,
                )
            }
        };

        info!(
            query,
            intent = %extraction.intent,
            candidates = merged.len(),
            ranked = ranked.len(),
            status = %status,
            "research complete"
        );

        Ok(ResearchReport {
            query: query.to_string(),
            intent: extraction.intent,
            facets: extraction.facets,
            calls_made,
            merged,
            ranked,
            status,
            fallback_applied,
            started_at,
            duration_ms: timer.elapsed().as_millis() as u64,
        })
    }

    /// Plain one-shot answer from the reasoning service, with no research
    /// behind it. Used for side-by-side comparison against the pipeline.
    pub async fn simple_answer(&self, query: &str) -> anyhow::Result<String> {
        self.llm
            .chat(
                "You are a Pokemon expert. Answer the user's question about Pokemon using your own knowledge.",
                query,
            )
            .await
    }
}

/// Builder for [`ResearchAgent`]
///
/// Collaborators default to the real LLM client and API gateway; tests
/// inject scripted implementations instead.
pub struct ResearchAgentBuilder {
    config: ResearchConfig,
    llm: Option<Arc<dyn LlmClient>>,
    source: Option<Arc<dyn CandidateSource>>,
}

impl ResearchAgentBuilder {
    pub fn new(config: ResearchConfig) -> Self {
        Self {
            config,
            llm: None,
            source: None,
        }
    }

    /// Use a specific LLM client
    pub fn llm_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(client);
        self
    }

    /// Use a specific candidate source
    pub fn candidate_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<ResearchAgent, ResearchError> {
        let llm = match self.llm {
            Some(client) => client,
            None => create_llm_client(&self.config.llm)
                .map_err(|e| ResearchError::Config(e.to_string()))?,
        };

        let source: Arc<dyn CandidateSource> = match self.source {
            Some(source) => source,
            None => Arc::new(
                ApiGateway::new(&self.config.api)
                    .map_err(|e| ResearchError::Config(e.to_string()))?,
            ),
        };

        Ok(ResearchAgent {
            extractor: FacetExtractor::new(Arc::clone(&llm)),
            ranker: Ranker::new(Arc::clone(&llm), self.config.max_ranked_candidates),
            fallback: FallbackProcessor::new(
                self.config.max_relaxation_depth,
                self.config.fallback_population_limit,
            ),
            source,
            llm,
            max_ranked_candidates: self.config.max_ranked_candidates,
        })
    }
}
