//! API Gateway
//!
//! Issues mapped endpoint calls concurrently under a bounded in-flight
//! count. Output order always matches input order, so callers can zip
//! results back to the facets that produced them. A call that fails for
//! any reason yields an empty candidate set; the batch never aborts.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::client::PokeApiClient;
use super::types::{CandidateSet, PokemonDetail};
use crate::analysis::mapper::EndpointCall;
use crate::config::ApiConfig;

/// The retrieval seam the pipeline depends on
///
/// Implemented by [`ApiGateway`] for real fetches and by in-process mocks
/// in tests.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Issue all calls; one candidate set per call, same order. Failed
    /// calls come back empty, never as errors.
    async fn fetch(&self, calls: &[EndpointCall]) -> Vec<CandidateSet>;

    /// Fetch detail records for candidate enrichment. Names that fail to
    /// resolve are simply absent from the result.
    async fn fetch_details(&self, names: &[String]) -> Vec<PokemonDetail>;
}

/// Concurrent gateway over [`PokeApiClient`]
pub struct ApiGateway {
    client: Arc<PokeApiClient>,
    permits: Arc<Semaphore>,
}

impl ApiGateway {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: Arc::new(PokeApiClient::new(config)?),
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        })
    }
}

#[async_trait]
impl CandidateSource for ApiGateway {
    async fn fetch(&self, calls: &[EndpointCall]) -> Vec<CandidateSet> {
        let tasks = calls.iter().map(|call| {
            let client = Arc::clone(&self.client);
            let permits = Arc::clone(&self.permits);
            let call = call.clone();
            async move {
                let _permit = permits.acquire().await.expect("semaphore closed");
                match client.fetch_candidates(&call).await {
                    Ok(set) => {
                        debug!(call = %call, candidates = set.len(), "endpoint call complete");
                        set
                    }
                    Err(e) => {
                        warn!(call = %call, error = %e, "endpoint call failed, yielding empty set");
                        CandidateSet::new()
                    }
                }
            }
        });

        // join_all preserves input order
        join_all(tasks).await
    }

    async fn fetch_details(&self, names: &[String]) -> Vec<PokemonDetail> {
        let tasks = names.iter().map(|name| {
            let client = Arc::clone(&self.client);
            let permits = Arc::clone(&self.permits);
            let name = name.clone();
            async move {
                let _permit = permits.acquire().await.expect("semaphore closed");
                match client.fetch_pokemon(&name).await {
                    Ok(detail) => Some(detail),
                    Err(e) => {
                        warn!(name = %name, error = %e, "detail fetch failed, candidate stays unenriched");
                        None
                    }
                }
            }
        });

        join_all(tasks).await.into_iter().flatten().collect()
    }
}
