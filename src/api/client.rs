//! PokeAPI client
//!
//! Rate-limited HTTP client for the public PokeAPI. Transient failures and
//! HTTP 429 are retried with exponential backoff up to a fixed attempt
//! count; 404 is terminal for the call. Conversion of failures into empty
//! candidate sets happens one layer up, in the gateway.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::types::{
    AbilityResponse, CandidateSet, PokemonDetail, PokemonIndexResponse, SpeciesDetail,
    SpeciesGroupResponse, TypeResponse,
};
use crate::analysis::mapper::{EndpointCall, ResourceFamily};
use crate::config::ApiConfig;
use crate::error::FetchError;

/// PokeAPI HTTP client
pub struct PokeApiClient {
    http: Client,
    base_url: String,
    retry_attempts: u32,
    rate_limit_delay: Duration,
    last_request: Mutex<Instant>,
}

impl PokeApiClient {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_attempts: config.retry_attempts.max(1),
            rate_limit_delay: config.rate_limit_delay,
            last_request: Mutex::new(Instant::now()),
        })
    }

    /// Enforce minimum spacing between requests
    async fn pace(&self) {
        let elapsed = {
            let last = self.last_request.lock().unwrap();
            last.elapsed()
        };

        if elapsed < self.rate_limit_delay {
            sleep(self.rate_limit_delay - elapsed).await;
        }

        let mut last = self.last_request.lock().unwrap();
        *last = Instant::now();
    }

    /// GET with retry/backoff on transient failures
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.pace().await;

            match self.try_get::<T>(url, attempt).await {
                Ok(value) => {
                    debug!(url, attempt, "API call successful");
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < self.retry_attempts => {
                    let delay = backoff_delay(attempt);
                    warn!(url, attempt, delay_ms = delay.as_millis() as u64, error = %e,
                        "transient API failure, backing off");
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        attempt: u32,
    ) -> Result<T, FetchError> {
        let response =
            self.http
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    attempts: attempt,
                    message: e.to_string(),
                })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
                attempts: attempt,
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json().await.map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Full URL for an endpoint call
    fn call_url(&self, call: &EndpointCall) -> String {
        match call.resource {
            ResourceFamily::PokemonIndex => {
                let limit: u32 = call.parameter.parse().unwrap_or(100);
                format!("{}/pokemon?limit={}", self.base_url, limit)
            }
            _ => format!(
                "{}/{}/{}",
                self.base_url,
                call.resource.path_segment(),
                slug(&call.parameter)
            ),
        }
    }

    /// Issue one endpoint call and reduce the response to a candidate set
    pub async fn fetch_candidates(&self, call: &EndpointCall) -> Result<CandidateSet, FetchError> {
        let url = self.call_url(call);

        let candidates = match call.resource {
            ResourceFamily::Type => {
                let decoded: TypeResponse = self.get_json(&url).await?;
                CandidateSet::from_names(decoded.pokemon.iter().map(|m| m.pokemon.name.as_str()))
            }
            ResourceFamily::Ability => {
                let decoded: AbilityResponse = self.get_json(&url).await?;
                CandidateSet::from_names(decoded.pokemon.iter().map(|m| m.pokemon.name.as_str()))
            }
            ResourceFamily::PokemonColor
            | ResourceFamily::PokemonHabitat
            | ResourceFamily::PokemonShape
            | ResourceFamily::Generation
            | ResourceFamily::EggGroup => {
                let decoded: SpeciesGroupResponse = self.get_json(&url).await?;
                CandidateSet::from_names(decoded.pokemon_species.iter().map(|s| s.name.as_str()))
            }
            ResourceFamily::Pokemon => {
                let decoded: PokemonDetail = self.get_json(&url).await?;
                CandidateSet::from_names([decoded.name.as_str()])
            }
            ResourceFamily::PokemonSpecies => {
                let decoded: SpeciesDetail = self.get_json(&url).await?;
                CandidateSet::from_names([decoded.name.as_str()])
            }
            ResourceFamily::PokemonIndex => {
                let decoded: PokemonIndexResponse = self.get_json(&url).await?;
                CandidateSet::from_names(decoded.results.iter().map(|r| r.name.as_str()))
            }
        };

        Ok(candidates)
    }

    /// Fetch the detail record for one Pokemon
    pub async fn fetch_pokemon(&self, name: &str) -> Result<PokemonDetail, FetchError> {
        let url = format!("{}/pokemon/{}", self.base_url, slug(name));
        self.get_json(&url).await
    }
}

/// Exponential backoff: 500ms, 1s, 2s, ... capped
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(250 * (1u64 << attempt.min(5)))
}

/// Reduce a free-form value to the API's slug form
fn slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}
