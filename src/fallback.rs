//! Fallback processor
//!
//! Progressive relaxation for queries that yield nothing: no usable
//! facets, or facets whose merge came up empty. Relaxation never errors —
//! exhausting every rung produces a terminal no-matches outcome.

use tracing::{debug, info};

use crate::analysis::intent::{CombinationRule, Intent};
use crate::analysis::mapper::{EndpointCall, ResourceFamily};
use crate::api::gateway::CandidateSource;
use crate::api::types::CandidateSet;
use crate::merge::{merge_with_rule, FacetResult, MergedCandidates};

/// Outcome of a relaxation attempt
#[derive(Debug, Clone)]
pub enum FallbackOutcome {
    /// Relaxation produced a non-empty candidate set
    Recovered {
        merged: MergedCandidates,
        /// Calls the fallback issued beyond the original mapped set
        extra_calls: Vec<EndpointCall>,
    },
    /// Every rung exhausted; terminal, not an error
    NoMatches,
}

/// Relaxation strategy driver
///
/// The ladder for intersection-style intents, in order:
/// 1. drop the least-specific facet and re-merge under the strict rule,
///    repeating while include facets remain
/// 2. re-merge the full original sets with union semantics
/// 3. a single broad population call
///
/// Union-style intents skip straight to rung 3: their merge was already
/// maximal, so an empty result means every fetched set was empty.
///
/// Each rung costs one unit of relaxation depth; no rung refetches the
/// original facet sets.
pub struct FallbackProcessor {
    max_depth: usize,
    population_limit: u32,
}

impl FallbackProcessor {
    pub fn new(max_depth: usize, population_limit: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
            population_limit,
        }
    }

    /// The broad category call used when nothing facet-driven is available
    pub fn broad_call(&self) -> EndpointCall {
        EndpointCall::new(
            ResourceFamily::PokemonIndex,
            self.population_limit.to_string(),
        )
    }

    /// Case (a): extraction produced zero usable facets, so the mapper had
    /// zero calls. Supplies the broad call set directly — merging is never
    /// attempted on zero calls.
    pub async fn recover_zero_calls(&self, source: &dyn CandidateSource) -> FallbackOutcome {
        info!("no endpoint calls mapped, falling back to broad population");
        self.broad_population(source, &[]).await
    }

    /// Case (b): the facet-driven merge produced zero candidates.
    pub async fn recover_zero_candidates(
        &self,
        intent: Intent,
        results: &[FacetResult],
        source: &dyn CandidateSource,
    ) -> FallbackOutcome {
        let mut depth = 0;

        if intent.combination_rule() == CombinationRule::Intersection {
            // Rung 1: fewer constraints, same strict rule. Dropping facets
            // can only grow an intersection.
            let mut working: Vec<FacetResult> = results.to_vec();
            while depth < self.max_depth {
                let include_count = working.iter().filter(|r| !r.facet.exclude).count();
                if include_count <= 1 {
                    break;
                }

                let Some(least) = working
                    .iter()
                    .filter(|r| !r.facet.exclude)
                    .min_by_key(|r| r.facet.attribute.specificity())
                    .map(|r| r.facet.clone())
                else {
                    break;
                };

                working.retain(|r| r.facet != least);
                depth += 1;

                let merged = merge_with_rule(CombinationRule::Intersection, &working);
                debug!(depth, dropped = %least, candidates = merged.len(), "facet drop retry");
                if !merged.is_empty() {
                    info!(depth, dropped = %least, "recovered by dropping facet");
                    return FallbackOutcome::Recovered {
                        merged,
                        extra_calls: Vec::new(),
                    };
                }
            }

            // Rung 2: union over the full original sets.
            if depth < self.max_depth {
                depth += 1;
                let merged = merge_with_rule(CombinationRule::Union, results);
                debug!(depth, candidates = merged.len(), "union retry");
                if !merged.is_empty() {
                    info!(depth, "recovered by switching intersection to union");
                    return FallbackOutcome::Recovered {
                        merged,
                        extra_calls: Vec::new(),
                    };
                }
            }
        }

        // Rung 3: broad population, still honoring exclusions.
        if depth < self.max_depth {
            return self.broad_population(source, results).await;
        }

        info!(depth, "relaxation depth exhausted, no matches");
        FallbackOutcome::NoMatches
    }

    async fn broad_population(
        &self,
        source: &dyn CandidateSource,
        prior_results: &[FacetResult],
    ) -> FallbackOutcome {
        let call = self.broad_call();
        let sets = source.fetch(std::slice::from_ref(&call)).await;
        let population = sets.into_iter().next().unwrap_or_default();

        // Exclusions from the original query still apply to the broad set
        let excluded_union = prior_results
            .iter()
            .filter(|r| r.facet.exclude)
            .fold(CandidateSet::new(), |acc, r| acc.union(&r.candidates));
        let candidates = population.difference(&excluded_union);

        if candidates.is_empty() {
            info!("broad population call produced nothing, no matches");
            return FallbackOutcome::NoMatches;
        }

        info!(
            candidates = candidates.len(),
            "recovered via broad population call"
        );
        let mut merged = MergedCandidates::from_population(candidates);
        merged.excluded = prior_results
            .iter()
            .filter(|r| r.facet.exclude)
            .map(|r| r.facet.clone())
            .collect();

        FallbackOutcome::Recovered {
            merged,
            extra_calls: vec![call],
        }
    }
}
