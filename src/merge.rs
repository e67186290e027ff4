//! Candidate merger
//!
//! Set algebra over per-facet candidate sets. Include sets are combined
//! with the intent's rule (intersection or union), then the union of all
//! exclude sets is subtracted. An empty include list combines to the empty
//! set, never to "everything".

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::intent::{CombinationRule, Facet, Intent};
use crate::analysis::mapper::EndpointCall;
use crate::api::types::CandidateSet;

/// One fetched candidate set, still attached to its source facet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetResult {
    pub facet: Facet,
    pub call: EndpointCall,
    pub candidates: CandidateSet,
}

/// Result of combining all facet results for a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedCandidates {
    pub candidates: CandidateSet,
    pub rule: CombinationRule,
    /// Include-flagged facets that contributed sets
    pub included: Vec<Facet>,
    /// Exclude-flagged facets whose union was subtracted
    pub excluded: Vec<Facet>,
}

impl MergedCandidates {
    /// A merged result built directly from a broad population set, used by
    /// the fallback path where no facets exist.
    pub fn from_population(candidates: CandidateSet) -> Self {
        Self {
            candidates,
            rule: CombinationRule::Union,
            included: Vec::new(),
            excluded: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Merge facet results using the rule bound to the intent
pub fn merge(intent: Intent, results: &[FacetResult]) -> MergedCandidates {
    merge_with_rule(intent.combination_rule(), results)
}

/// Merge facet results under an explicit rule
///
/// The fallback processor uses this to re-merge already-fetched sets with
/// union semantics after an intersection came up empty.
pub fn merge_with_rule(rule: CombinationRule, results: &[FacetResult]) -> MergedCandidates {
    let (include, exclude): (Vec<&FacetResult>, Vec<&FacetResult>) =
        results.iter().partition(|r| !r.facet.exclude);

    let combined = match rule {
        CombinationRule::Intersection => include
            .iter()
            .map(|r| &r.candidates)
            .cloned()
            .reduce(|acc, set| acc.intersection(&set))
            .unwrap_or_default(),
        CombinationRule::Union => include
            .iter()
            .fold(CandidateSet::new(), |acc, r| acc.union(&r.candidates)),
    };

    let excluded_union = exclude
        .iter()
        .fold(CandidateSet::new(), |acc, r| acc.union(&r.candidates));

    let candidates = combined.difference(&excluded_union);

    debug!(
        rule = ?rule,
        include_sets = include.len(),
        exclude_sets = exclude.len(),
        combined = combined.len(),
        subtracted = excluded_union.len(),
        merged = candidates.len(),
        "merged candidate sets"
    );

    MergedCandidates {
        candidates,
        rule,
        included: include.iter().map(|r| r.facet.clone()).collect(),
        excluded: exclude.iter().map(|r| r.facet.clone()).collect(),
    }
}
