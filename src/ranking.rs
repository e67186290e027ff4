//! Ranking and explanation
//!
//! Hands the merged candidates (with enriched attributes where available)
//! plus the original query to the reasoning service, and parses its
//! structured answer into an ordered, explained list. On any failure the
//! pipeline downgrades to an unranked passthrough instead of failing the
//! query.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::types::PokemonDetail;
use crate::error::RankingError;
use crate::llm::{strip_code_fences, LlmClient};
use crate::merge::MergedCandidates;

/// One ranked candidate with its explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub identifier: String,
    pub explanation: String,
}

/// Ordered ranking; insertion order is the presentation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    pub entries: Vec<RankedEntry>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// LLM-backed ranker
pub struct Ranker {
    client: Arc<dyn LlmClient>,
    max_candidates: usize,
}

/// Wire shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct RankingWire {
    ranking: Vec<RankingEntryWire>,
}

#[derive(Debug, Deserialize)]
struct RankingEntryWire {
    #[serde(alias = "name")]
    identifier: String,
    #[serde(default)]
    explanation: String,
}

impl Ranker {
    pub fn new(client: Arc<dyn LlmClient>, max_candidates: usize) -> Self {
        Self {
            client,
            max_candidates: max_candidates.max(1),
        }
    }

    /// Rank the merged candidates against the original query
    pub async fn rank(
        &self,
        query: &str,
        merged: &MergedCandidates,
        details: &[PokemonDetail],
    ) -> Result<RankedResult, RankingError> {
        let shortlist = self.shortlist(merged);
        let user_prompt = build_user_prompt(query, &shortlist, details);

        let response = self
            .client
            .chat_json(RANKING_SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(|e| RankingError::ServiceUnreachable(e.to_string()))?;

        let ranked = parse_ranking(&response, &shortlist)?;
        info!(entries = ranked.len(), "candidates ranked");
        Ok(ranked)
    }

    /// Stable-order passthrough used when ranking fails
    pub fn unranked_passthrough(&self, merged: &MergedCandidates) -> RankedResult {
        RankedResult {
            entries: self
                .shortlist(merged)
                .into_iter()
                .map(|identifier| RankedEntry {
                    identifier,
                    explanation: String::new(),
                })
                .collect(),
        }
    }

    /// Bounded, deterministically ordered slice of the merged set
    fn shortlist(&self, merged: &MergedCandidates) -> Vec<String> {
        merged
            .candidates
            .sorted_names()
            .into_iter()
            .take(self.max_candidates)
            .collect()
    }
}

const RANKING_SYSTEM_PROMPT: &str = r#"You are a Pokemon research assistant. You receive a user's question and a list of candidate Pokemon that survived data-driven filtering. Rank the candidates by how well each answers the question, best first, and explain each choice in one sentence.

Only rank Pokemon from the candidate list. Return JSON only, in exactly this shape:
{
  "ranking": [
    {"identifier": "<candidate name>", "explanation": "<one sentence>"}
  ]
}"#;

fn build_user_prompt(query: &str, shortlist: &[String], details: &[PokemonDetail]) -> String {
    let mut prompt = format!("Question: {}\n\nCandidates:\n", query);

    for name in shortlist {
        match details.iter().find(|d| &d.name == name) {
            Some(detail) => {
                prompt.push_str(&format!(
                    "- {} (types: {}; base stat total: {})\n",
                    detail.name,
                    detail.type_names().join("/"),
                    detail.base_stat_total()
                ));
            }
            None => prompt.push_str(&format!("- {}\n", name)),
        }
    }

    prompt.push_str("\nRank these candidates for the question above.\n");
    prompt
}

/// Parse the model's ranking, keeping only known candidates and the first
/// occurrence of each identifier
fn parse_ranking(response: &str, shortlist: &[String]) -> Result<RankedResult, RankingError> {
    let clean = strip_code_fences(response);

    let wire: RankingWire =
        serde_json::from_str(clean).map_err(|e| RankingError::Unparseable {
            reason: e.to_string(),
        })?;

    let known: BTreeSet<&str> = shortlist.iter().map(|s| s.as_str()).collect();
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();

    for entry in wire.ranking {
        let identifier = entry.identifier.trim().to_lowercase();
        if !known.contains(identifier.as_str()) {
            warn!(identifier = %identifier, "ranking entry outside candidate list, dropping");
            continue;
        }
        if !seen.insert(identifier.clone()) {
            continue;
        }
        entries.push(RankedEntry {
            identifier,
            explanation: entry.explanation.trim().to_string(),
        });
    }

    if entries.is_empty() {
        return Err(RankingError::Empty);
    }

    Ok(RankedResult { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::intent::CombinationRule;
    use crate::api::types::CandidateSet;

    fn merged(names: &[&str]) -> MergedCandidates {
        MergedCandidates {
            candidates: CandidateSet::from_names(names.iter().copied()),
            rule: CombinationRule::Union,
            included: Vec::new(),
            excluded: Vec::new(),
        }
    }

    #[test]
    fn test_parse_ranking_preserves_order() {
        let shortlist = vec!["dragonite".to_string(), "pikachu".to_string()];
        let response = r#"{
            "ranking": [
                {"identifier": "pikachu", "explanation": "Iconic electric type."},
                {"identifier": "dragonite", "explanation": "Strong pseudo-legendary."}
            ]
        }"#;

        let ranked = parse_ranking(response, &shortlist).unwrap();
        assert_eq!(ranked.entries[0].identifier, "pikachu");
        assert_eq!(ranked.entries[1].identifier, "dragonite");
    }

    #[test]
    fn test_parse_ranking_drops_unknown_and_duplicates() {
        let shortlist = vec!["pikachu".to_string()];
        let response = r#"{
            "ranking": [
                {"identifier": "mewtwo", "explanation": "not a candidate"},
                {"identifier": "Pikachu", "explanation": "first"},
                {"identifier": "pikachu", "explanation": "again"}
            ]
        }"#;

        let ranked = parse_ranking(response, &shortlist).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked.entries[0].explanation, "first");
    }

    #[test]
    fn test_parse_ranking_accepts_name_alias() {
        let shortlist = vec!["eevee".to_string()];
        let response = r#"{"ranking": [{"name": "eevee", "explanation": "flexible"}]}"#;

        let ranked = parse_ranking(response, &shortlist).unwrap();
        assert_eq!(ranked.entries[0].identifier, "eevee");
    }

    #[test]
    fn test_parse_ranking_all_unknown_is_empty_error() {
        let shortlist = vec!["eevee".to_string()];
        let response = r#"{"ranking": [{"identifier": "mew", "explanation": ""}]}"#;

        assert!(matches!(
            parse_ranking(response, &shortlist),
            Err(RankingError::Empty)
        ));
    }

    #[test]
    fn test_parse_ranking_garbage_is_unparseable() {
        assert!(matches!(
            parse_ranking("top pick: pikachu!", &["pikachu".to_string()]),
            Err(RankingError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_passthrough_is_stable_and_bounded() {
        struct NoopClient;
        #[async_trait::async_trait]
        impl LlmClient for NoopClient {
            async fn chat(&self, _s: &str, _u: &str) -> anyhow::Result<String> {
                unreachable!()
            }
            async fn chat_json(&self, _s: &str, _u: &str) -> anyhow::Result<String> {
                unreachable!()
            }
            fn model_name(&self) -> &str {
                "noop"
            }
            fn provider_name(&self) -> &str {
                "noop"
            }
        }

        let ranker = Ranker::new(Arc::new(NoopClient), 2);
        let result = ranker.unranked_passthrough(&merged(&["zubat", "abra", "mew"]));

        // Sorted order, capped at max_candidates, no explanations
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries[0].identifier, "abra");
        assert_eq!(result.entries[1].identifier, "mew");
        assert!(result.entries.iter().all(|e| e.explanation.is_empty()));
    }

    #[test]
    fn test_prompt_includes_enrichment_when_available() {
        use crate::api::types::{NamedResourceOwned, PokemonStatSlot, PokemonTypeSlot};

        let shortlist = vec!["pikachu".to_string(), "zubat".to_string()];
        let details = vec![PokemonDetail {
            name: "pikachu".into(),
            id: 25,
            height: 4,
            weight: 60,
            types: vec![PokemonTypeSlot {
                type_ref: NamedResourceOwned {
                    name: "electric".into(),
                },
            }],
            stats: vec![PokemonStatSlot {
                base_stat: 90,
                stat: NamedResourceOwned {
                    name: "speed".into(),
                },
            }],
        }];

        let prompt = build_user_prompt("fast electric pokemon?", &shortlist, &details);
        assert!(prompt.contains("pikachu (types: electric; base stat total: 90)"));
        assert!(prompt.contains("- zubat\n"));
    }
}
