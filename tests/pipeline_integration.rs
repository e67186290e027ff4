//! End-to-end pipeline tests over scripted collaborators
//!
//! The LLM client and the candidate source are both in-process mocks, so
//! these tests exercise the real extraction parsing, mapping, merging,
//! fallback and ranking logic without any network access.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use poke_research::{
    CandidateSet, CandidateSource, EndpointCall, LlmClient, ResearchAgentBuilder, ResearchConfig,
    ResearchStatus, ResourceFamily,
};
use poke_research::api::types::PokemonDetail;

/// Scripted LLM: pops one canned response per chat call, in order.
/// The pipeline calls it once for extraction, then once for ranking.
struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
        })
    }

    fn pop(&self) -> anyhow::Result<String> {
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("scripted LLM ran out of responses")),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
        self.pop()
    }

    async fn chat_json(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
        self.pop()
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Scripted source: a fixed table of call → candidate set. Calls with no
/// entry answer empty, mimicking the gateway's degraded-call behavior.
struct ScriptedSource {
    sets: HashMap<EndpointCall, CandidateSet>,
}

impl ScriptedSource {
    fn new(entries: Vec<(EndpointCall, &[&str])>) -> Arc<Self> {
        Arc::new(Self {
            sets: entries
                .into_iter()
                .map(|(call, names)| (call, CandidateSet::from_names(names.iter().copied())))
                .collect(),
        })
    }
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    async fn fetch(&self, calls: &[EndpointCall]) -> Vec<CandidateSet> {
        calls
            .iter()
            .map(|call| self.sets.get(call).cloned().unwrap_or_default())
            .collect()
    }

    async fn fetch_details(&self, _names: &[String]) -> Vec<PokemonDetail> {
        Vec::new()
    }
}

fn agent(
    llm: Arc<ScriptedLlm>,
    source: Arc<ScriptedSource>,
) -> poke_research::ResearchAgent {
    ResearchAgentBuilder::new(ResearchConfig::default())
        .llm_client(llm)
        .candidate_source(source)
        .build()
        .expect("mock-backed agent always builds")
}

fn call(resource: ResourceFamily, parameter: &str) -> EndpointCall {
    EndpointCall::new(resource, parameter)
}

#[tokio::test]
async fn trait_search_with_exclusion_end_to_end() {
    let llm = ScriptedLlm::new(vec![
        Ok(r#"{
            "intent": "trait-search",
            "facets": [
                {"attribute": "color", "value": "yellow", "exclude": false},
                {"attribute": "type", "value": "dragon", "exclude": false},
                {"attribute": "type", "value": "flying", "exclude": true}
            ]
        }"#),
        Ok(r#"{"ranking": [{"identifier": "dragonair", "explanation": "Yellow-adjacent serpentine dragon."}]}"#),
    ]);
    let source = ScriptedSource::new(vec![
        (
            call(ResourceFamily::PokemonColor, "yellow"),
            &["ampharos", "dragonair"][..],
        ),
        (
            call(ResourceFamily::Type, "dragon"),
            &["dragonair", "dragonite"][..],
        ),
        (call(ResourceFamily::Type, "flying"), &["dragonite"][..]),
    ]);

    let report = agent(llm, source)
        .run("find me a yellow dragon, but nothing that flies")
        .await
        .unwrap();

    assert_eq!(report.status, ResearchStatus::Ranked);
    assert!(!report.fallback_applied);
    assert_eq!(report.calls_made.len(), 3);
    assert_eq!(
        report.merged.candidates,
        CandidateSet::from_names(["dragonair"])
    );
    assert_eq!(report.ranked.entries.len(), 1);
    assert_eq!(report.ranked.entries[0].identifier, "dragonair");
}

#[tokio::test]
async fn merged_result_is_subset_of_everything_fetched() {
    let llm = ScriptedLlm::new(vec![
        Ok(r#"{
            "intent": "team-build",
            "facets": [
                {"attribute": "type", "value": "bug", "exclude": false},
                {"attribute": "type", "value": "grass", "exclude": false}
            ]
        }"#),
        Ok(r#"{"ranking": [{"identifier": "scyther", "explanation": "Fast physical attacker."}]}"#),
    ]);
    let source = ScriptedSource::new(vec![
        (
            call(ResourceFamily::Type, "bug"),
            &["scyther", "caterpie"][..],
        ),
        (call(ResourceFamily::Type, "grass"), &["oddish"][..]),
    ]);

    let report = agent(llm, source)
        .run("build me a bug and grass team")
        .await
        .unwrap();

    let fetched_union = CandidateSet::from_names(["scyther", "caterpie", "oddish"]);
    assert!(report.merged.candidates.is_subset(&fetched_union));
    assert_eq!(report.merged.candidates, fetched_union);
}

#[tokio::test]
async fn extraction_failure_falls_back_to_broad_population() {
    let llm = ScriptedLlm::new(vec![
        Err("reasoning service timed out"),
        Ok(r#"{"ranking": [{"identifier": "bulbasaur", "explanation": "A classic starter."}]}"#),
    ]);
    let source = ScriptedSource::new(vec![(
        call(ResourceFamily::PokemonIndex, "151"),
        &["bulbasaur", "charmander", "squirtle"][..],
    )]);

    let report = agent(llm, source)
        .run("why do people like pokemon?")
        .await
        .unwrap();

    assert!(report.fallback_applied);
    assert!(report.facets.is_empty());
    assert_eq!(report.calls_made.len(), 1);
    assert_eq!(report.calls_made[0].resource, ResourceFamily::PokemonIndex);
    assert_eq!(report.merged.len(), 3);
    assert_eq!(report.status, ResearchStatus::Ranked);
}

#[tokio::test]
async fn empty_intersection_recovers_by_dropping_facet() {
    let llm = ScriptedLlm::new(vec![
        Ok(r#"{
            "intent": "trait-search",
            "facets": [
                {"attribute": "color", "value": "pink", "exclude": false},
                {"attribute": "type", "value": "dragon", "exclude": false}
            ]
        }"#),
        Ok(r#"{"ranking": [{"identifier": "dratini", "explanation": "The closest dragon on offer."}]}"#),
    ]);
    // Disjoint sets: no pink dragons exist
    let source = ScriptedSource::new(vec![
        (call(ResourceFamily::PokemonColor, "pink"), &["clefairy"][..]),
        (call(ResourceFamily::Type, "dragon"), &["dratini"][..]),
    ]);

    let report = agent(llm, source).run("a pink dragon please").await.unwrap();

    assert!(report.fallback_applied);
    // Color is less specific than type, so the dragon facet survives
    assert_eq!(
        report.merged.candidates,
        CandidateSet::from_names(["dratini"])
    );
    assert_eq!(report.status, ResearchStatus::Ranked);
}

#[tokio::test]
async fn ranking_failure_degrades_to_stable_passthrough() {
    let llm = ScriptedLlm::new(vec![
        Ok(r#"{
            "intent": "team-build",
            "facets": [{"attribute": "type", "value": "bug", "exclude": false}]
        }"#),
        Ok("the best bug is definitely scyther, trust me"),
    ]);
    let source = ScriptedSource::new(vec![(
        call(ResourceFamily::Type, "bug"),
        &["weedle", "scyther", "caterpie"][..],
    )]);

    let report = agent(llm, source).run("bug team please").await.unwrap();

    assert_eq!(report.status, ResearchStatus::Unranked);
    // Sorted identifiers, no explanations
    let ids: Vec<&str> = report
        .ranked
        .entries
        .iter()
        .map(|e| e.identifier.as_str())
        .collect();
    assert_eq!(ids, vec!["caterpie", "scyther", "weedle"]);
    assert!(report.ranked.entries.iter().all(|e| e.explanation.is_empty()));
}

#[tokio::test]
async fn one_failed_call_does_not_poison_the_batch() {
    let llm = ScriptedLlm::new(vec![
        Ok(r#"{
            "intent": "team-build",
            "facets": [
                {"attribute": "type", "value": "bug", "exclude": false},
                {"attribute": "type", "value": "mystery", "exclude": false}
            ]
        }"#),
        Ok(r#"{"ranking": [{"identifier": "caterpie", "explanation": "Easy early catch."}]}"#),
    ]);
    // The "mystery" type has no scripted answer: it behaves like a call
    // that failed and degraded to an empty set.
    let source = ScriptedSource::new(vec![(
        call(ResourceFamily::Type, "bug"),
        &["caterpie"][..],
    )]);

    let report = agent(llm, source).run("bug team").await.unwrap();

    assert!(!report.fallback_applied);
    assert_eq!(report.calls_made.len(), 2);
    assert_eq!(
        report.merged.candidates,
        CandidateSet::from_names(["caterpie"])
    );
}

#[tokio::test]
async fn nothing_anywhere_ends_as_no_matches_not_an_error() {
    let llm = ScriptedLlm::new(vec![Ok(r#"{
        "intent": "trait-search",
        "facets": [{"attribute": "type", "value": "fairy", "exclude": false}]
    }"#)]);
    // Facet set empty, broad population empty too
    let source = ScriptedSource::new(vec![]);

    let report = agent(llm, source)
        .run("an imaginary pokemon that does not exist")
        .await
        .unwrap();

    assert_eq!(report.status, ResearchStatus::NoMatches);
    assert!(report.fallback_applied);
    assert!(report.merged.is_empty());
    assert!(report.ranked.is_empty());
}

#[tokio::test]
async fn name_facet_issues_both_pokemon_and_species_calls() {
    let llm = ScriptedLlm::new(vec![
        Ok(r#"{
            "intent": "single-lookup",
            "facets": [{"attribute": "name", "value": "pikachu", "exclude": false}]
        }"#),
        Ok(r#"{"ranking": [{"identifier": "pikachu", "explanation": "Exactly what was asked for."}]}"#),
    ]);
    let source = ScriptedSource::new(vec![
        (call(ResourceFamily::Pokemon, "pikachu"), &["pikachu"][..]),
        (
            call(ResourceFamily::PokemonSpecies, "pikachu"),
            &["pikachu"][..],
        ),
    ]);

    let report = agent(llm, source).run("tell me about pikachu").await.unwrap();

    assert_eq!(report.calls_made.len(), 2);
    assert_eq!(
        report.merged.candidates,
        CandidateSet::from_names(["pikachu"])
    );
    assert_eq!(report.status, ResearchStatus::Ranked);
}
