//! Property tests for the candidate merger
//!
//! The merge step is pure set algebra, so its contract is checked over
//! generated inputs: the union formula, the intersection subset property,
//! exclusion handling and order independence.

use std::collections::BTreeSet;

use proptest::prelude::*;

use poke_research::{
    merge_with_rule, CandidateSet, CombinationRule, EndpointCall, Facet, FacetAttribute,
    FacetResult, ResourceFamily,
};

type RawSets = Vec<(bool, BTreeSet<String>)>;

fn raw_sets() -> impl Strategy<Value = RawSets> {
    prop::collection::vec(
        (
            any::<bool>(),
            prop::collection::btree_set("[a-z]{1,6}", 0..8),
        ),
        0..6,
    )
}

fn to_results(raw: &RawSets) -> Vec<FacetResult> {
    raw.iter()
        .enumerate()
        .map(|(i, (exclude, names))| {
            let value = format!("v{}", i);
            let facet = if *exclude {
                Facet::exclude(FacetAttribute::Type, value.as_str())
            } else {
                Facet::include(FacetAttribute::Type, value.as_str())
            };
            FacetResult {
                call: EndpointCall::new(ResourceFamily::Type, value.as_str()),
                facet,
                candidates: CandidateSet::from_names(names.iter().map(String::as_str)),
            }
        })
        .collect()
}

fn include_sets(raw: &RawSets) -> Vec<&BTreeSet<String>> {
    raw.iter()
        .filter(|(exclude, _)| !exclude)
        .map(|(_, names)| names)
        .collect()
}

fn exclude_union(raw: &RawSets) -> BTreeSet<String> {
    raw.iter()
        .filter(|(exclude, _)| *exclude)
        .flat_map(|(_, names)| names.iter().cloned())
        .collect()
}

proptest! {
    #[test]
    fn union_merge_follows_the_formula(raw in raw_sets()) {
        let results = to_results(&raw);
        let merged = merge_with_rule(CombinationRule::Union, &results);

        let expected: BTreeSet<String> = include_sets(&raw)
            .into_iter()
            .flat_map(|s| s.iter().cloned())
            .collect::<BTreeSet<_>>()
            .difference(&exclude_union(&raw))
            .cloned()
            .collect();

        prop_assert_eq!(merged.candidates.sorted_names(), expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn intersection_merge_is_subset_of_every_include_set(raw in raw_sets()) {
        let results = to_results(&raw);
        let merged = merge_with_rule(CombinationRule::Intersection, &results);

        for names in include_sets(&raw) {
            let set = CandidateSet::from_names(names.iter().map(String::as_str));
            prop_assert!(merged.candidates.is_subset(&set));
        }
    }

    #[test]
    fn empty_include_list_never_yields_everything(raw in raw_sets()) {
        let only_excludes: RawSets = raw
            .into_iter()
            .map(|(_, names)| (true, names))
            .collect();
        let results = to_results(&only_excludes);

        for rule in [CombinationRule::Intersection, CombinationRule::Union] {
            let merged = merge_with_rule(rule, &results);
            prop_assert!(merged.candidates.is_empty());
        }
    }

    #[test]
    fn excluded_identifiers_never_survive(raw in raw_sets()) {
        let results = to_results(&raw);
        let excluded = exclude_union(&raw);

        for rule in [CombinationRule::Intersection, CombinationRule::Union] {
            let merged = merge_with_rule(rule, &results);
            for name in &excluded {
                prop_assert!(!merged.candidates.contains(name));
            }
        }
    }

    #[test]
    fn merge_is_order_independent_and_idempotent(raw in raw_sets()) {
        let results = to_results(&raw);
        let mut reversed = results.clone();
        reversed.reverse();

        for rule in [CombinationRule::Intersection, CombinationRule::Union] {
            let first = merge_with_rule(rule, &results);
            let again = merge_with_rule(rule, &results);
            let backwards = merge_with_rule(rule, &reversed);

            prop_assert_eq!(&first.candidates, &again.candidates);
            prop_assert_eq!(&first.candidates, &backwards.candidates);
        }
    }

    #[test]
    fn merged_is_subset_of_all_fetched(raw in raw_sets()) {
        let results = to_results(&raw);
        let all_fetched = results
            .iter()
            .fold(CandidateSet::new(), |acc, r| acc.union(&r.candidates));

        for rule in [CombinationRule::Intersection, CombinationRule::Union] {
            let merged = merge_with_rule(rule, &results);
            prop_assert!(merged.candidates.is_subset(&all_fetched));
        }
    }
}
