//! PokeAPI response types and the candidate-set model
//!
//! Each resource family answers with a different JSON shape; these structs
//! decode just enough of each to reduce the response to a set of Pokemon
//! identifiers, plus the detail shape used to enrich candidates before
//! ranking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A `{name, url}` reference, PokeAPI's universal link shape
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// `/type/{name}` — members are nested under a slot wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct TypeResponse {
    pub name: String,
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedResource,
}

/// `/ability/{name}` — same nesting as the type resource
#[derive(Debug, Clone, Deserialize)]
pub struct AbilityResponse {
    pub name: String,
    pub pokemon: Vec<AbilityMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilityMember {
    pub pokemon: NamedResource,
}

/// Shared shape of `/pokemon-color`, `/pokemon-habitat`, `/pokemon-shape`,
/// `/generation` and `/egg-group`: a flat species list.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesGroupResponse {
    pub name: String,
    pub pokemon_species: Vec<NamedResource>,
}

/// Paged `/pokemon` listing used by the fallback's broad call
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonIndexResponse {
    pub results: Vec<NamedResource>,
}

/// `/pokemon/{name}` detail, reduced to the attributes ranking cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub name: String,
    pub id: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub stats: Vec<PokemonStatSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonTypeSlot {
    #[serde(rename = "type")]
    pub type_ref: NamedResourceOwned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonStatSlot {
    pub base_stat: u32,
    pub stat: NamedResourceOwned,
}

/// Serializable twin of [`NamedResource`] for detail payloads that travel
/// into reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResourceOwned {
    pub name: String,
}

impl PokemonDetail {
    /// Type names in slot order
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.type_ref.name.as_str()).collect()
    }

    /// Sum of base stats, a rough power proxy for the ranking prompt
    pub fn base_stat_total(&self) -> u32 {
        self.stats.iter().map(|s| s.base_stat).sum()
    }
}

/// `/pokemon-species/{name}` detail
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesDetail {
    pub name: String,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
}

/// Set of Pokemon identifiers returned by one endpoint call
///
/// Backed by a `BTreeSet` so iteration order, equality and the merge
/// algebra are deterministic. Identifiers are lowercase API slugs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet(BTreeSet<String>);

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    pub fn insert(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref().trim().to_lowercase();
        if !name.is_empty() {
            self.0.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Members in deterministic (sorted) order
    pub fn sorted_names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn union(&self, other: &CandidateSet) -> CandidateSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &CandidateSet) -> CandidateSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &CandidateSet) -> CandidateSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn is_subset(&self, other: &CandidateSet) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<String> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
