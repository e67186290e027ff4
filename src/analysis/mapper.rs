//! Endpoint Mapper
//!
//! Pure translation of facets into PokeAPI calls via a static declarative
//! table. No dynamic dispatch: the table is data, and multi-call expansions
//! are declared per attribute, not improvised at call time.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::intent::{Facet, FacetAttribute, Intent};

/// PokeAPI resource families the mapper can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceFamily {
    Pokemon,
    PokemonSpecies,
    Type,
    PokemonColor,
    PokemonHabitat,
    PokemonShape,
    Generation,
    EggGroup,
    Ability,
    /// Paged `/pokemon` listing; only issued by the fallback processor
    PokemonIndex,
}

impl ResourceFamily {
    /// URL path segment under the API base
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceFamily::Pokemon | ResourceFamily::PokemonIndex => "pokemon",
            ResourceFamily::PokemonSpecies => "pokemon-species",
            ResourceFamily::Type => "type",
            ResourceFamily::PokemonColor => "pokemon-color",
            ResourceFamily::PokemonHabitat => "pokemon-habitat",
            ResourceFamily::PokemonShape => "pokemon-shape",
            ResourceFamily::Generation => "generation",
            ResourceFamily::EggGroup => "egg-group",
            ResourceFamily::Ability => "ability",
        }
    }
}

impl std::fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// One API call derived from a facet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointCall {
    pub resource: ResourceFamily,
    pub parameter: String,
}

impl EndpointCall {
    pub fn new(resource: ResourceFamily, parameter: impl Into<String>) -> Self {
        Self {
            resource,
            parameter: parameter.into(),
        }
    }
}

impl std::fmt::Display for EndpointCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.resource.path_segment(), self.parameter)
    }
}

/// An endpoint call paired with the facet that produced it, so gateway
/// results stay traceable to their source facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedCall {
    pub facet: Facet,
    pub call: EndpointCall,
}

/// Attribute → resource-family routes
///
/// Every attribute maps to exactly one family except `Name`, which expands
/// to both the pokemon and species resources.
static ATTRIBUTE_ROUTES: Lazy<HashMap<FacetAttribute, &'static [ResourceFamily]>> =
    Lazy::new(|| {
        let mut routes: HashMap<FacetAttribute, &'static [ResourceFamily]> = HashMap::new();
        routes.insert(
            FacetAttribute::Name,
            &[ResourceFamily::Pokemon, ResourceFamily::PokemonSpecies],
        );
        routes.insert(FacetAttribute::Type, &[ResourceFamily::Type]);
        routes.insert(FacetAttribute::Color, &[ResourceFamily::PokemonColor]);
        routes.insert(FacetAttribute::Habitat, &[ResourceFamily::PokemonHabitat]);
        routes.insert(FacetAttribute::Shape, &[ResourceFamily::PokemonShape]);
        routes.insert(FacetAttribute::Generation, &[ResourceFamily::Generation]);
        routes.insert(FacetAttribute::EggGroup, &[ResourceFamily::EggGroup]);
        routes.insert(FacetAttribute::Ability, &[ResourceFamily::Ability]);
        routes
    });

/// Maps facets to endpoint calls
pub struct EndpointMapper;

impl EndpointMapper {
    /// Translate facets into the calls to issue. Pure; zero facets yield
    /// zero calls, which the pipeline must route through the fallback
    /// processor before any merge.
    ///
    /// Output order is stable: facet order, then route order within an
    /// attribute.
    pub fn map(intent: Intent, facets: &[Facet]) -> Vec<MappedCall> {
        let mut calls = Vec::new();

        for facet in facets {
            let Some(families) = ATTRIBUTE_ROUTES.get(&facet.attribute) else {
                // Attribute known to the type system but not yet wired to an
                // endpoint; degrade by dropping it.
                debug!(facet = %facet, "no route for facet attribute, dropping");
                continue;
            };

            for family in families.iter() {
                calls.push(MappedCall {
                    facet: facet.clone(),
                    call: EndpointCall::new(*family, facet.value.clone()),
                });
            }
        }

        debug!(
            intent = %intent,
            facets = facets.len(),
            calls = calls.len(),
            "mapped facets to endpoint calls"
        );
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_route_attributes() {
        let facets = vec![Facet::include(FacetAttribute::Color, "yellow")];
        let calls = EndpointMapper::map(Intent::TraitSearch, &facets);

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].call.resource, ResourceFamily::PokemonColor);
        assert_eq!(calls[0].call.parameter, "yellow");
        assert_eq!(calls[0].facet, facets[0]);
    }

    #[test]
    fn test_name_expands_to_two_calls() {
        let facets = vec![Facet::include(FacetAttribute::Name, "pikachu")];
        let calls = EndpointMapper::map(Intent::SingleLookup, &facets);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].call.resource, ResourceFamily::Pokemon);
        assert_eq!(calls[1].call.resource, ResourceFamily::PokemonSpecies);
        assert!(calls.iter().all(|c| c.call.parameter == "pikachu"));
    }

    #[test]
    fn test_exclude_facets_map_like_include() {
        let facets = vec![Facet::exclude(FacetAttribute::Type, "flying")];
        let calls = EndpointMapper::map(Intent::TraitSearch, &facets);

        assert_eq!(calls.len(), 1);
        assert!(calls[0].facet.exclude);
        assert_eq!(calls[0].call.resource, ResourceFamily::Type);
    }

    #[test]
    fn test_zero_facets_zero_calls() {
        let calls = EndpointMapper::map(Intent::GeneralQuestion, &[]);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_output_order_is_stable() {
        let facets = vec![
            Facet::include(FacetAttribute::Type, "dragon"),
            Facet::include(FacetAttribute::Color, "yellow"),
        ];
        let calls = EndpointMapper::map(Intent::TraitSearch, &facets);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].call.resource, ResourceFamily::Type);
        assert_eq!(calls[1].call.resource, ResourceFamily::PokemonColor);
    }

    #[test]
    fn test_every_attribute_has_a_route() {
        for attr in FacetAttribute::all() {
            assert!(
                ATTRIBUTE_ROUTES.contains_key(attr),
                "attribute {} has no route",
                attr
            );
        }
    }

    #[test]
    fn test_call_display() {
        let call = EndpointCall::new(ResourceFamily::Type, "fire");
        assert_eq!(call.to_string(), "/type/fire");
    }
}
