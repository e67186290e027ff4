//! Intent and facet types
//!
//! The intent label decides which set-combination rule the merger applies;
//! the facet vocabulary is the closed set of attributes the extractor may
//! emit, each wired to exactly one resource family in the mapper.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classified query type
///
/// Closed set. Each intent carries its combination rule; the table is
/// total so the merger never has to infer a rule ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    /// Assemble a roster; broad recommendation semantics
    TeamBuild,
    /// One specific Pokemon
    SingleLookup,
    /// Side-by-side comparison of named Pokemon
    Comparison,
    /// Filter the population by shared traits
    TraitSearch,
    /// Anything that doesn't decompose into facets
    #[default]
    GeneralQuestion,
}

/// How include-flagged candidate sets are combined at merge time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombinationRule {
    /// Every include set must contain the candidate
    Intersection,
    /// Any include set suffices
    Union,
}

impl Intent {
    /// The combination rule bound to this intent
    pub fn combination_rule(&self) -> CombinationRule {
        match self {
            // Filter-style intents: all facets must hold
            Intent::SingleLookup | Intent::TraitSearch => CombinationRule::Intersection,
            // Broad intents: each facet contributes candidates
            Intent::TeamBuild | Intent::Comparison | Intent::GeneralQuestion => {
                CombinationRule::Union
            }
        }
    }

    /// Wire label used in prompts and reports
    pub fn label(&self) -> &'static str {
        match self {
            Intent::TeamBuild => "team-build",
            Intent::SingleLookup => "single-lookup",
            Intent::Comparison => "comparison",
            Intent::TraitSearch => "trait-search",
            Intent::GeneralQuestion => "general-question",
        }
    }

    /// All intents, for prompt vocabulary seeding
    pub fn all() -> &'static [Intent] {
        &[
            Intent::TeamBuild,
            Intent::SingleLookup,
            Intent::Comparison,
            Intent::TraitSearch,
            Intent::GeneralQuestion,
        ]
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "team-build" | "team-building" => Ok(Intent::TeamBuild),
            "single-lookup" | "lookup" => Ok(Intent::SingleLookup),
            "comparison" | "compare" => Ok(Intent::Comparison),
            "trait-search" | "filtering" => Ok(Intent::TraitSearch),
            "general-question" | "general" => Ok(Intent::GeneralQuestion),
            other => Err(format!("unknown intent label '{}'", other)),
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Recognized facet attributes
///
/// Each maps to exactly one resource family (two for `Name`, the declared
/// multi-call expansion). New attributes appearing in extraction output but
/// absent here are dropped at the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacetAttribute {
    Name,
    Type,
    Color,
    Habitat,
    Shape,
    Generation,
    EggGroup,
    Ability,
}

impl FacetAttribute {
    /// Wire label used in prompts and reports
    pub fn label(&self) -> &'static str {
        match self {
            FacetAttribute::Name => "name",
            FacetAttribute::Type => "type",
            FacetAttribute::Color => "color",
            FacetAttribute::Habitat => "habitat",
            FacetAttribute::Shape => "shape",
            FacetAttribute::Generation => "generation",
            FacetAttribute::EggGroup => "egg-group",
            FacetAttribute::Ability => "ability",
        }
    }

    /// All attributes, for prompt vocabulary seeding
    pub fn all() -> &'static [FacetAttribute] {
        &[
            FacetAttribute::Name,
            FacetAttribute::Type,
            FacetAttribute::Color,
            FacetAttribute::Habitat,
            FacetAttribute::Shape,
            FacetAttribute::Generation,
            FacetAttribute::EggGroup,
            FacetAttribute::Ability,
        ]
    }

    /// Relative specificity, used by the fallback processor to decide which
    /// facet to drop first. Lower means less specific.
    pub fn specificity(&self) -> u8 {
        match self {
            FacetAttribute::Generation => 0,
            FacetAttribute::Color => 1,
            FacetAttribute::Shape => 2,
            FacetAttribute::Habitat => 3,
            FacetAttribute::EggGroup => 4,
            FacetAttribute::Ability => 5,
            FacetAttribute::Type => 6,
            FacetAttribute::Name => 7,
        }
    }
}

impl FromStr for FacetAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "name" | "pokemon" | "pokemon-name" => Ok(FacetAttribute::Name),
            "type" => Ok(FacetAttribute::Type),
            "color" | "colour" => Ok(FacetAttribute::Color),
            "habitat" => Ok(FacetAttribute::Habitat),
            "shape" => Ok(FacetAttribute::Shape),
            "generation" => Ok(FacetAttribute::Generation),
            "egg-group" => Ok(FacetAttribute::EggGroup),
            "ability" => Ok(FacetAttribute::Ability),
            other => Err(format!("unknown facet attribute '{}'", other)),
        }
    }
}

impl std::fmt::Display for FacetAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One attribute/value pair extracted from a query
///
/// The `exclude` flag is honored only at merge time, never inside an
/// individual endpoint call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facet {
    pub attribute: FacetAttribute,
    pub value: String,
    #[serde(default)]
    pub exclude: bool,
}

impl Facet {
    /// Include-flagged facet with a normalized value
    pub fn include(attribute: FacetAttribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: normalize_value(&value.into()),
            exclude: false,
        }
    }

    /// Exclude-flagged facet with a normalized value
    pub fn exclude(attribute: FacetAttribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: normalize_value(&value.into()),
            exclude: true,
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exclude {
            write!(f, "!{}={}", self.attribute, self.value)
        } else {
            write!(f, "{}={}", self.attribute, self.value)
        }
    }
}

/// Lowercase, trimmed, spaces collapsed to hyphens (PokeAPI slug form)
pub fn normalize_value(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
