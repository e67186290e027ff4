//! Facet Extractor
//!
//! Classifies a query into an intent and a set of facets by delegating to
//! the reasoning service, seeded with the fixed vocabulary of recognized
//! intents and attributes. The service's output is untrusted: it goes
//! through a strict parser, and any failure degrades to an empty facet set
//! with the general-question intent so the fallback processor takes over.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::intent::{Facet, FacetAttribute, Intent};
use crate::error::ExtractionError;
use crate::llm::{strip_code_fences, LlmClient};

/// Typed result of facet extraction
///
/// Always produced, even when the underlying reasoning call failed — the
/// shape is deterministic, only the content is not.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub intent: Intent,
    pub facets: Vec<Facet>,
}

/// Facet extractor backed by an LLM client
pub struct FacetExtractor {
    client: Arc<dyn LlmClient>,
}

/// Wire shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct ExtractionWire {
    intent: String,
    #[serde(default)]
    facets: Vec<FacetWire>,
}

#[derive(Debug, Deserialize)]
struct FacetWire {
    attribute: String,
    value: String,
    #[serde(default)]
    exclude: bool,
}

impl FacetExtractor {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Extract intent and facets from a free-text query
    ///
    /// Never fails: a reasoning-service error or unparseable response is
    /// logged and collapses to `(general-question, [])`.
    pub async fn extract(&self, query: &str) -> Extraction {
        let system_prompt = build_system_prompt();
        let user_prompt = format!("Analyze this Pokemon query:\n\n{}", query);

        let response = match self.client.chat_json(&system_prompt, &user_prompt).await {
            Ok(text) => text,
            Err(e) => {
                let err = ExtractionError::ServiceUnreachable(e.to_string());
                warn!(error = %err, "facet extraction degraded to empty facet set");
                return Extraction::default();
            }
        };

        match parse_extraction(&response) {
            Ok(extraction) => {
                info!(
                    intent = %extraction.intent,
                    facets = extraction.facets.len(),
                    "query analyzed"
                );
                extraction
            }
            Err(err) => {
                warn!(error = %err, "facet extraction degraded to empty facet set");
                Extraction::default()
            }
        }
    }
}

/// Parse the model's JSON into the typed extraction shape
///
/// Unknown attributes are dropped (logged); an unknown intent label falls
/// back to the general-question intent. Only structurally invalid JSON is
/// an error.
pub(crate) fn parse_extraction(response: &str) -> Result<Extraction, ExtractionError> {
    let clean = strip_code_fences(response);

    let wire: ExtractionWire =
        serde_json::from_str(clean).map_err(|e| ExtractionError::Unparseable {
            reason: e.to_string(),
        })?;

    let intent = wire.intent.parse::<Intent>().unwrap_or_else(|e| {
        warn!(label = %wire.intent, error = %e, "unknown intent label, defaulting");
        Intent::GeneralQuestion
    });

    let mut facets = Vec::new();
    for f in wire.facets {
        let attribute = match f.attribute.parse::<FacetAttribute>() {
            Ok(attr) => attr,
            Err(e) => {
                // Attribute outside the wired vocabulary; drop it rather
                // than fail the extraction.
                warn!(attribute = %f.attribute, error = %e, "dropping unmapped facet attribute");
                continue;
            }
        };

        let facet = if f.exclude {
            Facet::exclude(attribute, f.value)
        } else {
            Facet::include(attribute, f.value)
        };

        if facet.value.is_empty() {
            warn!(attribute = %attribute, "dropping facet with empty value");
            continue;
        }

        facets.push(facet);
    }

    Ok(Extraction { intent, facets })
}

/// System prompt seeding the fixed vocabulary
fn build_system_prompt() -> String {
    let intents: Vec<&str> = Intent::all().iter().map(|i| i.label()).collect();
    let attributes: Vec<&str> = FacetAttribute::all().iter().map(|a| a.label()).collect();

    format!(
        r#"You are a Pokemon query analyst. Classify the user's query and extract its facets.

Intent must be exactly one of: {intents}

Each facet is one attribute/value pair. Attribute must be exactly one of: {attributes}

Mark a facet with "exclude": true when the user wants it ruled out
(e.g. "but not Mew" gives {{"attribute": "name", "value": "mew", "exclude": true}}).

Values are lowercase API identifiers: type names like "fire", colors like
"pink", generation numbers like "1", Pokemon names like "pikachu".

Return JSON only, in exactly this shape:
{{
  "intent": "<intent label>",
  "facets": [
    {{"attribute": "<attribute>", "value": "<value>", "exclude": false}}
  ]
}}

A query with no extractable facets gets "intent": "general-question" and an
empty facets array."#,
        intents = intents.join(", "),
        attributes = attributes.join(", "),
    )
}
