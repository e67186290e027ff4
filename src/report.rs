//! Research report
//!
//! The finished bundle handed to the external report sink. The core
//! defines only this shape and a plain-text rendering; persistence and
//! presentation belong to the collaborator that receives it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::intent::{Facet, Intent};
use crate::analysis::mapper::EndpointCall;
use crate::merge::MergedCandidates;
use crate::ranking::RankedResult;

/// Terminal status of a research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchStatus {
    /// Candidates ranked and explained by the reasoning service
    Ranked,
    /// Ranking failed; candidates presented in stable order, unexplained
    Unranked,
    /// Relaxation exhausted without finding anything; not an error
    NoMatches,
}

impl ResearchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ResearchStatus::Ranked => "ranked",
            ResearchStatus::Unranked => "unranked",
            ResearchStatus::NoMatches => "no-matches",
        }
    }
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Finished research result for one query
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub query: String,
    pub intent: Intent,
    pub facets: Vec<Facet>,
    /// Every endpoint call issued, fallback calls included
    pub calls_made: Vec<EndpointCall>,
    pub merged: MergedCandidates,
    pub ranked: RankedResult,
    pub status: ResearchStatus,
    pub fallback_applied: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ResearchReport {
    /// Plain-text rendering for terminal display and the text report file
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(72);

        out.push_str(&rule);
        out.push_str("\nPOKEMON DEEP RESEARCH REPORT\n");
        out.push_str(&rule);
        out.push_str(&format!("\nQuery:    {}\n", self.query));
        out.push_str(&format!("Intent:   {}\n", self.intent));
        out.push_str(&format!("Status:   {}\n", self.status));

        if !self.facets.is_empty() {
            out.push_str("Facets:   ");
            let rendered: Vec<String> = self.facets.iter().map(|f| f.to_string()).collect();
            out.push_str(&rendered.join(", "));
            out.push('\n');
        }

        if self.fallback_applied {
            out.push_str("Note:     fallback strategy applied\n");
        }

        out.push_str(&format!(
            "Research: {} endpoint calls, {} merged candidates, {} ms\n",
            self.calls_made.len(),
            self.merged.len(),
            self.duration_ms
        ));

        out.push_str(&rule);
        out.push('\n');

        match self.status {
            ResearchStatus::NoMatches => {
                out.push_str("No Pokemon matched the query, even after relaxing it.\n");
            }
            _ => {
                for (idx, entry) in self.ranked.entries.iter().enumerate() {
                    if entry.explanation.is_empty() {
                        out.push_str(&format!("{:>3}. {}\n", idx + 1, entry.identifier));
                    } else {
                        out.push_str(&format!(
                            "{:>3}. {}: {}\n",
                            idx + 1,
                            entry.identifier,
                            entry.explanation
                        ));
                    }
                }
            }
        }

        out.push_str(&rule);
        out.push('\n');
        out
    }

    /// Persist the text rendering and the raw JSON bundle side by side
    ///
    /// Returns the written `(text, json)` paths. The optional comparison
    /// answer is appended to the text file only.
    pub fn save_to_dir(
        &self,
        dir: &Path,
        comparison: Option<&str>,
    ) -> Result<(PathBuf, PathBuf), crate::error::ResearchError> {
        std::fs::create_dir_all(dir)?;
        let stamp = self.started_at.format("%Y%m%d_%H%M%S");

        let text_path = dir.join(format!("pokemon_research_{}.txt", stamp));
        let mut text = self.render_text();
        if let Some(answer) = comparison {
            text.push_str("\nPLAIN LLM ANSWER (no research)\n");
            text.push_str(answer);
            text.push('\n');
        }
        std::fs::write(&text_path, text)?;

        let json_path = dir.join(format!("research_data_{}.json", stamp));
        std::fs::write(&json_path, serde_json::to_string_pretty(self)?)?;

        info!(
            text = %text_path.display(),
            json = %json_path.display(),
            "report saved"
        );
        Ok((text_path, json_path))
    }
}
