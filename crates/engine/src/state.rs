//! Pipeline state threaded through the refinement stages.

use querypilot_registry::Template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of the matching stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// A template was chosen for the query
    Matched,
    /// Templates exist but none fit
    NoMatch,
    /// The registry snapshot was empty; no LLM call was made
    NoPromptsAvailable,
}

/// Structured match decision recorded after the matching stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMatch {
    pub status: MatchStatus,

    /// Chosen template name (only when matched)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_name: Option<String>,

    /// Confidence score, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,

    /// Free-text reasoning from the matcher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl PromptMatch {
    pub fn no_match() -> Self {
        Self {
            status: MatchStatus::NoMatch,
            prompt_name: None,
            confidence: None,
            reasoning: None,
        }
    }

    pub fn no_prompts_available() -> Self {
        Self {
            status: MatchStatus::NoPromptsAvailable,
            prompt_name: None,
            confidence: None,
            reasoning: None,
        }
    }
}

/// Verdict recorded after the validation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationVerdict {
    Valid,
    NeedsAdjustment,
}

/// The record threaded through all five stages.
///
/// Stages take ownership of the state and hand back a new value; no stage
/// reaches into stages beyond its direct input. `user_query` is immutable
/// for the lifetime of the pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Original user query
    pub user_query: String,

    /// Read-only template snapshot, fetched once per query
    pub available: HashMap<String, Template>,

    /// Set by the matching stage
    pub prompt_match: Option<PromptMatch>,

    /// Content type of the matched template
    pub content_type: Option<String>,

    /// Inferred parameters, later widened with synthesized defaults
    pub parameters: HashMap<String, String>,

    /// Marks that no template matched; enhancement, validation, and
    /// adjustment pass through unchanged
    pub skip_enhance: bool,

    /// Set by the enhancement stage
    pub enhanced_query: Option<String>,

    /// Set by the validation stage
    pub validation: Option<ValidationVerdict>,
    pub validation_issues: Vec<String>,

    /// Set by the adjustment stage
    pub final_query: Option<String>,

    /// Set by the generation stage
    pub response: Option<String>,
}

impl PipelineState {
    /// Start a pipeline run for a query against a template snapshot.
    pub fn new(user_query: impl Into<String>, available: HashMap<String, Template>) -> Self {
        Self {
            user_query: user_query.into(),
            available,
            prompt_match: None,
            content_type: None,
            parameters: HashMap::new(),
            skip_enhance: false,
            enhanced_query: None,
            validation: None,
            validation_issues: Vec::new(),
            final_query: None,
            response: None,
        }
    }

    /// The text the generation stage should send: final query, falling back
    /// to the enhanced query, falling back to the original query.
    pub fn outgoing_query(&self) -> &str {
        self.final_query
            .as_deref()
            .or(self.enhanced_query.as_deref())
            .unwrap_or(&self.user_query)
    }

    /// Whether the matching stage chose a template.
    pub fn is_matched(&self) -> bool {
        matches!(
            self.prompt_match,
            Some(PromptMatch {
                status: MatchStatus::Matched,
                ..
            })
        )
    }
}
