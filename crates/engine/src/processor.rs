//! Pipeline entry point.
//!
//! Fetches a template snapshot, runs the five stages in their fixed order,
//! and shapes the terminal state into a caller-facing outcome. One
//! invocation per query; concurrent invocations are independent because the
//! snapshot is read-only and providers hold no session state.

use crate::stages::{adjust_query, enhance_query, generate_response, match_prompt, validate_query};
use crate::state::{PipelineState, PromptMatch, ValidationVerdict};
use querypilot_core::AppResult;
use querypilot_llm::{create_provider, Provider};
use querypilot_registry::TemplateRegistry;
use serde::{Deserialize, Serialize};

/// Result of a full pipeline run.
///
/// The `response` field always contains human-readable text, even on a
/// backend failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub original_query: String,

    pub prompt_match: PromptMatch,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Whether a template was applied to the query
    pub enhanced: bool,

    pub enhanced_query: String,

    pub validation_result: ValidationVerdict,

    pub validation_issues: Vec<String>,

    pub response: String,
}

/// Process a user query through the refinement pipeline.
///
/// # Arguments
/// * `query` - Free-form user query
/// * `registry` - Template registry collaborator; a read-only snapshot is
///   fetched once at the start
/// * `provider` - Language-model backend shared by all stages
///
/// # Errors
/// Registry failures and a provider failure during the matching stage
/// propagate; every later stage degrades to a safe default instead.
pub async fn process_query(
    query: &str,
    registry: &dyn TemplateRegistry,
    provider: &dyn Provider,
) -> AppResult<QueryOutcome> {
    let snapshot = registry.load_all().await?;

    tracing::info!(
        templates = snapshot.len(),
        "Processing query through refinement pipeline"
    );

    let state = PipelineState::new(query, snapshot);

    // Fixed topology: match -> enhance -> validate -> (adjust) -> generate
    let state = match_prompt(state, provider).await?;
    let state = enhance_query(state).await?;
    let state = validate_query(state, provider).await?;
    let state = adjust_query(state, provider).await?;
    let state = generate_response(state, provider).await?;

    Ok(into_outcome(state))
}

/// Process a query, constructing the provider from a raw configuration
/// record first.
///
/// Configuration-time errors (missing/unknown provider type, missing
/// required fields) surface before any stage runs.
pub async fn process_query_with_config(
    query: &str,
    registry: &dyn TemplateRegistry,
    provider_config: &serde_json::Value,
) -> AppResult<QueryOutcome> {
    let provider = create_provider(provider_config)?;
    process_query(query, registry, provider.as_ref()).await
}

fn into_outcome(state: PipelineState) -> QueryOutcome {
    let enhanced = state.is_matched();

    QueryOutcome {
        enhanced,
        content_type: state.content_type,
        prompt_match: state.prompt_match.unwrap_or_else(PromptMatch::no_match),
        enhanced_query: state
            .enhanced_query
            .unwrap_or_else(|| state.user_query.clone()),
        validation_result: state.validation.unwrap_or(ValidationVerdict::Valid),
        validation_issues: state.validation_issues,
        response: state.response.unwrap_or_default(),
        original_query: state.user_query,
    }
}
