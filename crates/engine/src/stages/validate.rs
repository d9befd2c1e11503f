//! Validation stage: judge the enhanced query for defects.
//!
//! This stage fails open: a provider failure or malformed verdict never
//! blocks the pipeline, it just means no adjustment happens.

use crate::extract::parse_json_object;
use crate::prompts::validation_prompt;
use crate::state::{PipelineState, ValidationVerdict};
use querypilot_core::AppResult;
use querypilot_llm::Provider;

/// Validate the enhanced query.
///
/// Skip-flagged states are VALID by definition with no provider call.
pub async fn validate_query(
    mut state: PipelineState,
    provider: &dyn Provider,
) -> AppResult<PipelineState> {
    if state.skip_enhance {
        state.validation = Some(ValidationVerdict::Valid);
        state.validation_issues = Vec::new();
        return Ok(state);
    }

    let enhanced = state
        .enhanced_query
        .clone()
        .unwrap_or_else(|| state.user_query.clone());

    let prompt = validation_prompt(&enhanced);

    let reply = match provider.generate_response(&prompt, None).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("Validator call failed, failing open to VALID: {}", e);
            state.validation = Some(ValidationVerdict::Valid);
            state.validation_issues = Vec::new();
            return Ok(state);
        }
    };

    let (verdict, issues) = match parse_json_object(&reply) {
        Ok(value) => {
            let valid = value.get("valid").and_then(|v| v.as_bool()).unwrap_or(true);
            let issues = value
                .get("issues")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|i| i.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_else(Vec::new);

            if valid {
                (ValidationVerdict::Valid, issues)
            } else {
                (ValidationVerdict::NeedsAdjustment, issues)
            }
        }
        Err(e) => {
            tracing::warn!("Unparseable validator verdict, failing open to VALID: {}", e);
            (ValidationVerdict::Valid, Vec::new())
        }
    };

    tracing::info!(verdict = ?verdict, issues = issues.len(), "Validated enhanced query");

    state.validation = Some(verdict);
    state.validation_issues = issues;
    Ok(state)
}
