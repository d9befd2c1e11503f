//! Adjustment stage: repair a flagged instruction.
//!
//! Runs a corrective LLM call only when validation demanded it; otherwise
//! the stage is a pass-through. A failed repair degrades to the enhanced
//! query rather than aborting the pipeline.

use crate::prompts::adjustment_prompt;
use crate::state::{PipelineState, ValidationVerdict};
use querypilot_core::AppResult;
use querypilot_llm::Provider;

/// Fix the enhanced query when validation flagged it.
///
/// - skip flag set: final query = original user query, no call
/// - verdict VALID: final query = enhanced query, no call
/// - verdict NEEDS_ADJUSTMENT: repair via provider; the raw text reply
///   becomes the final query, falling back to the enhanced query on failure
pub async fn adjust_query(
    mut state: PipelineState,
    provider: &dyn Provider,
) -> AppResult<PipelineState> {
    if state.skip_enhance {
        state.final_query = Some(state.user_query.clone());
        return Ok(state);
    }

    let enhanced = state
        .enhanced_query
        .clone()
        .unwrap_or_else(|| state.user_query.clone());

    if state.validation != Some(ValidationVerdict::NeedsAdjustment) {
        state.final_query = Some(enhanced);
        return Ok(state);
    }

    let prompt = adjustment_prompt(&state.user_query, &enhanced, &state.validation_issues);

    let final_query = match provider.generate_response(&prompt, None).await {
        Ok(reply) => {
            tracing::info!("Adjusted query after validation issues");
            reply.trim().to_string()
        }
        Err(e) => {
            tracing::warn!("Adjustment call failed, keeping enhanced query: {}", e);
            enhanced
        }
    };

    state.final_query = Some(final_query);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedProvider;
    use std::collections::HashMap;

    fn flagged_state() -> PipelineState {
        let mut state = PipelineState::new("Write about AI", HashMap::new());
        state.enhanced_query =
            Some("Write an essay. Write an essay about artificial intelligence.".to_string());
        state.validation = Some(ValidationVerdict::NeedsAdjustment);
        state.validation_issues = vec!["Repeated phrase: 'Write an essay'".to_string()];
        state
    }

    #[tokio::test]
    async fn test_adjustment_rewrites_query() {
        let provider = ScriptedProvider::new(vec![
            "Write a comprehensive essay about artificial intelligence.",
        ]);
        let state = flagged_state();

        let state = adjust_query(state, &provider).await.unwrap();

        let final_query = state.final_query.unwrap();
        assert_eq!(
            final_query,
            "Write a comprehensive essay about artificial intelligence."
        );
        assert_ne!(Some(final_query), state.enhanced_query);
    }

    #[tokio::test]
    async fn test_valid_verdict_passes_through_without_call() {
        let provider = ScriptedProvider::new(vec![]);
        let mut state = PipelineState::new("Write about AI", HashMap::new());
        state.enhanced_query = Some("A fine enhanced query.".to_string());
        state.validation = Some(ValidationVerdict::Valid);

        let state = adjust_query(state, &provider).await.unwrap();

        // Final query strictly equals the enhanced query, zero provider calls
        assert_eq!(state.final_query.as_deref(), Some("A fine enhanced query."));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_skip_keeps_original_query_without_call() {
        let provider = ScriptedProvider::new(vec![]);
        let mut state = PipelineState::new("Write about AI", HashMap::new());
        state.skip_enhance = true;
        state.enhanced_query = Some("Write about AI".to_string());
        state.validation = Some(ValidationVerdict::Valid);

        let state = adjust_query(state, &provider).await.unwrap();

        assert_eq!(state.final_query.as_deref(), Some("Write about AI"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_repair_falls_back_to_enhanced() {
        let provider = ScriptedProvider::failing("backend down");
        let state = flagged_state();
        let enhanced = state.enhanced_query.clone();

        let state = adjust_query(state, &provider).await.unwrap();

        assert_eq!(state.final_query, enhanced);
    }
}
