//! Matching stage: classify the query against the registered templates.

use crate::extract::parse_json_object;
use crate::prompts::{matching_prompt, NO_MATCH_SENTINEL};
use crate::state::{MatchStatus, PipelineState, PromptMatch};
use querypilot_core::AppResult;
use querypilot_llm::Provider;
use std::collections::HashMap;

/// Match the user query to the best-fitting template.
///
/// With an empty snapshot the stage short-circuits to
/// `no_prompts_available` without calling the provider. A provider failure
/// here propagates to the pipeline caller: once templates exist there is no
/// safe default decision. A malformed or sentinel reply degrades to
/// `no_match`.
pub async fn match_prompt(
    mut state: PipelineState,
    provider: &dyn Provider,
) -> AppResult<PipelineState> {
    if state.available.is_empty() {
        tracing::info!("No templates registered; skipping enhancement");
        state.prompt_match = Some(PromptMatch::no_prompts_available());
        state.skip_enhance = true;
        return Ok(state);
    }

    let prompt = matching_prompt(&state.user_query, &state.available);

    // Provider failures propagate (see error-handling policy)
    let reply = provider.generate_response(&prompt, None).await?;

    let decision = match parse_json_object(&reply) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::warn!("Unparseable match decision, treating as no match: {}", e);
            state.prompt_match = Some(PromptMatch::no_match());
            state.skip_enhance = true;
            return Ok(state);
        }
    };

    let prompt_name = decision
        .get("prompt_name")
        .and_then(|v| v.as_str())
        .unwrap_or(NO_MATCH_SENTINEL)
        .to_string();

    // The sentinel and hallucinated names both mean no usable match
    if prompt_name == NO_MATCH_SENTINEL || !state.available.contains_key(&prompt_name) {
        if prompt_name != NO_MATCH_SENTINEL {
            tracing::warn!("Matcher chose unknown template '{}'", prompt_name);
        }
        state.prompt_match = Some(PromptMatch::no_match());
        state.skip_enhance = true;
        return Ok(state);
    }

    let confidence = decision
        .get("confidence")
        .and_then(|v| v.as_u64())
        .map(|c| c.min(100) as u8);

    let reasoning = decision
        .get("reasoning")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let parameters = decision
        .get("parameters")
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| {
                    let value = match v.as_str() {
                        Some(s) => s.to_string(),
                        None => v.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_else(HashMap::new);

    // Snapshot membership was checked above
    let content_type = state
        .available
        .get(&prompt_name)
        .map(|t| t.content_type().to_string());

    tracing::info!(
        template = %prompt_name,
        confidence = ?confidence,
        "Matched query to template"
    );

    state.prompt_match = Some(PromptMatch {
        status: MatchStatus::Matched,
        prompt_name: Some(prompt_name),
        confidence,
        reasoning,
    });
    state.content_type = content_type;
    state.parameters = parameters;
    state.skip_enhance = false;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{essay_template, snapshot_of, ScriptedProvider};
    use querypilot_core::AppError;

    #[tokio::test]
    async fn test_match_found() {
        let provider = ScriptedProvider::new(vec![
            r#"{"prompt_name": "essay_prompt", "confidence": 90,
               "reasoning": "This is a request for an essay",
               "parameters": {"topic": "AI"}}"#,
        ]);
        let state = PipelineState::new(
            "Write an essay about AI",
            snapshot_of(vec![essay_template()]),
        );

        let state = match_prompt(state, &provider).await.unwrap();

        let prompt_match = state.prompt_match.unwrap();
        assert_eq!(prompt_match.status, MatchStatus::Matched);
        assert_eq!(prompt_match.prompt_name.as_deref(), Some("essay_prompt"));
        assert_eq!(prompt_match.confidence, Some(90));
        assert_eq!(state.content_type.as_deref(), Some("essay"));
        assert_eq!(state.parameters["topic"], "AI");
        assert!(!state.skip_enhance);
    }

    #[tokio::test]
    async fn test_sentinel_means_no_match() {
        let provider = ScriptedProvider::new(vec![
            r#"{"prompt_name": "none", "confidence": 0,
               "reasoning": "No matching template found", "parameters": {}}"#,
        ]);
        let state = PipelineState::new(
            "Do something unusual",
            snapshot_of(vec![essay_template()]),
        );

        let state = match_prompt(state, &provider).await.unwrap();

        assert_eq!(state.prompt_match.unwrap().status, MatchStatus::NoMatch);
        assert!(state.skip_enhance);
    }

    #[tokio::test]
    async fn test_unknown_template_name_means_no_match() {
        let provider = ScriptedProvider::new(vec![
            r#"{"prompt_name": "poem_prompt", "confidence": 95}"#,
        ]);
        let state = PipelineState::new("Write a poem", snapshot_of(vec![essay_template()]));

        let state = match_prompt(state, &provider).await.unwrap();

        assert_eq!(state.prompt_match.unwrap().status, MatchStatus::NoMatch);
        assert!(state.skip_enhance);
    }

    #[tokio::test]
    async fn test_empty_snapshot_short_circuits() {
        let provider = ScriptedProvider::new(vec![]);
        let state = PipelineState::new("Write an essay about AI", HashMap::new());

        let state = match_prompt(state, &provider).await.unwrap();

        assert_eq!(
            state.prompt_match.unwrap().status,
            MatchStatus::NoPromptsAvailable
        );
        assert!(state.skip_enhance);
        // No LLM call was made
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_reply_degrades_to_no_match() {
        let provider = ScriptedProvider::new(vec!["I have no idea what to pick."]);
        let state = PipelineState::new("Write something", snapshot_of(vec![essay_template()]));

        let state = match_prompt(state, &provider).await.unwrap();

        assert_eq!(state.prompt_match.unwrap().status, MatchStatus::NoMatch);
        assert!(state.skip_enhance);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = ScriptedProvider::failing("connection refused");
        let state = PipelineState::new("Write an essay", snapshot_of(vec![essay_template()]));

        let result = match_prompt(state, &provider).await;
        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[tokio::test]
    async fn test_reply_wrapped_in_prose() {
        let provider = ScriptedProvider::new(vec![
            "Here is my decision:\n```json\n{\"prompt_name\": \"essay_prompt\", \
             \"confidence\": 75, \"parameters\": {\"topic\": \"history\"}}\n```",
        ]);
        let state = PipelineState::new(
            "Write an essay about history",
            snapshot_of(vec![essay_template()]),
        );

        let state = match_prompt(state, &provider).await.unwrap();
        assert_eq!(state.prompt_match.unwrap().status, MatchStatus::Matched);
        assert_eq!(state.parameters["topic"], "history");
    }
}
