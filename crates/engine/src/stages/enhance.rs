//! Enhancement stage: fill the matched template's variables.
//!
//! Every declared variable must receive some value before formatting;
//! variables the matcher did not infer get a synthesized default. The exact
//! synthesis rule is a policy choice, not a contract — callers may rely on
//! presence of a value, not its text.

use crate::state::PipelineState;
use querypilot_core::{AppError, AppResult};

/// Produce the enhanced query from the matched template.
///
/// Skip-flagged states pass through with the original query. Inferred
/// parameter values always win over synthesized defaults, so re-running the
/// stage on a fully parameterized state changes nothing.
pub async fn enhance_query(mut state: PipelineState) -> AppResult<PipelineState> {
    if state.skip_enhance {
        state.enhanced_query = Some(state.user_query.clone());
        return Ok(state);
    }

    let name = state
        .prompt_match
        .as_ref()
        .and_then(|m| m.prompt_name.as_deref())
        .ok_or_else(|| {
            AppError::Other("Enhancement ran without a match decision".to_string())
        })?;

    let template = state.available.get(name).ok_or_else(|| {
        AppError::Registry(format!("Matched template missing from snapshot: {}", name))
    })?;

    let mut synthesized = 0;
    for variable in template.variables() {
        if !state.parameters.contains_key(&variable) {
            let value = synthesize_default(&variable, &state.user_query);
            tracing::debug!(variable = %variable, value = %value, "Synthesized parameter");
            state.parameters.insert(variable, value);
            synthesized += 1;
        }
    }

    let enhanced = template.render(&state.parameters);

    tracing::info!(
        template = %name,
        synthesized,
        "Enhanced query from template"
    );

    state.enhanced_query = Some(enhanced);
    Ok(state)
}

/// Default value for a declared variable the matcher did not infer.
fn synthesize_default(variable: &str, user_query: &str) -> String {
    let lower = variable.to_lowercase();

    if lower.contains("topic") || lower.contains("subject") {
        return derive_topic(user_query);
    }
    if lower.contains("formality") || lower.contains("tone") || lower.contains("style") {
        return "formal".to_string();
    }
    if lower.contains("recipient") || lower.contains("audience") {
        return "general".to_string();
    }
    if lower.contains("length") {
        return "medium".to_string();
    }

    "general".to_string()
}

/// Derive a topic from the tail of the query.
///
/// Takes the text after the first "about"/"regarding"/"on" marker, falling
/// back to the whole query.
fn derive_topic(user_query: &str) -> String {
    for marker in [" about ", " regarding ", " on "] {
        if let Some(idx) = find_ignore_ascii_case(user_query, marker) {
            let tail = user_query[idx + marker.len()..]
                .trim()
                .trim_end_matches(['.', '!', '?']);
            if !tail.is_empty() {
                return tail.to_string();
            }
        }
    }

    user_query.trim().trim_end_matches(['.', '!', '?']).to_string()
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MatchStatus, PromptMatch};
    use crate::testutil::{email_template, essay_template, snapshot_of};
    use std::collections::HashMap;

    fn matched_state(
        query: &str,
        template_name: &str,
        parameters: HashMap<String, String>,
    ) -> PipelineState {
        let mut state = PipelineState::new(
            query,
            snapshot_of(vec![essay_template(), email_template()]),
        );
        state.prompt_match = Some(PromptMatch {
            status: MatchStatus::Matched,
            prompt_name: Some(template_name.to_string()),
            confidence: Some(90),
            reasoning: None,
        });
        state.parameters = parameters;
        state
    }

    #[tokio::test]
    async fn test_enhance_with_inferred_parameters() {
        let state = matched_state(
            "Write an essay about AI",
            "essay_prompt",
            HashMap::from([("topic".to_string(), "AI".to_string())]),
        );

        let state = enhance_query(state).await.unwrap();

        let enhanced = state.enhanced_query.unwrap();
        assert!(enhanced.contains("AI"));
        assert!(!enhanced.contains("{{"));
    }

    #[tokio::test]
    async fn test_missing_parameters_are_synthesized() {
        let state = matched_state(
            "Write an email about vacation",
            "email_prompt",
            HashMap::from([("topic".to_string(), "vacation".to_string())]),
        );

        let state = enhance_query(state).await.unwrap();

        // Every declared variable received a value
        assert!(state.parameters.contains_key("formality"));
        assert!(state.parameters.contains_key("recipient_type"));
        // The inferred value survived untouched
        assert_eq!(state.parameters["topic"], "vacation");
        assert!(!state.enhanced_query.unwrap().contains("{{"));
    }

    #[tokio::test]
    async fn test_enhance_is_idempotent_on_full_parameters() {
        let full = HashMap::from([
            ("formality".to_string(), "casual".to_string()),
            ("recipient_type".to_string(), "boss".to_string()),
            ("topic".to_string(), "vacation".to_string()),
        ]);
        let state = matched_state("Write an email about vacation", "email_prompt", full.clone());

        let state = enhance_query(state).await.unwrap();
        let first = state.enhanced_query.clone().unwrap();
        assert_eq!(state.parameters, full);

        // Re-running does not alter existing values
        let mut again = matched_state("Write an email about vacation", "email_prompt", full.clone());
        again.parameters = state.parameters.clone();
        let again = enhance_query(again).await.unwrap();
        assert_eq!(again.parameters, full);
        assert_eq!(again.enhanced_query.unwrap(), first);
    }

    #[tokio::test]
    async fn test_skip_passes_original_through() {
        let mut state = PipelineState::new("Write an essay about AI", HashMap::new());
        state.skip_enhance = true;

        let state = enhance_query(state).await.unwrap();
        assert_eq!(state.enhanced_query.as_deref(), Some("Write an essay about AI"));
    }

    #[test]
    fn test_derive_topic_from_about() {
        assert_eq!(derive_topic("Write an essay about climate change."), "climate change");
        assert_eq!(derive_topic("Tell me ABOUT rust"), "rust");
    }

    #[test]
    fn test_derive_topic_fallback_is_whole_query() {
        assert_eq!(derive_topic("Summarize this document!"), "Summarize this document");
    }

    #[test]
    fn test_synthesize_default_policy() {
        let query = "Write an email about vacation";
        assert_eq!(synthesize_default("formality", query), "formal");
        assert_eq!(synthesize_default("tone", query), "formal");
        assert_eq!(synthesize_default("recipient_type", query), "general");
        assert_eq!(synthesize_default("topic", query), "vacation");
        assert_eq!(synthesize_default("aspects", query), "general");
    }
}
