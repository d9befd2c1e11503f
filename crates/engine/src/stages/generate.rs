//! Generation stage: produce the terminal answer.
//!
//! The caller always receives displayable text; a backend failure is
//! embedded into the response string instead of surfacing as an error.

use crate::state::PipelineState;
use querypilot_core::AppResult;
use querypilot_llm::Provider;

/// Send the final query to the provider for the terminal answer.
pub async fn generate_response(
    mut state: PipelineState,
    provider: &dyn Provider,
) -> AppResult<PipelineState> {
    let outgoing = state.outgoing_query().to_string();

    tracing::info!(provider = provider.name(), "Generating final response");

    let response = match provider.generate_response(&outgoing, None).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            format!("Error generating response: {}", e)
        }
    };

    state.response = Some(response);
    Ok(state)
}
