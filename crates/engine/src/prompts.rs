//! Prompt construction for the structured LLM exchanges.
//!
//! Three of the five stages talk to a provider with a purpose-built prompt:
//! matching (structured decision), validation (structured verdict), and
//! adjustment (free-text repair). The JSON field names here are a wire
//! contract shared with the stage parsers.

use querypilot_registry::Template;
use std::collections::HashMap;

/// Sentinel the matcher returns when no template fits.
pub const NO_MATCH_SENTINEL: &str = "none";

/// Build the classification prompt for the matching stage.
///
/// Lists each template's name, content type, and declared variables so the
/// model can both choose a template and extract parameter values present in
/// the query.
pub fn matching_prompt(user_query: &str, available: &HashMap<String, Template>) -> String {
    let mut catalog: Vec<String> = available
        .values()
        .map(|t| {
            format!(
                "- {} (type: {}, variables: {})",
                t.name,
                t.content_type(),
                if t.variables().is_empty() {
                    "none".to_string()
                } else {
                    t.variables().join(", ")
                }
            )
        })
        .collect();
    catalog.sort();

    format!(
        r#"You route user queries to prompt templates.

User query: "{query}"

Available templates:
{catalog}

Choose the template that best fits the query. Respond with a single JSON object:
{{"prompt_name": "<template name or {sentinel}>", "confidence": <0-100>, "reasoning": "<why>", "parameters": {{<values for the template's variables that appear in the query>}}}}

Use "{sentinel}" as the prompt_name if no template is a good fit. Only extract
parameter values actually present in the query; leave others out."#,
        query = user_query,
        catalog = catalog.join("\n"),
        sentinel = NO_MATCH_SENTINEL,
    )
}

/// Build the inspection prompt for the validation stage.
pub fn validation_prompt(enhanced_query: &str) -> String {
    format!(
        r#"Review the following instruction for defects: repeated phrases,
incoherent wording, or unresolved placeholders like {{{{ variable }}}}.

Instruction:
{enhanced}

Respond with a single JSON object:
{{"valid": <true or false>, "issues": ["<each defect found>"]}}

Return {{"valid": true, "issues": []}} if the instruction is sound."#,
        enhanced = enhanced_query,
    )
}

/// Build the repair prompt for the adjustment stage.
///
/// The reply is used verbatim as the final query, so the prompt insists on
/// bare text.
pub fn adjustment_prompt(user_query: &str, enhanced_query: &str, issues: &[String]) -> String {
    let issue_list: Vec<String> = issues.iter().map(|i| format!("- {}", i)).collect();

    format!(
        r#"An instruction derived from a user query has defects. Produce a
corrected instruction that preserves the user's intent.

Original query:
{original}

Instruction with defects:
{enhanced}

Defects:
{issues}

Respond with only the corrected instruction text, no commentary."#,
        original = user_query,
        enhanced = enhanced_query,
        issues = issue_list.join("\n"),
    )
}
