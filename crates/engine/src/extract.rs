//! Tolerant JSON extraction from free-form LLM text.
//!
//! Providers are asked for a bare JSON object, but models wrap their answer
//! in prose or code fences often enough that a strict parse alone is too
//! brittle. Parsing is two-phase: a strict parse first, then a brace-scan
//! for the first balanced object embedded in the text. Both phases are
//! independently testable.

use querypilot_core::{AppError, AppResult};

/// Parse a JSON object out of provider text.
///
/// # Errors
/// `AppError::Parse` when neither the whole text nor any embedded fragment
/// is a JSON object.
pub fn parse_json_object(text: &str) -> AppResult<serde_json::Value> {
    let trimmed = text.trim();

    // Phase 1: strict parse
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if value.is_object() {
            return Ok(value);
        }
    }

    // Phase 2: bracket-scanning extraction
    extract_embedded_object(text).ok_or_else(|| {
        AppError::Parse(format!(
            "No JSON object found in provider response: {}",
            truncate(text, 120)
        ))
    })
}

/// Find the first balanced `{ ... }` fragment that parses as a JSON object.
///
/// The scan is string- and escape-aware, so braces inside string literals do
/// not confuse the depth tracking. A balanced fragment that fails to parse
/// does not end the search; scanning resumes past its opening brace.
pub fn extract_embedded_object(text: &str) -> Option<serde_json::Value> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;

        if let Some(end) = balanced_end(&text[start..]) {
            let candidate = &text[start..start + end];
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }

        search_from = start + 1;
    }

    None
}

/// Byte length of the balanced object starting at the first byte of `text`
/// (which must be `{`), or `None` if it never closes.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
