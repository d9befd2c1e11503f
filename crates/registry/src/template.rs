//! Template data model.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder pattern: `{{ name }}` with optional surrounding whitespace.
const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// A named, versioned instruction text with placeholder variables.
///
/// Templates are immutable once versioned and read-only to the pipeline;
/// only the registry creates new versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique key
    pub name: String,

    /// Text containing `{{ var }}` placeholders
    pub body: String,

    /// Free-form metadata; `type` carries the content type
    #[serde(default)]
    pub tags: HashMap<String, String>,

    /// Monotonic version, starting at 1
    pub version: u32,

    /// At most one version per name is marked production
    #[serde(default)]
    pub production: bool,
}

impl Template {
    /// Create the first version of a template.
    pub fn new(
        name: impl Into<String>,
        body: impl Into<String>,
        tags: HashMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            tags,
            version: 1,
            production: true,
        }
    }

    /// Declared variable names, derived from a placeholder scan of the body.
    ///
    /// Order of first appearance, de-duplicated.
    pub fn variables(&self) -> Vec<String> {
        let re = placeholder_regex();
        let mut seen = Vec::new();
        for capture in re.captures_iter(&self.body) {
            let name = capture[1].to_string();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    /// Content type for this template.
    ///
    /// Taken from the `type` tag when present, otherwise derived from the
    /// name with a trailing `_prompt` stripped ("essay_prompt" -> "essay").
    pub fn content_type(&self) -> &str {
        if let Some(tag) = self.tags.get("type") {
            return tag;
        }
        self.name.strip_suffix("_prompt").unwrap_or(&self.name)
    }

    /// Substitute placeholders with values from `params`.
    ///
    /// Placeholders without a value are left in place; the enhancement stage
    /// guarantees every declared variable has one before rendering.
    pub fn render(&self, params: &HashMap<String, String>) -> String {
        let re = placeholder_regex();
        re.replace_all(&self.body, |caps: &regex::Captures| {
            match params.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
    }
}

fn placeholder_regex() -> Regex {
    // The pattern is a compile-time constant; construction cannot fail
    Regex::new(PLACEHOLDER_PATTERN).unwrap_or_else(|_| unreachable!())
}
