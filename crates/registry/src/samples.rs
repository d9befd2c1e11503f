//! Built-in starter templates.
//!
//! A small library of ready-made templates so a fresh install can exercise
//! the pipeline before anyone registers their own.

use crate::template::Template;
use std::collections::HashMap;

/// The built-in sample templates, in registration order.
pub fn sample_templates() -> Vec<Template> {
    vec![
        Template::new(
            "essay_prompt",
            "Write a well-structured essay on {{ topic }} that includes \
             an introduction, body, and conclusion.",
            tags(&[("type", "essay"), ("task", "writing")]),
        ),
        Template::new(
            "email_prompt",
            "Write a {{ formality }} email to my {{ recipient_type }} about {{ topic }}.",
            tags(&[("type", "email"), ("task", "writing")]),
        ),
        Template::new(
            "comparison_prompt",
            "Compare {{ item_1 }} and {{ item_2 }} in terms of {{ aspects }}.",
            tags(&[("type", "comparison"), ("task", "analysis")]),
        ),
    ]
}

fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_well_formed() {
        let samples = sample_templates();
        assert_eq!(samples.len(), 3);
        for sample in samples {
            assert!(sample.name.ends_with("_prompt"));
            assert!(!sample.variables().is_empty());
            assert!(sample.tags.contains_key("type"));
        }
    }
}
