//! Shared test support for stage unit tests.

use querypilot_core::{AppError, AppResult};
use querypilot_llm::Provider;
use querypilot_registry::Template;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A provider that replays scripted replies and counts calls.
///
/// Replies are consumed in order; `Err` entries surface as provider errors.
/// Calls beyond the script fail, which catches stages that talk to the
/// provider when they should pass through.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().map(|r| Ok(r.to_string())).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(vec![Err(message.to_string())]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_response(&self, _prompt: &str, _system: Option<&str>) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut replies = self.replies.lock().unwrap();
        match replies.pop() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(AppError::Provider(message)),
            None => Err(AppError::Provider("Unexpected provider call".to_string())),
        }
    }
}

/// Single-variable template used across the stage tests.
pub fn essay_template() -> Template {
    Template::new(
        "essay_prompt",
        "Write a well-structured essay on {{ topic }} that includes \
         an introduction, body, and conclusion.",
        HashMap::from([
            ("type".to_string(), "essay".to_string()),
            ("task".to_string(), "writing".to_string()),
        ]),
    )
}

/// A multi-variable template for default-synthesis tests.
pub fn email_template() -> Template {
    Template::new(
        "email_prompt",
        "Write a {{ formality }} email to my {{ recipient_type }} about {{ topic }}.",
        HashMap::from([
            ("type".to_string(), "email".to_string()),
            ("task".to_string(), "writing".to_string()),
        ]),
    )
}

pub fn snapshot_of(templates: Vec<Template>) -> HashMap<String, Template> {
    templates
        .into_iter()
        .map(|t| (t.name.clone(), t))
        .collect()
}
