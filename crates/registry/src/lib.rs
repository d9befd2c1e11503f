//! Template registry for QueryPilot.
//!
//! This crate provides:
//! - The `Template` data model (named, versioned instruction text with
//!   `{{ var }}` placeholders)
//! - The `TemplateRegistry` collaborator interface consumed by the pipeline
//! - An in-memory implementation with version history and JSON-file
//!   persistence used by the CLI and tests

pub mod samples;
pub mod store;
pub mod template;

// Re-export main types
pub use store::{
    InMemoryRegistry, SampleReport, TemplateDetails, TemplateRegistry, TemplateSummary,
};
pub use template::Template;
