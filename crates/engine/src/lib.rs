//! Query refinement engine for QueryPilot.
//!
//! This crate implements the fixed five-stage pipeline that routes a
//! free-form user query to the best-matching registered template, fills its
//! parameters, validates and repairs the resulting text, and forwards it to
//! a provider for the final response:
//!
//! ```text
//! match -> enhance -> validate -> (adjust) -> generate
//! ```
//!
//! Every stage is a pure function of state-in to state-out: it consumes an
//! owned [`PipelineState`] and returns a new one, which keeps concurrent
//! pipeline invocations independent and each stage testable in isolation.

pub mod extract;
pub mod processor;
pub mod prompts;
pub mod stages;
pub mod state;

// Re-export main types
pub use processor::{process_query, process_query_with_config, QueryOutcome};
pub use state::{MatchStatus, PipelineState, PromptMatch, ValidationVerdict};

#[cfg(test)]
pub(crate) mod testutil;
