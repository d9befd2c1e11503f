//! The five pipeline stages.
//!
//! Control flows strictly match -> enhance -> validate -> (adjust) ->
//! generate. Each stage consumes the state and returns a new one; the
//! skip flag set by matching turns the middle stages into pass-throughs.

pub mod adjust;
pub mod enhance;
pub mod generate;
pub mod matching;
pub mod validate;

pub use adjust::adjust_query;
pub use enhance::enhance_query;
pub use generate::generate_response;
pub use matching::match_prompt;
pub use validate::validate_query;
