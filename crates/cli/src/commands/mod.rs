//! Command handlers for the QueryPilot CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod chat;
pub mod list;
pub mod register;

// Re-export command types for convenience
pub use chat::ChatCommand;
pub use list::ListCommand;
pub use register::RegisterCommand;
