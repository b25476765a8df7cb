//! Application services.

/// Workflow interpreter and step registry
pub mod orchestrator;
