//! Domain layer: review data model, execution context, workflow definition,
//! run aggregate, and collaborator contracts.

/// Execution context threaded between steps
pub mod context;

/// Workflow definition graph
pub mod definition;

/// Collaborator (port) traits
pub mod ports;

/// Review submission, sentiment, and record types
pub mod review;

/// Per-run aggregate and state machine
pub mod run;
