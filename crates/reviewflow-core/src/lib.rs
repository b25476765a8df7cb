//!
//! Reviewflow Core - workflow orchestration engine for review intake
//!
//! This crate defines the step contracts, the execution context, the
//! workflow definition graph, and the orchestrator that interprets it.
//! External collaborators (classifier, storage sink, notification channel)
//! are injected behind the traits in [`domain::ports`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;

/// Application services - orchestration logic
pub mod application;

/// Domain layer - data model, definitions, and collaborator contracts
pub mod domain;

/// Error types
pub mod error;

/// Concrete workflow steps
pub mod steps;

// Re-export key types
pub use application::orchestrator::{
    Orchestrator, OrchestratorConfig, RunOutcome, StepRegistry,
};
pub use domain::context::{ExecutionContext, StepDelta};
pub use domain::definition::{
    DecisionDefinition, NodeDefinition, StepDefinition, WorkflowDefinition,
};
pub use domain::ports::{
    Classification, Classifier, ConfidenceScores, Notifier, PortError, PutOutcome, ReviewAlert,
    ReviewSink,
};
pub use domain::review::{RefId, ReviewRecord, ReviewSubmission, Sentiment};
pub use domain::run::{RunId, RunStatus, WorkflowRun};
pub use error::WorkflowError;

/// How safely a step can be re-executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyClass {
    /// No side effects outside its delta; safe to retry blindly
    Pure,

    /// Calls an outside system; a retry may duplicate effects unless the
    /// effect itself is idempotent
    ExternalEffect,
}

/// A unit of work in the workflow.
///
/// A step reads its declared input fields from the [`ExecutionContext`] and
/// returns a [`StepDelta`] of new fields. It must not have side effects
/// visible outside its delta except through its injected collaborator. The
/// orchestrator verifies required fields before invoking `execute` and merges
/// the delta append-only afterwards.
#[async_trait]
pub trait Step: Send + Sync {
    /// Registry key and error-reporting name of this step.
    fn name(&self) -> &str;

    /// Context fields this step reads.
    fn required_fields(&self) -> &'static [&'static str];

    /// Context fields this step produces.
    fn produced_fields(&self) -> &'static [&'static str];

    /// Whether retrying this step risks duplicate effects.
    fn idempotency(&self) -> IdempotencyClass;

    /// Execute the step against the current context.
    async fn execute(&self, context: &ExecutionContext) -> Result<StepDelta, WorkflowError>;
}
