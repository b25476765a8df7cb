use crate::domain::context::{ExecutionContext, StepDelta};
use crate::WorkflowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is initializing
    Created,

    /// Run is currently executing steps
    Running,

    /// Run reached the terminal success state
    Completed,

    /// Run failed on an unrecovered step failure
    Failed,
}

/// Value object: Run ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

/// Aggregate: one in-flight workflow execution.
///
/// Owns the [`ExecutionContext`] for its lifetime. Nothing about the run
/// itself is persisted; only the record the persistence step writes
/// survives the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Unique identifier
    pub id: RunId,

    /// Name of the workflow definition being executed
    pub workflow: String,

    /// Current status
    pub status: RunStatus,

    /// Data threaded between steps
    pub context: ExecutionContext,

    /// Node ids of completed steps, in execution order
    pub completed_steps: Vec<String>,

    /// Error message if the run failed
    pub error: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRun {
    /// Create a new run over the given seeded context.
    pub fn new(workflow: &str, context: ExecutionContext) -> Self {
        let now = Utc::now();
        Self {
            id: RunId(Uuid::new_v4().to_string()),
            workflow: workflow.to_string(),
            status: RunStatus::Created,
            context,
            completed_steps: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Begin executing steps.
    pub fn start(&mut self) -> Result<(), WorkflowError> {
        if self.status != RunStatus::Created {
            return Err(WorkflowError::RunState(format!(
                "cannot start run in state {:?}",
                self.status
            )));
        }

        self.status = RunStatus::Running;
        self.touch();
        Ok(())
    }

    /// Record a completed step, merging its delta into the context.
    pub fn complete_step(&mut self, step_id: &str, delta: StepDelta) -> Result<(), WorkflowError> {
        if self.status != RunStatus::Running {
            return Err(WorkflowError::RunState(format!(
                "cannot complete step while run is in state {:?}",
                self.status
            )));
        }

        self.context.merge(step_id, delta)?;
        self.completed_steps.push(step_id.to_string());
        self.touch();
        Ok(())
    }

    /// Transition to the terminal success state.
    pub fn complete(&mut self) -> Result<(), WorkflowError> {
        if self.status != RunStatus::Running {
            return Err(WorkflowError::RunState(format!(
                "cannot complete run in state {:?}",
                self.status
            )));
        }

        self.status = RunStatus::Completed;
        self.touch();
        Ok(())
    }

    /// Transition to the terminal failure state.
    pub fn fail(&mut self, error: String) -> Result<(), WorkflowError> {
        if self.status == RunStatus::Completed || self.status == RunStatus::Failed {
            return Err(WorkflowError::RunState(format!(
                "cannot fail run in state {:?}",
                self.status
            )));
        }

        self.status = RunStatus::Failed;
        self.error = Some(error);
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
