use crate::domain::context::{fields, ExecutionContext, StepDelta};
use crate::domain::review::RefId;
use crate::{IdempotencyClass, Step, WorkflowError};
use async_trait::async_trait;
use serde_json::Value;

/// Allocates a fresh reference id for the review.
///
/// Re-executing this step (on resubmission of a failed run) allocates a new
/// id, so a resubmitted review persists under a different key.
#[derive(Debug, Default)]
pub struct GenerateRefId;

impl GenerateRefId {
    /// Create the step.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for GenerateRefId {
    fn name(&self) -> &str {
        "generate_ref_id"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn produced_fields(&self) -> &'static [&'static str] {
        &[fields::REF_ID]
    }

    fn idempotency(&self) -> IdempotencyClass {
        IdempotencyClass::Pure
    }

    async fn execute(&self, _context: &ExecutionContext) -> Result<StepDelta, WorkflowError> {
        let ref_id = RefId::generate();
        Ok(StepDelta::new().set(fields::REF_ID, Value::String(ref_id.0)))
    }
}
