use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for a workflow run.
///
/// Every variant that originates inside a step carries the step name so the
/// caller can decide whether resubmission is safe. The engine performs no
/// internal retries; idempotent step design makes resubmission safe for the
/// persistence path and tolerable for notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Malformed or incomplete submission, rejected before any step runs
    #[error("invalid submission: {0}")]
    Validation(String),

    /// A step's declared input field is absent from the execution context.
    /// Indicates a workflow-definition bug and is fatal to the run.
    #[error("step {step}: required field `{field}` is absent from the context")]
    MissingField {
        /// Step that declared the field
        step: String,
        /// The absent field name
        field: String,
    },

    /// A step's delta tried to rewrite a field an earlier step already wrote.
    /// Same definition-bug class as [`WorkflowError::MissingField`].
    #[error("step {step}: attempted to overwrite field `{field}`")]
    FieldOverwrite {
        /// Step whose delta collided
        step: String,
        /// The field that already existed
        field: String,
    },

    /// An external-effect step's collaborator failed or was unreachable
    #[error("step {step}: dependency unavailable: {reason}")]
    DependencyUnavailable {
        /// Step whose collaborator failed
        step: String,
        /// Collaborator-reported reason
        reason: String,
    },

    /// Persistence key collision with a differing payload
    #[error("review ({book_id}, {ref_id}) already persisted with a different payload")]
    ConflictWrite {
        /// Partition key of the colliding record
        book_id: String,
        /// Sort key of the colliding record
        ref_id: String,
    },

    /// The run exceeded its time budget and was aborted
    #[error("run exceeded its time budget of {budget:?}")]
    Timeout {
        /// The configured budget that expired
        budget: Duration,
    },

    /// Invalid workflow definition (bad graph shape, unknown step type)
    #[error("invalid workflow definition: {0}")]
    Definition(String),

    /// Illegal run state transition
    #[error("illegal run transition: {0}")]
    RunState(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl WorkflowError {
    /// The name of the step this failure originated in, if any.
    pub fn step(&self) -> Option<&str> {
        match self {
            WorkflowError::MissingField { step, .. }
            | WorkflowError::FieldOverwrite { step, .. }
            | WorkflowError::DependencyUnavailable { step, .. } => Some(step),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for WorkflowError {
    fn from(err: serde_json::Error) -> Self {
        WorkflowError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                WorkflowError::Validation("bookId must be non-empty".to_string()),
                "invalid submission: bookId must be non-empty",
            ),
            (
                WorkflowError::MissingField {
                    step: "detect_sentiment".to_string(),
                    field: "message".to_string(),
                },
                "step detect_sentiment: required field `message` is absent from the context",
            ),
            (
                WorkflowError::FieldOverwrite {
                    step: "generate_ref_id".to_string(),
                    field: "refId".to_string(),
                },
                "step generate_ref_id: attempted to overwrite field `refId`",
            ),
            (
                WorkflowError::DependencyUnavailable {
                    step: "detect_sentiment".to_string(),
                    reason: "classifier offline".to_string(),
                },
                "step detect_sentiment: dependency unavailable: classifier offline",
            ),
            (
                WorkflowError::ConflictWrite {
                    book_id: "B1".to_string(),
                    ref_id: "r#abc".to_string(),
                },
                "review (B1, r#abc) already persisted with a different payload",
            ),
            (
                WorkflowError::Definition("duplicate node id: persist_review".to_string()),
                "invalid workflow definition: duplicate node id: persist_review",
            ),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_timeout_display_mentions_budget() {
        let error = WorkflowError::Timeout {
            budget: Duration::from_secs(300),
        };
        assert!(error.to_string().contains("300"));
    }

    #[test]
    fn test_originating_step() {
        let error = WorkflowError::DependencyUnavailable {
            step: "persist_review".to_string(),
            reason: "sink offline".to_string(),
        };
        assert_eq!(error.step(), Some("persist_review"));

        let error = WorkflowError::Validation("empty".to_string());
        assert_eq!(error.step(), None);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error: WorkflowError = json_error.into();

        match error {
            WorkflowError::Serialization(msg) => assert!(msg.contains("expected value")),
            _ => panic!("Expected Serialization variant"),
        }
    }
}
