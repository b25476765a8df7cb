use crate::domain::review::ReviewSubmission;
use crate::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known context field names.
pub mod fields {
    /// Partition key of the review
    pub const BOOK_ID: &str = "bookId";
    /// Review author
    pub const REVIEWER: &str = "reviewer";
    /// Review text
    pub const MESSAGE: &str = "message";
    /// Classifier output label
    pub const SENTIMENT: &str = "sentiment";
    /// Allocated reference identifier
    pub const REF_ID: &str = "refId";
}

/// The set of new fields a single step produced. Merging a delta into the
/// context is the only way a step affects later steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDelta {
    fields: BTreeMap<String, Value>,
}

impl StepDelta {
    /// An empty delta (for steps whose effect is external only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a produced field to the delta.
    pub fn set(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// True if the step produced no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate the produced fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }
}

/// Per-run document threading data between steps.
///
/// Seeded from the accepted submission and append-only from then on: once a
/// step writes a field, later steps may read it but never overwrite it. Owned
/// exclusively by the single in-flight run and dropped at terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    fields: BTreeMap<String, Value>,
}

impl ExecutionContext {
    /// Create a context seeded with the submission's fields.
    pub fn seeded_from(submission: &ReviewSubmission) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            fields::BOOK_ID.to_string(),
            Value::String(submission.book_id().to_string()),
        );
        fields.insert(
            fields::REVIEWER.to_string(),
            Value::String(submission.reviewer().to_string()),
        );
        fields.insert(
            fields::MESSAGE.to_string(),
            Value::String(submission.message().to_string()),
        );
        Self { fields }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// True if the field has been written.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Look up a field, failing with [`WorkflowError::MissingField`] on
    /// behalf of the named step if it is absent.
    pub fn require(&self, step: &str, field: &str) -> Result<&Value, WorkflowError> {
        self.fields
            .get(field)
            .ok_or_else(|| WorkflowError::MissingField {
                step: step.to_string(),
                field: field.to_string(),
            })
    }

    /// As [`ExecutionContext::require`], additionally requiring the value to
    /// be a string.
    pub fn require_str(&self, step: &str, field: &str) -> Result<&str, WorkflowError> {
        self.require(step, field)?.as_str().ok_or_else(|| {
            WorkflowError::Definition(format!(
                "step {}: field `{}` is not a string",
                step, field
            ))
        })
    }

    /// Merge a step's delta. Rejects any field an earlier step already wrote.
    pub fn merge(&mut self, step: &str, delta: StepDelta) -> Result<(), WorkflowError> {
        let incoming = delta.into_fields();

        for name in incoming.keys() {
            if self.fields.contains_key(name) {
                return Err(WorkflowError::FieldOverwrite {
                    step: step.to_string(),
                    field: name.clone(),
                });
            }
        }

        self.fields.extend(incoming);
        Ok(())
    }

    /// Names of all fields written so far.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }
}
